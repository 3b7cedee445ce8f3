//! A [`ProcessRunner`] that replays canned outputs and records what it was
//! asked to run.

use std::{
    collections::VecDeque,
    sync::{Arc, Mutex},
};

use crate::process::{Error, Invocation, Output, ProcessRunner};

#[derive(Debug, Default)]
struct State {
    outputs: VecDeque<Output>,
    invocations: Vec<Invocation>,
}

/// Outputs are handed out in the order they were pushed; once exhausted
/// every invocation succeeds with empty output.
#[derive(Clone, Debug, Default)]
pub struct ScriptedRunner {
    state: Arc<Mutex<State>>,
}

impl ScriptedRunner {
    pub fn new() -> Self { Self::default() }

    pub fn push_output(&self, code: i32, stdout: &str, stderr: &str) {
        self.state.lock().expect("runner state is poisoned").outputs.push_back(Output {
            code: Some(code),
            stdout: stdout.to_string(),
            stderr: stderr.to_string(),
        });
    }

    pub fn push_success(&self, stdout: &str) { self.push_output(0, stdout, ""); }

    pub fn push_failure(&self, code: i32, stderr: &str) { self.push_output(code, "", stderr); }

    pub fn invocations(&self) -> Vec<Invocation> {
        self.state.lock().expect("runner state is poisoned").invocations.clone()
    }

    pub fn command_lines(&self) -> Vec<String> {
        self.invocations().iter().map(ToString::to_string).collect()
    }

    /// Program and arguments of every invocation, unescaped.
    pub fn command_args(&self) -> Vec<Vec<String>> {
        self.invocations()
            .iter()
            .map(|invocation| {
                std::iter::once(invocation.program().as_os_str())
                    .chain(invocation.get_args())
                    .map(|arg| arg.to_string_lossy().into_owned())
                    .collect()
            })
            .collect()
    }
}

impl ProcessRunner for ScriptedRunner {
    async fn output(&self, invocation: &Invocation) -> Result<Output, Error> {
        let mut state = self.state.lock().expect("runner state is poisoned");
        state.invocations.push(invocation.clone());
        Ok(state.outputs.pop_front().unwrap_or(Output { code: Some(0), ..Output::default() }))
    }
}

mod tests {
    use super::ScriptedRunner;
    use crate::process::{Invocation, ProcessRunner};

    #[tokio::test]
    async fn test_debug_shows_queued_and_recorded_state() {
        let runner = ScriptedRunner::new();
        runner.push_failure(2, "no such file");
        let output = runner.output(&Invocation::new("ls").arg("/missing")).await.unwrap();
        assert_eq!(output.code, Some(2));
        runner.push_success("left over");

        let debug = format!("{runner:?}");
        assert!(debug.starts_with("ScriptedRunner"));
        assert!(debug.contains("left over"));
        assert!(debug.contains("missing"));
    }
}
