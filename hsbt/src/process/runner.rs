use std::{io::ErrorKind, process::Stdio};

use snafu::ResultExt;
use tokio::io::AsyncWriteExt;

use crate::process::{Invocation, Output, error, error::Error};

/// Executes [`Invocation`]s.
pub trait ProcessRunner {
    /// Runs the invocation to completion and captures its output. A non-zero
    /// exit status is not an error here.
    async fn output(&self, invocation: &Invocation) -> Result<Output, Error>;

    /// Runs the invocation and returns its standard output.
    ///
    /// # Errors
    ///
    /// Returns [`Error::CommandFailed`] if the process does not exit
    /// successfully, in addition to the errors of [`ProcessRunner::output`].
    async fn run(&self, invocation: &Invocation) -> Result<String, Error> {
        let output = self.output(invocation).await?;
        if output.success() {
            Ok(output.stdout)
        } else {
            error::CommandFailedSnafu {
                command: invocation.to_string(),
                code: output.code,
                stderr: output.stderr.trim().to_string(),
            }
            .fail()
        }
    }
}

/// Runs invocations as child processes of `hsbt`.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemRunner;

impl ProcessRunner for SystemRunner {
    async fn output(&self, invocation: &Invocation) -> Result<Output, Error> {
        let command_line = invocation.to_string();
        tracing::debug!("Run command: {command_line}");

        let stdin = if invocation.get_stdin().is_some() { Stdio::piped() } else { Stdio::null() };
        let mut command = tokio::process::Command::new(invocation.program());
        let _unused = command
            .args(invocation.get_args())
            .envs(invocation.get_envs())
            .stdin(stdin)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let mut child = command
            .spawn()
            .with_context(|_| error::SpawnCommandSnafu { command: command_line.clone() })?;

        // The child may fill its stdout pipe before it has read all of stdin.
        let child_stdin = child.stdin.take();
        let feed_stdin = async {
            let (Some(data), Some(mut child_stdin)) = (invocation.get_stdin(), child_stdin) else {
                return Ok(());
            };
            match child_stdin.write_all(data).await {
                // The child exited early; its status and stderr are reported.
                Err(err) if err.kind() == ErrorKind::BrokenPipe => Ok(()),
                result => result,
            }
        };
        let (written, output) = tokio::join!(feed_stdin, child.wait_with_output());

        let output = Output::from(
            output.with_context(|_| error::WaitCommandSnafu { command: command_line.clone() })?,
        );
        written.with_context(|_| error::WriteStdinSnafu { command: command_line.clone() })?;
        tracing::debug!(
            "Command `{command_line}` finished with {:?}, stdout: {:?}, stderr: {:?}",
            output.code,
            output.stdout,
            output.stderr
        );
        Ok(output)
    }
}

#[cfg(all(test, unix))]
mod tests {
    use std::time::Duration;

    use super::*;

    #[tokio::test]
    async fn test_run_captures_stdout() {
        let stdout = SystemRunner.run(&Invocation::new("echo").arg("hello")).await.unwrap();
        assert_eq!(stdout, "hello\n");
    }

    #[tokio::test]
    async fn test_run_feeds_stdin() {
        let invocation = Invocation::new("cat").stdin("ssh-rsa AAAA comment\n");
        let stdout = SystemRunner.run(&invocation).await.unwrap();
        assert_eq!(stdout, "ssh-rsa AAAA comment\n");
    }

    #[tokio::test]
    async fn test_run_passes_environment() {
        let invocation = Invocation::new("sh").args(["-c", "printf %s \"$HSBT_TEST\""]).env(
            "HSBT_TEST",
            "value",
        );
        assert_eq!(SystemRunner.run(&invocation).await.unwrap(), "value");
    }

    #[tokio::test]
    async fn test_non_zero_exit_is_reported() {
        let invocation = Invocation::new("sh").args(["-c", "echo oops >&2; exit 3"]);

        let output = SystemRunner.output(&invocation).await.unwrap();
        assert_eq!(output.code, Some(3));
        assert_eq!(output.stderr, "oops\n");

        let err = SystemRunner.run(&invocation).await.unwrap_err();
        assert!(matches!(err, Error::CommandFailed { code: Some(3), ref stderr, .. } if stderr == "oops"));
    }

    #[tokio::test]
    async fn test_large_stdin_is_fed_while_output_is_read() {
        let data = vec![b'x'; 1 << 20];
        let invocation = Invocation::new("cat").stdin(data.clone());

        let output =
            tokio::time::timeout(Duration::from_secs(30), SystemRunner.output(&invocation))
                .await
                .expect("cat should not block on its output pipe")
                .unwrap();
        assert!(output.success());
        assert_eq!(output.stdout.len(), data.len());
    }

    #[tokio::test]
    async fn test_child_ignoring_stdin_keeps_exit_status() {
        let invocation = Invocation::new("sh")
            .args(["-c", "echo denied >&2; exit 5"])
            .stdin(vec![b'x'; 1 << 20]);

        let output =
            tokio::time::timeout(Duration::from_secs(30), SystemRunner.output(&invocation))
                .await
                .expect("the runner should finish once sh exits")
                .unwrap();
        assert_eq!(output.code, Some(5));
        assert_eq!(output.stderr, "denied\n");
    }

    #[tokio::test]
    async fn test_missing_program() {
        let err = SystemRunner
            .output(&Invocation::new("/nonexistent/hsbt-test-binary"))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::SpawnCommand { .. }));
    }
}
