use std::{
    borrow::Cow,
    ffi::{OsStr, OsString},
    fmt,
    path::{Path, PathBuf},
};

const MASKED_VALUE: &str = "******";

#[derive(Clone, Debug, PartialEq, Eq)]
struct EnvVar {
    key: String,
    value: String,
    secret: bool,
}

/// A fully described external command: program, arguments, extra
/// environment variables and optional standard input.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Invocation {
    program: PathBuf,
    args: Vec<OsString>,
    envs: Vec<EnvVar>,
    stdin: Option<Vec<u8>>,
}

impl Invocation {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self { program: program.into(), args: Vec::new(), envs: Vec::new(), stdin: None }
    }

    #[must_use]
    pub fn arg(mut self, arg: impl AsRef<OsStr>) -> Self {
        self.args.push(arg.as_ref().to_os_string());
        self
    }

    #[must_use]
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        self.args.extend(args.into_iter().map(|arg| arg.as_ref().to_os_string()));
        self
    }

    #[must_use]
    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.envs.push(EnvVar { key: key.into(), value: value.into(), secret: false });
        self
    }

    /// Like [`Invocation::env`], but the value is masked whenever the
    /// invocation is displayed or logged.
    #[must_use]
    pub fn secret_env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.envs.push(EnvVar { key: key.into(), value: value.into(), secret: true });
        self
    }

    #[must_use]
    pub fn stdin(mut self, data: impl Into<Vec<u8>>) -> Self {
        self.stdin = Some(data.into());
        self
    }

    pub fn program(&self) -> &Path { &self.program }

    pub fn get_args(&self) -> impl Iterator<Item = &OsStr> { self.args.iter().map(OsString::as_os_str) }

    pub fn get_envs(&self) -> impl Iterator<Item = (&str, &str)> {
        self.envs.iter().map(|env| (env.key.as_str(), env.value.as_str()))
    }

    pub fn get_stdin(&self) -> Option<&[u8]> { self.stdin.as_deref() }
}

impl fmt::Display for Invocation {
    /// Renders a shell-escaped command line, with secret environment values
    /// masked.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let envs = self.envs.iter().map(|EnvVar { key, value, secret }| {
            if *secret {
                format!("{key}={MASKED_VALUE}")
            } else {
                format!("{key}={}", shell_escape::escape(Cow::Borrowed(value.as_str())))
            }
        });
        let program = std::iter::once(escape_os(self.program.as_os_str()));
        let args = self.args.iter().map(|arg| escape_os(arg));

        let line = envs.chain(program).chain(args).collect::<Vec<_>>().join(" ");
        f.write_str(&line)
    }
}

fn escape_os(value: &OsStr) -> String {
    shell_escape::escape(value.to_string_lossy()).into_owned()
}

/// Captured result of a finished process.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Output {
    /// `None` if the process was terminated by a signal.
    pub code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl Output {
    pub const fn success(&self) -> bool { matches!(self.code, Some(0)) }
}

impl From<std::process::Output> for Output {
    fn from(output: std::process::Output) -> Self {
        Self {
            code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_escapes_arguments() {
        let invocation = Invocation::new("ssh").args(["-p", "23"]).arg("mkdir -p 'a b'");
        assert_eq!(invocation.to_string(), r#"ssh -p 23 'mkdir -p '\''a b'\'''"#);
    }

    #[test]
    fn test_display_masks_secrets() {
        let invocation = Invocation::new("sshpass")
            .secret_env("SSHPASS", "hunter2")
            .env("LANG", "C")
            .args(["-e", "ssh"]);

        let line = invocation.to_string();
        assert_eq!(line, "SSHPASS=****** LANG=C sshpass -e ssh");
        assert!(!line.contains("hunter2"));
        assert_eq!(invocation.get_envs().collect::<Vec<_>>(), vec![
            ("SSHPASS", "hunter2"),
            ("LANG", "C")
        ]);
    }

    #[test]
    fn test_output_success() {
        assert!(Output { code: Some(0), ..Output::default() }.success());
        assert!(!Output { code: Some(1), ..Output::default() }.success());
        assert!(!Output { code: None, ..Output::default() }.success());
    }
}
