use snafu::Snafu;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum Error {
    #[snafu(display("Failed to start `{command}`, error: {source}"))]
    SpawnCommand { command: String, source: std::io::Error },

    #[snafu(display("Failed to write to the standard input of `{command}`, error: {source}"))]
    WriteStdin { command: String, source: std::io::Error },

    #[snafu(display("Failed to wait for `{command}`, error: {source}"))]
    WaitCommand { command: String, source: std::io::Error },

    #[snafu(display("`{command}` {}, error: {stderr}", describe_exit(*code)))]
    CommandFailed { command: String, code: Option<i32>, stderr: String },
}

fn describe_exit(code: Option<i32>) -> String {
    code.map_or_else(|| "was terminated by a signal".to_string(), |code| format!("exited with code {code}"))
}
