use std::future::Future;

use snafu::ResultExt;
use tokio::io::AsyncWriteExt;

use crate::{
    cli::{Error, error},
    ui::ProgressSpinner,
};

/// Writes `text` to stdout, terminated by a newline.
pub async fn write_stdout(text: &str) -> Result<(), Error> {
    let mut stdout = tokio::io::stdout();
    stdout.write_all(text.as_bytes()).await.context(error::WriteStdoutSnafu)?;
    if !text.ends_with('\n') {
        stdout.write_u8(b'\n').await.context(error::WriteStdoutSnafu)?;
    }
    stdout.flush().await.context(error::WriteStdoutSnafu)
}

/// Shows a spinner with `message` while `fut` runs.
pub async fn with_spinner<T, E, F>(message: &str, fut: F) -> Result<T, E>
where
    F: Future<Output = Result<T, E>>,
{
    let spinner = ProgressSpinner::start(message);
    let result = fut.await;
    match result {
        Ok(_) => spinner.finish(format!("{message} done")),
        Err(_) => spinner.abandon(),
    }
    result
}
