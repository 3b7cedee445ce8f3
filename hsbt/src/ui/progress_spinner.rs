//! A spinner for external commands that take a while, such as transfers and
//! mounts.

use std::{io::IsTerminal, time::Duration};

pub struct ProgressSpinner {
    inner: indicatif::ProgressBar,
}

impl ProgressSpinner {
    /// Starts spinning with `message`. Nothing is drawn if stderr is not a
    /// terminal.
    pub fn start(message: impl Into<String>) -> Self {
        let inner = if std::io::stderr().is_terminal() {
            indicatif::ProgressBar::new_spinner()
        } else {
            indicatif::ProgressBar::hidden()
        };
        if let Ok(style) = indicatif::ProgressStyle::default_spinner()
            .template("{spinner:.green} [{elapsed_precise}] {msg}")
        {
            inner.set_style(style);
        }
        inner.set_message(message.into());
        inner.enable_steady_tick(Duration::from_millis(100));
        Self { inner }
    }

    /// Stops spinning and leaves `message` in place of the spinner.
    pub fn finish(self, message: impl Into<String>) {
        self.inner.finish_with_message(message.into());
    }

    /// Removes the spinner without a trace, e.g. when the command failed.
    pub fn abandon(self) { self.inner.finish_and_clear(); }
}
