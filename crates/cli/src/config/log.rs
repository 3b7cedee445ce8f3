//! Where `hsbt` writes its log records, and how verbose they are.

use std::{fs::OpenOptions, path::PathBuf};

use serde::{Deserialize, Serialize};
use serde_with::{DisplayFromStr, serde_as};
use tracing_subscriber::{
    Layer, layer::SubscriberExt, registry::LookupSpan, util::SubscriberInitExt,
};

/// Log outputs and level.
///
/// Standard output carries the results of `hsbt` commands (tables, JSON,
/// YAML), so records go to standard error unless configured otherwise.
#[serde_as]
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default, rename_all = "camelCase")]
pub struct LogConfig {
    /// Appends records to this file as well.
    pub file_path: Option<PathBuf>,

    pub emit_journald: bool,

    pub emit_stdout: bool,

    pub emit_stderr: bool,

    #[serde_as(as = "DisplayFromStr")]
    pub level: tracing::Level,
}

impl Default for LogConfig {
    /// `WARN` and above, to standard error only.
    ///
    /// ```rust
    /// use hsbt_cli::config::LogConfig;
    ///
    /// let config = LogConfig::default();
    /// assert_eq!(config.level, tracing::Level::WARN);
    /// assert!(config.emit_stderr);
    /// assert!(!config.emit_stdout && !config.emit_journald);
    /// ```
    fn default() -> Self {
        Self {
            file_path: None,
            emit_journald: false,
            emit_stdout: false,
            emit_stderr: true,
            level: tracing::Level::WARN,
        }
    }
}

impl LogConfig {
    /// Installs the global `tracing` subscriber.
    ///
    /// Outputs that cannot be opened, such as an unwritable log file or an
    /// absent `journald`, are skipped.
    ///
    /// # Panics
    ///
    /// Panics if a global subscriber is already installed.
    pub fn registry(&self) {
        let Self { file_path, emit_journald, emit_stdout, emit_stderr, level } = self;

        tracing_subscriber::registry()
            .with(tracing_subscriber::filter::LevelFilter::from_level(*level))
            .with(emit_journald.then(|| Output::Journald.layer()))
            .with(file_path.clone().map(|path| Output::File(path).layer()))
            .with(emit_stdout.then(|| Output::Stdout.layer()))
            .with(emit_stderr.then(|| Output::Stderr.layer()))
            .init();
    }
}

#[derive(Clone, Debug)]
enum Output {
    Stdout,
    Stderr,
    Journald,
    File(PathBuf),
}

impl Output {
    #[allow(clippy::type_repetition_in_bounds)]
    fn layer<S>(self) -> Option<Box<dyn Layer<S> + Send + Sync + 'static>>
    where
        S: tracing::Subscriber,
        for<'a> S: LookupSpan<'a>,
    {
        let fmt = tracing_subscriber::fmt::layer().compact().with_target(false);

        match self {
            Self::Stdout => Some(Box::new(fmt.with_writer(std::io::stdout))),
            Self::Stderr => Some(Box::new(fmt.with_writer(std::io::stderr))),
            Self::File(path) => {
                let file = OpenOptions::new().create(true).append(true).open(path).ok()?;
                Some(Box::new(fmt.with_ansi(false).with_target(true).with_writer(file)))
            }
            Self::Journald => {
                Some(Box::new(tracing_journald::layer().ok()?.with_syslog_identifier(
                    "hsbt".to_string(),
                )))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_partial_config() {
        let config: LogConfig = serde_yaml::from_str("level: debug\nemitJournald: true\n").unwrap();

        assert_eq!(config.level, tracing::Level::DEBUG);
        assert!(config.emit_journald);
        assert!(config.emit_stderr);
        assert!(!config.emit_stdout);
        assert!(config.file_path.is_none());
    }

    #[test]
    fn test_serialize_level_as_string() {
        let yaml = serde_yaml::to_string(&LogConfig::default()).unwrap();
        assert!(yaml.contains("level: WARN"));
        assert!(yaml.contains("emitStderr: true"));
    }
}
