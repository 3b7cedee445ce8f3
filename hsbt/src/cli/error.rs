use snafu::Snafu;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum Error {
    #[snafu(display("{source}"))]
    Configuration { source: crate::config::Error },

    #[snafu(display("{source}"))]
    Connection { source: crate::connection::Error },

    #[snafu(display("{source}"))]
    Key { source: crate::key::Error },

    #[snafu(display("{source}"))]
    StorageBox { source: crate::storage_box::Error },

    #[snafu(display("{source}"))]
    Rclone { source: crate::rclone::Error },

    #[snafu(display("{source}"))]
    Render { source: crate::ui::RenderError },

    #[snafu(display("No connection with the identifier '{identifier}' is stored"))]
    ConnectionNotFound { identifier: String },

    #[snafu(display(
        "No connection was chosen. Pass `--identifier`, or store one with `hsbt connection set`"
    ))]
    ConnectionNotSpecified,

    #[snafu(display("Failed to write to stdout, error: {source}"))]
    WriteStdout { source: std::io::Error },

    #[snafu(display("Failed to create tokio runtime, error: {source}"))]
    InitializeTokioRuntime { source: std::io::Error },
}

impl From<crate::config::Error> for Error {
    fn from(source: crate::config::Error) -> Self { Self::Configuration { source } }
}

impl From<crate::connection::Error> for Error {
    fn from(source: crate::connection::Error) -> Self { Self::Connection { source } }
}

impl From<crate::key::Error> for Error {
    fn from(source: crate::key::Error) -> Self { Self::Key { source } }
}

impl From<crate::storage_box::Error> for Error {
    fn from(source: crate::storage_box::Error) -> Self { Self::StorageBox { source } }
}

impl From<crate::rclone::Error> for Error {
    fn from(source: crate::rclone::Error) -> Self { Self::Rclone { source } }
}

impl From<crate::ui::RenderError> for Error {
    fn from(source: crate::ui::RenderError) -> Self { Self::Render { source } }
}
