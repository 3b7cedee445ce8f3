use std::path::PathBuf;

use snafu::Snafu;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum Error {
    #[snafu(display("Connection '{identifier}' already exist."))]
    ConnectionExists { identifier: String },

    #[snafu(display("Connection '{identifier}' does not exist in {}", file_path.display()))]
    ConnectionNotFound { identifier: String, file_path: PathBuf },

    #[snafu(display(
        "Invalid connection identifier '{identifier}', use letters, digits, '.', '_' and '-' only"
    ))]
    InvalidIdentifier { identifier: String },

    #[snafu(display("The {field} of connection '{identifier}' must not be empty"))]
    MissingField { identifier: String, field: &'static str },

    #[snafu(display("Invalid {field} '{value}' of connection '{identifier}'"))]
    InvalidField { identifier: String, field: &'static str, value: String },

    #[snafu(display("Connection '{identifier}' is stored under the identifier '{key}'"))]
    MismatchedIdentifier { key: String, identifier: String },

    #[snafu(display("Invalid connection in {}, error: {source}", file_path.display()))]
    InvalidConnectionFile { file_path: PathBuf, source: Box<Error> },

    #[snafu(display("Failed to read connections from {}, error: {source}", file_path.display()))]
    ReadConnectionFile { file_path: PathBuf, source: std::io::Error },

    #[snafu(display("Failed to parse connections from {}, error: {source}", file_path.display()))]
    ParseConnectionFile { file_path: PathBuf, source: serde_json::Error },

    #[snafu(display("Failed to serialize connections, error: {source}"))]
    SerializeConnections { source: serde_json::Error },

    #[snafu(display("Failed to write connections to {}, error: {source}", file_path.display()))]
    WriteConnectionFile { file_path: PathBuf, source: std::io::Error },
}
