use std::path::PathBuf;

use snafu::Snafu;

use crate::process;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum Error {
    #[snafu(display("Path to the key directory must be a directory, got a file: {}", path.display()))]
    KeyDirectoryIsFile { path: PathBuf },

    #[snafu(display("Failed to create key directory {}, error: {source}", path.display()))]
    CreateKeyDirectory { path: PathBuf, source: std::io::Error },

    #[snafu(display(
        "Can not generate key at {}, because it already exists. Overwrite it or accept the existing key",
        path.display()
    ))]
    KeyExists { path: PathBuf },

    #[snafu(display(
        "The key pair at {} is incomplete or invalid. Overwrite it to generate a new one",
        path.display()
    ))]
    IncompleteKeyPair { path: PathBuf },

    #[snafu(display("Can not write {}, because the file already exists", path.display()))]
    FileExists { path: PathBuf },

    #[snafu(display("{} is not a valid SSH key, error: {source}", path.display()))]
    InvalidKey { path: PathBuf, source: process::Error },

    #[snafu(display("Failed to generate SSH key {}, error: {source}", path.display()))]
    GenerateKey { path: PathBuf, source: process::Error },

    #[snafu(display("Failed to convert {} into RFC 4716 format, error: {source}", path.display()))]
    ConvertKey { path: PathBuf, source: process::Error },

    #[snafu(display("Failed to look up host in {}, error: {source}", path.display()))]
    LookupKnownHost { path: PathBuf, source: process::Error },

    #[snafu(display("Failed to scan host keys of {host}, error: {source}"))]
    ScanHost { host: String, source: process::Error },

    #[snafu(display("Scanning {host} on port {port} did not yield any host key"))]
    HostScanEmpty { host: String, port: u16 },

    #[snafu(display("Failed to read {}, error: {source}", path.display()))]
    ReadKeyFile { path: PathBuf, source: std::io::Error },

    #[snafu(display("Failed to write {}, error: {source}", path.display()))]
    WriteKeyFile { path: PathBuf, source: std::io::Error },

    #[snafu(display("Failed to remove {}, error: {source}", path.display()))]
    RemoveKeyFile { path: PathBuf, source: std::io::Error },
}
