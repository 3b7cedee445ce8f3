use std::path::PathBuf;

use snafu::Snafu;

use crate::process;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum Error {
    #[snafu(display("Failed to read the rclone configuration, error: {source}"))]
    DumpConfig { source: process::Error },

    #[snafu(display("Failed to parse the output of `rclone config dump`, error: {source}"))]
    ParseConfigDump { source: serde_json::Error },

    #[snafu(display("Can not find an rclone remote by the name '{name}'"))]
    RemoteNotFound { name: String },

    #[snafu(display("Failed to configure rclone remote '{name}', error: {source}"))]
    ConfigureRemote { name: String, source: process::Error },

    #[snafu(display("Failed to create mount point {}, error: {source}", path.display()))]
    CreateMountPoint { path: PathBuf, source: std::io::Error },

    #[snafu(display("Failed to mount rclone remote {remote}, error: {source}"))]
    Mount { remote: String, source: process::Error },
}
