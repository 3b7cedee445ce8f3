use std::path::PathBuf;

use snafu::Snafu;

use crate::{key, process};

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum Error {
    #[snafu(display("{source}"))]
    Key { source: key::Error },

    #[snafu(display(
        "To deploy the SSH key at {host} the first time, the storage box password must be \
         provided. After that the deployed key authorizes all connections"
    ))]
    DeployKeyPasswordMissing { host: String },

    #[snafu(display("Failed to deploy the public key to {host}, error: {source}"))]
    DeployKey { host: String, source: process::Error },

    #[snafu(display("The public key was deployed to {host}, but logging in with it still fails"))]
    KeyDeploymentFailed { host: String },

    #[snafu(display("Failed to check the key deployment on {host}, error: {source}"))]
    CheckKeyDeployment { host: String, source: process::Error },

    #[snafu(display("Failed to run `{command}` on the storage box, error: {source}"))]
    RemoteCommand { command: String, source: process::Error },

    #[snafu(display("Unexpected output of `{command}`: {output}"))]
    UnexpectedOutput { command: String, output: String },

    #[snafu(display("Failed to copy {source_path} to {target_path}, error: {source}"))]
    Transfer { source_path: String, target_path: String, source: process::Error },

    #[snafu(display("Failed to update fstab entry, error: {source}"))]
    EditFstab { source: hsbt_base::config_file_editor::Error },

    #[snafu(display("Failed to create mount point {}, error: {source}", path.display()))]
    CreateMountPoint { path: PathBuf, source: std::io::Error },

    #[snafu(display("Failed to read mount table {}, error: {source}", path.display()))]
    ReadMountTable { path: PathBuf, source: std::io::Error },

    #[snafu(display("Failed to mount {}, error: {source}", mount_point.display()))]
    Mount { mount_point: PathBuf, source: process::Error },

    #[snafu(display("Failed to unmount {}, error: {source}", mount_point.display()))]
    Unmount { mount_point: PathBuf, source: process::Error },
}

impl From<key::Error> for Error {
    fn from(source: key::Error) -> Self { Self::Key { source } }
}
