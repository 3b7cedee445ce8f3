//! An rclone `sftp` remote per storage box.

mod error;

use std::{
    collections::BTreeMap,
    path::{Path, PathBuf},
};

use hsbt_base::consts::STORAGE_BOX_SSH_PORT;
use snafu::ResultExt;

pub use self::error::Error;
use crate::{
    config::Binaries,
    process::{Invocation, ProcessRunner},
    storage_box::StorageBox,
};

/// Settings of one rclone remote, as printed by `rclone config dump`.
pub type RemoteConfig = BTreeMap<String, String>;

pub struct Rclone<R> {
    storage_box: StorageBox<R>,
    remote_name: String,
    config_file_path: Option<PathBuf>,
    binary: PathBuf,
    runner: R,
}

impl<R> Rclone<R>
where
    R: ProcessRunner + Clone,
{
    /// The remote is named after the connection of `storage_box`.
    pub fn new(
        storage_box: StorageBox<R>,
        config_file_path: Option<PathBuf>,
        binaries: &Binaries,
        runner: R,
    ) -> Self {
        let remote_name = storage_box.identifier().to_string();
        Self { storage_box, remote_name, config_file_path, binary: binaries.rclone.clone(), runner }
    }

    pub fn remote_name(&self) -> &str { &self.remote_name }

    fn rclone(&self) -> Invocation {
        let invocation = Invocation::new(&self.binary);
        match &self.config_file_path {
            Some(path) => invocation.arg("--config").arg(path),
            None => invocation,
        }
    }

    /// # Errors
    ///
    /// Returns [`Error::RemoteNotFound`] if there is no remote `name`, unless
    /// `missing_ok` is set.
    pub async fn get_existing_config(
        &self,
        name: &str,
        missing_ok: bool,
    ) -> Result<Option<RemoteConfig>, Error> {
        let invocation = self.rclone().args(["-q", "config", "dump"]);
        let dump = self.runner.run(&invocation).await.context(error::DumpConfigSnafu)?;
        let mut remotes = parse_config_dump(&dump)?;
        match remotes.remove(name) {
            Some(config) => Ok(Some(config)),
            None if missing_ok => Ok(None),
            None => error::RemoteNotFoundSnafu { name }.fail(),
        }
    }

    /// The settings rclone needs to reach the storage box with the managed
    /// key.
    pub fn desired_config(&self) -> RemoteConfig {
        let key_manager = self.storage_box.key_manager();
        [
            ("type", "sftp".to_string()),
            ("host", self.storage_box.host().to_string()),
            ("user", self.storage_box.user().to_string()),
            ("port", STORAGE_BOX_SSH_PORT.to_string()),
            ("key_file", key_manager.private_key_path().display().to_string()),
            ("known_hosts_file", key_manager.known_hosts_path().display().to_string()),
        ]
        .into_iter()
        .map(|(key, value)| (key.to_string(), value))
        .collect()
    }

    /// Creates or updates the remote of this storage box. Returns `false` if
    /// it is configured already.
    pub async fn generate_config_file_if_not_exists(&self) -> Result<bool, Error> {
        let desired = self.desired_config();
        let existing = self.get_existing_config(&self.remote_name, true).await?;
        if existing.as_ref().is_some_and(|existing| is_configured(existing, &desired)) {
            tracing::debug!("rclone remote '{}' is up to date", self.remote_name);
            return Ok(false);
        }

        // `config update` cannot change the backend of a remote.
        let existing = match existing {
            Some(existing) if existing.get("type") != desired.get("type") => {
                let invocation = self.rclone().args(["config", "delete", self.remote_name.as_str()]);
                let _unused = self.runner.run(&invocation).await.with_context(|_| {
                    error::ConfigureRemoteSnafu { name: self.remote_name.clone() }
                })?;
                tracing::info!("Deleted rclone remote '{}' of another type", self.remote_name);
                None
            }
            existing => existing,
        };
        let invocation = match existing {
            Some(_) => self.rclone().args(["config", "update", self.remote_name.as_str()]),
            None => self.rclone().args(["config", "create", self.remote_name.as_str(), "sftp"]),
        };
        let invocation = desired
            .iter()
            .filter(|(key, _)| key.as_str() != "type")
            .fold(invocation, |invocation, (key, value)| invocation.arg(key).arg(value))
            .arg("--non-interactive");
        let _unused = self
            .runner
            .run(&invocation)
            .await
            .with_context(|_| error::ConfigureRemoteSnafu { name: self.remote_name.clone() })?;
        tracing::info!("Configured rclone remote '{}'", self.remote_name);
        Ok(true)
    }

    /// Mounts the remote base path of the storage box at `local_dir`. With
    /// `daemon` unset, this returns only after the file system is unmounted.
    pub async fn mount(&self, local_dir: &Path, daemon: bool) -> Result<(), Error> {
        let _unused = self.generate_config_file_if_not_exists().await?;
        tokio::fs::create_dir_all(local_dir)
            .await
            .with_context(|_| error::CreateMountPointSnafu { path: local_dir.to_path_buf() })?;

        let remote = format!("{}:{}", self.remote_name, self.storage_box.remote_base_path());
        let invocation = self.rclone().arg("mount").arg(&remote).arg(local_dir);
        let invocation = if daemon { invocation.arg("--daemon") } else { invocation };
        let _unused = self
            .runner
            .run(&invocation)
            .await
            .with_context(|_| error::MountSnafu { remote: remote.clone() })?;
        Ok(())
    }
}

/// Parses the output of `rclone config dump`. Non-string values are kept in
/// their JSON form.
pub fn parse_config_dump(dump: &str) -> Result<BTreeMap<String, RemoteConfig>, Error> {
    if dump.trim().is_empty() {
        return Ok(BTreeMap::new());
    }
    let remotes: BTreeMap<String, BTreeMap<String, serde_json::Value>> =
        serde_json::from_str(dump).context(error::ParseConfigDumpSnafu)?;
    Ok(remotes
        .into_iter()
        .map(|(name, config)| {
            let config = config
                .into_iter()
                .map(|(key, value)| match value {
                    serde_json::Value::String(value) => (key, value),
                    value => (key, value.to_string()),
                })
                .collect();
            (name, config)
        })
        .collect())
}

/// rclone adds settings of its own to a remote, so only the desired ones are
/// compared.
fn is_configured(existing: &RemoteConfig, desired: &RemoteConfig) -> bool {
    desired.iter().all(|(key, value)| existing.get(key) == Some(value))
}
