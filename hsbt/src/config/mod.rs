mod binaries;
mod error;

use std::path::{Path, PathBuf};

use hsbt_base::consts::{self, env};
use resolve_path::PathResolveExt;
use serde::{Deserialize, Serialize};
use snafu::ResultExt;

pub use self::{binaries::Binaries, error::Error};

#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Connection profile file to write to. Chosen by user id when unset.
    #[serde(default)]
    pub connections_file: Option<PathBuf>,

    /// Default directory for generated SSH keys and `known_hosts`.
    #[serde(default = "default_ssh_key_directory")]
    pub ssh_key_directory: PathBuf,

    #[serde(default = "default_key_bits")]
    pub key_bits: u32,

    #[serde(default = "default_fstab_file_path")]
    pub fstab_file_path: PathBuf,

    #[serde(default = "default_mount_table_path")]
    pub mount_table_path: PathBuf,

    #[serde(default)]
    pub rclone_config_file: Option<PathBuf>,

    #[serde(default)]
    pub binaries: Binaries,

    #[serde(default = "hsbt_cli::config::LogConfig::default")]
    pub log: hsbt_cli::config::LogConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            connections_file: None,
            ssh_key_directory: default_ssh_key_directory(),
            key_bits: default_key_bits(),
            fstab_file_path: default_fstab_file_path(),
            mount_table_path: default_mount_table_path(),
            rclone_config_file: None,
            binaries: Binaries::default(),
            log: hsbt_cli::config::LogConfig::default(),
        }
    }
}

impl Config {
    pub fn search_config_file_path() -> PathBuf {
        hsbt_base::paths::config_file_candidates()
            .into_iter()
            .find(|path| path.try_exists().unwrap_or(false))
            .unwrap_or_else(Self::default_path)
    }

    #[inline]
    pub fn default_path() -> PathBuf { hsbt_base::paths::default_config_file() }

    #[inline]
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, Error> {
        let path = resolve(path.as_ref())?;
        let data = std::fs::read(&path).context(error::OpenConfigSnafu { filename: path.clone() })?;
        serde_yaml::from_slice(&data).context(error::ParseConfigSnafu { filename: path })
    }

    /// Loads the searched configuration file, or the defaults if there is
    /// none.
    pub fn load_or_default() -> Result<Self, Error> {
        let path = Self::search_config_file_path();
        if path.try_exists().unwrap_or(false) {
            Self::load(path)
        } else {
            tracing::debug!("No configuration file at {}, using defaults", path.display());
            Ok(Self::default())
        }
    }

    pub fn template_basic() -> Vec<u8> {
        serde_yaml::to_string(&Self::default()).unwrap_or_default().into_bytes()
    }

    /// Applies the `HSBT_*` environment variables that `lookup` yields.
    pub fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|value| !value.is_empty());

        if let Some(path) = non_empty(env::CONNECTIONS_CONFIG_FILE) {
            self.connections_file = Some(PathBuf::from(path));
        }
        if let Some(path) = non_empty(env::SSH_KEY_DIRECTORY) {
            self.ssh_key_directory = PathBuf::from(path);
        }
        if let Some(path) = non_empty(env::RCLONE_CONFIG_FILE) {
            self.rclone_config_file = Some(PathBuf::from(path));
        }
        self.binaries.apply_env_overrides(&lookup);
    }

    /// Expands `~` and makes relative paths absolute.
    pub fn resolve_paths(&mut self) -> Result<(), Error> {
        self.connections_file = self.connections_file.as_deref().map(resolve).transpose()?;
        self.ssh_key_directory = resolve(&self.ssh_key_directory)?;
        self.fstab_file_path = resolve(&self.fstab_file_path)?;
        self.mount_table_path = resolve(&self.mount_table_path)?;
        self.rclone_config_file = self.rclone_config_file.as_deref().map(resolve).transpose()?;
        self.log.file_path = self.log.file_path.as_deref().map(resolve).transpose()?;
        Ok(())
    }
}

/// Expands `~` and makes `path` absolute relative to the working directory.
pub fn resolve(path: &Path) -> Result<PathBuf, Error> {
    path.try_resolve()
        .map(|path| path.to_path_buf())
        .with_context(|_| error::ResolveFilePathSnafu { file_path: path.to_path_buf() })
}

fn default_ssh_key_directory() -> PathBuf { PathBuf::from(consts::DEFAULT_SSH_KEY_DIR) }

const fn default_key_bits() -> u32 { consts::DEFAULT_KEY_BITS }

fn default_fstab_file_path() -> PathBuf { PathBuf::from(consts::DEFAULT_FSTAB_FILE_PATH) }

fn default_mount_table_path() -> PathBuf { PathBuf::from(consts::DEFAULT_MOUNT_TABLE_PATH) }

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_from_empty_document() {
        let config: Config = serde_yaml::from_str("{}").unwrap();

        assert_eq!(config.ssh_key_directory, PathBuf::from("~/.ssh"));
        assert_eq!(config.key_bits, 2048);
        assert_eq!(config.fstab_file_path, PathBuf::from("/etc/fstab"));
        assert_eq!(config.mount_table_path, PathBuf::from("/proc/self/mounts"));
        assert!(config.connections_file.is_none());
        assert!(config.rclone_config_file.is_none());
        assert_eq!(config.binaries, Binaries::default());
    }

    #[test]
    fn test_template_parses_back() {
        let template = Config::template_basic();
        let config: Config = serde_yaml::from_slice(&template).unwrap();
        assert_eq!(config.key_bits, Config::default().key_bits);
        assert!(String::from_utf8(template).unwrap().contains("sshKeyDirectory"));
    }

    #[test]
    fn test_env_overrides() {
        let mut config = Config::default();
        config.apply_env_overrides(|key| match key {
            "HSBT_CONNECTIONS_CONFIG_FILE" => Some("/srv/connections.json".to_string()),
            "HSBT_SSH_KEY_FILE_DIR" => Some("/srv/keys".to_string()),
            "HSBT_BIN_PATH_SSHFS" => Some("/opt/sshfs".to_string()),
            _ => None,
        });

        assert_eq!(config.connections_file, Some(PathBuf::from("/srv/connections.json")));
        assert_eq!(config.ssh_key_directory, PathBuf::from("/srv/keys"));
        assert_eq!(config.binaries.sshfs, PathBuf::from("/opt/sshfs"));
        assert!(config.rclone_config_file.is_none());
    }

    #[test]
    fn test_load_and_resolve() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        std::fs::write(&path, "keyBits: 4096\nfstabFilePath: ./fstab\n").unwrap();

        let mut config = Config::load(&path).unwrap();
        config.resolve_paths().unwrap();

        assert_eq!(config.key_bits, 4096);
        assert!(config.fstab_file_path.is_absolute());
        assert!(config.fstab_file_path.ends_with("fstab"));
        assert!(!config.ssh_key_directory.starts_with("~"));
    }

    #[test]
    fn test_load_missing_file() {
        let err = Config::load("/nonexistent/hsbt/config.yaml").unwrap_err();
        assert!(matches!(err, Error::OpenConfig { .. }));
    }
}
