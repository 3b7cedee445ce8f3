use std::path::PathBuf;

use hsbt_base::consts::env;
use serde::{Deserialize, Serialize};

/// Locations of the external tools. Bare names are looked up in `PATH`.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default, rename_all = "camelCase")]
pub struct Binaries {
    pub ssh: PathBuf,
    pub scp: PathBuf,
    pub ssh_keygen: PathBuf,
    pub ssh_keyscan: PathBuf,
    pub ssh_copy_id: PathBuf,
    pub sshpass: PathBuf,
    pub rclone: PathBuf,
    pub sshfs: PathBuf,
    pub mount: PathBuf,
    pub umount: PathBuf,
}

impl Default for Binaries {
    fn default() -> Self {
        Self {
            ssh: PathBuf::from("ssh"),
            scp: PathBuf::from("scp"),
            ssh_keygen: PathBuf::from("ssh-keygen"),
            ssh_keyscan: PathBuf::from("ssh-keyscan"),
            ssh_copy_id: PathBuf::from("ssh-copy-id"),
            sshpass: PathBuf::from("sshpass"),
            rclone: PathBuf::from("rclone"),
            sshfs: PathBuf::from("sshfs"),
            mount: PathBuf::from("mount"),
            umount: PathBuf::from("umount"),
        }
    }
}

impl Binaries {
    /// Replaces paths with the values of the `HSBT_BIN_PATH_*` variables that
    /// `lookup` yields.
    pub fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let Self {
            ssh,
            scp,
            ssh_keygen,
            ssh_keyscan,
            ssh_copy_id,
            sshpass,
            rclone,
            sshfs,
            mount,
            umount,
        } = self;
        let overrides = [
            (env::BIN_PATH_SSH, ssh),
            (env::BIN_PATH_SCP, scp),
            (env::BIN_PATH_SSH_KEYGEN, ssh_keygen),
            (env::BIN_PATH_SSH_KEYSCAN, ssh_keyscan),
            (env::BIN_PATH_SSH_COPY_ID, ssh_copy_id),
            (env::BIN_PATH_SSHPASS, sshpass),
            (env::BIN_PATH_RCLONE, rclone),
            (env::BIN_PATH_SSHFS, sshfs),
            (env::BIN_PATH_MOUNT, mount),
            (env::BIN_PATH_UMOUNT, umount),
        ];
        for (key, path) in overrides {
            if let Some(value) = lookup(key).filter(|value| !value.is_empty()) {
                tracing::debug!("{key} overrides {} with {value}", path.display());
                *path = PathBuf::from(value);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_env_overrides() {
        let mut binaries = Binaries::default();
        binaries.apply_env_overrides(|key| match key {
            "HSBT_BIN_PATH_RCLONE" => Some("/opt/rclone/rclone".to_string()),
            "HSBT_BIN_PATH_SSH" => Some("/usr/local/bin/ssh".to_string()),
            "HSBT_BIN_PATH_SCP" => Some(String::new()),
            _ => None,
        });

        assert_eq!(binaries.rclone, PathBuf::from("/opt/rclone/rclone"));
        assert_eq!(binaries.ssh, PathBuf::from("/usr/local/bin/ssh"));
        assert_eq!(binaries.scp, PathBuf::from("scp"));
        assert_eq!(binaries.sshfs, PathBuf::from("sshfs"));
    }

    #[test]
    fn test_partial_yaml() {
        let binaries: Binaries = serde_yaml::from_str("sshKeygen: /usr/bin/ssh-keygen\n").unwrap();
        assert_eq!(binaries.ssh_keygen, PathBuf::from("/usr/bin/ssh-keygen"));
        assert_eq!(binaries.umount, PathBuf::from("umount"));
    }
}
