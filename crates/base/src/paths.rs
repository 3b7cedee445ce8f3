//! Well-known locations of the configuration and connection profile files.

use std::path::{Path, PathBuf};

use directories::{ProjectDirs, UserDirs};

use crate::{
    CLI_CONFIG_NAME, PROJECT_NAME,
    consts::{CONNECTIONS_FILE_NAME, SYSTEM_CONFIG_DIR},
};

/// `$XDG_CONFIG_HOME/hsbt/config.yaml` on Linux. Falls back to a relative
/// `hsbt/config.yaml` if no home directory can be determined.
#[must_use]
pub fn default_config_file() -> PathBuf {
    let dir = ProjectDirs::from("", PROJECT_NAME, PROJECT_NAME)
        .map_or_else(|| PathBuf::from(PROJECT_NAME), |dirs| dirs.config_dir().to_path_buf());
    dir.join(CLI_CONFIG_NAME)
}

/// Configuration files in the order they are searched: the default location,
/// then `~/.config/hsbt/config.yaml` and `~/.hsbt/config.yaml`.
#[must_use]
pub fn config_file_candidates() -> Vec<PathBuf> {
    let mut candidates = vec![default_config_file()];
    if let Some(user_dirs) = UserDirs::new() {
        let home = user_dirs.home_dir();
        for dir in [home.join(".config").join(PROJECT_NAME), home.join(format!(".{PROJECT_NAME}"))]
        {
            let candidate = dir.join(CLI_CONFIG_NAME);
            if !candidates.contains(&candidate) {
                candidates.push(candidate);
            }
        }
    }
    candidates
}

/// Returns `true` when the current process runs with an effective user id of
/// 0.
#[cfg(unix)]
#[must_use]
pub fn is_root() -> bool { rustix::process::geteuid().is_root() }

#[cfg(not(unix))]
#[must_use]
pub const fn is_root() -> bool { false }

/// `/etc/hetzner_sb_connections.json`
#[must_use]
pub fn system_connections_file() -> PathBuf {
    [Path::new(SYSTEM_CONFIG_DIR), Path::new(CONNECTIONS_FILE_NAME)].iter().collect()
}

/// `~/.config/hetzner_sb_connections.json`, `None` if no home directory can
/// be determined.
#[must_use]
pub fn user_connections_file() -> Option<PathBuf> {
    let user_dirs = UserDirs::new()?;
    Some(
        [user_dirs.home_dir(), Path::new(".config"), Path::new(CONNECTIONS_FILE_NAME)]
            .iter()
            .collect(),
    )
}
