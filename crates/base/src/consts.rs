/// Hetzner Storage Boxes serve SSH, SCP and SFTP with key authentication on
/// this port. Port 22 only speaks SFTP.
pub const STORAGE_BOX_SSH_PORT: u16 = 23;

pub const CONNECTIONS_FILE_NAME: &str = "hetzner_sb_connections.json";
pub const SYSTEM_CONFIG_DIR: &str = "/etc";

pub const DEFAULT_SSH_KEY_DIR: &str = "~/.ssh";
pub const DEFAULT_KEY_BITS: u32 = 2048;
pub const DEFAULT_REMOTE_BASE_PATH: &str = "/";

pub const DEFAULT_FSTAB_FILE_PATH: &str = "/etc/fstab";
pub const DEFAULT_MOUNT_TABLE_PATH: &str = "/proc/self/mounts";

pub mod env {
    pub const CONFIG_FILE_PATH: &str = "HSBT_CONFIG_FILE_PATH";
    pub const LOG_LEVEL: &str = "HSBT_LOG_LEVEL";
    pub const CONNECTIONS_CONFIG_FILE: &str = "HSBT_CONNECTIONS_CONFIG_FILE";
    pub const SSH_KEY_DIRECTORY: &str = "HSBT_SSH_KEY_FILE_DIR";
    pub const RCLONE_CONFIG_FILE: &str = "HSBT_RCLONE_CONFIG_FILE";
    pub const PASSWORD: &str = "HSBT_PASSWORD";

    pub const BIN_PATH_RCLONE: &str = "HSBT_BIN_PATH_RCLONE";
    pub const BIN_PATH_SSH: &str = "HSBT_BIN_PATH_SSH";
    pub const BIN_PATH_SSHFS: &str = "HSBT_BIN_PATH_SSHFS";
    pub const BIN_PATH_SCP: &str = "HSBT_BIN_PATH_SCP";
    pub const BIN_PATH_SSH_COPY_ID: &str = "HSBT_BIN_PATH_SSH_COPY_ID";
    pub const BIN_PATH_SSH_KEYGEN: &str = "HSBT_BIN_PATH_SSH_KEYGEN";
    pub const BIN_PATH_SSH_KEYSCAN: &str = "HSBT_BIN_PATH_SSH_KEYSCAN";
    pub const BIN_PATH_SSHPASS: &str = "HSBT_BIN_PATH_SSHPASS";
    pub const BIN_PATH_MOUNT: &str = "HSBT_BIN_PATH_MOUNT";
    pub const BIN_PATH_UMOUNT: &str = "HSBT_BIN_PATH_UMOUNT";
}
