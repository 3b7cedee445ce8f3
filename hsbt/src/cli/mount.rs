//! Mounting the storage box locally.

use std::path::PathBuf;

use clap::{Args, Subcommand};

use crate::{
    cli::{
        Error,
        internal::{ConnectionArgs, ConnectionResolver, with_spinner, write_stdout},
    },
    config::Config,
    connection::ConnectionManager,
    process::SystemRunner,
    rclone::Rclone,
    storage_box,
};

#[derive(Clone, Subcommand)]
pub enum MountCommands {
    #[command(about = "Add an sshfs entry for the storage box to fstab and mount it")]
    Fstab(FstabCommand),

    #[command(about = "Mount the storage box with sshfs, without an fstab entry")]
    Sshfs(SshfsCommand),

    #[command(about = "Mount the storage box with rclone")]
    Rclone(RcloneCommand),

    #[command(about = "Tell whether something is mounted at a directory")]
    Status(StatusCommand),
}

impl MountCommands {
    pub async fn run(
        self,
        connection_manager: &ConnectionManager,
        config: &Config,
    ) -> Result<(), Error> {
        match self {
            Self::Fstab(cmd) => cmd.run(connection_manager, config).await,
            Self::Sshfs(cmd) => cmd.run(connection_manager, config).await,
            Self::Rclone(cmd) => cmd.run(connection_manager, config).await,
            Self::Status(cmd) => cmd.run(config).await,
        }
    }
}

#[derive(Args, Clone)]
pub struct FstabCommand {
    #[command(flatten)]
    pub connection: ConnectionArgs,

    #[arg(
        long = "fstab-file",
        help = "fstab file to edit. Defaults to `fstabFilePath` of the configuration."
    )]
    pub fstab_file: Option<PathBuf>,

    #[arg(help = "Local directory to mount the remote base path at.")]
    pub mount_point: PathBuf,
}

impl FstabCommand {
    pub async fn run(
        self,
        connection_manager: &ConnectionManager,
        config: &Config,
    ) -> Result<(), Error> {
        let Self { connection: ConnectionArgs { identifier }, fstab_file, mount_point } = self;
        let storage_box =
            ConnectionResolver::from((connection_manager, config)).storage_box(identifier)?;
        let fstab_file = fstab_file.unwrap_or_else(|| config.fstab_file_path.clone());

        let message = format!("Mounting {} at {}", storage_box.identifier(), mount_point.display());
        let changed = with_spinner(
            &message,
            storage_box.mount_storage_box_via_fstab(
                &mount_point,
                &fstab_file,
                &config.mount_table_path,
            ),
        )
        .await?;
        if changed {
            write_stdout(&format!(
                "Updated the entry of '{}' in {}",
                storage_box.identifier(),
                fstab_file.display()
            ))
            .await?;
        }
        Ok(())
    }
}

#[derive(Args, Clone)]
pub struct SshfsCommand {
    #[command(flatten)]
    pub connection: ConnectionArgs,

    #[arg(help = "Local directory to mount the remote base path at.")]
    pub mount_point: PathBuf,
}

impl SshfsCommand {
    pub async fn run(
        self,
        connection_manager: &ConnectionManager,
        config: &Config,
    ) -> Result<(), Error> {
        let Self { connection: ConnectionArgs { identifier }, mount_point } = self;
        let storage_box =
            ConnectionResolver::from((connection_manager, config)).storage_box(identifier)?;

        let message = format!("Mounting {} at {}", storage_box.identifier(), mount_point.display());
        with_spinner(&message, storage_box.mount_storage_box_via_sshfs(&mount_point)).await?;
        Ok(())
    }
}

#[derive(Args, Clone)]
pub struct RcloneCommand {
    #[command(flatten)]
    pub connection: ConnectionArgs,

    #[arg(long = "foreground", help = "Keep rclone in the foreground until it is unmounted.")]
    pub foreground: bool,

    #[arg(help = "Local directory to mount the remote base path at.")]
    pub mount_point: PathBuf,
}

impl RcloneCommand {
    pub async fn run(
        self,
        connection_manager: &ConnectionManager,
        config: &Config,
    ) -> Result<(), Error> {
        let Self { connection: ConnectionArgs { identifier }, foreground, mount_point } = self;
        let storage_box =
            ConnectionResolver::from((connection_manager, config)).storage_box(identifier)?;
        let rclone = Rclone::new(
            storage_box,
            config.rclone_config_file.clone(),
            &config.binaries,
            SystemRunner,
        );

        if foreground {
            rclone.mount(&mount_point, false).await?;
        } else {
            let message = format!("Mounting {} at {}", rclone.remote_name(), mount_point.display());
            with_spinner(&message, rclone.mount(&mount_point, true)).await?;
        }
        Ok(())
    }
}

#[derive(Args, Clone)]
pub struct StatusCommand {
    #[arg(help = "Local directory to check.")]
    pub mount_point: PathBuf,
}

impl StatusCommand {
    pub async fn run(self, config: &Config) -> Result<(), Error> {
        let mounted = storage_box::is_mounted(&self.mount_point, &config.mount_table_path).await?;
        let state = if mounted { "mounted" } else { "not mounted" };
        write_stdout(&format!("{}: {state}", self.mount_point.display())).await
    }
}

#[derive(Args, Clone)]
pub struct UnmountCommand {
    #[command(flatten)]
    pub connection: ConnectionArgs,

    #[arg(
        long = "remove-fstab-entry",
        help = "Also remove the fstab entry of the connection, so it is not mounted again at boot."
    )]
    pub remove_fstab_entry: bool,

    #[arg(
        long = "fstab-file",
        help = "fstab file to edit. Defaults to `fstabFilePath` of the configuration."
    )]
    pub fstab_file: Option<PathBuf>,

    #[arg(help = "Local directory the storage box is mounted at.")]
    pub mount_point: PathBuf,
}

impl UnmountCommand {
    pub async fn run(
        self,
        connection_manager: &ConnectionManager,
        config: &Config,
    ) -> Result<(), Error> {
        let Self {
            connection: ConnectionArgs { identifier },
            remove_fstab_entry,
            fstab_file,
            mount_point,
        } = self;
        let storage_box =
            ConnectionResolver::from((connection_manager, config)).storage_box(identifier)?;

        let fstab_file = remove_fstab_entry
            .then(|| fstab_file.unwrap_or_else(|| config.fstab_file_path.clone()));
        let outcome = storage_box
            .unmount_storage_box(&mount_point, &config.mount_table_path, fstab_file.as_deref())
            .await?;
        if let (true, Some(fstab_file)) = (outcome.fstab_entry_removed, &fstab_file) {
            write_stdout(&format!(
                "Removed the entry of '{}' from {}",
                storage_box.identifier(),
                fstab_file.display()
            ))
            .await?;
        }
        Ok(())
    }
}
