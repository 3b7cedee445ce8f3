use clap::{Args, Subcommand};

use crate::{
    cli::{
        Error,
        internal::{ConnectionArgs, ConnectionResolver, write_stdout},
    },
    config::Config,
    connection::ConnectionManager,
    process::SystemRunner,
    rclone::Rclone,
};

#[derive(Clone, Subcommand)]
pub enum RcloneCommands {
    #[command(about = "Create or update the rclone remote of a connection")]
    Config(ConfigCommand),
}

impl RcloneCommands {
    pub async fn run(
        self,
        connection_manager: &ConnectionManager,
        config: &Config,
    ) -> Result<(), Error> {
        match self {
            Self::Config(cmd) => cmd.run(connection_manager, config).await,
        }
    }
}

#[derive(Args, Clone)]
pub struct ConfigCommand {
    #[command(flatten)]
    pub connection: ConnectionArgs,
}

impl ConfigCommand {
    pub async fn run(
        self,
        connection_manager: &ConnectionManager,
        config: &Config,
    ) -> Result<(), Error> {
        let Self { connection: ConnectionArgs { identifier } } = self;
        let storage_box =
            ConnectionResolver::from((connection_manager, config)).storage_box(identifier)?;
        let rclone = Rclone::new(
            storage_box,
            config.rclone_config_file.clone(),
            &config.binaries,
            SystemRunner,
        );

        let changed = rclone.generate_config_file_if_not_exists().await?;
        let state = if changed { "is configured now" } else { "is up to date" };
        write_stdout(&format!("rclone remote '{}' {state}", rclone.remote_name())).await
    }
}
