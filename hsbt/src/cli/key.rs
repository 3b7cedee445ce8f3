//! Access to the key pair of a connection.

use clap::{Args, Subcommand};
use snafu::ResultExt;
use tokio::io::AsyncWriteExt;

use crate::{
    cli::{
        Error, error,
        internal::{ConnectionArgs, ConnectionResolver, write_stdout},
    },
    config::Config,
    connection::ConnectionManager,
};

#[derive(Clone, Subcommand)]
pub enum KeyCommands {
    #[command(about = "Generate the key pair of a connection if it does not exist")]
    Generate(GenerateCommand),

    #[command(about = "Print the key of a connection")]
    Show(ShowCommand),
}

impl KeyCommands {
    pub async fn run(
        self,
        connection_manager: &ConnectionManager,
        config: &Config,
    ) -> Result<(), Error> {
        match self {
            Self::Generate(cmd) => cmd.run(connection_manager, config).await,
            Self::Show(cmd) => cmd.run(connection_manager, config).await,
        }
    }
}

#[derive(Args, Clone)]
pub struct GenerateCommand {
    #[command(flatten)]
    pub connection: ConnectionArgs,

    #[arg(long = "overwrite", help = "Replace an existing key pair.")]
    pub overwrite: bool,

    #[arg(long = "bits", help = "Size of the RSA key. Defaults to `keyBits` of the configuration.")]
    pub bits: Option<u32>,
}

impl GenerateCommand {
    pub async fn run(
        self,
        connection_manager: &ConnectionManager,
        config: &Config,
    ) -> Result<(), Error> {
        let Self { connection: ConnectionArgs { identifier }, overwrite, bits } = self;
        let storage_box =
            ConnectionResolver::from((connection_manager, config)).storage_box(identifier)?;
        let key_manager = storage_box.key_manager();

        let generated =
            key_manager.ssh_keygen(overwrite, true, bits.unwrap_or(config.key_bits)).await?;
        let state = if generated { "Generated" } else { "Kept existing" };
        write_stdout(&format!(
            "{state} key '{}' in {}",
            key_manager.identifier(),
            key_manager.directory().display()
        ))
        .await
    }
}

#[derive(Args, Clone)]
pub struct ShowCommand {
    #[command(flatten)]
    pub connection: ConnectionArgs,

    #[arg(long = "rfc4716", help = "Print the key in the RFC 4716 format instead of OpenSSH's.")]
    pub rfc4716: bool,

    #[arg(
        long = "private",
        conflicts_with = "rfc4716",
        help = "Print the private key instead of the public key."
    )]
    pub private: bool,
}

impl ShowCommand {
    pub async fn run(
        self,
        connection_manager: &ConnectionManager,
        config: &Config,
    ) -> Result<(), Error> {
        let Self { connection: ConnectionArgs { identifier }, rfc4716, private } = self;
        let storage_box =
            ConnectionResolver::from((connection_manager, config)).storage_box(identifier)?;
        let key_manager = storage_box.key_manager();

        let _unused = key_manager.validate_if_keys_exists_and_valid(true).await?;
        let key = if private {
            key_manager.get_private_key().await?
        } else {
            if rfc4716 {
                let _unused = key_manager.gen_rfc4716_format_copy(None, false, true).await?;
            }
            key_manager.get_public_key(rfc4716).await?
        };

        let mut stdout = tokio::io::stdout();
        stdout.write_all(&key).await.context(error::WriteStdoutSnafu)?;
        stdout.flush().await.context(error::WriteStdoutSnafu)
    }
}
