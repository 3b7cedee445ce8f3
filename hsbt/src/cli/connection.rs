//! Management of the stored connection profiles.

use std::path::PathBuf;

use clap::{Args, Subcommand};

use crate::{
    cli::{
        Error,
        internal::{ConnectionArgs, ConnectionResolver, write_stdout},
    },
    config::Config,
    connection::{Connection, ConnectionList, ConnectionManager},
    ui::{OutputFormat, table::ConnectionListExt as _},
};

#[derive(Clone, Subcommand)]
pub enum ConnectionCommands {
    #[command(alias = "setConnection", about = "Store a connection profile")]
    Set(SetCommand),

    #[command(
        aliases = ["listConnection", "ls"],
        about = "List the connection profiles of all profile files"
    )]
    List(ListCommand),

    #[command(about = "Show one connection profile")]
    Show(ShowCommand),

    #[command(aliases = ["rm", "delete"], about = "Remove a connection profile")]
    Remove(RemoveCommand),
}

impl ConnectionCommands {
    pub async fn run(
        self,
        connection_manager: &ConnectionManager,
        config: &Config,
    ) -> Result<(), Error> {
        match self {
            Self::Set(cmd) => cmd.run(connection_manager, config).await,
            Self::List(cmd) => cmd.run(connection_manager).await,
            Self::Show(cmd) => cmd.run(connection_manager, config).await,
            Self::Remove(cmd) => cmd.run(connection_manager).await,
        }
    }
}

#[derive(Args, Clone)]
pub struct SetCommand {
    #[arg(
        short = 'i',
        long = "identifier",
        help = "An identifier to point to the connection in all other commands."
    )]
    pub identifier: String,

    #[arg(
        short = 'H',
        long = "host",
        help = "Host name of the storage box, e.g. u123456.your-storagebox.de."
    )]
    pub host: String,

    #[arg(short = 'u', long = "user", help = "User name of the storage box, e.g. u123456.")]
    pub user: String,

    #[arg(
        short = 's',
        long = "ssh-key-dir",
        help = "Directory of the SSH key used for this connection. Defaults to `sshKeyDirectory` \
                of the configuration."
    )]
    pub ssh_key_dir: Option<PathBuf>,

    #[arg(
        short = 'r',
        long = "remote-base-path",
        help = "Directory on the storage box that mounts and listings start at. Defaults to `/`."
    )]
    pub remote_base_path: Option<String>,

    #[arg(
        short = 'o',
        long = "overwrite-existing",
        help = "Replace a stored connection with the same identifier instead of failing."
    )]
    pub overwrite_existing: bool,
}

impl SetCommand {
    pub async fn run(
        self,
        connection_manager: &ConnectionManager,
        config: &Config,
    ) -> Result<(), Error> {
        let Self { identifier, host, user, ssh_key_dir, remote_base_path, overwrite_existing } =
            self;

        let key_dir = ssh_key_dir.unwrap_or_else(|| config.ssh_key_directory.clone());
        let connection = Connection::new(identifier, host, user, key_dir)?
            .with_remote_base_path(remote_base_path.unwrap_or_default());
        let connection = connection_manager.set_connection(connection, overwrite_existing, false)?;

        write_stdout(&format!(
            "Saved connection at '{}' as:\n\t{connection}",
            connection_manager.target_config_file().display()
        ))
        .await
    }
}

#[derive(Args, Clone)]
pub struct ListCommand {
    #[arg(
        short = 'f',
        long = "format-output",
        value_enum,
        default_value_t = OutputFormat::Table,
        help = "Output format."
    )]
    pub format: OutputFormat,

    #[arg(
        long = "from-file",
        help = "List only the profiles in this file instead of merging all profile files."
    )]
    pub from_file: Option<PathBuf>,
}

impl ListCommand {
    pub async fn run(self, connection_manager: &ConnectionManager) -> Result<(), Error> {
        let Self { format, from_file } = self;
        let connections = connection_manager.list_connections(from_file.as_deref())?;
        write_stdout(&format.render(&connections, ConnectionList::render_table)?).await
    }
}

#[derive(Args, Clone)]
pub struct ShowCommand {
    #[command(flatten)]
    pub connection: ConnectionArgs,

    #[arg(
        short = 'f',
        long = "format-output",
        value_enum,
        default_value_t = OutputFormat::Table,
        help = "Output format."
    )]
    pub format: OutputFormat,
}

impl ShowCommand {
    pub async fn run(
        self,
        connection_manager: &ConnectionManager,
        config: &Config,
    ) -> Result<(), Error> {
        let Self { connection: ConnectionArgs { identifier }, format } = self;
        let connection =
            ConnectionResolver::from((connection_manager, config)).resolve(identifier)?;
        let output = match format {
            OutputFormat::Table => {
                let mut connections = ConnectionList::default();
                connections.set_connection(connection, false, false)?;
                connections.render_table()
            }
            format => format.render(&connection, ToString::to_string)?,
        };
        write_stdout(&output).await
    }
}

#[derive(Args, Clone)]
pub struct RemoveCommand {
    #[arg(short = 'i', long = "identifier", help = "Identifier of the connection to remove.")]
    pub identifier: String,
}

impl RemoveCommand {
    pub async fn run(self, connection_manager: &ConnectionManager) -> Result<(), Error> {
        let connection = connection_manager.remove_connection(&self.identifier)?;
        write_stdout(&format!(
            "Removed connection from '{}':\n\t{connection}",
            connection_manager.target_config_file().display()
        ))
        .await
    }
}
