//! Commands that run on the storage box through `ssh`.

use clap::Args;

use crate::{
    cli::{
        Error,
        internal::{ConnectionArgs, ConnectionResolver, write_stdout},
    },
    config::Config,
    connection::ConnectionManager,
    storage_box::{DiskUsage, RemoteEntry},
    ui::{
        OutputFormat,
        table::{DiskUsageExt as _, RemoteEntryExt as _},
    },
};

#[derive(Args, Clone)]
pub struct ExecCommand {
    #[command(flatten)]
    pub connection: ConnectionArgs,

    #[arg(
        trailing_var_arg = true,
        required = true,
        help = "Command and arguments to run. The storage box offers a restricted set of \
                commands only."
    )]
    pub command: Vec<String>,
}

impl ExecCommand {
    pub async fn run(
        self,
        connection_manager: &ConnectionManager,
        config: &Config,
    ) -> Result<(), Error> {
        let Self { connection: ConnectionArgs { identifier }, command } = self;
        let storage_box =
            ConnectionResolver::from((connection_manager, config)).storage_box(identifier)?;
        let output = storage_box.run_remote_command(command.as_slice()).await?;
        if output.is_empty() { Ok(()) } else { write_stdout(&output).await }
    }
}

#[derive(Args, Clone)]
pub struct ListFilesCommand {
    #[command(flatten)]
    pub connection: ConnectionArgs,

    #[arg(help = "Remote directory to list. Defaults to the remote base path of the connection.")]
    pub path: Option<String>,

    #[arg(
        short = 'f',
        long = "format-output",
        value_enum,
        default_value_t = OutputFormat::Table,
        help = "Output format."
    )]
    pub format: OutputFormat,
}

impl ListFilesCommand {
    pub async fn run(
        self,
        connection_manager: &ConnectionManager,
        config: &Config,
    ) -> Result<(), Error> {
        let Self { connection: ConnectionArgs { identifier }, path, format } = self;
        let storage_box =
            ConnectionResolver::from((connection_manager, config)).storage_box(identifier)?;
        let entries = storage_box.list_files(path.as_deref()).await?;
        write_stdout(&format.render(entries.as_slice(), <[RemoteEntry]>::render_table)?).await
    }
}

#[derive(Args, Clone)]
pub struct DiskUsageCommand {
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

impl DiskUsageCommand {
    pub async fn run(
        self,
        connection_manager: &ConnectionManager,
        config: &Config,
    ) -> Result<(), Error> {
        let Self { connection: ConnectionArgs { identifier }, format } = self;
        let storage_box =
            ConnectionResolver::from((connection_manager, config)).storage_box(identifier)?;
        let usage = storage_box.available_space().await?;
        write_stdout(&format.render(&usage, DiskUsage::render_table)?).await
    }
}

#[derive(Args, Clone)]
pub struct MakeDirectoryCommand {
    #[command(flatten)]
    pub connection: ConnectionArgs,

    #[arg(help = "Remote directory to create, parents included.")]
    pub path: String,
}

impl MakeDirectoryCommand {
    pub async fn run(
        self,
        connection_manager: &ConnectionManager,
        config: &Config,
    ) -> Result<(), Error> {
        let Self { connection: ConnectionArgs { identifier }, path } = self;
        let storage_box =
            ConnectionResolver::from((connection_manager, config)).storage_box(identifier)?;
        storage_box.create_remote_directory(&path).await?;
        Ok(())
    }
}
