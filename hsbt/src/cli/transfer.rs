//! File transfers with `scp`.

use std::path::PathBuf;

use clap::Args;

use crate::{
    cli::{
        Error,
        internal::{ConnectionArgs, ConnectionResolver, with_spinner},
    },
    config::Config,
    connection::ConnectionManager,
};

#[derive(Args, Clone)]
pub struct UploadCommand {
    #[command(flatten)]
    pub connection: ConnectionArgs,

    #[arg(short = 'r', long = "recursive", help = "Copy directories recursively.")]
    pub recursive: bool,

    #[arg(help = "Local path of the file to upload.")]
    pub source: PathBuf,

    #[arg(help = "Path on the storage box where the file will be saved.")]
    pub destination: String,
}

impl UploadCommand {
    pub async fn run(
        self,
        connection_manager: &ConnectionManager,
        config: &Config,
    ) -> Result<(), Error> {
        let Self { connection: ConnectionArgs { identifier }, recursive, source, destination } =
            self;
        let storage_box =
            ConnectionResolver::from((connection_manager, config)).storage_box(identifier)?;

        let message = format!("Uploading {} to {destination}", source.display());
        with_spinner(&message, storage_box.upload(&source, &destination, recursive)).await?;
        Ok(())
    }
}

#[derive(Args, Clone)]
pub struct DownloadCommand {
    #[command(flatten)]
    pub connection: ConnectionArgs,

    #[arg(short = 'r', long = "recursive", help = "Copy directories recursively.")]
    pub recursive: bool,

    #[arg(help = "Path of the file on the storage box.")]
    pub source: String,

    #[arg(help = "Local path where the file will be saved.")]
    pub destination: PathBuf,
}

impl DownloadCommand {
    pub async fn run(
        self,
        connection_manager: &ConnectionManager,
        config: &Config,
    ) -> Result<(), Error> {
        let Self { connection: ConnectionArgs { identifier }, recursive, source, destination } =
            self;
        let storage_box =
            ConnectionResolver::from((connection_manager, config)).storage_box(identifier)?;

        let message = format!("Downloading {source} to {}", destination.display());
        with_spinner(&message, storage_box.download(&source, &destination, recursive)).await?;
        Ok(())
    }
}
