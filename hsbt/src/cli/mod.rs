//! The `hsbt` command-line interface.
//!
//! # Examples
//!
//! ```bash
//! # Store a connection profile
//! hsbt connection set -i backup -H u123456.your-storagebox.de -u u123456
//!
//! # Generate a key, trust the host key and deploy the public key
//! HSBT_PASSWORD=secret hsbt setup -i backup
//!
//! # Check the free space and list the files
//! hsbt df -i backup
//! hsbt ls -i backup /backups
//!
//! # Mount the storage box at boot through fstab
//! sudo hsbt mount fstab -i backup /mnt/backup
//! ```

mod connection;
pub mod error;
mod internal;
mod key;
mod mount;
mod rclone;
mod remote;
mod setup;
mod transfer;

use std::{io::Write, path::PathBuf};

use clap::{CommandFactory, Parser, Subcommand};
use hsbt_base::{CLI_PROGRAM_NAME, consts::env};
use snafu::ResultExt;

pub use self::error::Error;
use self::{
    connection::ConnectionCommands,
    key::KeyCommands,
    mount::{MountCommands, UnmountCommand},
    rclone::RcloneCommands,
    remote::{DiskUsageCommand, ExecCommand, ListFilesCommand, MakeDirectoryCommand},
    setup::SetupCommand,
    transfer::{DownloadCommand, UploadCommand},
};
use crate::{config::Config, connection::ConnectionManager, shadow};

#[derive(Parser)]
#[command(
    name = CLI_PROGRAM_NAME,
    author,
    version,
    long_version = shadow::CLAP_LONG_VERSION,
    about = "hsbt: common tasks with a Hetzner Storage Box.",
    long_about = "hsbt stores connection profiles for Hetzner Storage Boxes, deploys SSH keys \
                  to them and wraps ssh, scp, rclone and sshfs to list, transfer and mount \
                  the remote files.",
    color = clap::ColorChoice::Always
)]
pub struct Cli {
    #[clap(subcommand)]
    commands: Option<Commands>,

    #[clap(
        long = "config",
        short = 'c',
        env = env::CONFIG_FILE_PATH,
        help = "Specify a configuration file. Defaults to ~/.config/hsbt/config.yaml or \
                HSBT_CONFIG_FILE_PATH env var."
    )]
    config_file: Option<PathBuf>,

    #[clap(
        long = "log-level",
        env = env::LOG_LEVEL,
        help = "Set the logging level (e.g., info, debug, trace)."
    )]
    log_level: Option<tracing::Level>,

    #[clap(long = "debug", help = "Log at debug level. Overrides --log-level.")]
    debug: bool,

    #[clap(
        long = "connections-file",
        env = env::CONNECTIONS_CONFIG_FILE,
        help = "Connection profile file to store profiles in. Defaults to \
                ~/.config/hetzner_sb_connections.json, or /etc/hetzner_sb_connections.json \
                for root."
    )]
    connections_file: Option<PathBuf>,
}

#[derive(Clone, Subcommand)]
pub enum Commands {
    #[command(about = "Display version information")]
    Version,

    #[command(about = "Generate shell completion script for the specified shell (bash, zsh, fish)")]
    Completions { shell: clap_complete::Shell },

    #[command(about = "Output the default configuration in YAML format")]
    DefaultConfig,

    #[command(aliases = ["c", "conn"], about = "Manage connection profiles")]
    Connection {
        #[command(subcommand)]
        commands: ConnectionCommands,
    },

    #[command(about = "Trust the host key, generate a key pair and deploy it to the storage box")]
    Setup(SetupCommand),

    #[command(about = "Manage the SSH key pair of a connection")]
    Key {
        #[command(subcommand)]
        commands: KeyCommands,
    },

    #[command(aliases = ["e", "execute"], about = "Run a command on the storage box")]
    Exec(ExecCommand),

    #[command(about = "List files on the storage box")]
    Ls(ListFilesCommand),

    #[command(about = "Show the used and available space of the storage box")]
    Df(DiskUsageCommand),

    #[command(about = "Create a directory on the storage box")]
    Mkdir(MakeDirectoryCommand),

    #[command(alias = "put", about = "Upload a file to the storage box")]
    Upload(UploadCommand),

    #[command(alias = "get", about = "Download a file from the storage box")]
    Download(DownloadCommand),

    #[command(about = "Mount the storage box locally")]
    Mount {
        #[command(subcommand)]
        commands: MountCommands,
    },

    #[command(alias = "umount", about = "Unmount the storage box")]
    Unmount(UnmountCommand),

    #[command(about = "Manage the rclone remote of a connection")]
    Rclone {
        #[command(subcommand)]
        commands: RcloneCommands,
    },
}

impl Default for Cli {
    fn default() -> Self { Self::parse() }
}

impl Cli {
    /// Loads the configuration file, then applies the `HSBT_*` environment
    /// variables and finally the command line flags.
    ///
    /// A configuration file given explicitly must exist; otherwise the
    /// defaults are used when no file is found.
    fn load_config(&self) -> Result<Config, Error> {
        self.load_config_with(|key| std::env::var(key).ok())
    }

    fn load_config_with<F>(&self, lookup: F) -> Result<Config, Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = match &self.config_file {
            Some(path) => Config::load(path)?,
            None => Config::load_or_default()?,
        };
        config.apply_env_overrides(lookup);

        if let Some(path) = &self.connections_file {
            config.connections_file = Some(path.clone());
        }
        if let Some(log_level) = self.log_level {
            config.log.level = log_level;
        }
        if self.debug {
            config.log.level = tracing::Level::DEBUG;
        }

        config.resolve_paths()?;
        Ok(config)
    }

    /// # Errors
    ///
    /// Returns an `Error` if the configuration cannot be loaded, the runtime
    /// cannot be created, or the subcommand fails.
    ///
    /// # Panics
    ///
    /// Panics if writing the version or the default configuration to stdout
    /// fails.
    pub fn run(self) -> Result<i32, Error> {
        match self.commands {
            Some(Commands::Version) => {
                std::io::stdout()
                    .write_all(Self::command().render_long_version().as_bytes())
                    .expect("Failed to write to stdout");
                return Ok(0);
            }
            Some(Commands::Completions { shell }) => {
                let mut app = Self::command();
                let bin_name = app.get_name().to_string();
                clap_complete::generate(shell, &mut app, bin_name, &mut std::io::stdout());
                return Ok(0);
            }
            Some(Commands::DefaultConfig) => {
                std::io::stdout()
                    .write_all(Config::template_basic().as_slice())
                    .expect("Failed to write to stdout");
                return Ok(0);
            }
            None => {
                let help = Self::command().render_long_help().ansi().to_string();
                std::io::stderr().write_all(help.as_bytes()).expect("Failed to write to stderr");
                return Ok(-1);
            }
            _ => {}
        }

        let config = self.load_config()?;
        config.log.registry();
        let connection_manager = ConnectionManager::new(config.connections_file.clone());
        tracing::debug!(
            "Connection profiles are stored in {}",
            connection_manager.target_config_file().display()
        );

        let fut = async move {
            let Some(commands) = self.commands else {
                return Ok(());
            };
            match commands {
                Commands::Connection { commands } => {
                    commands.run(&connection_manager, &config).await
                }
                Commands::Setup(cmd) => cmd.run(&connection_manager, &config).await,
                Commands::Key { commands } => commands.run(&connection_manager, &config).await,
                Commands::Exec(cmd) => cmd.run(&connection_manager, &config).await,
                Commands::Ls(cmd) => cmd.run(&connection_manager, &config).await,
                Commands::Df(cmd) => cmd.run(&connection_manager, &config).await,
                Commands::Mkdir(cmd) => cmd.run(&connection_manager, &config).await,
                Commands::Upload(cmd) => cmd.run(&connection_manager, &config).await,
                Commands::Download(cmd) => cmd.run(&connection_manager, &config).await,
                Commands::Mount { commands } => commands.run(&connection_manager, &config).await,
                Commands::Unmount(cmd) => cmd.run(&connection_manager, &config).await,
                Commands::Rclone { commands } => commands.run(&connection_manager, &config).await,
                Commands::Version | Commands::Completions { .. } | Commands::DefaultConfig => {
                    Ok(())
                }
            }
        };

        tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .context(error::InitializeTokioRuntimeSnafu)?
            .block_on(fut)?;
        Ok(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_is_consistent() { Cli::command().debug_assert(); }

    #[test]
    fn test_parse_aliases() {
        let cli = Cli::try_parse_from([
            "hsbt",
            "connection",
            "setConnection",
            "-i",
            "backup",
            "-H",
            "u1.your-storagebox.de",
            "-u",
            "u1",
        ])
        .unwrap();
        assert!(matches!(
            cli.commands,
            Some(Commands::Connection { commands: ConnectionCommands::Set(_) })
        ));

        let cli = Cli::try_parse_from(["hsbt", "put", "-r", "local", "/remote"]).unwrap();
        assert!(matches!(cli.commands, Some(Commands::Upload(_))));
    }

    fn write_config(dir: &std::path::Path, content: &str) -> String {
        let path = dir.join("config.yaml");
        std::fs::write(&path, content).unwrap();
        path.display().to_string()
    }

    #[test]
    fn test_debug_overrides_log_level() {
        let dir = tempfile::tempdir().unwrap();
        let config_file = write_config(dir.path(), "log:\n  level: WARN\n");

        let cli =
            Cli::try_parse_from(["hsbt", "-c", config_file.as_str(), "--log-level", "info"])
                .unwrap();
        assert_eq!(cli.load_config_with(|_| None).unwrap().log.level, tracing::Level::INFO);

        let cli = Cli::try_parse_from([
            "hsbt",
            "-c",
            config_file.as_str(),
            "--log-level",
            "info",
            "--debug",
        ])
        .unwrap();
        assert_eq!(cli.load_config_with(|_| None).unwrap().log.level, tracing::Level::DEBUG);
    }

    #[test]
    fn test_connections_file_precedence() {
        let dir = tempfile::tempdir().unwrap();
        let config_file = write_config(dir.path(), "connectionsFile: /from/file.json\n");
        let from_env = |key: &str| {
            (key == env::CONNECTIONS_CONFIG_FILE).then(|| "/from/env.json".to_string())
        };

        let cli = Cli::try_parse_from(["hsbt", "-c", config_file.as_str()]).unwrap();
        let config = cli.load_config_with(|_| None).unwrap();
        assert_eq!(config.connections_file, Some(PathBuf::from("/from/file.json")));
        let config = cli.load_config_with(from_env).unwrap();
        assert_eq!(config.connections_file, Some(PathBuf::from("/from/env.json")));

        let cli = Cli::try_parse_from([
            "hsbt",
            "-c",
            config_file.as_str(),
            "--connections-file",
            "/from/flag.json",
        ])
        .unwrap();
        let config = cli.load_config_with(from_env).unwrap();
        assert_eq!(config.connections_file, Some(PathBuf::from("/from/flag.json")));
    }

    #[test]
    fn test_explicit_config_file_must_exist() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.yaml").display().to_string();

        let cli = Cli::try_parse_from(["hsbt", "-c", missing.as_str()]).unwrap();
        let err = cli.load_config_with(|_| None).unwrap_err();
        assert!(matches!(
            err,
            Error::Configuration { source: crate::config::Error::OpenConfig { .. } }
        ));
    }

    #[test]
    fn test_parse_exec_keeps_remote_flags() {
        let cli = Cli::try_parse_from(["hsbt", "exec", "-i", "backup", "--", "ls", "-la"]).unwrap();
        let Some(Commands::Exec(cmd)) = cli.commands else {
            panic!("expected the exec command");
        };
        assert_eq!(cmd.connection.identifier.as_deref(), Some("backup"));
        assert_eq!(cmd.command, ["ls", "-la"]);
    }
}
