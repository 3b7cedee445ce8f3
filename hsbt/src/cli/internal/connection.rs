use std::io::IsTerminal;

use clap::Args;

use crate::{
    cli::Error,
    config::{self, Config},
    connection::{Connection, ConnectionManager},
    process::SystemRunner,
    storage_box::StorageBox,
    ui::fuzzy_finder::ConnectionListExt as _,
};

#[derive(Args, Clone, Debug, Default)]
pub struct ConnectionArgs {
    #[arg(
        short = 'i',
        long = "identifier",
        help = "Identifier of the connection. If not specified and more than one connection is \
                stored, a fuzzy finder is used to select one."
    )]
    pub identifier: Option<String>,
}

/// Finds the connection a subcommand works on.
pub struct ConnectionResolver<'m, 'c> {
    connection_manager: &'m ConnectionManager,
    config: &'c Config,
}

impl<'m, 'c> From<(&'m ConnectionManager, &'c Config)> for ConnectionResolver<'m, 'c> {
    fn from((connection_manager, config): (&'m ConnectionManager, &'c Config)) -> Self {
        Self { connection_manager, config }
    }
}

impl ConnectionResolver<'_, '_> {
    /// Looks up `identifier`. Without one, the only stored connection is
    /// used, or the user picks one if several are stored and a terminal is
    /// attached.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConnectionNotFound`] for an unknown identifier and
    /// [`Error::ConnectionNotSpecified`] if no connection could be chosen.
    pub fn resolve(&self, identifier: Option<String>) -> Result<Connection, Error> {
        if let Some(identifier) = identifier.filter(|id| !id.is_empty()) {
            return self
                .connection_manager
                .get_connection(&identifier, None)?
                .ok_or(Error::ConnectionNotFound { identifier });
        }

        let mut connections = self.connection_manager.list_connections(None)?;
        let identifier = match connections.len() {
            0 => None,
            1 => connections.iter().next().map(|connection| connection.identifier.clone()),
            _ if std::io::stdin().is_terminal() && std::io::stderr().is_terminal() => {
                connections.select_connection_identifier()
            }
            _ => None,
        };
        identifier
            .and_then(|identifier| connections.remove_connection(&identifier))
            .ok_or(Error::ConnectionNotSpecified)
    }

    /// Resolves the connection like [`Self::resolve`] and prepares its
    /// storage box.
    pub fn storage_box(
        &self,
        identifier: Option<String>,
    ) -> Result<StorageBox<SystemRunner>, Error> {
        let connection = self.resolve(identifier)?;
        let key_dir = config::resolve(&connection.key_dir)?;
        tracing::debug!("Use connection {connection}");
        Ok(StorageBox::from_connection(&connection, key_dir, &self.config.binaries, SystemRunner)?)
    }
}
