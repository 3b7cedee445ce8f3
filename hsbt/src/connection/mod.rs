//! Named connection profiles of storage boxes.

mod error;
mod manager;

use std::{collections::BTreeMap, fmt, path::PathBuf};

use hsbt_base::{PROJECT_NAME, consts::DEFAULT_REMOTE_BASE_PATH};
use serde::{Deserialize, Serialize};

pub use self::{error::Error, manager::ConnectionManager};

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
pub struct Connection {
    pub identifier: String,

    /// e.g. `u123456.your-storagebox.de`
    pub host: String,

    /// e.g. `u123456` or `u123456-sub1`
    pub user: String,

    /// Directory holding the key pair and `known_hosts` of this connection.
    pub key_dir: PathBuf,

    /// Remote directory that mounts expose.
    #[serde(default = "default_remote_base_path")]
    pub remote_base_path: String,
}

impl Connection {
    /// # Errors
    ///
    /// Fails if the identifier contains characters that cannot be used in an
    /// fstab marker or an rclone remote name, if `host` or `user` is empty,
    /// or if `user` cannot be part of a key file name.
    pub fn new(
        identifier: impl Into<String>,
        host: impl Into<String>,
        user: impl Into<String>,
        key_dir: impl Into<PathBuf>,
    ) -> Result<Self, Error> {
        let connection = Self {
            identifier: identifier.into(),
            host: host.into().trim().to_string(),
            user: user.into().trim().to_string(),
            key_dir: key_dir.into(),
            remote_base_path: default_remote_base_path(),
        };
        connection.validate()?;
        Ok(connection)
    }

    #[must_use]
    pub fn with_remote_base_path(mut self, remote_base_path: impl Into<String>) -> Self {
        let remote_base_path = remote_base_path.into();
        if !remote_base_path.is_empty() {
            self.remote_base_path = remote_base_path;
        }
        self
    }

    /// Name of the key pair used for this connection.
    pub fn key_identifier(&self) -> String { format!("{PROJECT_NAME}_{}", self.user) }

    /// Connections read from a profile file are checked the same way as new
    /// ones.
    pub fn validate(&self) -> Result<(), Error> {
        let Self { identifier, host, user, .. } = self;
        let valid_identifier = !identifier.is_empty()
            && !identifier.starts_with('-')
            && identifier.chars().all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'));
        if !valid_identifier {
            return error::InvalidIdentifierSnafu { identifier }.fail();
        }
        if host.is_empty() {
            return error::MissingFieldSnafu { identifier, field: "host" }.fail();
        }
        if user.is_empty() {
            return error::MissingFieldSnafu { identifier, field: "user" }.fail();
        }
        if host.contains(|c: char| c.is_whitespace() || matches!(c, '/' | '@')) {
            return error::InvalidFieldSnafu { identifier, field: "host", value: host }.fail();
        }
        if !user.chars().all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-')) {
            return error::InvalidFieldSnafu { identifier, field: "user", value: user }.fail();
        }
        Ok(())
    }
}

impl fmt::Display for Connection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Self { identifier, host, user, key_dir, remote_base_path } = self;
        write!(
            f,
            "{identifier}: {user}@{host}:{remote_base_path} (keys in {})",
            key_dir.display()
        )
    }
}

/// The content of a connection profile file.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct ConnectionList {
    #[serde(default)]
    pub connections: BTreeMap<String, Connection>,
}

impl ConnectionList {
    /// Adds the connections of `other` whose identifiers are not present yet.
    pub fn extend_connections(&mut self, other: Self) {
        for (identifier, connection) in other.connections {
            let _unused = self.connections.entry(identifier).or_insert(connection);
        }
    }

    /// Stores `connection`.
    ///
    /// An existing connection with the same identifier is replaced if
    /// `overwrite_existing` is set, and kept as it is if `exists_ok` is set.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConnectionExists`] if the identifier is taken and
    /// neither flag is set.
    pub fn set_connection(
        &mut self,
        connection: Connection,
        overwrite_existing: bool,
        exists_ok: bool,
    ) -> Result<(), Error> {
        if self.connections.contains_key(&connection.identifier) && !overwrite_existing {
            if exists_ok {
                return Ok(());
            }
            return error::ConnectionExistsSnafu { identifier: connection.identifier }.fail();
        }
        let _unused = self.connections.insert(connection.identifier.clone(), connection);
        Ok(())
    }

    /// Every connection must be valid and stored under its own identifier.
    ///
    /// # Errors
    ///
    /// Returns the first violation found.
    pub fn validate(&self) -> Result<(), Error> {
        for (key, connection) in &self.connections {
            if *key != connection.identifier {
                return error::MismatchedIdentifierSnafu {
                    key,
                    identifier: connection.identifier.as_str(),
                }
                .fail();
            }
            connection.validate()?;
        }
        Ok(())
    }

    pub fn remove_connection(&mut self, identifier: &str) -> Option<Connection> {
        self.connections.remove(identifier)
    }

    pub fn len(&self) -> usize { self.connections.len() }

    pub fn iter(&self) -> impl Iterator<Item = &Connection> { self.connections.values() }
}

fn default_remote_base_path() -> String { DEFAULT_REMOTE_BASE_PATH.to_string() }

#[cfg(test)]
impl ConnectionList {
    pub fn get_connection(&self, identifier: &str) -> Option<&Connection> {
        self.connections.get(identifier)
    }

    pub fn is_empty(&self) -> bool { self.connections.is_empty() }
}
