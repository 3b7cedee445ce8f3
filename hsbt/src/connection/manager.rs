use std::{
    io::ErrorKind,
    path::{Path, PathBuf},
};

use hsbt_base::paths;
use snafu::ResultExt;

use crate::connection::{Connection, ConnectionList, error, error::Error};

/// Reads and writes connection profiles.
///
/// Writes always go to the target file. Reads merge the target file with the
/// alternative sources, earlier files taking precedence.
#[derive(Clone, Debug)]
pub struct ConnectionManager {
    target_config_file: PathBuf,
    alternative_config_file_sources: Vec<PathBuf>,
}

impl ConnectionManager {
    /// Chooses the connection files for the current user.
    ///
    /// Without an explicit target, root writes to the system wide file and
    /// everybody else to the file in their home directory; the other one is
    /// still read.
    pub fn new(target_config_file: Option<PathBuf>) -> Self {
        Self::for_user(
            target_config_file,
            paths::is_root(),
            paths::system_connections_file(),
            paths::user_connections_file(),
        )
    }

    fn for_user(
        target_config_file: Option<PathBuf>,
        is_root: bool,
        system_file: PathBuf,
        user_file: Option<PathBuf>,
    ) -> Self {
        match (target_config_file, user_file) {
            (Some(target), user_file) => {
                let alternatives = std::iter::once(system_file)
                    .chain(user_file)
                    .filter(|path| *path != target)
                    .collect();
                Self::with_sources(target, alternatives)
            }
            (None, Some(user_file)) if !is_root => Self::with_sources(user_file, vec![system_file]),
            (None, Some(user_file)) => Self::with_sources(system_file, vec![user_file]),
            (None, None) => Self::with_sources(system_file, Vec::new()),
        }
    }

    pub const fn with_sources(
        target_config_file: PathBuf,
        alternative_config_file_sources: Vec<PathBuf>,
    ) -> Self {
        Self { target_config_file, alternative_config_file_sources }
    }

    pub fn target_config_file(&self) -> &Path { &self.target_config_file }

    fn sources(&self) -> impl Iterator<Item = &Path> {
        std::iter::once(self.target_config_file.as_path())
            .chain(self.alternative_config_file_sources.iter().map(PathBuf::as_path))
    }

    /// Lists the connections of all sources, or of `from_specific_config_file`
    /// only.
    ///
    /// # Errors
    ///
    /// Fails if a readable file does not contain valid connection JSON.
    pub fn list_connections(
        &self,
        from_specific_config_file: Option<&Path>,
    ) -> Result<ConnectionList, Error> {
        if let Some(file_path) = from_specific_config_file {
            return Ok(read_connection_file(file_path)?.unwrap_or_default());
        }

        let mut connections = ConnectionList::default();
        for file_path in self.sources() {
            if let Some(list) = read_connection_file(file_path)? {
                connections.extend_connections(list);
            }
        }
        Ok(connections)
    }

    /// Stores `connection` in the target file and returns the connection that
    /// is stored there afterwards.
    ///
    /// # Errors
    ///
    /// See [`ConnectionList::set_connection`]; file errors are passed on.
    pub fn set_connection(
        &self,
        connection: Connection,
        overwrite_existing: bool,
        exists_ok: bool,
    ) -> Result<Connection, Error> {
        let identifier = connection.identifier.clone();
        let mut list = read_connection_file(&self.target_config_file)?.unwrap_or_default();
        list.set_connection(connection, overwrite_existing, exists_ok)?;
        write_connection_file(&self.target_config_file, &list)?;
        tracing::info!(
            "Stored connection '{identifier}' in {}",
            self.target_config_file.display()
        );

        list.remove_connection(&identifier).ok_or_else(|| Error::ConnectionNotFound {
            identifier,
            file_path: self.target_config_file.clone(),
        })
    }

    /// # Errors
    ///
    /// Fails if one of the consulted files is malformed.
    pub fn get_connection(
        &self,
        identifier: &str,
        from_specific_config_file: Option<&Path>,
    ) -> Result<Option<Connection>, Error> {
        let mut list = self.list_connections(from_specific_config_file)?;
        Ok(list.remove_connection(identifier))
    }

    /// Removes a connection from the target file.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConnectionNotFound`] if the target file does not
    /// contain `identifier`.
    pub fn remove_connection(&self, identifier: &str) -> Result<Connection, Error> {
        let mut list = read_connection_file(&self.target_config_file)?.unwrap_or_default();
        let removed = list.remove_connection(identifier).ok_or_else(|| {
            Error::ConnectionNotFound {
                identifier: identifier.to_string(),
                file_path: self.target_config_file.clone(),
            }
        })?;
        write_connection_file(&self.target_config_file, &list)?;
        tracing::info!(
            "Removed connection '{identifier}' from {}",
            self.target_config_file.display()
        );
        Ok(removed)
    }
}

/// `None` if the file does not exist or may not be read.
fn read_connection_file(file_path: &Path) -> Result<Option<ConnectionList>, Error> {
    let data = match std::fs::read_to_string(file_path) {
        Ok(data) => data,
        Err(err) if matches!(err.kind(), ErrorKind::NotFound | ErrorKind::PermissionDenied) => {
            tracing::debug!("Skip connection file {}: {err}", file_path.display());
            return Ok(None);
        }
        Err(source) => {
            return Err(Error::ReadConnectionFile { file_path: file_path.to_path_buf(), source });
        }
    };
    if data.trim().is_empty() {
        return Ok(Some(ConnectionList::default()));
    }
    let list: ConnectionList = serde_json::from_str(&data)
        .context(error::ParseConnectionFileSnafu { file_path: file_path.to_path_buf() })?;
    list.validate().map_err(|source| Error::InvalidConnectionFile {
        file_path: file_path.to_path_buf(),
        source: Box::new(source),
    })?;
    Ok(Some(list))
}

fn write_connection_file(file_path: &Path, list: &ConnectionList) -> Result<(), Error> {
    let mut data = serde_json::to_string_pretty(list).context(error::SerializeConnectionsSnafu)?;
    data.push('\n');
    if let Some(parent) = file_path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .context(error::WriteConnectionFileSnafu { file_path: file_path.to_path_buf() })?;
    }
    std::fs::write(file_path, data)
        .context(error::WriteConnectionFileSnafu { file_path: file_path.to_path_buf() })
}
