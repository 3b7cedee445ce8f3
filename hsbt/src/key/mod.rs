//! Generation and inspection of the SSH key pairs used to log in to storage
//! boxes, and of the `known_hosts` file next to them.

mod error;

use std::path::{Path, PathBuf};

use snafu::ResultExt;
use tokio::io::AsyncWriteExt;

pub use self::error::Error;
use crate::{
    config::Binaries,
    process::{Invocation, ProcessRunner},
};

const KNOWN_HOSTS_FILE_NAME: &str = "known_hosts";
const KEY_SCAN_TYPES: &str = "rsa,ecdsa,ed25519";

#[derive(Clone, Debug)]
pub struct KeyManager<R> {
    directory: PathBuf,
    identifier: String,
    ssh_keygen: PathBuf,
    ssh_keyscan: PathBuf,
    runner: R,
}

impl<R> KeyManager<R>
where
    R: ProcessRunner,
{
    /// Creates `directory` with mode `0700` if it does not exist yet.
    ///
    /// # Errors
    ///
    /// Fails if `directory` is a file or cannot be created.
    pub fn new(
        directory: impl Into<PathBuf>,
        identifier: impl Into<String>,
        binaries: &Binaries,
        runner: R,
    ) -> Result<Self, Error> {
        let directory = directory.into();
        if directory.is_file() {
            return error::KeyDirectoryIsFileSnafu { path: directory }.fail();
        }
        if !directory.is_dir() {
            create_private_dir(&directory)
                .context(error::CreateKeyDirectorySnafu { path: directory.clone() })?;
        }

        Ok(Self {
            directory,
            identifier: identifier.into(),
            ssh_keygen: binaries.ssh_keygen.clone(),
            ssh_keyscan: binaries.ssh_keyscan.clone(),
            runner,
        })
    }

    pub fn identifier(&self) -> &str { &self.identifier }

    pub fn directory(&self) -> &Path { &self.directory }

    pub fn private_key_path(&self) -> PathBuf { self.directory.join(&self.identifier) }

    pub fn public_key_path(&self) -> PathBuf {
        self.directory.join(format!("{}.pub", self.identifier))
    }

    pub fn rfc4716_path(&self) -> PathBuf {
        self.directory.join(format!("{}.rfc.pub", self.identifier))
    }

    pub fn known_hosts_path(&self) -> PathBuf { self.directory.join(KNOWN_HOSTS_FILE_NAME) }

    /// Generates an RSA key pair without passphrase.
    ///
    /// Returns `false` if a valid key pair exists and `exists_ok` is set.
    ///
    /// # Errors
    ///
    /// An existing key pair is an error unless `overwrite_if_exists` or, for
    /// a valid pair, `exists_ok` is set.
    pub async fn ssh_keygen(
        &self,
        overwrite_if_exists: bool,
        exists_ok: bool,
        key_bits: u32,
    ) -> Result<bool, Error> {
        let private_key_path = self.private_key_path();
        let public_key_path = self.public_key_path();

        if private_key_path.exists() || public_key_path.exists() {
            if !overwrite_if_exists {
                let valid = self.validate_if_keys_exists_and_valid(false).await?;
                return match (valid, exists_ok) {
                    (true, true) => {
                        tracing::debug!("Use existing key {}", private_key_path.display());
                        Ok(false)
                    }
                    (true, false) => error::KeyExistsSnafu { path: private_key_path }.fail(),
                    (false, _) => error::IncompleteKeyPairSnafu { path: private_key_path }.fail(),
                };
            }
            for path in [&private_key_path, &public_key_path] {
                remove_file_if_exists(path).await?;
            }
        }
        // An RFC 4716 copy always belongs to the key pair it was made from.
        remove_file_if_exists(&self.rfc4716_path()).await?;

        let key_bits = key_bits.to_string();
        let invocation = Invocation::new(&self.ssh_keygen)
            .args(["-b", key_bits.as_str(), "-t", "rsa", "-f"])
            .arg(&private_key_path)
            .args(["-q", "-N", ""]);
        let _unused = self
            .runner
            .run(&invocation)
            .await
            .with_context(|_| error::GenerateKeySnafu { path: private_key_path.clone() })?;
        tracing::info!("Generated SSH key {}", private_key_path.display());
        Ok(true)
    }

    /// Returns `true` if both halves of the key pair exist and `ssh-keygen`
    /// accepts them.
    ///
    /// # Errors
    ///
    /// A key that `ssh-keygen` rejects is an error only if
    /// `raise_if_not_valid` is set.
    pub async fn validate_if_keys_exists_and_valid(
        &self,
        raise_if_not_valid: bool,
    ) -> Result<bool, Error> {
        let paths = [self.private_key_path(), self.public_key_path()];
        if !paths.iter().all(|path| path.is_file()) {
            return Ok(false);
        }
        for path in paths {
            let invocation = Invocation::new(&self.ssh_keygen).arg("-l").arg("-f").arg(&path);
            match self.runner.run(&invocation).await {
                Ok(_) => tracing::debug!("{} is valid", path.display()),
                Err(source) if raise_if_not_valid => {
                    return Err(Error::InvalidKey { path, source });
                }
                Err(err) => {
                    tracing::debug!("{} is not valid: {err}", path.display());
                    return Ok(false);
                }
            }
        }
        Ok(true)
    }

    /// Writes the public key in RFC 4716 format to `target_path`, or next to
    /// the public key by default, and returns the written path.
    ///
    /// # Errors
    ///
    /// Returns [`Error::FileExists`] if the target exists and neither
    /// `overwrite_if_exist` nor `exists_ok` is set.
    pub async fn gen_rfc4716_format_copy(
        &self,
        target_path: Option<&Path>,
        overwrite_if_exist: bool,
        exists_ok: bool,
    ) -> Result<PathBuf, Error> {
        let target_path = target_path.map_or_else(|| self.rfc4716_path(), Path::to_path_buf);
        if target_path.is_file() && !overwrite_if_exist {
            if exists_ok {
                return Ok(target_path);
            }
            return error::FileExistsSnafu { path: target_path }.fail();
        }

        let public_key_path = self.public_key_path();
        let invocation = Invocation::new(&self.ssh_keygen)
            .arg("-e")
            .arg("-f")
            .arg(&public_key_path)
            .args(["-m", "RFC4716"]);
        let converted = self
            .runner
            .run(&invocation)
            .await
            .context(error::ConvertKeySnafu { path: public_key_path })?;
        tokio::fs::write(&target_path, converted)
            .await
            .with_context(|_| error::WriteKeyFileSnafu { path: target_path.clone() })?;
        Ok(target_path)
    }

    pub async fn get_private_key(&self) -> Result<Vec<u8>, Error> {
        read_file(&self.private_key_path()).await
    }

    pub async fn get_public_key(&self, in_rfc4716_format: bool) -> Result<Vec<u8>, Error> {
        let path = if in_rfc4716_format { self.rfc4716_path() } else { self.public_key_path() };
        read_file(&path).await
    }

    /// # Errors
    ///
    /// Fails only if `ssh-keygen` cannot be started.
    pub async fn known_host_entry_exists(&self, host: &str, port: u16) -> Result<bool, Error> {
        let known_hosts_path = self.known_hosts_path();
        if !known_hosts_path.is_file() {
            return Ok(false);
        }
        let invocation = Invocation::new(&self.ssh_keygen)
            .arg("-F")
            .arg(known_host_pattern(host, port))
            .arg("-f")
            .arg(&known_hosts_path);
        let output = self
            .runner
            .output(&invocation)
            .await
            .context(error::LookupKnownHostSnafu { path: known_hosts_path })?;
        Ok(output.success() && !output.stdout.trim().is_empty())
    }

    /// Appends the host keys of `host` to the `known_hosts` file unless it
    /// already knows the host. Returns whether the file was changed.
    pub async fn create_known_host_entry_if_not_exists(
        &self,
        host: &str,
        port: u16,
    ) -> Result<bool, Error> {
        if self.known_host_entry_exists(host, port).await? {
            return Ok(false);
        }

        let port_arg = port.to_string();
        let invocation = Invocation::new(&self.ssh_keyscan)
            .args(["-p", port_arg.as_str(), "-t", KEY_SCAN_TYPES, host]);
        let mut entries = self
            .runner
            .run(&invocation)
            .await
            .with_context(|_| error::ScanHostSnafu { host: host.to_string() })?;
        if entries.trim().is_empty() {
            return error::HostScanEmptySnafu { host, port }.fail();
        }
        if !entries.ends_with('\n') {
            entries.push('\n');
        }

        let known_hosts_path = self.known_hosts_path();
        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&known_hosts_path)
            .await
            .with_context(|_| error::WriteKeyFileSnafu { path: known_hosts_path.clone() })?;
        file.write_all(entries.as_bytes())
            .await
            .with_context(|_| error::WriteKeyFileSnafu { path: known_hosts_path.clone() })?;
        tracing::info!("Added host keys of {host} to {}", known_hosts_path.display());
        Ok(true)
    }
}

/// `ssh` writes hosts on non-standard ports as `[host]:port`.
pub fn known_host_pattern(host: &str, port: u16) -> String {
    if port == 22 { host.to_string() } else { format!("[{host}]:{port}") }
}

#[cfg(unix)]
fn create_private_dir(path: &Path) -> std::io::Result<()> {
    use std::os::unix::fs::DirBuilderExt;

    std::fs::DirBuilder::new().recursive(true).mode(0o700).create(path)
}

#[cfg(not(unix))]
fn create_private_dir(path: &Path) -> std::io::Result<()> { std::fs::create_dir_all(path) }

async fn read_file(path: &Path) -> Result<Vec<u8>, Error> {
    tokio::fs::read(path).await.context(error::ReadKeyFileSnafu { path: path.to_path_buf() })
}

async fn remove_file_if_exists(path: &Path) -> Result<(), Error> {
    match tokio::fs::remove_file(path).await {
        Ok(()) => Ok(()),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(source) => Err(Error::RemoveKeyFile { path: path.to_path_buf(), source }),
    }
}
