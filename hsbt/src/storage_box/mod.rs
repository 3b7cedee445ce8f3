//! Operations on a Hetzner Storage Box, carried out with `ssh`, `scp`,
//! `sshfs`, `mount` and `umount`.

mod disk_usage;
mod error;
mod listing;
mod mount;

use std::{
    ffi::OsString,
    path::{Path, PathBuf},
};

use hsbt_base::{ConfigFileEditor, consts::STORAGE_BOX_SSH_PORT};
use snafu::ResultExt;

pub use self::{
    disk_usage::{DiskUsage, parse_df_output},
    error::Error,
    listing::{RemoteEntry, parse_ls_output},
    mount::{FstabEntry, is_mounted},
};
use crate::{
    config::Binaries,
    connection::Connection,
    key::KeyManager,
    process::{Invocation, ProcessRunner},
};

const AUTHENTICATION_SUCCEEDED: &str = "Authentication succeeded";
const PASSWORD_ENV: &str = "SSHPASS";

/// What [`StorageBox::unmount_storage_box`] did.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct UnmountOutcome {
    /// `false` if nothing was mounted at the mount point.
    pub unmounted: bool,

    pub fstab_entry_removed: bool,
}

/// How the public key gets onto the storage box.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum DeployMethod {
    /// The `install-ssh-key` command of the storage box.
    #[default]
    InstallSshKey,

    /// `ssh-copy-id` in SFTP mode.
    SshCopyId,
}

pub struct StorageBox<R> {
    identifier: String,
    host: String,
    user: String,
    port: u16,
    password: Option<String>,
    remote_base_path: String,
    key_manager: KeyManager<R>,
    binaries: Binaries,
    runner: R,
}

impl<R> StorageBox<R>
where
    R: ProcessRunner + Clone,
{
    /// `key_dir` replaces the key directory of the connection, which may
    /// contain `~`.
    ///
    /// # Errors
    ///
    /// Fails if the key directory cannot be used.
    pub fn from_connection(
        connection: &Connection,
        key_dir: impl Into<PathBuf>,
        binaries: &Binaries,
        runner: R,
    ) -> Result<Self, Error> {
        let key_manager =
            KeyManager::new(key_dir, connection.key_identifier(), binaries, runner.clone())?;
        Ok(Self {
            identifier: connection.identifier.clone(),
            host: connection.host.clone(),
            user: connection.user.clone(),
            port: STORAGE_BOX_SSH_PORT,
            password: None,
            remote_base_path: connection.remote_base_path.clone(),
            key_manager,
            binaries: binaries.clone(),
            runner,
        })
    }

    #[must_use]
    pub fn with_password(mut self, password: Option<String>) -> Self {
        self.password = password.filter(|password| !password.is_empty());
        self
    }

    pub fn identifier(&self) -> &str { &self.identifier }

    pub fn host(&self) -> &str { &self.host }

    pub fn user(&self) -> &str { &self.user }

    pub fn remote_base_path(&self) -> &str { &self.remote_base_path }

    pub const fn key_manager(&self) -> &KeyManager<R> { &self.key_manager }

    /// `user@host`
    pub fn destination(&self) -> String { format!("{}@{}", self.user, self.host) }

    /// `user@host:path`, the operand form of `scp`, `sshfs` and `fstab`.
    pub fn remote_location(&self, path: &str) -> String {
        format!("{}:{path}", self.destination())
    }

    fn known_hosts_option(&self) -> String {
        format!("UserKnownHostsFile={}", self.key_manager.known_hosts_path().display())
    }

    /// Options that make `ssh` and `scp` authenticate with the managed key
    /// only. `port_flag` is `-p` for `ssh` and `-P` for `scp`.
    fn ssh_options(&self, port_flag: &str) -> Vec<OsString> {
        let mut options: Vec<OsString> = vec![
            port_flag.into(),
            self.port.to_string().into(),
            "-i".into(),
            self.key_manager.private_key_path().into(),
        ];
        for option in [
            "PreferredAuthentications=publickey".to_string(),
            "PasswordAuthentication=no".to_string(),
            "BatchMode=yes".to_string(),
            "StrictHostKeyChecking=yes".to_string(),
            self.known_hosts_option(),
        ] {
            options.push("-o".into());
            options.push(option.into());
        }
        options
    }

    fn ssh(&self) -> Invocation { Invocation::new(&self.binaries.ssh).args(self.ssh_options("-p")) }

    fn scp(&self) -> Invocation { Invocation::new(&self.binaries.scp).args(self.ssh_options("-P")) }

    /// Tries to log in with the managed key.
    pub async fn check_if_public_key_is_deployed(&self) -> Result<bool, Error> {
        if !self.key_manager.private_key_path().is_file() {
            return Ok(false);
        }
        // The verbose output is matched in English.
        let invocation =
            self.ssh().arg("-v").arg(self.destination()).arg("exit").env("LC_ALL", "C");
        let output = self
            .runner
            .output(&invocation)
            .await
            .with_context(|_| error::CheckKeyDeploymentSnafu { host: self.host.clone() })?;
        let deployed = output.stderr.contains(AUTHENTICATION_SUCCEEDED)
            || output.stdout.contains(AUTHENTICATION_SUCCEEDED);
        tracing::debug!("Public key deployed on {}: {deployed}", self.host);
        Ok(deployed)
    }

    /// Makes sure the storage box accepts the managed key, generating the
    /// key pair and the `known_hosts` entry first if needed.
    ///
    /// Returns `false` if the key was already deployed.
    ///
    /// # Errors
    ///
    /// The first deployment needs the storage box password.
    pub async fn deploy_public_key_if_not_done(
        &self,
        method: DeployMethod,
        key_bits: u32,
    ) -> Result<bool, Error> {
        let _unused =
            self.key_manager.create_known_host_entry_if_not_exists(&self.host, self.port).await?;
        let _unused = self.key_manager.ssh_keygen(false, true, key_bits).await?;

        if self.check_if_public_key_is_deployed().await? {
            return Ok(false);
        }
        let Some(password) = self.password.as_deref() else {
            return error::DeployKeyPasswordMissingSnafu { host: self.host.clone() }.fail();
        };

        let port = self.port.to_string();
        let invocation = match method {
            DeployMethod::InstallSshKey => {
                let public_key = self.key_manager.get_public_key(false).await?;
                Invocation::new(&self.binaries.sshpass)
                    .arg("-e")
                    .arg(&self.binaries.ssh)
                    .args(["-p", port.as_str()])
                    .args(["-o", "StrictHostKeyChecking=yes", "-o"])
                    .arg(self.known_hosts_option())
                    .arg(self.destination())
                    .arg("install-ssh-key")
                    .stdin(public_key)
            }
            DeployMethod::SshCopyId => Invocation::new(&self.binaries.sshpass)
                .arg("-e")
                .arg(&self.binaries.ssh_copy_id)
                .args(["-p", port.as_str(), "-s", "-i"])
                .arg(self.key_manager.public_key_path())
                .arg("-o")
                .arg(self.known_hosts_option())
                .arg(self.destination()),
        }
        .secret_env(PASSWORD_ENV, password);

        let _unused = self
            .runner
            .run(&invocation)
            .await
            .with_context(|_| error::DeployKeySnafu { host: self.host.clone() })?;

        if !self.check_if_public_key_is_deployed().await? {
            return error::KeyDeploymentFailedSnafu { host: self.host.clone() }.fail();
        }
        tracing::info!("Deployed public key to {}", self.host);
        Ok(true)
    }

    /// Runs `command` through the restricted shell of the storage box and
    /// returns its standard output. Arguments are quoted for that shell.
    pub async fn run_remote_command<S>(&self, command: &[S]) -> Result<String, Error>
    where
        S: AsRef<str>,
    {
        let command = command
            .iter()
            .map(|arg| shell_escape::escape(arg.as_ref().into()).into_owned())
            .collect::<Vec<_>>()
            .join(" ");
        let invocation = self.ssh().arg(self.destination()).arg(&command);
        self.runner.run(&invocation).await.context(error::RemoteCommandSnafu { command })
    }

    pub async fn create_remote_directory(&self, path: &str) -> Result<(), Error> {
        let _unused = self.run_remote_command(&["mkdir", "-p", path]).await?;
        Ok(())
    }

    /// Lists `path`, or the remote base path if `path` is `None`.
    pub async fn list_files(&self, path: Option<&str>) -> Result<Vec<RemoteEntry>, Error> {
        let path = path.unwrap_or(&self.remote_base_path);
        let output = self.run_remote_command(&["ls", "-la", path]).await?;
        Ok(parse_ls_output(&output))
    }

    pub async fn available_space(&self) -> Result<DiskUsage, Error> {
        let output = self.run_remote_command(&["df"]).await?;
        parse_df_output(&output).ok_or_else(|| Error::UnexpectedOutput {
            command: "df".to_string(),
            output: output.trim().to_string(),
        })
    }

    /// Copies a local file, or a directory if `recursive` is set, to the
    /// storage box.
    pub async fn upload(&self, local: &Path, remote: &str, recursive: bool) -> Result<(), Error> {
        let target = self.remote_location(remote);
        let invocation = self.transfer_invocation(recursive).arg(local).arg(&target);
        let _unused = self.runner.run(&invocation).await.with_context(|_| error::TransferSnafu {
            source_path: local.display().to_string(),
            target_path: target.clone(),
        })?;
        Ok(())
    }

    pub async fn download(&self, remote: &str, local: &Path, recursive: bool) -> Result<(), Error> {
        let source = self.remote_location(remote);
        let invocation = self.transfer_invocation(recursive).arg(&source).arg(local);
        let _unused = self.runner.run(&invocation).await.with_context(|_| error::TransferSnafu {
            source_path: source.clone(),
            target_path: local.display().to_string(),
        })?;
        Ok(())
    }

    fn transfer_invocation(&self, recursive: bool) -> Invocation {
        let invocation = self.scp();
        if recursive { invocation.arg("-r") } else { invocation }
    }

    /// The `fstab` line that mounts the remote base path at `mount_point`
    /// through `sshfs`.
    pub fn fstab_entry(&self, mount_point: &Path) -> FstabEntry {
        let options = [
            format!("port={}", self.port),
            format!("IdentityFile={}", self.key_manager.private_key_path().display()),
            self.known_hosts_option(),
            "delay_connect".to_string(),
            "_netdev".to_string(),
            "user".to_string(),
            "idmap=user".to_string(),
            "reconnect".to_string(),
        ];
        FstabEntry {
            source: self.remote_location(&self.remote_base_path),
            mount_point: mount_point.display().to_string(),
            fs_type: "fuse.sshfs".to_string(),
            options: options.into(),
            dump: 0,
            pass: 0,
        }
    }

    /// Writes the `fstab` entry of this storage box and mounts it unless it
    /// is mounted already. Returns whether `fstab_path` changed.
    pub async fn mount_storage_box_via_fstab(
        &self,
        mount_point: &Path,
        fstab_path: &Path,
        mount_table_path: &Path,
    ) -> Result<bool, Error> {
        let entry = self.fstab_entry(mount_point).to_string();
        let changed = ConfigFileEditor::new(fstab_path)
            .upsert_block(&self.identifier, &entry)
            .context(error::EditFstabSnafu)?;
        create_mount_point(mount_point).await?;

        if self.storage_box_is_mounted(mount_point, mount_table_path).await? {
            tracing::info!("{} is already mounted", mount_point.display());
            return Ok(changed);
        }
        let invocation = Invocation::new(&self.binaries.mount).arg(mount_point);
        let _unused = self
            .runner
            .run(&invocation)
            .await
            .with_context(|_| error::MountSnafu { mount_point: mount_point.to_path_buf() })?;
        Ok(changed)
    }

    /// Removes the `fstab` entry of this storage box. Returns whether
    /// `fstab_path` changed.
    pub fn remove_fstab_entry(&self, fstab_path: &Path) -> Result<bool, Error> {
        ConfigFileEditor::new(fstab_path)
            .remove_block(&self.identifier)
            .context(error::EditFstabSnafu)
    }

    /// Mounts the remote base path at `mount_point` with `sshfs`, outside of
    /// `fstab`.
    pub async fn mount_storage_box_via_sshfs(&self, mount_point: &Path) -> Result<(), Error> {
        create_mount_point(mount_point).await?;
        let options = [
            format!("IdentityFile={}", self.key_manager.private_key_path().display()),
            self.known_hosts_option(),
            "StrictHostKeyChecking=yes".to_string(),
            "reconnect".to_string(),
        ]
        .join(",");
        let port = self.port.to_string();
        let invocation = Invocation::new(&self.binaries.sshfs)
            .args(["-p", port.as_str(), "-o", options.as_str()])
            .arg(self.remote_location(&self.remote_base_path))
            .arg(mount_point);
        let _unused = self
            .runner
            .run(&invocation)
            .await
            .with_context(|_| error::MountSnafu { mount_point: mount_point.to_path_buf() })?;
        Ok(())
    }

    /// Looks up `mount_point` in the mount table, e.g. `/proc/self/mounts`.
    pub async fn storage_box_is_mounted(
        &self,
        mount_point: &Path,
        mount_table_path: &Path,
    ) -> Result<bool, Error> {
        is_mounted(mount_point, mount_table_path).await
    }

    /// Unmounts `mount_point` if the mount table lists it, then removes the
    /// entry of this storage box from `fstab_path` if one is given.
    pub async fn unmount_storage_box(
        &self,
        mount_point: &Path,
        mount_table_path: &Path,
        fstab_path: Option<&Path>,
    ) -> Result<UnmountOutcome, Error> {
        let unmounted = self.storage_box_is_mounted(mount_point, mount_table_path).await?;
        if unmounted {
            self.unmount(mount_point).await?;
        } else {
            tracing::warn!("Nothing is mounted at {}", mount_point.display());
        }
        let fstab_entry_removed = match fstab_path {
            Some(fstab_path) => self.remove_fstab_entry(fstab_path)?,
            None => false,
        };
        Ok(UnmountOutcome { unmounted, fstab_entry_removed })
    }

    pub async fn unmount(&self, mount_point: &Path) -> Result<(), Error> {
        let invocation = Invocation::new(&self.binaries.umount).arg(mount_point);
        let _unused = self
            .runner
            .run(&invocation)
            .await
            .with_context(|_| error::UnmountSnafu { mount_point: mount_point.to_path_buf() })?;
        tracing::info!("Unmounted {}", mount_point.display());
        Ok(())
    }
}

async fn create_mount_point(mount_point: &Path) -> Result<(), Error> {
    tokio::fs::create_dir_all(mount_point)
        .await
        .with_context(|_| error::CreateMountPointSnafu { path: mount_point.to_path_buf() })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::process::testing::ScriptedRunner;

    struct Fixture {
        _dir: tempfile::TempDir,
        keys: PathBuf,
        root: PathBuf,
        runner: ScriptedRunner,
        storage_box: StorageBox<ScriptedRunner>,
    }

    fn fixture() -> Fixture {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().to_path_buf();
        let keys = root.join("keys");
        let runner = ScriptedRunner::new();
        let connection =
            Connection::new("backup", "u1.your-storagebox.de", "u1", "~/.ssh").unwrap();
        let storage_box =
            StorageBox::from_connection(&connection, &keys, &Binaries::default(), runner.clone())
                .unwrap();
        Fixture { _dir: dir, keys, root, runner, storage_box }
    }

    fn write_key_pair(keys: &Path) {
        std::fs::write(keys.join("hsbt_u1"), "private").unwrap();
        std::fs::write(keys.join("hsbt_u1.pub"), "ssh-rsa AAAA hsbt\n").unwrap();
    }

    fn write_known_hosts(keys: &Path) {
        std::fs::write(keys.join("known_hosts"), "[u1.your-storagebox.de]:23 ssh-ed25519 AAAA\n")
            .unwrap();
    }

    /// Outputs of the steps that precede a deployment: known host lookup,
    /// validation of both key files and the failing login.
    fn push_undeployed_key(runner: &ScriptedRunner) {
        runner.push_success("[u1.your-storagebox.de]:23 ssh-ed25519 AAAA\n");
        runner.push_success("");
        runner.push_success("");
        runner.push_failure(255, "Permission denied (publickey).");
    }

    #[tokio::test]
    async fn test_remote_command_is_quoted() {
        let Fixture { _dir, keys, runner, storage_box, .. } = fixture();
        runner.push_success("ok\n");

        let output = storage_box.run_remote_command(&["mkdir", "-p", "a b"]).await.unwrap();
        assert_eq!(output, "ok\n");

        let private_key = keys.join("hsbt_u1").display().to_string();
        let known_hosts = format!("UserKnownHostsFile={}", keys.join("known_hosts").display());
        assert_eq!(runner.command_args(), vec![vec![
            "ssh",
            "-p",
            "23",
            "-i",
            private_key.as_str(),
            "-o",
            "PreferredAuthentications=publickey",
            "-o",
            "PasswordAuthentication=no",
            "-o",
            "BatchMode=yes",
            "-o",
            "StrictHostKeyChecking=yes",
            "-o",
            known_hosts.as_str(),
            "u1@u1.your-storagebox.de",
            "mkdir -p 'a b'",
        ]]);
    }

    #[tokio::test]
    async fn test_check_deployment() {
        let Fixture { _dir, keys, runner, storage_box, .. } = fixture();
        assert!(!storage_box.check_if_public_key_is_deployed().await.unwrap());
        assert!(runner.invocations().is_empty());

        write_key_pair(&keys);
        runner.push_output(0, "", "debug1: Authentication succeeded (publickey).\n");
        assert!(storage_box.check_if_public_key_is_deployed().await.unwrap());
        runner.push_output(255, "", "Permission denied (publickey).\n");
        assert!(!storage_box.check_if_public_key_is_deployed().await.unwrap());

        let args = &runner.command_args()[0];
        assert_eq!(args[args.len() - 3..], ["-v", "u1@u1.your-storagebox.de", "exit"]);
    }

    #[tokio::test]
    async fn test_deploy_requires_password() {
        let Fixture { _dir, keys, runner, storage_box, .. } = fixture();
        write_key_pair(&keys);
        write_known_hosts(&keys);
        push_undeployed_key(&runner);

        let err = storage_box
            .deploy_public_key_if_not_done(DeployMethod::InstallSshKey, 2048)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::DeployKeyPasswordMissing { .. }));
        assert_eq!(runner.invocations().len(), 4);
    }

    #[tokio::test]
    async fn test_deploy_skips_deployed_key() {
        let Fixture { _dir, keys, runner, storage_box, .. } = fixture();
        write_key_pair(&keys);
        write_known_hosts(&keys);
        runner.push_success("[u1.your-storagebox.de]:23 ssh-ed25519 AAAA\n");
        runner.push_success("");
        runner.push_success("");
        runner.push_output(0, "", "Authentication succeeded (publickey).");

        assert!(
            !storage_box
                .deploy_public_key_if_not_done(DeployMethod::InstallSshKey, 2048)
                .await
                .unwrap()
        );
    }

    #[tokio::test]
    async fn test_deploy_with_install_ssh_key() {
        let Fixture { _dir, keys, runner, storage_box, .. } = fixture();
        let storage_box = storage_box.with_password(Some("hunter2".to_string()));
        write_key_pair(&keys);
        write_known_hosts(&keys);
        push_undeployed_key(&runner);
        runner.push_success("Key No. 1 (ssh-rsa hsbt) was installed in RFC4716 format\n");
        runner.push_output(0, "", "Authentication succeeded (publickey).");

        assert!(
            storage_box
                .deploy_public_key_if_not_done(DeployMethod::InstallSshKey, 2048)
                .await
                .unwrap()
        );

        let invocations = runner.invocations();
        assert_eq!(invocations.len(), 6);
        let deploy = &invocations[4];
        assert_eq!(deploy.get_stdin(), Some(b"ssh-rsa AAAA hsbt\n".as_slice()));
        assert_eq!(deploy.get_envs().collect::<Vec<_>>(), vec![("SSHPASS", "hunter2")]);
        assert!(!deploy.to_string().contains("hunter2"));

        let known_hosts = format!("UserKnownHostsFile={}", keys.join("known_hosts").display());
        assert_eq!(runner.command_args()[4], vec![
            "sshpass",
            "-e",
            "ssh",
            "-p",
            "23",
            "-o",
            "StrictHostKeyChecking=yes",
            "-o",
            known_hosts.as_str(),
            "u1@u1.your-storagebox.de",
            "install-ssh-key",
        ]);
    }

    #[tokio::test]
    async fn test_deploy_reports_failed_login() {
        let Fixture { _dir, keys, runner, storage_box, .. } = fixture();
        let storage_box = storage_box.with_password(Some("hunter2".to_string()));
        write_key_pair(&keys);
        write_known_hosts(&keys);
        push_undeployed_key(&runner);
        runner.push_success("");
        runner.push_failure(255, "Permission denied (publickey).");

        let err = storage_box
            .deploy_public_key_if_not_done(DeployMethod::SshCopyId, 2048)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::KeyDeploymentFailed { .. }));

        let public_key = keys.join("hsbt_u1.pub").display().to_string();
        assert_eq!(runner.command_args()[4][..8], [
            "sshpass",
            "-e",
            "ssh-copy-id",
            "-p",
            "23",
            "-s",
            "-i",
            public_key.as_str()
        ]);
    }

    #[tokio::test]
    async fn test_available_space() {
        let Fixture { _dir, runner, storage_box, .. } = fixture();
        runner.push_success(
            "Filesystem 1K-blocks Used Available Use% Mounted on\nu1 1000 250 750 25% /home\n",
        );
        let usage = storage_box.available_space().await.unwrap();
        assert_eq!(usage.available, 750 * 1024);

        runner.push_success("");
        let err = storage_box.available_space().await.unwrap_err();
        assert!(matches!(err, Error::UnexpectedOutput { .. }));
    }

    #[tokio::test]
    async fn test_list_files_defaults_to_base_path() {
        let Fixture { _dir, runner, storage_box, .. } = fixture();
        runner.push_success("total 0\n-rw-r--r-- 1 u1 u1 3 Jan 1 10:00 a.txt\n");

        let entries = storage_box.list_files(None).await.unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(runner.command_args()[0].last().map(String::as_str), Some("ls -la /"));
    }

    #[tokio::test]
    async fn test_transfers() {
        let Fixture { _dir, runner, storage_box, .. } = fixture();
        storage_box.upload(Path::new("/tmp/a"), "backups/a", false).await.unwrap();
        storage_box.download("backups", Path::new("/tmp/b"), true).await.unwrap();

        let args = runner.command_args();
        assert_eq!(args[0][..3], ["scp", "-P", "23"]);
        assert_eq!(args[0][args[0].len() - 2..], ["/tmp/a", "u1@u1.your-storagebox.de:backups/a"]);
        assert_eq!(args[1][args[1].len() - 3..], [
            "-r",
            "u1@u1.your-storagebox.de:backups",
            "/tmp/b"
        ]);

        runner.push_failure(1, "scp: backups/c: No such file or directory");
        let err = storage_box.download("backups/c", Path::new("/tmp/c"), false).await.unwrap_err();
        assert!(matches!(err, Error::Transfer { .. }));
    }

    #[tokio::test]
    async fn test_mount_via_fstab() {
        let Fixture { _dir, keys, root, runner, storage_box, .. } = fixture();
        let fstab = root.join("fstab");
        let mounts = root.join("mounts");
        let mount_point = root.join("mnt/backup");
        std::fs::write(&fstab, "UUID=abcd / ext4 defaults 0 1\n").unwrap();
        std::fs::write(&mounts, "proc /proc proc rw 0 0\n").unwrap();

        assert!(
            storage_box.mount_storage_box_via_fstab(&mount_point, &fstab, &mounts).await.unwrap()
        );
        assert!(mount_point.is_dir());
        assert_eq!(runner.command_args(), vec![vec![
            "mount".to_string(),
            mount_point.display().to_string()
        ]]);

        let content = std::fs::read_to_string(&fstab).unwrap();
        assert!(content.starts_with("UUID=abcd / ext4 defaults 0 1\n# BEGIN hsbt backup\n"));
        assert!(content.contains(&format!(
            "u1@u1.your-storagebox.de:/ {} fuse.sshfs port=23,IdentityFile={},\
             UserKnownHostsFile={},delay_connect,_netdev,user,idmap=user,reconnect 0 0\n",
            mount_point.display(),
            keys.join("hsbt_u1").display(),
            keys.join("known_hosts").display()
        )));

        std::fs::write(
            &mounts,
            format!("u1@u1.your-storagebox.de:/ {} fuse.sshfs rw 0 0\n", mount_point.display()),
        )
        .unwrap();
        assert!(
            !storage_box.mount_storage_box_via_fstab(&mount_point, &fstab, &mounts).await.unwrap()
        );
        assert_eq!(runner.invocations().len(), 1);

        assert!(storage_box.remove_fstab_entry(&fstab).unwrap());
        assert_eq!(std::fs::read_to_string(&fstab).unwrap(), "UUID=abcd / ext4 defaults 0 1\n");
        assert!(!storage_box.remove_fstab_entry(&fstab).unwrap());
    }

    #[tokio::test]
    async fn test_mount_via_sshfs_and_unmount() {
        let Fixture { _dir, keys, root, runner, storage_box, .. } = fixture();
        let mount_point = root.join("sshfs");

        storage_box.mount_storage_box_via_sshfs(&mount_point).await.unwrap();
        storage_box.unmount(&mount_point).await.unwrap();
        assert!(mount_point.is_dir());

        let options = format!(
            "IdentityFile={},UserKnownHostsFile={},StrictHostKeyChecking=yes,reconnect",
            keys.join("hsbt_u1").display(),
            keys.join("known_hosts").display()
        );
        let mount_point = mount_point.display().to_string();
        assert_eq!(runner.command_args(), vec![
            vec![
                "sshfs",
                "-p",
                "23",
                "-o",
                options.as_str(),
                "u1@u1.your-storagebox.de:/",
                mount_point.as_str()
            ],
            vec!["umount", mount_point.as_str()],
        ]);
    }

    #[tokio::test]
    async fn test_unmount_skips_unmounted_mount_point() {
        let Fixture { _dir, root, runner, storage_box, .. } = fixture();
        let mounts = root.join("mounts");
        std::fs::write(&mounts, "proc /proc proc rw 0 0\n").unwrap();

        let outcome =
            storage_box.unmount_storage_box(&root.join("mnt"), &mounts, None).await.unwrap();
        assert_eq!(outcome, UnmountOutcome::default());
        assert!(runner.invocations().is_empty());
    }

    #[tokio::test]
    async fn test_unmount_and_remove_fstab_entry() {
        let Fixture { _dir, root, runner, storage_box, .. } = fixture();
        let fstab = root.join("fstab");
        let mounts = root.join("mounts");
        let mount_point = root.join("mnt");
        std::fs::write(&fstab, "UUID=abcd / ext4 defaults 0 1\n").unwrap();
        std::fs::write(&mounts, "proc /proc proc rw 0 0\n").unwrap();
        let _unused =
            storage_box.mount_storage_box_via_fstab(&mount_point, &fstab, &mounts).await.unwrap();
        std::fs::write(
            &mounts,
            format!("u1@u1.your-storagebox.de:/ {} fuse.sshfs rw 0 0\n", mount_point.display()),
        )
        .unwrap();

        let outcome =
            storage_box.unmount_storage_box(&mount_point, &mounts, Some(&fstab)).await.unwrap();
        assert_eq!(outcome, UnmountOutcome { unmounted: true, fstab_entry_removed: true });
        assert_eq!(runner.command_args()[1], vec![
            "umount".to_string(),
            mount_point.display().to_string()
        ]);
        assert_eq!(std::fs::read_to_string(&fstab).unwrap(), "UUID=abcd / ext4 defaults 0 1\n");

        // still listed as mounted, but the fstab entry is gone already
        let outcome =
            storage_box.unmount_storage_box(&mount_point, &mounts, Some(&fstab)).await.unwrap();
        assert_eq!(outcome, UnmountOutcome { unmounted: true, fstab_entry_removed: false });
    }
}
