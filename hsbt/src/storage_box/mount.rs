use std::{fmt, path::Path};

use snafu::ResultExt;

use super::{Error, error};

/// A line of `/etc/fstab`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FstabEntry {
    pub source: String,
    pub mount_point: String,
    pub fs_type: String,
    pub options: Vec<String>,
    pub dump: u8,
    pub pass: u8,
}

impl fmt::Display for FstabEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Self { source, mount_point, fs_type, options, dump, pass } = self;
        write!(
            f,
            "{} {} {fs_type} {} {dump} {pass}",
            escape_mount_field(source),
            escape_mount_field(mount_point),
            escape_mount_field(&options.join(","))
        )
    }
}

/// Escapes whitespace and backslashes the way `fstab` and the mount table
/// expect, e.g. a space becomes `\040`.
pub fn escape_mount_field(field: &str) -> String {
    let mut escaped = String::with_capacity(field.len());
    for c in field.chars() {
        match c {
            ' ' | '\t' | '\n' | '\\' => escaped.push_str(&format!("\\{:03o}", u32::from(c))),
            c => escaped.push(c),
        }
    }
    escaped
}

/// Reverts [`escape_mount_field`]. Invalid escape sequences are kept as they
/// are.
pub fn unescape_mount_field(field: &str) -> String {
    let bytes = field.as_bytes();
    let mut unescaped = Vec::with_capacity(bytes.len());
    let mut index = 0;
    while index < bytes.len() {
        let octal = bytes.get(index + 1..index + 4).filter(|digits| {
            bytes[index] == b'\\' && digits.iter().all(|digit| (b'0'..=b'7').contains(digit))
        });
        if let Some(value) = octal.and_then(|digits| {
            u8::from_str_radix(std::str::from_utf8(digits).ok()?, 8).ok()
        }) {
            unescaped.push(value);
            index += 4;
        } else {
            unescaped.push(bytes[index]);
            index += 1;
        }
    }
    String::from_utf8_lossy(&unescaped).into_owned()
}

/// Returns `true` if the mount table lists a file system mounted at
/// `mount_point`. `mount_table` is in the format of `/proc/self/mounts`.
pub fn is_mounted_in_table(mount_table: &str, mount_point: &Path) -> bool {
    let mount_point = normalize_mount_point(&mount_point.to_string_lossy());
    mount_table
        .lines()
        .filter_map(|line| line.split_whitespace().nth(1))
        .any(|field| normalize_mount_point(&unescape_mount_field(field)) == mount_point)
}

/// Reads the mount table at `mount_table_path`, e.g. `/proc/self/mounts`, and
/// looks up `mount_point` in it.
pub async fn is_mounted(mount_point: &Path, mount_table_path: &Path) -> Result<bool, Error> {
    let mount_table = tokio::fs::read_to_string(mount_table_path)
        .await
        .with_context(|_| error::ReadMountTableSnafu { path: mount_table_path.to_path_buf() })?;
    Ok(is_mounted_in_table(&mount_table, mount_point))
}

fn normalize_mount_point(path: &str) -> String {
    let trimmed = path.trim_end_matches('/');
    if trimmed.is_empty() { "/".to_string() } else { trimmed.to_string() }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_escapes_fields() {
        let entry = FstabEntry {
            source: "u1@u1.your-storagebox.de:/".to_string(),
            mount_point: "/mnt/my box".to_string(),
            fs_type: "fuse.sshfs".to_string(),
            options: vec!["port=23".to_string(), "IdentityFile=/root/.ssh/hsbt_u1".to_string()],
            dump: 0,
            pass: 0,
        };
        assert_eq!(
            entry.to_string(),
            "u1@u1.your-storagebox.de:/ /mnt/my\\040box fuse.sshfs \
             port=23,IdentityFile=/root/.ssh/hsbt_u1 0 0"
        );
    }

    #[test]
    fn test_escape_and_unescape() {
        assert_eq!(escape_mount_field("a b\tc\\d"), "a\\040b\\011c\\134d");
        assert_eq!(unescape_mount_field("a\\040b\\011c\\134d"), "a b\tc\\d");
        assert_eq!(unescape_mount_field("trailing\\04"), "trailing\\04");
        assert_eq!(unescape_mount_field("\\9xy"), "\\9xy");
    }

    #[test]
    fn test_is_mounted_in_table() {
        let table = "\
proc /proc proc rw,nosuid,nodev,noexec,relatime 0 0
u1@u1.your-storagebox.de:/ /mnt/my\\040box fuse.sshfs rw,nosuid,nodev,relatime 0 0
";
        assert!(is_mounted_in_table(table, Path::new("/mnt/my box")));
        assert!(is_mounted_in_table(table, Path::new("/mnt/my box/")));
        assert!(!is_mounted_in_table(table, Path::new("/mnt/my")));
        assert!(!is_mounted_in_table("", Path::new("/proc")));
    }

    #[tokio::test]
    async fn test_is_mounted_reads_mount_table() {
        let dir = tempfile::tempdir().unwrap();
        let mounts = dir.path().join("mounts");
        std::fs::write(&mounts, "proc /proc proc rw 0 0\n").unwrap();

        assert!(is_mounted(Path::new("/proc"), &mounts).await.unwrap());
        assert!(!is_mounted(Path::new("/mnt"), &mounts).await.unwrap());

        let err = is_mounted(Path::new("/proc"), &dir.path().join("missing")).await.unwrap_err();
        assert!(matches!(err, Error::ReadMountTable { .. }));
    }
}
