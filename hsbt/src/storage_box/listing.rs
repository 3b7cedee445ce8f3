use serde::Serialize;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    File,
    Directory,
    Symlink,
    Other,
}

impl EntryKind {
    fn from_mode(mode: &str) -> Self {
        match mode.chars().next() {
            Some('-') => Self::File,
            Some('d') => Self::Directory,
            Some('l') => Self::Symlink,
            _ => Self::Other,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::File => "file",
            Self::Directory => "directory",
            Self::Symlink => "symlink",
            Self::Other => "other",
        }
    }
}

/// One line of `ls -la`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct RemoteEntry {
    pub kind: EntryKind,
    pub permissions: String,
    pub links: u64,
    pub owner: String,
    pub group: String,
    pub size: u64,

    /// Date and time as printed by `ls`, e.g. `Jan 12 09:41` or `Mar 3 2023`.
    pub modified: String,
    pub name: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub link_target: Option<String>,
}

/// Parses the output of `ls -la`, skipping the `total` line and the `.` and
/// `..` entries.
pub fn parse_ls_output(output: &str) -> Vec<RemoteEntry> {
    output
        .lines()
        .filter(|line| !line.trim().is_empty() && !line.starts_with("total "))
        .filter_map(|line| {
            let entry = parse_ls_line(line);
            if entry.is_none() {
                tracing::warn!("Skip unrecognized `ls` line: {line:?}");
            }
            entry
        })
        .filter(|entry| entry.name != "." && entry.name != "..")
        .collect()
}

fn parse_ls_line(line: &str) -> Option<RemoteEntry> {
    let (fields, rest) = split_fields(line)?;
    let [permissions, links, owner, group, size, month, day, time] = fields;

    let kind = EntryKind::from_mode(permissions);
    let (name, link_target) = match (kind, rest.split_once(" -> ")) {
        (EntryKind::Symlink, Some((name, target))) => (name, Some(target.to_string())),
        _ => (rest, None),
    };
    if name.is_empty() {
        return None;
    }

    Some(RemoteEntry {
        kind,
        permissions: permissions.to_string(),
        links: links.parse().ok()?,
        owner: owner.to_string(),
        group: group.to_string(),
        size: size.parse().ok()?,
        modified: format!("{month} {day} {time}"),
        name: name.to_string(),
        link_target,
    })
}

/// Splits off `N` whitespace separated fields and returns them together with
/// the remainder of the line, whose inner whitespace is kept.
fn split_fields<const N: usize>(line: &str) -> Option<([&str; N], &str)> {
    let mut fields = [""; N];
    let mut rest = line;
    for field in &mut fields {
        rest = rest.trim_start();
        let end = rest.find(char::is_whitespace)?;
        *field = &rest[..end];
        rest = &rest[end..];
    }
    Some((fields, rest.trim_start().trim_end_matches(['\r', '\n'])))
}

#[cfg(test)]
mod tests {
    use super::*;

    const LISTING: &str = "\
total 24
drwxr-xr-x  5 u123456 u123456    6 Jan 12 09:41 .
drwxr-xr-x  3 root    root       3 Jan  1  2023 ..
drwxr-xr-x  2 u123456 u123456    2 Jan 12 09:41 backups
-rw-r--r--  1 u123456 u123456 1024 Mar  3  2023 notes with spaces.txt
lrwxrwxrwx  1 u123456 u123456    7 Mar  3  2023 latest -> backups
crw-rw-rw-  1 root    root    1, 3 Mar  3  2023 null
";

    #[test]
    fn test_parse_ls_output() {
        let entries = parse_ls_output(LISTING);
        assert_eq!(entries.len(), 3);

        assert_eq!(entries[0], RemoteEntry {
            kind: EntryKind::Directory,
            permissions: "drwxr-xr-x".to_string(),
            links: 2,
            owner: "u123456".to_string(),
            group: "u123456".to_string(),
            size: 2,
            modified: "Jan 12 09:41".to_string(),
            name: "backups".to_string(),
            link_target: None,
        });

        assert_eq!(entries[1].kind, EntryKind::File);
        assert_eq!(entries[1].name, "notes with spaces.txt");
        assert_eq!(entries[1].size, 1024);
        assert_eq!(entries[1].modified, "Mar 3 2023");

        assert_eq!(entries[2].kind, EntryKind::Symlink);
        assert_eq!(entries[2].name, "latest");
        assert_eq!(entries[2].link_target.as_deref(), Some("backups"));
    }

    #[test]
    fn test_parse_empty_output() {
        assert!(parse_ls_output("").is_empty());
        assert!(parse_ls_output("total 0\n").is_empty());
    }

    #[test]
    fn test_split_fields_keeps_inner_whitespace() {
        let (fields, rest) = split_fields::<2>("  a  b   c  d\n").unwrap();
        assert_eq!(fields, ["a", "b"]);
        assert_eq!(rest, "c  d");
        assert!(split_fields::<3>("a b").is_none());
    }
}
