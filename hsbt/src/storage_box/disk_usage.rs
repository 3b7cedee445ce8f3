use serde::Serialize;

/// Usage of the file system behind a storage box, in bytes.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct DiskUsage {
    pub filesystem: String,
    pub total: u64,
    pub used: u64,
    pub available: u64,
    pub use_percent: u8,
    pub mounted_on: String,
}

/// How the size columns of `df` are to be read.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum SizeUnit {
    Blocks(u64),
    HumanReadable,
}

impl SizeUnit {
    fn from_header(column: &str) -> Option<Self> {
        if let Some(block_size) = column.strip_suffix("-blocks") {
            return parse_human_size(block_size).map(Self::Blocks);
        }
        matches!(column, "Size" | "size").then_some(Self::HumanReadable)
    }

    fn to_bytes(self, value: &str) -> Option<u64> {
        match self {
            Self::Blocks(block_size) => value.parse::<u64>().ok()?.checked_mul(block_size),
            Self::HumanReadable => parse_human_size(value),
        }
    }
}

/// Parses the first file system reported by `df` or `df -h`.
///
/// `df` moves the columns of a file system with a long name to the next
/// line; such rows are joined.
pub fn parse_df_output(output: &str) -> Option<DiskUsage> {
    let mut lines = output.lines().filter(|line| !line.trim().is_empty());
    let header = lines.next()?.split_whitespace().collect::<Vec<_>>();
    let unit = SizeUnit::from_header(header.get(1)?)?;

    let mut pending_filesystem: Option<&str> = None;
    for line in lines {
        let fields = line.split_whitespace().collect::<Vec<_>>();
        let fields = if let Some(filesystem) = pending_filesystem.take() {
            std::iter::once(filesystem).chain(fields).collect()
        } else if let [filesystem] = fields.as_slice() {
            pending_filesystem = Some(*filesystem);
            continue;
        } else {
            fields
        };
        if let Some(usage) = parse_row(unit, &fields) {
            return Some(usage);
        }
        tracing::warn!("Skip unrecognized `df` line: {line:?}");
    }
    None
}

fn parse_row(unit: SizeUnit, fields: &[&str]) -> Option<DiskUsage> {
    let [filesystem, total, used, available, use_percent, mounted_on @ ..] = fields else {
        return None;
    };
    if mounted_on.is_empty() {
        return None;
    }
    Some(DiskUsage {
        filesystem: (*filesystem).to_string(),
        total: unit.to_bytes(total)?,
        used: unit.to_bytes(used)?,
        available: unit.to_bytes(available)?,
        use_percent: use_percent.strip_suffix('%').unwrap_or(*use_percent).parse().ok()?,
        mounted_on: mounted_on.join(" "),
    })
}

/// Parses sizes like `1024`, `1K`, `2.5G` or `1.0Ti` with binary multiples.
fn parse_human_size(value: &str) -> Option<u64> {
    let value = value.trim().trim_end_matches(['i', 'B']);
    let (number, exponent) = match value.char_indices().last()? {
        (index, suffix) if suffix.is_ascii_alphabetic() => {
            let exponent = match suffix.to_ascii_uppercase() {
                'K' => 1,
                'M' => 2,
                'G' => 3,
                'T' => 4,
                'P' => 5,
                'E' => 6,
                _ => return None,
            };
            (&value[..index], exponent)
        }
        _ => (value, 0),
    };
    if number.is_empty() {
        return (exponent > 0).then(|| 1024_u64.pow(exponent));
    }
    if let Ok(number) = number.parse::<u64>() {
        return number.checked_mul(1024_u64.pow(exponent));
    }
    let number = number.parse::<f64>().ok()?;
    if !number.is_finite() || number < 0.0 {
        return None;
    }
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::cast_precision_loss)]
    let bytes = (number * 1024_u64.pow(exponent) as f64).round() as u64;
    Some(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_kilobyte_blocks() {
        let output = "\
Filesystem      1K-blocks      Used  Available Use% Mounted on
u123456        1073741824 268435456  805306368  25% /home
";
        assert_eq!(parse_df_output(output), Some(DiskUsage {
            filesystem: "u123456".to_string(),
            total: 1_099_511_627_776,
            used: 274_877_906_944,
            available: 824_633_720_832,
            use_percent: 25,
            mounted_on: "/home".to_string(),
        }));
    }

    #[test]
    fn test_parse_human_readable() {
        let output = "\
Filesystem      Size  Used Avail Use% Mounted on
u123456         1.0T  256G  768G  25% /home
";
        let usage = parse_df_output(output).unwrap();
        assert_eq!(usage.total, 1024_u64.pow(4));
        assert_eq!(usage.used, 256 * 1024_u64.pow(3));
        assert_eq!(usage.use_percent, 25);
    }

    #[test]
    fn test_parse_wrapped_row() {
        let output = "\
Filesystem                         1K-blocks Used Available Use% Mounted on
//u123456.your-storagebox.de/backup
                                        1000  100       900  10% /mnt/backup dir
";
        let usage = parse_df_output(output).unwrap();
        assert_eq!(usage.filesystem, "//u123456.your-storagebox.de/backup");
        assert_eq!(usage.total, 1_024_000);
        assert_eq!(usage.mounted_on, "/mnt/backup dir");
    }

    #[test]
    fn test_parse_without_data_row() {
        assert_eq!(parse_df_output(""), None);
        assert_eq!(parse_df_output("Filesystem 1K-blocks Used Available Use% Mounted on\n"), None);
        assert_eq!(parse_df_output("command not found\n"), None);
    }

    #[test]
    fn test_parse_human_size() {
        assert_eq!(parse_human_size("0"), Some(0));
        assert_eq!(parse_human_size("1K"), Some(1024));
        assert_eq!(parse_human_size("512"), Some(512));
        assert_eq!(parse_human_size("1.5M"), Some(1_572_864));
        assert_eq!(parse_human_size("2GiB"), Some(2 * 1024_u64.pow(3)));
        assert_eq!(parse_human_size("x"), None);
    }
}
