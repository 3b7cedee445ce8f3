use comfy_table::Cell;
use indicatif::HumanBytes;

use crate::storage_box::DiskUsage;

pub trait DiskUsageExt {
    fn render_table(&self) -> String;
}

impl DiskUsageExt for DiskUsage {
    fn render_table(&self) -> String {
        super::new_table()
            .set_header(vec!["FILESYSTEM", "SIZE", "USED", "AVAILABLE", "USE%", "MOUNTED ON"])
            .add_row([
                Cell::new(&self.filesystem),
                Cell::new(HumanBytes(self.total)),
                Cell::new(HumanBytes(self.used)),
                Cell::new(HumanBytes(self.available)),
                Cell::new(format!("{}%", self.use_percent)),
                Cell::new(&self.mounted_on),
            ])
            .to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_table_with_binary_prefixes() {
        let usage = DiskUsage {
            filesystem: "u1".to_string(),
            total: 1000 * 1024,
            used: 250 * 1024,
            available: 750 * 1024,
            use_percent: 25,
            mounted_on: "/home".to_string(),
        };
        let table = usage.render_table();

        assert!(table.contains("1000.00 KiB"));
        assert!(table.contains("750.00 KiB"));
        assert!(table.contains("25%"));
    }
}
