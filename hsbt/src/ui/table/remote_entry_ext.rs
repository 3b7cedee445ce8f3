use comfy_table::{Cell, CellAlignment};

use crate::storage_box::RemoteEntry;

pub trait RemoteEntryExt {
    fn render_table(&self) -> String;
}

impl RemoteEntryExt for [RemoteEntry] {
    fn render_table(&self) -> String {
        let rows = self
            .iter()
            .map(|entry| {
                let name = match &entry.link_target {
                    Some(target) => format!("{} -> {target}", entry.name),
                    None => entry.name.clone(),
                };
                [
                    Cell::new(entry.kind.as_str()),
                    Cell::new(&entry.permissions),
                    Cell::new(&entry.owner),
                    Cell::new(&entry.group),
                    Cell::new(entry.size).set_alignment(CellAlignment::Right),
                    Cell::new(&entry.modified),
                    Cell::new(name),
                ]
            })
            .collect::<Vec<_>>();

        super::new_table()
            .set_header(vec!["TYPE", "PERMISSIONS", "OWNER", "GROUP", "SIZE", "MODIFIED", "NAME"])
            .add_rows(rows)
            .to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage_box::parse_ls_output;

    #[test]
    fn test_render_table() {
        let entries = parse_ls_output(
            "total 4\n\
             drwxr-xr-x 2 u1 u1 4096 Jan 10 12:00 backups\n\
             lrwxrwxrwx 1 u1 u1    7 Jan 10 12:00 latest -> backups\n",
        );
        let table = entries.render_table();

        assert!(table.contains("TYPE"));
        assert!(table.contains("directory"));
        assert!(table.contains("latest -> backups"));
    }
}
