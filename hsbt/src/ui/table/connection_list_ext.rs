use comfy_table::Cell;

use crate::connection::ConnectionList;

pub trait ConnectionListExt {
    fn render_table(&self) -> String;
}

impl ConnectionListExt for ConnectionList {
    fn render_table(&self) -> String {
        let rows = self
            .iter()
            .map(|connection| {
                [
                    Cell::new(&connection.identifier),
                    Cell::new(&connection.user),
                    Cell::new(&connection.host),
                    Cell::new(&connection.remote_base_path),
                    Cell::new(connection.key_dir.display()),
                ]
            })
            .collect::<Vec<_>>();

        super::new_table()
            .set_header(vec!["IDENTIFIER", "USER", "HOST", "REMOTE BASE PATH", "KEY DIRECTORY"])
            .add_rows(rows)
            .to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connection::Connection;

    #[test]
    fn test_render_table() {
        let mut list = ConnectionList::default();
        list.set_connection(
            Connection::new("backup", "u1.your-storagebox.de", "u1", "~/.ssh").unwrap(),
            false,
            false,
        )
        .unwrap();

        let table = list.render_table();
        let row = table.lines().find(|line| line.contains("backup")).unwrap();
        assert!(table.lines().next().unwrap().contains("IDENTIFIER"));
        assert!(row.contains("u1.your-storagebox.de"));
        assert!(row.contains("~/.ssh"));
    }
}
