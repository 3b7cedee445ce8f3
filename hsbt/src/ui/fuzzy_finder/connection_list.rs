use std::{borrow::Cow, sync::Arc};

use skim::{
    Skim, SkimItem, SkimItemReceiver, SkimItemSender,
    prelude::{SkimOptionsBuilder, unbounded},
};

use crate::{
    connection::{Connection, ConnectionList},
    ui::fuzzy_finder::COLUMN_SEPARATOR,
};

pub trait ConnectionListExt {
    fn items(&self) -> Vec<Arc<dyn SkimItem>>;

    /// Lets the user pick a connection. `None` if the list is empty or the
    /// picker was aborted.
    fn select_connection_identifier(&self) -> Option<String> {
        let items = self.items();
        if items.is_empty() {
            return None;
        }

        let (tx_item, rx_item): (SkimItemSender, SkimItemReceiver) = unbounded();
        for item in items {
            drop(tx_item.send(item));
        }
        drop(tx_item);

        let options = SkimOptionsBuilder::default()
            .height("40%".to_string())
            .multi(false)
            .build()
            .ok()?;

        let out = Skim::run_with(&options, Some(rx_item))?;
        if out.is_abort {
            return None;
        }
        out.selected_items.first().map(|item| item.output().to_string())
    }
}

impl ConnectionListExt for ConnectionList {
    fn items(&self) -> Vec<Arc<dyn SkimItem>> {
        self.iter()
            .map(|connection| -> Arc<dyn SkimItem> {
                Arc::new(ConnectionSkimItem::from(connection.clone()))
            })
            .collect()
    }
}

pub struct ConnectionSkimItem(Connection);

impl From<Connection> for ConnectionSkimItem {
    fn from(value: Connection) -> Self { Self(value) }
}

impl SkimItem for ConnectionSkimItem {
    fn text(&self) -> Cow<'_, str> { connection_line(&self.0).into() }

    fn output(&self) -> Cow<'_, str> { Cow::Borrowed(&self.0.identifier) }

    fn display<'a>(&'a self, _context: skim::DisplayContext<'a>) -> skim::AnsiString<'a> {
        skim::AnsiString::from(connection_line(&self.0))
    }
}

fn connection_line(connection: &Connection) -> String {
    let Connection { identifier, host, user, remote_base_path, .. } = connection;
    format!("{identifier}{COLUMN_SEPARATOR}{user}@{host}{COLUMN_SEPARATOR}{remote_base_path}")
}
