//! Interactive pickers built on `skim`.

mod connection_list;

/// Separates the columns of a picker line.
pub const COLUMN_SEPARATOR: &str = "\t";

pub use self::connection_list::ConnectionListExt;
