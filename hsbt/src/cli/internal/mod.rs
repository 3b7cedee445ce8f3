//! Helpers shared by the subcommands.

mod connection;
mod output;

pub use self::{
    connection::{ConnectionArgs, ConnectionResolver},
    output::{with_spinner, write_stdout},
};
