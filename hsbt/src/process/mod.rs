//! Invocation of the external tools `hsbt` orchestrates.
//!
//! Commands are never passed through a shell. Pipes and redirections are
//! expressed with [`Invocation::stdin`] and by handling [`Output::stdout`] in
//! Rust.

mod error;
mod invocation;
mod runner;
#[cfg(test)]
pub mod testing;

pub use self::{
    error::Error,
    invocation::{Invocation, Output},
    runner::{ProcessRunner, SystemRunner},
};
