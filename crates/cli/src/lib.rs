//! Shared plumbing of the `hsbt` command-line interface.

pub mod config;
