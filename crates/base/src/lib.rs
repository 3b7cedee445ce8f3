//! Constants and helpers shared by the `hsbt` crates.

pub mod config_file_editor;
pub mod consts;
pub mod paths;

pub use self::config_file_editor::ConfigFileEditor;

pub const PROJECT_NAME: &str = "hsbt";

pub const CLI_PROGRAM_NAME: &str = "hsbt";
pub const CLI_CONFIG_NAME: &str = "config.yaml";
