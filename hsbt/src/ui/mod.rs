//! Terminal output: tables, pickers, spinners and serialized listings.

pub mod fuzzy_finder;
mod output_format;
mod progress_spinner;
pub mod table;

pub use self::{
    output_format::{OutputFormat, RenderError},
    progress_spinner::ProgressSpinner,
};
