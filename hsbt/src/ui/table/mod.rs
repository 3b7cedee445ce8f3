//! Tables rendered for humans on stdout.

mod connection_list_ext;
mod disk_usage_ext;
mod remote_entry_ext;

pub use self::{
    connection_list_ext::ConnectionListExt, disk_usage_ext::DiskUsageExt,
    remote_entry_ext::RemoteEntryExt,
};

fn new_table() -> comfy_table::Table {
    let mut table = comfy_table::Table::new();
    let _unused = table
        .load_preset(comfy_table::presets::NOTHING)
        .set_content_arrangement(comfy_table::ContentArrangement::Dynamic);
    table
}
