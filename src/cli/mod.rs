mod commands;
mod handlers;

pub use commands::{Cli, Commands};
pub use handlers::{
    handle_delete, handle_edit, handle_export, handle_export_all, handle_init, handle_links,
    handle_list, handle_new, handle_render, handle_show, handle_stats,
};
