pub mod commands;
pub mod render;
pub mod table;

pub use commands::{parse_command, Command, HELP_TEXT};
pub use render::{render_catalog, render_dashboard};
pub use table::render_table;
