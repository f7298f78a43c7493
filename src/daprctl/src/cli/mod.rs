pub mod commands;
mod handlers;
mod process_command;

pub use handlers::{render_records, OutputFormat};
pub use process_command::process_command;
