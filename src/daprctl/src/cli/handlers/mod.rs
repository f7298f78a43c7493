mod list;
mod subscribe;

pub use list::{render_records, OutputFormat};
pub(super) use list::list;
pub(super) use subscribe::subscribe;
