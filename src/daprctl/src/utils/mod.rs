mod age;
mod string_utils;

pub use age::format_age;
pub use string_utils::truncate_string;
