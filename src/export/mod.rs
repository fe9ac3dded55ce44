//! Output of extraction results as Markdown and JSON.

mod json;
mod markdown;

pub use json::{to_json, JsonFormat};
pub use markdown::{page_to_markdown, to_markdown};
