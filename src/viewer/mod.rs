//! Viewer orchestration over the render scheduler and extraction results.

mod controller;
mod id;
mod options;
mod search;

pub use controller::ViewerController;
pub use id::{resolve_box, ElementId};
pub use options::ViewerOptions;
pub use search::{search, PageMatch};
