//! Page rendering: backend boundary, scheduling and coordinate mapping.

mod backend;
mod cancel;
mod mapper;
mod scheduler;
mod surface;

pub use backend::{
    RenderBackend, RenderDocument, RenderPage, RenderStatus, Viewport, ViewportParams,
};
pub use cancel::{cancel_pair, CancelHandle, CancelSignal};
pub use mapper::{to_surface_box, CoordinateMapper};
pub use scheduler::{
    CommittedRender, Generation, PageRenderScheduler, RenderOutcome, RenderTarget,
    SchedulerState,
};
pub use surface::{Surface, MAX_SURFACE_PIXELS};
