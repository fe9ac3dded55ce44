//! Mapping from document space to surface pixels.
//!
//! Extraction boxes are expressed at unit scale. The rendered surface is the
//! same page at the current zoom, so a single uniform factor
//! `surface_width / reference_width` carries a box onto the surface. Both
//! widths must come from viewports sharing the page's own rotation.

use super::CommittedRender;
use crate::model::BoundingBox;

/// Scale a document-space box onto a surface.
///
/// Returns `None` when the reference width is not a positive finite number.
pub fn to_surface_box(
    bbox: &BoundingBox,
    reference_width: f32,
    surface_width: f32,
) -> Option<BoundingBox> {
    if !(reference_width.is_finite() && reference_width > 0.0) || !surface_width.is_finite() {
        return None;
    }
    Some(bbox.scale(surface_width / reference_width))
}

/// Pure mapper over the currently committed render.
#[derive(Debug, Clone, Copy, Default)]
pub struct CoordinateMapper;

impl CoordinateMapper {
    /// Map a box using a committed render's reference viewport and surface.
    ///
    /// Returns `None` while nothing has been committed yet.
    pub fn map(committed: Option<&CommittedRender>, bbox: &BoundingBox) -> Option<BoundingBox> {
        let committed = committed?;
        to_surface_box(
            bbox,
            committed.reference.width,
            committed.surface.width() as f32,
        )
    }
}
