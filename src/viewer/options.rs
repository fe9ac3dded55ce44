//! Viewer configuration.

use crate::align::AlignOptions;

/// Options for a [`super::ViewerController`].
#[derive(Debug, Clone)]
pub struct ViewerOptions {
    /// Zoom the first page is rendered at
    pub initial_zoom: f32,

    /// Amount `zoom_in`/`zoom_out` add or remove
    pub zoom_step: f32,

    /// Smallest allowed zoom (must be positive)
    pub min_zoom: f32,

    /// Alignment used when resolving table cells
    pub align: AlignOptions,
}

impl ViewerOptions {
    /// Create new viewer options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the initial zoom.
    pub fn with_initial_zoom(mut self, zoom: f32) -> Self {
        self.initial_zoom = zoom;
        self
    }

    /// Set the zoom step.
    pub fn with_zoom_step(mut self, step: f32) -> Self {
        self.zoom_step = step;
        self
    }

    /// Set the minimum zoom.
    pub fn with_min_zoom(mut self, min_zoom: f32) -> Self {
        self.min_zoom = min_zoom;
        self
    }

    /// Set the table alignment options.
    pub fn with_align(mut self, align: AlignOptions) -> Self {
        self.align = align;
        self
    }

    /// Clamp a zoom to the allowed range. Non-finite input falls back to the
    /// initial zoom.
    pub fn clamp_zoom(&self, zoom: f32) -> f32 {
        let floor = if self.min_zoom.is_finite() && self.min_zoom > 0.0 {
            self.min_zoom
        } else {
            f32::MIN_POSITIVE
        };
        if zoom.is_finite() {
            zoom.max(floor)
        } else {
            self.initial_zoom.max(floor)
        }
    }
}

impl Default for ViewerOptions {
    fn default() -> Self {
        Self {
            initial_zoom: 1.5,
            zoom_step: 0.25,
            min_zoom: 0.25,
            align: AlignOptions::default(),
        }
    }
}
