//! Boundary to the rendering library.
//!
//! The crate never decodes or rasterizes PDF content itself. A backend turns
//! bytes into a document, a document hands out pages, and a page draws
//! itself into a [`Surface`] for a given [`Viewport`].

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::{CancelSignal, Surface};
use crate::error::Result;
use crate::model::{normalize_rotation, Page};

/// Requested scale and rotation for a viewport.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewportParams {
    /// Zoom factor (1.0 = native size)
    pub scale: f32,
    /// Rotation in degrees
    pub rotation: u16,
}

impl ViewportParams {
    /// Create viewport parameters.
    pub fn new(scale: f32, rotation: u16) -> Self {
        Self { scale, rotation }
    }

    /// Unit scale under the given rotation: the reference frame that
    /// extraction boxes are expressed in.
    pub fn unit(rotation: u16) -> Self {
        Self::new(1.0, rotation)
    }
}

/// Size of a page at a given scale and rotation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    /// Width in pixels
    pub width: f32,
    /// Height in pixels
    pub height: f32,
    /// Scale the viewport was computed for
    pub scale: f32,
    /// Rotation the viewport was computed for
    pub rotation: u16,
}

impl Viewport {
    /// Compute the viewport of a page, swapping axes on quarter turns.
    pub fn for_page(page: &Page, params: ViewportParams) -> Self {
        let rotation = normalize_rotation(i32::from(params.rotation));
        let (width, height) = if rotation % 180 == 90 {
            (page.native_height, page.native_width)
        } else {
            (page.native_width, page.native_height)
        };
        Self {
            width: width * params.scale,
            height: height * params.scale,
            scale: params.scale,
            rotation,
        }
    }
}

/// Result of a render call that did not fault.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderStatus {
    /// The page was fully drawn
    Completed,
    /// The backend observed the cancellation signal and stopped early
    Cancelled,
}

/// Loads documents from raw bytes.
#[async_trait]
pub trait RenderBackend: Send + Sync {
    /// Backend name for diagnostics.
    fn name(&self) -> &str;

    /// Decode a document. Suspends while the file is parsed.
    async fn load_document(&self, bytes: Vec<u8>) -> Result<Arc<dyn RenderDocument>>;
}

/// A loaded, immutable document.
#[async_trait]
pub trait RenderDocument: Send + Sync {
    /// Total number of pages.
    fn page_count(&self) -> u32;

    /// Retrieve a page by one-based number.
    async fn get_page(&self, number: u32) -> Result<Arc<dyn RenderPage>>;
}

/// One renderable page.
#[async_trait]
pub trait RenderPage: Send + Sync {
    /// Index, rotation and native size.
    fn info(&self) -> Page;

    /// Viewport for a scale and rotation.
    fn viewport(&self, params: ViewportParams) -> Viewport {
        Viewport::for_page(&self.info(), params)
    }

    /// Draw into `surface`. Implementations should check `cancel` between
    /// drawing steps and return [`RenderStatus::Cancelled`] once it fires.
    async fn render(
        &self,
        surface: &mut Surface,
        viewport: &Viewport,
        cancel: &CancelSignal,
    ) -> Result<RenderStatus>;
}
