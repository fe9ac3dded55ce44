//! Pixel surface a page is drawn into.

use super::Viewport;
use crate::error::{Error, Result};

/// Bytes per RGBA pixel.
const BYTES_PER_PIXEL: usize = 4;

/// Largest surface accepted, in pixels (a 16384 x 16384 canvas).
pub const MAX_SURFACE_PIXELS: usize = 16384 * 16384;

/// An RGBA pixel buffer sized for one viewport.
#[derive(Clone, PartialEq, Eq)]
pub struct Surface {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl Surface {
    /// Create a blank surface.
    ///
    /// Fails with [`Error::Render`] when the surface is larger than
    /// [`MAX_SURFACE_PIXELS`] or its buffer cannot be allocated.
    pub fn new(width: u32, height: u32) -> Result<Self> {
        let too_large =
            || Error::Render(format!("surface of {}x{} pixels is too large", width, height));

        let pixels = (width as usize)
            .checked_mul(height as usize)
            .filter(|&n| n <= MAX_SURFACE_PIXELS)
            .ok_or_else(too_large)?;
        let len = pixels.checked_mul(BYTES_PER_PIXEL).ok_or_else(too_large)?;

        let mut buffer = Vec::new();
        buffer.try_reserve_exact(len).map_err(|e| {
            Error::Render(format!(
                "cannot allocate {}x{} surface: {}",
                width, height, e
            ))
        })?;
        buffer.resize(len, 0);

        Ok(Self {
            width,
            height,
            pixels: buffer,
        })
    }

    /// Create a surface for a viewport, truncating to whole pixels the way a
    /// canvas does when its size is set from a fractional viewport.
    pub fn for_viewport(viewport: &Viewport) -> Result<Self> {
        Self::new(to_pixels(viewport.width), to_pixels(viewport.height))
    }

    /// Width in pixels.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Raw RGBA bytes, row-major.
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    /// Mutable RGBA bytes for backends to draw into.
    pub fn pixels_mut(&mut self) -> &mut [u8] {
        &mut self.pixels
    }

    /// Fill the whole surface with one color.
    pub fn fill(&mut self, rgba: [u8; 4]) {
        for px in self.pixels.chunks_exact_mut(BYTES_PER_PIXEL) {
            px.copy_from_slice(&rgba);
        }
    }

    /// Check if the surface has no pixels.
    pub fn is_empty(&self) -> bool {
        self.pixels.is_empty()
    }
}

impl std::fmt::Debug for Surface {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Surface")
            .field("width", &self.width)
            .field("height", &self.height)
            .finish()
    }
}

fn to_pixels(v: f32) -> u32 {
    if v.is_finite() && v > 0.0 {
        v as u32
    } else {
        0
    }
}
