//! Document- and page-level types.

use serde::{Deserialize, Serialize};

/// Geometry of a single page as reported by the rendering library.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Page {
    /// Page index (0-indexed)
    pub index: u32,

    /// Page rotation in degrees (0, 90, 180, 270)
    pub rotation: u16,

    /// Unrotated page width in points (1 point = 1/72 inch)
    pub native_width: f32,

    /// Unrotated page height in points
    pub native_height: f32,
}

impl Page {
    /// Create a new unrotated page with the given dimensions.
    pub fn new(index: u32, native_width: f32, native_height: f32) -> Self {
        Self {
            index,
            rotation: 0,
            native_width,
            native_height,
        }
    }

    /// Create a new page with standard Letter size (8.5 x 11 inches).
    pub fn letter(index: u32) -> Self {
        Self::new(index, 612.0, 792.0)
    }

    /// Create a new page with standard A4 size (210 x 297 mm).
    pub fn a4(index: u32) -> Self {
        Self::new(index, 595.0, 842.0)
    }

    /// Set the rotation, normalized to a multiple of 90 in `0..360`.
    pub fn with_rotation(mut self, degrees: i32) -> Self {
        self.rotation = normalize_rotation(degrees);
        self
    }

    /// One-based page number.
    pub fn number(&self) -> u32 {
        self.index + 1
    }

    /// Whether the rotation swaps width and height.
    pub fn is_quarter_turned(&self) -> bool {
        self.rotation % 180 == 90
    }

    /// Page dimensions as displayed, after applying the rotation.
    pub fn rotated_dimensions(&self) -> (f32, f32) {
        if self.is_quarter_turned() {
            (self.native_height, self.native_width)
        } else {
            (self.native_width, self.native_height)
        }
    }
}

/// Normalize any rotation in degrees to 0, 90, 180 or 270.
pub fn normalize_rotation(degrees: i32) -> u16 {
    let snapped = ((degrees as f32 / 90.0).round() as i32) * 90;
    snapped.rem_euclid(360) as u16
}

/// Facts about a loaded document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentInfo {
    /// PDF version from the file header (e.g., "1.7")
    pub pdf_version: String,

    /// Total number of pages
    pub page_count: u32,

    /// Name of the source file, when known
    pub file_name: Option<String>,
}

impl DocumentInfo {
    /// Create document info.
    pub fn new(pdf_version: impl Into<String>, page_count: u32) -> Self {
        Self {
            pdf_version: pdf_version.into(),
            page_count,
            file_name: None,
        }
    }

    /// Check if the document has any pages.
    pub fn is_empty(&self) -> bool {
        self.page_count == 0
    }
}
