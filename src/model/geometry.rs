//! Bounding-box and column geometry shared by extraction, alignment and rendering.

use serde::{Deserialize, Serialize};

/// Axis-aligned rectangle in the document's native coordinate space.
///
/// Serialized as `[left, top, width, height]`. Deserialization also accepts
/// the object form `{left, top, width, height}` and rejects negative or
/// non-finite extents.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "BoxRepr", into = "[f32; 4]")]
pub struct BoundingBox {
    /// Left edge
    pub left: f32,
    /// Top edge
    pub top: f32,
    /// Width (never negative)
    pub width: f32,
    /// Height (never negative)
    pub height: f32,
}

impl BoundingBox {
    /// Create a box from its left/top corner and extent.
    pub fn new(left: f32, top: f32, width: f32, height: f32) -> Self {
        debug_assert!(width >= 0.0 && height >= 0.0, "negative box extent");
        Self {
            left,
            top,
            width,
            height,
        }
    }

    /// Create a box, returning `None` if any value is non-finite or the
    /// extent is negative.
    pub fn try_new(left: f32, top: f32, width: f32, height: f32) -> Option<Self> {
        let finite = [left, top, width, height].iter().all(|v| v.is_finite());
        if finite && width >= 0.0 && height >= 0.0 {
            Some(Self {
                left,
                top,
                width,
                height,
            })
        } else {
            None
        }
    }

    /// Create a box from two corners, in any order.
    pub fn from_corners(x0: f32, y0: f32, x1: f32, y1: f32) -> Self {
        let left = x0.min(x1);
        let top = y0.min(y1);
        Self::new(left, top, (x1 - x0).abs(), (y1 - y0).abs())
    }

    /// Right edge.
    pub fn right(&self) -> f32 {
        self.left + self.width
    }

    /// Bottom edge.
    pub fn bottom(&self) -> f32 {
        self.top + self.height
    }

    /// Horizontal midpoint.
    pub fn center_x(&self) -> f32 {
        self.left + self.width / 2.0
    }

    /// Horizontal extent as a column boundary.
    pub fn horizontal_span(&self) -> ColumnBoundary {
        ColumnBoundary::new(self.left, self.right())
    }

    /// Scale every component uniformly.
    pub fn scale(&self, factor: f32) -> Self {
        Self {
            left: self.left * factor,
            top: self.top * factor,
            width: self.width * factor,
            height: self.height * factor,
        }
    }

    /// Smallest box containing both boxes.
    pub fn union(&self, other: &BoundingBox) -> Self {
        Self::from_corners(
            self.left.min(other.left),
            self.top.min(other.top),
            self.right().max(other.right()),
            self.bottom().max(other.bottom()),
        )
    }
}

impl From<BoundingBox> for [f32; 4] {
    fn from(b: BoundingBox) -> Self {
        [b.left, b.top, b.width, b.height]
    }
}

/// Accepted wire shapes for a bounding box.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(untagged)]
pub(crate) enum BoxRepr {
    Array([f32; 4]),
    Object {
        left: f32,
        top: f32,
        width: f32,
        height: f32,
    },
}

impl BoxRepr {
    pub(crate) fn parts(self) -> [f32; 4] {
        match self {
            BoxRepr::Array(parts) => parts,
            BoxRepr::Object {
                left,
                top,
                width,
                height,
            } => [left, top, width, height],
        }
    }
}

impl TryFrom<BoxRepr> for BoundingBox {
    type Error = String;

    fn try_from(repr: BoxRepr) -> Result<Self, Self::Error> {
        let [left, top, width, height] = repr.parts();
        BoundingBox::try_new(left, top, width, height).ok_or_else(|| {
            format!(
                "invalid bounding box [{}, {}, {}, {}]",
                left, top, width, height
            )
        })
    }
}

/// Horizontal interval `[start, end]` defining one table column.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ColumnBoundary {
    /// Left edge of the column
    pub start: f32,
    /// Right edge of the column
    pub end: f32,
}

impl ColumnBoundary {
    /// Create a new boundary.
    pub fn new(start: f32, end: f32) -> Self {
        Self { start, end }
    }

    /// Column midpoint, the anchor fields are measured against.
    pub fn midpoint(&self) -> f32 {
        (self.start + self.end) / 2.0
    }

    /// Column width.
    pub fn width(&self) -> f32 {
        self.end - self.start
    }
}
