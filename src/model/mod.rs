//! Data model shared by extraction, table alignment and the viewer.
//!
//! Extraction output is a flat list of [`ExtractedElement`]s, each tagged
//! with the page it came from. Tables hold ragged rows of fields; an
//! [`AlignedGrid`] is the transient, column-aligned view of one table.

mod document;
mod element;
mod geometry;
mod grid;

pub use document::{normalize_rotation, DocumentInfo, Page};
pub use element::{ExtractedElement, Field, Locatable, Row, Table, TextBlock};
pub use geometry::{BoundingBox, ColumnBoundary};
pub(crate) use geometry::BoxRepr;
pub use grid::{AlignedGrid, AlignedRow};
