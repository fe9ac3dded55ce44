//! # pdfspot
//!
//! Core of a PDF viewer that shows a page next to its extracted content and
//! highlights where a clicked element sits on the rendered page.
//!
//! ## Quick Start
//!
//! ```no_run
//! use pdfspot::{align, export, read_extraction_file, DecodeOptions};
//!
//! fn main() -> pdfspot::Result<()> {
//!     let elements = read_extraction_file("response.json", &DecodeOptions::default())?;
//!
//!     for table in elements.iter().filter_map(|e| e.as_table()) {
//!         if let Some(grid) = align::reconstruct(table) {
//!             println!("{}", export::to_markdown(&grid));
//!         }
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - **Table reconstruction**: ragged, positioned rows snapped to a column grid
//! - **Coordinate mapping**: document-space boxes scaled onto the rendered surface
//! - **Render scheduling**: one render in flight, superseded renders cancelled,
//!   stale completions never shown
//! - **Viewer state**: pagination, zoom, element location and page search
//! - **Extraction boundary**: response decoding and word-to-block grouping

pub mod align;
pub mod detect;
pub mod error;
pub mod export;
pub mod extract;
pub mod model;
pub mod render;
pub mod viewer;

// Re-export commonly used types
pub use align::{AlignOptions, CollisionPolicy, TableReconstructor};
pub use detect::{detect_format_from_bytes, detect_format_from_path, is_pdf_bytes, PdfFormat};
pub use error::{Error, Result};
pub use export::JsonFormat;
pub use extract::{
    decode_response, group_words, read_extraction_file, BlockOptions, DecodeOptions, ErrorMode,
    Word,
};
pub use model::{
    AlignedGrid, AlignedRow, BoundingBox, ColumnBoundary, DocumentInfo, ExtractedElement, Field,
    Locatable, Page, Row, Table, TextBlock,
};
pub use render::{
    to_surface_box, CoordinateMapper, Generation, PageRenderScheduler, RenderBackend,
    RenderDocument, RenderOutcome, RenderPage, RenderStatus, Surface, Viewport, ViewportParams,
};
pub use viewer::{ElementId, PageMatch, ViewerController, ViewerOptions};

/// Decode a successful extraction response body with default options.
///
/// # Example
///
/// ```
/// let elements = pdfspot::parse_response(r#"{"extracted_data": [{"text": "Total"}]}"#).unwrap();
/// assert_eq!(elements.len(), 1);
/// ```
pub fn parse_response(body: &str) -> Result<Vec<ExtractedElement>> {
    decode_response(200, body, &DecodeOptions::default())
}

/// Elements of one page (zero-based index), in extraction order.
pub fn page_elements(elements: &[ExtractedElement], page_index: u32) -> Vec<&ExtractedElement> {
    elements
        .iter()
        .filter(|e| e.page_index() == page_index)
        .collect()
}

/// Align every table of a page.
pub fn page_grids<'a>(
    elements: &[&'a ExtractedElement],
    options: &AlignOptions,
) -> Vec<AlignedGrid<'a>> {
    let tables: Vec<&'a Table> = elements.iter().filter_map(|e| e.as_table()).collect();
    TableReconstructor::with_options(options.clone())
        .reconstruct_all(&tables)
        .into_iter()
        .flatten()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_elements() {
        let elements: Vec<ExtractedElement> = vec![
            TextBlock::new("first", 0).into(),
            TextBlock::new("second", 1).into(),
            Table::new(0).into(),
        ];
        assert_eq!(page_elements(&elements, 0).len(), 2);
        assert_eq!(page_elements(&elements, 1).len(), 1);
        assert!(page_elements(&elements, 5).is_empty());
    }

    #[test]
    fn test_page_grids_skips_empty_tables() {
        let elements: Vec<ExtractedElement> = vec![
            Table::new(0).into(),
            Table::new(0)
                .with_row(Row::new(vec![Field::at("A", 0.0, 10.0)]))
                .into(),
        ];
        let refs = page_elements(&elements, 0);
        let grids = page_grids(&refs, &AlignOptions::default());
        assert_eq!(grids.len(), 1);
        assert_eq!(grids[0].column_count(), 1);
    }

    #[test]
    fn test_parse_response_error() {
        let err = parse_response(r#"{"error": "No file uploaded"}"#).unwrap_err();
        assert_eq!(err.to_string(), "No file uploaded");
    }
}
