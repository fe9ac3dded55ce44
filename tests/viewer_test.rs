//! Integration tests for the viewer controller.

use std::sync::Arc;

use async_trait::async_trait;

use pdfspot::error::{Error, Result};
use pdfspot::render::{
    CancelSignal, RenderBackend, RenderDocument, RenderPage, RenderStatus, Surface, Viewport,
};
use pdfspot::{
    parse_response, BoundingBox, ElementId, ExtractedElement, Field, Page, Row, Table, TextBlock,
    ViewerController, ViewerOptions,
};

const PDF: &[u8] = b"%PDF-1.7\n%\xe2\xe3\xcf\xd3\n1 0 obj\n";

/// Backend with fixed-size pages; optionally refuses to load or breaks a page.
struct MockBackend {
    pages: u32,
    fail_load: bool,
    broken_page: Option<u32>,
}

impl MockBackend {
    fn new(pages: u32) -> Self {
        Self {
            pages,
            fail_load: false,
            broken_page: None,
        }
    }
}

struct MockDocument {
    pages: u32,
    broken_page: Option<u32>,
}

struct MockPage {
    info: Page,
    broken: bool,
}

#[async_trait]
impl RenderBackend for MockBackend {
    fn name(&self) -> &str {
        "mock"
    }

    async fn load_document(&self, _bytes: Vec<u8>) -> Result<Arc<dyn RenderDocument>> {
        if self.fail_load {
            return Err(Error::Other("broken xref table".to_string()));
        }
        Ok(Arc::new(MockDocument {
            pages: self.pages,
            broken_page: self.broken_page,
        }))
    }
}

#[async_trait]
impl RenderDocument for MockDocument {
    fn page_count(&self) -> u32 {
        self.pages
    }

    async fn get_page(&self, number: u32) -> Result<Arc<dyn RenderPage>> {
        Ok(Arc::new(MockPage {
            info: Page::new(number - 1, 200.0, 100.0),
            broken: self.broken_page == Some(number),
        }))
    }
}

#[async_trait]
impl RenderPage for MockPage {
    fn info(&self) -> Page {
        self.info
    }

    async fn render(
        &self,
        surface: &mut Surface,
        _viewport: &Viewport,
        _cancel: &CancelSignal,
    ) -> Result<RenderStatus> {
        if self.broken {
            return Err(Error::Render("cannot decode page".to_string()));
        }
        surface.fill([255, 255, 255, 255]);
        Ok(RenderStatus::Completed)
    }
}

fn invoice_elements() -> Vec<ExtractedElement> {
    vec![
        TextBlock::new("Invoice 42", 0)
            .with_bbox(BoundingBox::new(100.0, 50.0, 20.0, 10.0))
            .into(),
        Table::new(0)
            .with_bbox(BoundingBox::new(10.0, 60.0, 180.0, 30.0))
            .with_row(Row::new(vec![
                Field::with_box("Item", BoundingBox::new(10.0, 60.0, 40.0, 8.0)),
                Field::with_box("Price", BoundingBox::new(120.0, 60.0, 30.0, 8.0)),
            ]))
            .with_row(
                Row::new(vec![Field::with_box(
                    "9.50",
                    BoundingBox::new(122.0, 70.0, 20.0, 8.0),
                )])
                .with_bbox(BoundingBox::new(10.0, 70.0, 180.0, 8.0)),
            )
            .into(),
        TextBlock::new("Unplaced summary", 0).into(),
        TextBlock::new("Terms", 2)
            .with_bbox(BoundingBox::new(10.0, 10.0, 50.0, 5.0))
            .into(),
    ]
}

async fn open_viewer(backend: &MockBackend, zoom: f32) -> ViewerController {
    let options = ViewerOptions::new().with_initial_zoom(zoom);
    ViewerController::open(backend, PDF.to_vec(), invoice_elements(), options)
        .await
        .unwrap()
}

#[tokio::test]
async fn test_open_input_errors() {
    let backend = MockBackend::new(1);

    let err = ViewerController::open(&backend, Vec::new(), Vec::new(), ViewerOptions::new())
        .await
        .unwrap_err();
    assert!(matches!(err, Error::EmptyInput));
    assert_eq!(err.to_string(), "Please select a file first.");

    let err = ViewerController::open(
        &backend,
        b"PK\x03\x04 not a pdf".to_vec(),
        Vec::new(),
        ViewerOptions::new(),
    )
    .await
    .unwrap_err();
    assert!(matches!(err, Error::UnknownFormat));

    let broken = MockBackend {
        fail_load: true,
        ..MockBackend::new(1)
    };
    let err = ViewerController::open(&broken, PDF.to_vec(), Vec::new(), ViewerOptions::new())
        .await
        .unwrap_err();
    assert!(matches!(err, Error::DocumentLoad(ref m) if m.contains("broken xref table")));

    let empty = MockBackend::new(0);
    let err = ViewerController::open(&empty, PDF.to_vec(), Vec::new(), ViewerOptions::new())
        .await
        .unwrap_err();
    assert!(matches!(err, Error::DocumentLoad(_)));
}

#[tokio::test]
async fn test_open_renders_first_page() {
    let backend = MockBackend::new(3);
    let mut viewer = open_viewer(&backend, 1.5).await.with_file_name("invoice.pdf");

    assert_eq!(viewer.current_page(), 1);
    assert_eq!(viewer.zoom(), 1.5);
    assert_eq!(viewer.page_count(), 3);
    assert_eq!(viewer.document_info().pdf_version, "1.7");
    assert_eq!(
        viewer.document_info().file_name.as_deref(),
        Some("invoice.pdf")
    );

    let outcomes = viewer.settle().await;
    assert!(outcomes[0].is_committed());
    assert_eq!(viewer.committed().unwrap().surface.width(), 300);
}

#[tokio::test]
async fn test_locate_scales_to_surface() {
    let backend = MockBackend::new(3);
    let mut viewer = open_viewer(&backend, 2.0).await;
    viewer.settle().await;

    let highlight = viewer.locate(ElementId::Text(0));
    assert_eq!(highlight, Some(BoundingBox::new(200.0, 100.0, 40.0, 20.0)));
    assert_eq!(viewer.highlight(), highlight);
    assert_eq!(viewer.active(), Some(ElementId::Text(0)));
}

#[tokio::test]
async fn test_locate_before_render_is_ignored() {
    let backend = MockBackend::new(3);
    let mut viewer = open_viewer(&backend, 2.0).await;

    assert!(viewer.locate(ElementId::Text(0)).is_none());
    assert!(viewer.highlight().is_none());
    assert!(viewer.last_error().is_none());
}

#[tokio::test]
async fn test_locate_without_box_is_noop() {
    let backend = MockBackend::new(3);
    let mut viewer = open_viewer(&backend, 1.0).await;
    viewer.settle().await;

    assert!(viewer.locate(ElementId::Text(2)).is_none());
    assert!(viewer.active().is_none());

    assert!(viewer.locate_box(ElementId::Text(2), None).is_none());
    assert!(viewer.active().is_none());
}

#[tokio::test]
async fn test_locate_table_parts() {
    let backend = MockBackend::new(3);
    let mut viewer = open_viewer(&backend, 1.0).await;
    viewer.settle().await;

    assert_eq!(
        viewer.locate(ElementId::Table(1)),
        Some(BoundingBox::new(10.0, 60.0, 180.0, 30.0))
    );
    assert_eq!(
        viewer.locate(ElementId::HeaderCell { table: 1, column: 1 }),
        Some(BoundingBox::new(120.0, 60.0, 30.0, 8.0))
    );
    assert_eq!(
        viewer.locate(ElementId::Row { table: 1, row: 0 }),
        Some(BoundingBox::new(10.0, 70.0, 180.0, 8.0))
    );
    assert_eq!(
        viewer.locate(ElementId::Cell {
            table: 1,
            row: 0,
            column: 1
        }),
        Some(BoundingBox::new(122.0, 70.0, 20.0, 8.0))
    );
    assert!(viewer
        .locate(ElementId::Cell {
            table: 1,
            row: 0,
            column: 0
        })
        .is_none());
}

#[tokio::test]
async fn test_rerender_clears_highlight() {
    let backend = MockBackend::new(3);
    let mut viewer = open_viewer(&backend, 2.0).await;
    viewer.settle().await;
    viewer.locate(ElementId::Text(0)).unwrap();

    assert!(viewer.zoom_in());
    assert!(viewer.highlight().is_none());
    viewer.settle().await;
    assert!(viewer.highlight().is_none());

    // 200 * 2.25 = 450 pixels wide
    let highlight = viewer.locate(ElementId::Text(0)).unwrap();
    assert_eq!(highlight.left, 225.0);
    assert_eq!(highlight.width, 45.0);
}

#[tokio::test]
async fn test_empty_page_is_a_valid_state() {
    let backend = MockBackend::new(3);
    let mut viewer = open_viewer(&backend, 1.0).await;

    assert!(viewer.set_page(2));
    viewer.settle().await;

    assert!(!viewer.has_page_content());
    assert!(viewer.current_page_elements().is_empty());
    assert!(viewer.search("").is_empty());
    assert!(viewer.search("invoice").is_empty());
    assert!(viewer.locate(ElementId::Text(0)).is_none());
    assert!(viewer.last_error().is_none());

    assert!(viewer.next_page());
    viewer.settle().await;
    assert!(viewer.has_page_content());
    assert_eq!(viewer.current_page_elements()[0].plain_text(), "Terms");
}

#[tokio::test]
async fn test_navigation_and_zoom_are_clamped() {
    let backend = MockBackend::new(3);
    let mut viewer = open_viewer(&backend, 0.5).await;

    assert!(!viewer.set_page(0));
    assert!(!viewer.prev_page());
    assert_eq!(viewer.current_page(), 1);

    assert!(viewer.set_page(99));
    assert_eq!(viewer.current_page(), 3);
    assert!(!viewer.next_page());

    assert!(viewer.zoom_out());
    assert_eq!(viewer.zoom(), 0.25);
    assert!(!viewer.zoom_out());
    assert!(!viewer.set_zoom(-4.0));
    assert_eq!(viewer.zoom(), 0.25);

    let outcomes = viewer.settle().await;
    assert!(outcomes.iter().all(|o| !o.is_failure()));
    let committed = viewer.committed().unwrap();
    assert_eq!(committed.target.page, 3);
    assert_eq!(committed.target.zoom, 0.25);
}

#[tokio::test]
async fn test_page_change_resets_active_element() {
    let backend = MockBackend::new(3);
    let mut viewer = open_viewer(&backend, 1.0).await;
    viewer.settle().await;
    viewer.locate(ElementId::Text(0)).unwrap();

    viewer.set_page(3);
    assert!(viewer.active().is_none());
    // The committed surface still shows page 1
    assert!(viewer.locate(ElementId::Text(0)).is_none());

    viewer.settle().await;
    assert_eq!(
        viewer.locate(ElementId::Text(0)),
        Some(BoundingBox::new(10.0, 10.0, 50.0, 5.0))
    );
}

#[tokio::test]
async fn test_render_fault_keeps_viewer_usable() {
    let backend = MockBackend {
        broken_page: Some(2),
        ..MockBackend::new(3)
    };
    let mut viewer = open_viewer(&backend, 1.0).await;
    viewer.settle().await;

    viewer.next_page();
    let outcomes = viewer.settle().await;
    assert!(outcomes[0].is_failure());
    assert!(viewer.last_error().unwrap().contains("cannot decode page"));
    assert_eq!(viewer.committed().unwrap().target.page, 1);

    // Back on the page that is still shown
    assert_eq!(viewer.current_page(), 1);
    assert_eq!(viewer.current_page_elements().len(), 3);
    assert_eq!(
        viewer.locate(ElementId::Text(0)),
        Some(BoundingBox::new(100.0, 50.0, 20.0, 10.0))
    );

    viewer.set_page(3);
    viewer.settle().await;
    assert!(viewer.last_error().is_none());
    assert_eq!(viewer.current_page(), 3);
    assert_eq!(viewer.committed().unwrap().target.page, 3);
}

#[tokio::test]
async fn test_oversized_zoom_falls_back_to_shown_zoom() {
    let backend = MockBackend::new(1);
    let mut viewer = open_viewer(&backend, 2.0).await;
    viewer.settle().await;

    assert!(viewer.set_zoom(100000.0));
    let outcomes = viewer.settle().await;
    assert!(outcomes[0].is_failure());
    assert!(viewer.last_error().unwrap().contains("too large"));
    assert_eq!(viewer.zoom(), 2.0);
    assert_eq!(
        viewer.locate(ElementId::Text(0)),
        Some(BoundingBox::new(200.0, 100.0, 40.0, 20.0))
    );

    assert!(viewer.zoom_in());
    viewer.settle().await;
    assert_eq!(viewer.zoom(), 2.25);
    assert!(viewer.last_error().is_none());
}

#[tokio::test]
async fn test_search_keeps_stable_ids() {
    let backend = MockBackend::new(3);
    let viewer = open_viewer(&backend, 1.0).await;

    let hits = viewer.search("9.5");
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].id(), ElementId::Table(1));
    assert_eq!(hits[0].rows, Some(vec![0]));

    let hits = viewer.search("SUMMARY");
    assert_eq!(hits[0].id(), ElementId::Text(2));
}

#[tokio::test]
async fn test_open_with_decoded_response() {
    let body = r#"{"extracted_data": {
        "1": [
            {"text": "Invoice", "bbox": [100, 50, 20, 10]},
            {"type": "table", "rows": [
                {"fields": [
                    {"text": "A", "bbox": [0, 0, 10, 5]},
                    {"text": "B", "bbox": [50, 0, 10, 5]}
                ]},
                {"fields": [{"text": "A1", "bbox": [1, 6, 9, 5]}]}
            ]}
        ]
    }}"#;
    let elements = parse_response(body).unwrap();

    let backend = MockBackend::new(1);
    let options = ViewerOptions::new().with_initial_zoom(2.0);
    let mut viewer = ViewerController::open(&backend, PDF.to_vec(), elements, options)
        .await
        .unwrap();
    viewer.settle().await;

    assert_eq!(
        viewer.locate(ElementId::Text(0)),
        Some(BoundingBox::new(200.0, 100.0, 40.0, 20.0))
    );
    assert_eq!(
        viewer.locate(ElementId::Cell {
            table: 1,
            row: 0,
            column: 0
        }),
        Some(BoundingBox::new(2.0, 12.0, 18.0, 10.0))
    );
}
