//! Viewer state: current page, zoom, active element and highlight.

use crate::detect::validate_input;
use crate::error::{Error, Result};
use crate::model::{BoundingBox, DocumentInfo, ExtractedElement};
use crate::render::{
    CommittedRender, CoordinateMapper, PageRenderScheduler, RenderBackend, RenderOutcome,
    SchedulerState,
};

use super::{resolve_box, search, ElementId, PageMatch, ViewerOptions};

/// One open document with its extraction results.
///
/// All mutation goes through `&mut self`; render completions are applied
/// with [`ViewerController::poll_renders`], [`ViewerController::next_outcome`]
/// or [`ViewerController::settle`].
pub struct ViewerController {
    scheduler: PageRenderScheduler,
    elements: Vec<ExtractedElement>,
    info: DocumentInfo,
    options: ViewerOptions,
    current_page: u32,
    zoom: f32,
    highlight: Option<BoundingBox>,
    active: Option<ElementId>,
    last_error: Option<String>,
}

impl ViewerController {
    /// Validate and load a document, then request the first page.
    ///
    /// Input errors are reported before the backend is involved. Must be
    /// called from within a Tokio runtime.
    pub async fn open(
        backend: &dyn RenderBackend,
        bytes: Vec<u8>,
        elements: Vec<ExtractedElement>,
        options: ViewerOptions,
    ) -> Result<Self> {
        let format = validate_input(&bytes)?;

        let document = backend.load_document(bytes).await.map_err(|e| match e {
            Error::DocumentLoad(_) => e,
            other => Error::DocumentLoad(other.to_string()),
        })?;

        let page_count = document.page_count();
        if page_count == 0 {
            return Err(Error::DocumentLoad("document has no pages".to_string()));
        }
        log::debug!(
            "Viewer: opened PDF {} with {} pages via {}",
            format.version,
            page_count,
            backend.name()
        );

        let zoom = options.clamp_zoom(options.initial_zoom);
        let mut scheduler = PageRenderScheduler::new(document);
        scheduler.request(1, zoom)?;

        Ok(Self {
            scheduler,
            elements,
            info: DocumentInfo::new(format.version, page_count),
            options,
            current_page: 1,
            zoom,
            highlight: None,
            active: None,
            last_error: None,
        })
    }

    /// Attach the source file name to the document info.
    pub fn with_file_name(mut self, name: impl Into<String>) -> Self {
        self.info.file_name = Some(name.into());
        self
    }

    /// Go to page `page`, clamped to the document. Returns whether a new
    /// render was requested.
    pub fn set_page(&mut self, page: u32) -> bool {
        let page = page.clamp(1, self.page_count());
        if page == self.current_page {
            return false;
        }
        self.current_page = page;
        // ids are relative to the page
        self.active = None;
        self.request_render();
        true
    }

    /// Go to the next page, if any.
    pub fn next_page(&mut self) -> bool {
        self.set_page(self.current_page.saturating_add(1))
    }

    /// Go to the previous page, if any.
    pub fn prev_page(&mut self) -> bool {
        self.set_page(self.current_page.saturating_sub(1))
    }

    /// Change the zoom, clamped to the minimum. Returns whether a new render
    /// was requested.
    pub fn set_zoom(&mut self, zoom: f32) -> bool {
        let zoom = self.options.clamp_zoom(zoom);
        if zoom == self.zoom {
            return false;
        }
        self.zoom = zoom;
        self.request_render();
        true
    }

    /// Zoom in by one step.
    pub fn zoom_in(&mut self) -> bool {
        self.set_zoom(self.zoom + self.options.zoom_step)
    }

    /// Zoom out by one step.
    pub fn zoom_out(&mut self) -> bool {
        self.set_zoom(self.zoom - self.options.zoom_step)
    }

    /// Locate an item of the current page and highlight it.
    pub fn locate(&mut self, id: ElementId) -> Option<BoundingBox> {
        let bbox = resolve_box(&self.current_page_elements(), id, &self.options.align);
        self.locate_box(id, bbox)
    }

    /// Highlight `bbox` for `id`.
    ///
    /// Without a box nothing happens. Otherwise `id` becomes active, and the
    /// box is mapped onto the surface if the current page has been rendered;
    /// before that the call is silently ignored.
    pub fn locate_box(&mut self, id: ElementId, bbox: Option<BoundingBox>) -> Option<BoundingBox> {
        let bbox = bbox?;
        self.active = Some(id);

        let committed = self
            .scheduler
            .committed()
            .filter(|c| c.target.page == self.current_page);
        let mapped = CoordinateMapper::map(committed, &bbox)?;
        self.highlight = Some(mapped);
        Some(mapped)
    }

    /// Drop the highlight and the active element.
    pub fn clear_highlight(&mut self) {
        self.highlight = None;
        self.active = None;
    }

    /// Apply every render report that is ready, without waiting.
    pub fn poll_renders(&mut self) -> Vec<RenderOutcome> {
        let mut outcomes = Vec::new();
        while let Some(outcome) = self.scheduler.try_outcome() {
            self.apply(&outcome);
            outcomes.push(outcome);
        }
        outcomes
    }

    /// Wait for the next render report and apply it.
    pub async fn next_outcome(&mut self) -> Option<RenderOutcome> {
        let outcome = self.scheduler.next_outcome().await?;
        self.apply(&outcome);
        Some(outcome)
    }

    /// Wait for every outstanding render and apply the reports.
    ///
    /// A fault of the latest render returns the page and zoom to those of
    /// the render still on screen.
    pub async fn settle(&mut self) -> Vec<RenderOutcome> {
        let outcomes = self.scheduler.settle().await;
        for outcome in &outcomes {
            self.apply(outcome);
        }
        outcomes
    }

    /// Elements extracted from the current page, in extraction order.
    pub fn current_page_elements(&self) -> Vec<&ExtractedElement> {
        let index = self.current_page - 1;
        self.elements
            .iter()
            .filter(|e| e.page_index() == index)
            .collect()
    }

    /// Whether anything was extracted for the current page.
    pub fn has_page_content(&self) -> bool {
        let index = self.current_page - 1;
        self.elements.iter().any(|e| e.page_index() == index)
    }

    /// Search the current page.
    pub fn search(&self, term: &str) -> Vec<PageMatch<'_>> {
        search(&self.current_page_elements(), term)
    }

    /// All extracted elements.
    pub fn elements(&self) -> &[ExtractedElement] {
        &self.elements
    }

    /// Current one-based page number.
    pub fn current_page(&self) -> u32 {
        self.current_page
    }

    /// Current zoom.
    pub fn zoom(&self) -> f32 {
        self.zoom
    }

    /// Number of pages.
    pub fn page_count(&self) -> u32 {
        self.info.page_count
    }

    /// Facts about the open document.
    pub fn document_info(&self) -> &DocumentInfo {
        &self.info
    }

    /// Options in use.
    pub fn options(&self) -> &ViewerOptions {
        &self.options
    }

    /// Highlight on the surface, in surface pixels.
    pub fn highlight(&self) -> Option<BoundingBox> {
        self.highlight
    }

    /// The element last located.
    pub fn active(&self) -> Option<ElementId> {
        self.active
    }

    /// Message of the last render or request fault, cleared by the next
    /// successful render.
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// The render on screen.
    pub fn committed(&self) -> Option<&CommittedRender> {
        self.scheduler.committed()
    }

    /// Render pipeline state.
    pub fn render_state(&self) -> SchedulerState {
        self.scheduler.state()
    }

    fn request_render(&mut self) {
        // a highlight only makes sense against the surface it was mapped on
        self.highlight = None;
        if let Err(e) = self.scheduler.request(self.current_page, self.zoom) {
            log::error!("Viewer: cannot render page {}: {}", self.current_page, e);
            self.last_error = Some(e.to_string());
        }
    }

    fn apply(&mut self, outcome: &RenderOutcome) {
        match outcome {
            RenderOutcome::Committed { .. } => {
                self.highlight = None;
                self.last_error = None;
            }
            RenderOutcome::Failed { error, .. } => {
                self.last_error = Some(error.to_string());
                // fall back to what is on screen
                if let Some(target) = self.scheduler.committed().map(|c| c.target) {
                    if target.page != self.current_page {
                        self.active = None;
                    }
                    self.current_page = target.page;
                    self.zoom = target.zoom;
                }
            }
            RenderOutcome::Cancelled { .. } | RenderOutcome::Superseded { .. } => {}
        }
    }
}

impl std::fmt::Debug for ViewerController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ViewerController")
            .field("info", &self.info)
            .field("current_page", &self.current_page)
            .field("zoom", &self.zoom)
            .field("elements", &self.elements.len())
            .field("active", &self.active)
            .field("highlight", &self.highlight)
            .finish()
    }
}
