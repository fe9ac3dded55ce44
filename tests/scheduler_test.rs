//! Integration tests for the page render scheduler.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Semaphore;

use pdfspot::error::{Error, Result};
use pdfspot::render::{
    CancelSignal, PageRenderScheduler, RenderDocument, RenderOutcome, RenderPage, RenderStatus,
    SchedulerState, Surface, Viewport,
};
use pdfspot::Page;

/// Document whose pages only finish drawing once their gate is opened.
struct GatedDocument {
    pages: Vec<Page>,
    gates: HashMap<u32, Arc<Semaphore>>,
    broken: Vec<u32>,
    live: Arc<AtomicUsize>,
}

impl GatedDocument {
    fn new(page_count: u32) -> Self {
        let pages = (0..page_count).map(|i| Page::new(i, 200.0, 300.0)).collect();
        Self {
            pages,
            gates: HashMap::new(),
            broken: Vec::new(),
            live: Arc::new(AtomicUsize::new(0)),
        }
    }

    fn gated(mut self, page: u32) -> (Self, Arc<Semaphore>) {
        let gate = Arc::new(Semaphore::new(0));
        self.gates.insert(page, Arc::clone(&gate));
        (self, gate)
    }

    fn broken(mut self, page: u32) -> Self {
        self.broken.push(page);
        self
    }
}

struct GatedPage {
    info: Page,
    gate: Option<Arc<Semaphore>>,
    broken: bool,
    live: Arc<AtomicUsize>,
}

struct LiveGuard(Arc<AtomicUsize>);

impl LiveGuard {
    fn new(live: &Arc<AtomicUsize>) -> Self {
        live.fetch_add(1, Ordering::SeqCst);
        Self(Arc::clone(live))
    }
}

impl Drop for LiveGuard {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl RenderDocument for GatedDocument {
    fn page_count(&self) -> u32 {
        self.pages.len() as u32
    }

    async fn get_page(&self, number: u32) -> Result<Arc<dyn RenderPage>> {
        let info = self.pages[(number - 1) as usize];
        Ok(Arc::new(GatedPage {
            info,
            gate: self.gates.get(&number).cloned(),
            broken: self.broken.contains(&number),
            live: Arc::clone(&self.live),
        }))
    }
}

#[async_trait]
impl RenderPage for GatedPage {
    fn info(&self) -> Page {
        self.info
    }

    async fn render(
        &self,
        surface: &mut Surface,
        _viewport: &Viewport,
        cancel: &CancelSignal,
    ) -> Result<RenderStatus> {
        let _live = LiveGuard::new(&self.live);
        if let Some(gate) = &self.gate {
            let mut watcher = cancel.clone();
            tokio::select! {
                _ = watcher.cancelled() => return Ok(RenderStatus::Cancelled),
                permit = gate.acquire() => {
                    permit.map_err(|e| Error::Render(e.to_string()))?.forget();
                }
            }
        }
        if self.broken {
            return Err(Error::Render("corrupt content stream".to_string()));
        }
        surface.fill([0xff, 0xff, 0xff, 0xff]);
        Ok(RenderStatus::Completed)
    }
}

async fn yield_to_tasks() {
    tokio::time::sleep(Duration::from_millis(20)).await;
}

fn failures(outcomes: &[RenderOutcome]) -> usize {
    outcomes.iter().filter(|o| o.is_failure()).count()
}

#[tokio::test]
async fn test_late_completion_never_commits() {
    let (doc, gate) = GatedDocument::new(3).gated(1);
    let mut scheduler = PageRenderScheduler::new(Arc::new(doc));

    let g1 = scheduler.request(1, 1.0).unwrap();
    yield_to_tasks().await;

    // G1 finishes drawing, but its report is read only after G2 started
    gate.add_permits(1);
    yield_to_tasks().await;
    let g2 = scheduler.request(2, 1.0).unwrap();

    let outcomes = scheduler.settle().await;
    assert_eq!(outcomes.len(), 2);
    assert!(matches!(outcomes[0], RenderOutcome::Superseded { generation } if generation == g1));
    assert!(matches!(
        outcomes[1],
        RenderOutcome::Committed { generation, page: 2 } if generation == g2
    ));

    let committed = scheduler.committed().unwrap();
    assert_eq!(committed.generation, g2);
    assert_eq!(committed.page.index, 1);
}

#[tokio::test]
async fn test_superseded_render_is_cancelled_not_failed() {
    let (doc, _gate) = GatedDocument::new(3).gated(1);
    let live = Arc::clone(&doc.live);
    let mut scheduler = PageRenderScheduler::new(Arc::new(doc));

    let g1 = scheduler.request(1, 1.5).unwrap();
    yield_to_tasks().await;
    assert_eq!(live.load(Ordering::SeqCst), 1);

    let g2 = scheduler.request(3, 1.5).unwrap();
    let outcomes = scheduler.settle().await;

    assert_eq!(failures(&outcomes), 0);
    assert!(outcomes
        .iter()
        .any(|o| matches!(o, RenderOutcome::Cancelled { generation } if *generation == g1)));
    assert_eq!(scheduler.committed().unwrap().generation, g2);
    assert!(scheduler.last_failure().is_none());
    assert_eq!(live.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_only_one_render_in_flight() {
    let (doc, gate) = GatedDocument::new(2).gated(2);
    let mut scheduler = PageRenderScheduler::new(Arc::new(doc));

    scheduler.request(2, 1.0).unwrap();
    let g2 = scheduler.request(2, 2.0).unwrap();
    assert!(matches!(
        scheduler.state(),
        SchedulerState::Rendering { generation, .. } if generation == g2
    ));

    gate.add_permits(2);
    let outcomes = scheduler.settle().await;
    assert_eq!(outcomes.iter().filter(|o| o.is_committed()).count(), 1);
    assert_eq!(scheduler.state(), SchedulerState::Idle);

    let committed = scheduler.committed().unwrap();
    assert_eq!(committed.target.zoom, 2.0);
    assert_eq!(committed.surface.width(), 400);
    assert_eq!(committed.reference.width, 200.0);
}

#[tokio::test]
async fn test_fault_keeps_previous_surface() {
    let doc = GatedDocument::new(2).broken(2);
    let mut scheduler = PageRenderScheduler::new(Arc::new(doc));

    let g1 = scheduler.request(1, 1.0).unwrap();
    scheduler.settle().await;

    scheduler.request(2, 1.0).unwrap();
    let outcomes = scheduler.settle().await;
    assert_eq!(failures(&outcomes), 1);
    assert_eq!(scheduler.committed().unwrap().generation, g1);
    assert!(scheduler
        .last_failure()
        .unwrap()
        .contains("corrupt content stream"));

    // The pipeline stays usable
    let g3 = scheduler.request(1, 2.0).unwrap();
    scheduler.settle().await;
    assert_eq!(scheduler.committed().unwrap().generation, g3);
    assert!(scheduler.last_failure().is_none());
}

#[tokio::test]
async fn test_teardown_releases_in_flight_render() {
    let (doc, _gate) = GatedDocument::new(1).gated(1);
    let live = Arc::clone(&doc.live);
    let mut scheduler = PageRenderScheduler::new(Arc::new(doc));

    scheduler.request(1, 1.0).unwrap();
    yield_to_tasks().await;
    assert_eq!(live.load(Ordering::SeqCst), 1);

    drop(scheduler);
    yield_to_tasks().await;
    assert_eq!(live.load(Ordering::SeqCst), 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_rapid_requests_commit_latest() {
    let doc = GatedDocument::new(5);
    let mut scheduler = PageRenderScheduler::new(Arc::new(doc));

    let mut last = None;
    for i in 0..50u32 {
        let page = i % 5 + 1;
        let zoom = 0.5 + (i % 4) as f32 * 0.25;
        last = Some(scheduler.request(page, zoom).unwrap());
    }

    let outcomes = scheduler.settle().await;
    assert_eq!(outcomes.len(), 50);
    assert_eq!(failures(&outcomes), 0);
    assert_eq!(outcomes.iter().filter(|o| o.is_committed()).count(), 1);
    assert_eq!(scheduler.committed().map(|c| c.generation), last);
}

#[tokio::test]
async fn test_poll_without_waiting() {
    let doc = GatedDocument::new(1);
    let mut scheduler = PageRenderScheduler::new(Arc::new(doc));
    assert!(scheduler.try_outcome().is_none());

    scheduler.request(1, 1.0).unwrap();
    yield_to_tasks().await;

    let outcome = scheduler.try_outcome().unwrap();
    assert!(outcome.is_committed());
    assert_eq!(scheduler.pending(), 0);
    assert!(scheduler.next_outcome().await.is_none());
}

#[tokio::test]
async fn test_oversized_zoom_fails_without_aborting() {
    let doc = GatedDocument::new(1);
    let mut scheduler = PageRenderScheduler::new(Arc::new(doc));

    let g1 = scheduler.request(1, 1.0).unwrap();
    scheduler.settle().await;

    let g2 = scheduler.request(1, 100000.0).unwrap();
    let outcomes = scheduler.settle().await;
    assert_eq!(outcomes.len(), 1);
    assert!(matches!(outcomes[0], RenderOutcome::Failed { generation, .. } if generation == g2));
    assert!(scheduler.last_failure().unwrap().contains("too large"));
    assert_eq!(scheduler.committed().unwrap().generation, g1);

    let g3 = scheduler.request(1, 2.0).unwrap();
    scheduler.settle().await;
    assert_eq!(scheduler.committed().unwrap().generation, g3);
}

#[tokio::test]
async fn test_cancel_after_drawing_never_commits() {
    let doc = GatedDocument::new(1);
    let mut scheduler = PageRenderScheduler::new(Arc::new(doc));

    // The task finishes drawing; its report is read only after the cancel
    let g1 = scheduler.request(1, 1.0).unwrap();
    yield_to_tasks().await;
    scheduler.cancel();

    let outcomes = scheduler.settle().await;
    assert_eq!(outcomes.len(), 1);
    assert!(matches!(outcomes[0], RenderOutcome::Cancelled { generation } if generation == g1));
    assert!(scheduler.committed().is_none());
    assert_eq!(scheduler.state(), SchedulerState::Idle);

    let g2 = scheduler.request(1, 1.0).unwrap();
    scheduler.settle().await;
    assert_eq!(scheduler.committed().unwrap().generation, g2);
}
