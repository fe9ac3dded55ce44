//! Asynchronous page-render lifecycle with cancel-on-supersede.
//!
//! Every request mints a new [`Generation`] and spawns one render task. The
//! previous in-flight task is told to cancel. Tasks report back over a
//! channel; only a completion carrying the latest generation may replace the
//! committed page and surface. Anything older is discarded, whatever order
//! the completions arrive in.

use std::fmt;
use std::sync::Arc;

use tokio::sync::mpsc;

use super::backend::{RenderDocument, RenderPage, RenderStatus, ViewportParams};
use super::cancel::{cancel_pair, CancelHandle, CancelSignal};
use super::{Surface, Viewport};
use crate::error::{Error, Result};
use crate::model::Page;

/// Token identifying one render attempt. Later requests get larger tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Generation(u64);

impl Generation {
    /// Raw counter value.
    pub fn value(self) -> u64 {
        self.0
    }
}

impl fmt::Display for Generation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Page and zoom a render was requested for.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderTarget {
    /// One-based page number
    pub page: u32,
    /// Zoom factor
    pub zoom: f32,
}

/// The render currently on screen.
pub struct CommittedRender {
    /// Generation that produced it
    pub generation: Generation,
    /// Requested page and zoom
    pub target: RenderTarget,
    /// Page geometry
    pub page: Page,
    /// Handle kept for coordinate mapping
    pub handle: Arc<dyn RenderPage>,
    /// Page viewport at unit scale under the page rotation
    pub reference: Viewport,
    /// Viewport the surface was drawn for
    pub viewport: Viewport,
    /// Drawn pixels
    pub surface: Surface,
}

impl fmt::Debug for CommittedRender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommittedRender")
            .field("generation", &self.generation)
            .field("target", &self.target)
            .field("page", &self.page)
            .field("reference", &self.reference)
            .field("viewport", &self.viewport)
            .field("surface", &self.surface)
            .finish()
    }
}

/// What became of one render attempt.
#[derive(Debug)]
pub enum RenderOutcome {
    /// The latest render finished and is now current
    Committed {
        /// Generation committed
        generation: Generation,
        /// One-based page number now shown
        page: u32,
    },
    /// The render stopped because it was cancelled
    Cancelled {
        /// Generation cancelled
        generation: Generation,
    },
    /// The render finished after a newer request; its result was discarded
    Superseded {
        /// Generation discarded
        generation: Generation,
    },
    /// The latest render hit a genuine fault; the previous surface stays
    Failed {
        /// Generation that failed
        generation: Generation,
        /// The fault
        error: Error,
    },
}

impl RenderOutcome {
    /// Generation the outcome refers to.
    pub fn generation(&self) -> Generation {
        match self {
            RenderOutcome::Committed { generation, .. }
            | RenderOutcome::Cancelled { generation }
            | RenderOutcome::Superseded { generation }
            | RenderOutcome::Failed { generation, .. } => *generation,
        }
    }

    /// Check if this outcome replaced the visible surface.
    pub fn is_committed(&self) -> bool {
        matches!(self, RenderOutcome::Committed { .. })
    }

    /// Check if this outcome should be surfaced to the user.
    pub fn is_failure(&self) -> bool {
        matches!(self, RenderOutcome::Failed { .. })
    }
}

/// Scheduler state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SchedulerState {
    /// Nothing in flight
    Idle,
    /// The latest request is being rendered
    Rendering {
        /// Generation in flight
        generation: Generation,
        /// Target in flight
        target: RenderTarget,
    },
}

struct InFlight {
    generation: Generation,
    target: RenderTarget,
    cancel: CancelHandle,
}

enum Finished {
    Drawn(Box<CommittedRender>),
    Cancelled,
}

struct Completion {
    generation: Generation,
    result: Result<Finished>,
}

/// Owns the single render pipeline of one open document.
pub struct PageRenderScheduler {
    document: Arc<dyn RenderDocument>,
    next_generation: u64,
    latest: Option<Generation>,
    cancelled: Option<Generation>,
    in_flight: Option<InFlight>,
    pending: usize,
    tx: mpsc::UnboundedSender<Completion>,
    rx: mpsc::UnboundedReceiver<Completion>,
    committed: Option<CommittedRender>,
    last_failure: Option<String>,
}

impl PageRenderScheduler {
    /// Create a scheduler for a loaded document.
    pub fn new(document: Arc<dyn RenderDocument>) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            document,
            next_generation: 0,
            latest: None,
            cancelled: None,
            in_flight: None,
            pending: 0,
            tx,
            rx,
            committed: None,
            last_failure: None,
        }
    }

    /// Number of pages in the document.
    pub fn page_count(&self) -> u32 {
        self.document.page_count()
    }

    /// Start rendering `page` (one-based) at `zoom`, superseding whatever is
    /// in flight. Must be called from within a Tokio runtime.
    pub fn request(&mut self, page: u32, zoom: f32) -> Result<Generation> {
        let page_count = self.page_count();
        if page == 0 || page > page_count {
            return Err(Error::PageOutOfRange(page, page_count));
        }
        if !(zoom.is_finite() && zoom > 0.0) {
            return Err(Error::InvalidZoom(zoom));
        }

        if let Some(previous) = self.in_flight.take() {
            log::debug!("Scheduler: cancelling render {}", previous.generation);
            previous.cancel.cancel();
        }

        self.next_generation += 1;
        let generation = Generation(self.next_generation);
        self.latest = Some(generation);

        let target = RenderTarget { page, zoom };
        let (cancel, signal) = cancel_pair();
        tokio::spawn(run_render(
            Arc::clone(&self.document),
            target,
            generation,
            signal,
            self.tx.clone(),
        ));
        self.pending += 1;
        self.in_flight = Some(InFlight {
            generation,
            target,
            cancel,
        });

        log::debug!(
            "Scheduler: render {} requested for page {} at zoom {}",
            generation,
            page,
            zoom
        );
        Ok(generation)
    }

    /// Wait for the next render task to report. Returns `None` when no task
    /// is outstanding.
    pub async fn next_outcome(&mut self) -> Option<RenderOutcome> {
        if self.pending == 0 {
            return None;
        }
        let completion = self.rx.recv().await?;
        Some(self.process(completion))
    }

    /// Take a report if one is ready, without waiting.
    pub fn try_outcome(&mut self) -> Option<RenderOutcome> {
        let completion = self.rx.try_recv().ok()?;
        Some(self.process(completion))
    }

    /// Wait until every outstanding task has reported.
    pub async fn settle(&mut self) -> Vec<RenderOutcome> {
        let mut outcomes = Vec::new();
        while let Some(outcome) = self.next_outcome().await {
            outcomes.push(outcome);
        }
        outcomes
    }

    /// Cancel the in-flight render, if any. Its report still arrives, as
    /// [`RenderOutcome::Cancelled`], even if it had already finished drawing.
    pub fn cancel(&mut self) {
        if let Some(in_flight) = self.in_flight.take() {
            log::debug!("Scheduler: cancelling render {}", in_flight.generation);
            self.cancelled = Some(in_flight.generation);
            in_flight.cancel.cancel();
        }
    }

    /// Current state.
    pub fn state(&self) -> SchedulerState {
        match &self.in_flight {
            Some(in_flight) => SchedulerState::Rendering {
                generation: in_flight.generation,
                target: in_flight.target,
            },
            None => SchedulerState::Idle,
        }
    }

    /// The render currently on screen.
    pub fn committed(&self) -> Option<&CommittedRender> {
        self.committed.as_ref()
    }

    /// Latest generation requested.
    pub fn latest(&self) -> Option<Generation> {
        self.latest
    }

    /// Message of the most recent fault, cleared by the next commit.
    pub fn last_failure(&self) -> Option<&str> {
        self.last_failure.as_deref()
    }

    /// Number of tasks that have not reported yet.
    pub fn pending(&self) -> usize {
        self.pending
    }

    fn process(&mut self, completion: Completion) -> RenderOutcome {
        self.pending = self.pending.saturating_sub(1);
        let Completion { generation, result } = completion;

        let was_cancelled = self.cancelled == Some(generation);
        let is_latest = self.latest == Some(generation) && !was_cancelled;
        if self
            .in_flight
            .as_ref()
            .is_some_and(|f| f.generation == generation)
        {
            self.in_flight = None;
        }

        match result {
            Ok(Finished::Drawn(render)) if is_latest => {
                let page = render.target.page;
                log::debug!("Scheduler: committing render {} (page {})", generation, page);
                self.committed = Some(*render);
                self.last_failure = None;
                RenderOutcome::Committed { generation, page }
            }
            Ok(Finished::Drawn(_)) if was_cancelled => {
                log::debug!("Scheduler: render {} cancelled after drawing", generation);
                RenderOutcome::Cancelled { generation }
            }
            Ok(Finished::Drawn(_)) => {
                log::debug!("Scheduler: discarding superseded render {}", generation);
                RenderOutcome::Superseded { generation }
            }
            Ok(Finished::Cancelled) => {
                log::debug!("Scheduler: render {} cancelled", generation);
                RenderOutcome::Cancelled { generation }
            }
            Err(_) if was_cancelled => {
                log::debug!("Scheduler: render {} cancelled", generation);
                RenderOutcome::Cancelled { generation }
            }
            Err(error) if is_latest => {
                log::error!("Error rendering page: {}", error);
                self.last_failure = Some(error.to_string());
                RenderOutcome::Failed { generation, error }
            }
            Err(error) => {
                log::debug!(
                    "Scheduler: ignoring failure of superseded render {}: {}",
                    generation,
                    error
                );
                RenderOutcome::Superseded { generation }
            }
        }
    }
}

impl Drop for PageRenderScheduler {
    fn drop(&mut self) {
        self.cancel();
    }
}

/// Sends the task's completion when dropped, so a panicking or aborted task
/// still reports and the pending count stays accurate.
struct Reporter {
    tx: mpsc::UnboundedSender<Completion>,
    generation: Generation,
    result: Option<Result<Finished>>,
}

impl Drop for Reporter {
    fn drop(&mut self) {
        let result = self
            .result
            .take()
            .unwrap_or_else(|| Err(Error::Render("render task ended without a result".into())));
        // The scheduler may already be gone.
        let _ = self.tx.send(Completion {
            generation: self.generation,
            result,
        });
    }
}

async fn run_render(
    document: Arc<dyn RenderDocument>,
    target: RenderTarget,
    generation: Generation,
    signal: CancelSignal,
    tx: mpsc::UnboundedSender<Completion>,
) {
    let mut reporter = Reporter {
        tx,
        generation,
        result: None,
    };
    let mut watcher = signal.clone();

    let result = tokio::select! {
        biased;
        _ = watcher.cancelled() => Ok(Finished::Cancelled),
        drawn = draw(document, target, generation, &signal) => drawn,
    };
    reporter.result = Some(result);
}

async fn draw(
    document: Arc<dyn RenderDocument>,
    target: RenderTarget,
    generation: Generation,
    signal: &CancelSignal,
) -> Result<Finished> {
    let handle = document.get_page(target.page).await?;
    let page = handle.info();
    let reference = handle.viewport(ViewportParams::unit(page.rotation));
    let viewport = handle.viewport(ViewportParams::new(target.zoom, page.rotation));
    let mut surface = Surface::for_viewport(&viewport)?;

    match handle.render(&mut surface, &viewport, signal).await? {
        RenderStatus::Cancelled => Ok(Finished::Cancelled),
        RenderStatus::Completed => Ok(Finished::Drawn(Box::new(CommittedRender {
            generation,
            target,
            page,
            handle,
            reference,
            viewport,
            surface,
        }))),
    }
}
