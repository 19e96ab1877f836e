use serde::Serialize;
use std::sync::Mutex;

/// Stage of a run, in the order they are entered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RunState {
    Idle,
    Fetching,
    Normalizing,
    Persisting,
    Succeeded,
    Failed,
}

/// Facts emitted by the pipeline as it runs.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PipelineEvent {
    RunStarted { start_page: u32, end_page: u32 },
    StateChanged { from: RunState, to: RunState },
    PageFetched { page: u32, bytes: usize },
    PageSkipped { page: u32, reason: String },
    PageParsed { page: u32, listings: usize },
    PageDelay { after_page: u32, millis: u64 },
    ScrapeCompleted { pages: usize, listings: usize },
    RecordsCleaned { scraped: usize, cleaned: usize, dropped: usize },
    RecordsInserted { inserted: usize },
    InsertRolledBack { attempted: usize, error: String },
    RunFinished { status: String, elapsed_seconds: f64 },
}

/// Where pipeline components report what they are doing.
pub trait EventSink {
    fn emit(&self, event: &PipelineEvent);
}

/// Forwards events to `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl EventSink for TracingSink {
    fn emit(&self, event: &PipelineEvent) {
        match event {
            PipelineEvent::RunStarted {
                start_page,
                end_page,
            } => tracing::info!(start_page, end_page, "run started"),
            PipelineEvent::StateChanged { from, to } => {
                tracing::debug!(?from, ?to, "state changed")
            }
            PipelineEvent::PageFetched { page, bytes } => {
                tracing::info!(page, bytes, "page fetched")
            }
            PipelineEvent::PageSkipped { page, reason } => {
                tracing::warn!(page, %reason, "failed to retrieve page, skipping")
            }
            PipelineEvent::PageParsed { page, listings } => {
                tracing::info!(page, listings, "page parsed")
            }
            PipelineEvent::PageDelay { after_page, millis } => {
                tracing::debug!(after_page, millis, "pausing before next page")
            }
            PipelineEvent::ScrapeCompleted { pages, listings } => {
                tracing::info!(pages, listings, "scraping complete")
            }
            PipelineEvent::RecordsCleaned {
                scraped,
                cleaned,
                dropped,
            } => tracing::info!(scraped, cleaned, dropped, "records cleaned"),
            PipelineEvent::RecordsInserted { inserted } => {
                tracing::info!(inserted, "records inserted")
            }
            PipelineEvent::InsertRolledBack { attempted, error } => {
                tracing::error!(attempted, %error, "insert rolled back")
            }
            PipelineEvent::RunFinished {
                status,
                elapsed_seconds,
            } => {
                if status == "success" {
                    tracing::info!(%status, elapsed_seconds, "run finished")
                } else {
                    tracing::error!(%status, elapsed_seconds, "run finished")
                }
            }
        }
    }
}

/// Keeps every event in memory, in emission order.
#[derive(Debug, Default)]
pub struct MemorySink {
    events: Mutex<Vec<PipelineEvent>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<PipelineEvent> {
        match self.events.lock() {
            Ok(events) => events.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

impl EventSink for MemorySink {
    fn emit(&self, event: &PipelineEvent) {
        match self.events.lock() {
            Ok(mut events) => events.push(event.clone()),
            Err(poisoned) => poisoned.into_inner().push(event.clone()),
        }
    }
}
