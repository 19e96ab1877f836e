// pipeline.rs
use crate::config::{ListingMarkers, ScrapeConfig, StoreConfig, PAGE_DELAY};
use crate::db::{insert_properties, Database};
use crate::domain::clean_listings;
use crate::errors::PipelineError;
use crate::events::{EventSink, PipelineEvent, RunState, TracingSink};
use crate::scraper::{Collector, HttpFetcher, ListingExtractor, PageSource};
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use std::any::Any;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RunStatus {
    Success,
    Failed,
}

impl RunStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RunStatus::Success => "success",
            RunStatus::Failed => "failed",
        }
    }
}

/// What a scheduler gets back from one run. Failures are reported here, never raised.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunSummary {
    pub status: RunStatus,
    pub records_scraped: usize,
    pub records_cleaned: usize,
    pub records_inserted: usize,
    pub execution_time_seconds: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub timestamp: DateTime<Utc>,
}

impl RunSummary {
    pub fn is_success(&self) -> bool {
        self.status == RunStatus::Success
    }

    /// The summary as a plain JSON object.
    pub fn to_mapping(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}

/// Knobs that tests and embedding callers may want to change.
#[derive(Debug, Clone)]
pub struct RunOptions {
    pub markers: ListingMarkers,
    pub page_delay: Duration,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            markers: ListingMarkers::default(),
            page_delay: PAGE_DELAY,
        }
    }
}

/// Tracks one run through its states and counts.
struct Run<'a> {
    sink: &'a dyn EventSink,
    state: RunState,
    started_at: DateTime<Utc>,
    scraped: usize,
    cleaned: usize,
    inserted: usize,
}

impl<'a> Run<'a> {
    fn start(pages: &ScrapeConfig, sink: &'a dyn EventSink) -> Self {
        sink.emit(&PipelineEvent::RunStarted {
            start_page: pages.start_page,
            end_page: pages.end_page,
        });

        let mut run = Self {
            sink,
            state: RunState::Idle,
            started_at: Utc::now(),
            scraped: 0,
            cleaned: 0,
            inserted: 0,
        };
        run.transition(RunState::Fetching);
        run
    }

    fn transition(&mut self, to: RunState) {
        self.sink.emit(&PipelineEvent::StateChanged {
            from: self.state,
            to,
        });
        self.state = to;
    }

    fn execute<S: PageSource>(
        &mut self,
        source: &S,
        store: &StoreConfig,
        pages: &ScrapeConfig,
        options: &RunOptions,
    ) -> Result<(), PipelineError> {
        check_range(pages)?;

        let extractor = ListingExtractor::new(&options.markers)?;
        let raw = Collector::new(source, &extractor)
            .with_delay(options.page_delay)
            .collect(pages.start_page, pages.end_page, self.sink);
        self.scraped = raw.len();

        self.transition(RunState::Normalizing);
        let scraped_at = Utc::now().naive_utc();
        let report = clean_listings(raw, scraped_at, self.sink);
        self.cleaned = report.cleaned;

        self.transition(RunState::Persisting);
        let db = Database::connect(store)?;
        self.inserted = insert_properties(&db, &report.listings, self.sink)?;

        Ok(())
    }

    fn finish(mut self, result: Result<(), PipelineError>) -> RunSummary {
        let finished_at = Utc::now();
        let elapsed = (finished_at - self.started_at)
            .to_std()
            .map(|d| d.as_secs_f64())
            .unwrap_or(0.0);

        let (status, error) = match result {
            Ok(()) => {
                self.transition(RunState::Succeeded);
                (RunStatus::Success, None)
            }
            Err(e) => {
                self.transition(RunState::Failed);
                self.inserted = 0;
                (RunStatus::Failed, Some(e.to_string()))
            }
        };

        self.sink.emit(&PipelineEvent::RunFinished {
            status: status.as_str().to_string(),
            elapsed_seconds: elapsed,
        });

        RunSummary {
            status,
            records_scraped: self.scraped,
            records_cleaned: self.cleaned,
            records_inserted: self.inserted,
            execution_time_seconds: elapsed,
            error,
            timestamp: finished_at,
        }
    }
}

fn check_range(pages: &ScrapeConfig) -> Result<(), PipelineError> {
    if pages.is_valid() {
        Ok(())
    } else {
        Err(PipelineError::InvalidRange {
            start: pages.start_page,
            end: pages.end_page,
        })
    }
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        msg.to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown panic".to_string()
    }
}

/// Runs the stages, turning a panic inside them into an ordinary failure.
fn guarded<F>(stages: F) -> Result<(), PipelineError>
where
    F: FnOnce() -> Result<(), PipelineError>,
{
    catch_unwind(AssertUnwindSafe(stages))
        .unwrap_or_else(|payload| Err(PipelineError::Panicked(panic_message(payload))))
}

/// Scrape the live site over `pages` and store what survives cleaning.
pub fn run(store: &StoreConfig, pages: &ScrapeConfig) -> RunSummary {
    run_configured(store, pages, &RunOptions::default())
}

/// Like [`run`], with caller-supplied markers and page delay.
pub fn run_configured(store: &StoreConfig, pages: &ScrapeConfig, options: &RunOptions) -> RunSummary {
    let sink = TracingSink;
    let mut run = Run::start(pages, &sink);
    let result = guarded(|| {
        check_range(pages)?;
        let fetcher = HttpFetcher::new()?;
        run.execute(&fetcher, store, pages, options)
    });
    run.finish(result)
}

/// Same as [`run`], with the page source, options and event sink supplied by the caller.
pub fn run_with<S: PageSource>(
    source: &S,
    store: &StoreConfig,
    pages: &ScrapeConfig,
    options: &RunOptions,
    sink: &dyn EventSink,
) -> RunSummary {
    let mut run = Run::start(pages, sink);
    let result = guarded(|| run.execute(source, store, pages, options));
    run.finish(result)
}
