//! In-memory event source.

use async_trait::async_trait;
use parking_lot::RwLock;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use crate::error::{FetchError, Result};
use crate::event::{CalendarEvent, DateRange};

use super::EventSource;

/// Event source serving a fixed in-memory event set.
///
/// Fetches return the configured events filtered to the requested range.
/// Latency and per-range failures can be injected, and every fetch is
/// recorded, which makes this the natural source for offline defaults and
/// for exercising the fetch coordinator in tests.
pub struct StaticEventSource {
    id: String,
    events: RwLock<Vec<CalendarEvent>>,
    latency: Option<Duration>,
    failures: RwLock<Vec<(DateRange, FetchError)>>,
    recorded: RwLock<Vec<DateRange>>,
    fetches: AtomicUsize,
}

impl StaticEventSource {
    /// Create a source serving the given events.
    pub fn new(events: Vec<CalendarEvent>) -> Self {
        Self {
            id: "static".to_string(),
            events: RwLock::new(events),
            latency: None,
            failures: RwLock::new(Vec::new()),
            recorded: RwLock::new(Vec::new()),
            fetches: AtomicUsize::new(0),
        }
    }

    /// Add artificial latency to every fetch.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Fail any fetch whose range overlaps `range` with the given error.
    pub fn fail_range(&self, range: DateRange, error: FetchError) {
        self.failures.write().push((range, error));
    }

    /// Remove all injected failures.
    pub fn clear_failures(&self) {
        self.failures.write().clear();
    }

    /// Replace the served events.
    pub fn set_events(&self, events: Vec<CalendarEvent>) {
        *self.events.write() = events;
    }

    /// Number of fetches issued against this source.
    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }

    /// Ranges requested so far, in order.
    pub fn recorded_ranges(&self) -> Vec<DateRange> {
        self.recorded.read().clone()
    }
}

#[async_trait]
impl EventSource for StaticEventSource {
    fn id(&self) -> &str {
        &self.id
    }

    async fn fetch_events(
        &self,
        range: &DateRange,
        _force_refresh: bool,
    ) -> Result<Vec<CalendarEvent>> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        self.recorded.write().push(*range);

        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }

        let failure = self
            .failures
            .read()
            .iter()
            .find(|(failing, _)| failing.overlaps(range))
            .map(|(_, error)| error.clone());
        if let Some(error) = failure {
            return Err(error.into());
        }

        Ok(self
            .events
            .read()
            .iter()
            .filter(|e| e.is_within(range))
            .cloned()
            .collect())
    }
}

// ============================================================================
// Tests
// ============================================================================
