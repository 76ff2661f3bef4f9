//! Event source trait definitions.

use async_trait::async_trait;
use std::sync::Arc;

use crate::error::Result;
use crate::event::{CalendarEvent, DateRange};

/// Trait for calendar event sources.
#[async_trait]
pub trait EventSource: Send + Sync {
    /// Get the source identifier (for logging and progress reporting).
    fn id(&self) -> &str;

    /// Fetch all events overlapping the given range.
    ///
    /// `force_refresh` is passed through to the backend so it can bypass
    /// any server-side caching; sources without such a cache ignore it.
    async fn fetch_events(
        &self,
        range: &DateRange,
        force_refresh: bool,
    ) -> Result<Vec<CalendarEvent>>;
}

/// A shared source for dynamic dispatch.
pub type SharedEventSource = Arc<dyn EventSource>;
