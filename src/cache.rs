//! Incremental range cache for remotely fetched calendar events.
//!
//! The cache tracks a single contiguous known-fetched interval and the
//! identity-merged set of events inside it. Coverage only ever grows within
//! a session; the sole ways to shrink it are a full [`RangeCache::invalidate`]
//! or the view-scoped [`RangeCache::evict_view`], both of which collapse the
//! bound entirely.
//!
//! The cache is a pure synchronous structure. The fetch coordinator owns
//! synchronization and is its only writer.

use std::collections::HashMap;

use chrono::Duration;
use tracing::debug;

use crate::event::{CalendarEvent, DateRange};

/// Session-scoped cache of fetched calendar events.
#[derive(Debug, Default)]
pub struct RangeCache {
    /// The known-fetched interval. `None` when the cache is empty.
    cached: Option<DateRange>,
    /// Events by id, last-write-wins.
    events: HashMap<String, CalendarEvent>,
}

impl RangeCache {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the cache holds no fetched range.
    pub fn is_empty(&self) -> bool {
        self.cached.is_none()
    }

    /// Number of cached events.
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// The known-fetched interval, if any.
    pub fn cached_range(&self) -> Option<DateRange> {
        self.cached
    }

    /// Whether the requested range lies entirely within the fetched bound.
    /// Always false for an empty cache.
    pub fn is_covered(&self, requested: &DateRange) -> bool {
        self.cached
            .map(|cached| cached.contains(requested))
            .unwrap_or(false)
    }

    /// Compute the sub-ranges of `requested` not yet fetched.
    ///
    /// An empty cache yields `[requested]` unchanged. Otherwise up to two
    /// sub-ranges come back: the portion before the cached bound (ending
    /// 1 ms before it) and the portion after it (starting 1 ms after it).
    /// Both can be non-empty when the request strictly surrounds the bound.
    pub fn missing_ranges(&self, requested: &DateRange) -> Vec<DateRange> {
        let Some(cached) = self.cached else {
            return vec![*requested];
        };

        let epsilon = Duration::milliseconds(1);
        let mut missing = Vec::new();

        if requested.min < cached.min {
            missing.push(DateRange::new(
                requested.min,
                requested.max.min(cached.min - epsilon),
            ));
        }
        if requested.max > cached.max {
            missing.push(DateRange::new(
                requested.min.max(cached.max + epsilon),
                requested.max,
            ));
        }

        missing
    }

    /// Merge fetched events into the cache and grow the fetched bound to
    /// the union bounding box. Events are upserted by id; later data wins.
    /// The bound never shrinks.
    pub fn merge(&mut self, events: Vec<CalendarEvent>, fetched_range: DateRange) {
        let count = events.len();
        for event in events {
            self.events.insert(event.id.clone(), event);
        }

        self.cached = Some(match self.cached {
            Some(cached) => cached.union(&fetched_range),
            None => fetched_range,
        });

        debug!(
            "Merged {} events for {}, cache now spans {}",
            count,
            fetched_range,
            self.cached.map(|r| r.to_string()).unwrap_or_default()
        );
    }

    /// Cached events overlapping the given range, sorted by start time
    /// (id as tie-break) for deterministic downstream layout.
    pub fn events_overlapping(&self, range: &DateRange) -> Vec<CalendarEvent> {
        let mut events: Vec<CalendarEvent> = self
            .events
            .values()
            .filter(|e| e.is_within(range))
            .cloned()
            .collect();
        events.sort_by(|a, b| a.start.cmp(&b.start).then_with(|| a.id.cmp(&b.id)));
        events
    }

    /// Clear the fetched bound and all events.
    pub fn invalidate(&mut self) {
        self.cached = None;
        self.events.clear();
        debug!("Cache invalidated");
    }

    /// View-scoped eviction before a forced refresh: remove events
    /// overlapping the view's range and collapse the fetched bound
    /// entirely, so the next fetch covers at least the whole view.
    ///
    /// The bound tracks one contiguous interval, not sub-intervals, so
    /// partial-range bookkeeping is not attempted here.
    pub fn evict_view(&mut self, range: &DateRange) {
        let before = self.events.len();
        self.events.retain(|_, e| !e.is_within(range));
        self.cached = None;
        debug!(
            "Evicted {} events overlapping {}, cache bound collapsed",
            before - self.events.len(),
            range
        );
    }
}

// ============================================================================
// Tests
// ============================================================================
