//! Layout output types.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::event::CalendarEvent;

/// Geometry for one event within a day column.
///
/// Vertical values are pixels at the configured per-minute scale;
/// horizontal values are percentages of the day column width. Fractional
/// values are preserved so adjacent edges stay aligned.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct EventPosition {
    /// Pixel offset from the day's top boundary.
    pub top: f32,
    /// Pixel height.
    pub height: f32,
    /// Left edge as a percentage of the day column width.
    pub left_percent: f32,
    /// Width as a percentage of the day column width.
    pub width_percent: f32,
}

/// A maximal set of events transitively connected by temporal overlap on
/// one day. Every timed event belongs to exactly one group.
#[derive(Debug, Clone, PartialEq)]
pub struct OverlapGroup {
    /// Member events, sorted by start time (id as tie-break).
    pub events: Vec<CalendarEvent>,
}

impl OverlapGroup {
    /// Member event ids, in group order.
    pub fn event_ids(&self) -> Vec<&str> {
        self.events.iter().map(|e| e.id.as_str()).collect()
    }

    /// Number of events in the group.
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Groups are non-empty by construction; this exists for completeness.
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

/// Renderer-facing output for one event on one day: the raw event, its
/// geometry, and the boundary-coincidence hints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct PositionedEvent {
    /// The raw event, unclipped.
    pub event: CalendarEvent,
    /// Computed geometry.
    pub position: EventPosition,
    /// Another event ends exactly when this one starts.
    pub touching_top: bool,
    /// Another event starts exactly when this one ends.
    pub touching_bottom: bool,
}
