//! Day layout for timed calendar events.
//!
//! This module turns a day's events into geometry a renderer can draw
//! directly:
//!
//! - **Overlap grouping**: partition the day's timed events into maximal
//!   groups connected by transitive temporal overlap ([`overlap_groups`]).
//! - **Column packing**: within a group, assign each event the lowest free
//!   column so concurrent events render side-by-side ([`engine`]).
//! - **Touch detection**: flag events whose boundary instants coincide, a
//!   purely visual hint independent of grouping ([`touch_flags`]).
//!
//! [`layout_day`] is the single entry point a renderer calls per day: it
//! filters all-day events, clips timed events to the day, groups, packs,
//! and returns one [`PositionedEvent`] per timed event.
//!
//! All computation here is synchronous and pure.

mod engine;
mod overlap;
mod touch;
mod types;

pub use engine::{layout_group, pack_columns, ColumnAssignment};
pub use overlap::overlap_groups;
pub use touch::{touch_flags, TouchFlags};
pub use types::{EventPosition, OverlapGroup, PositionedEvent};

use std::collections::HashMap;

use crate::config::LayoutConfig;
use crate::event::{CalendarEvent, DateRange};

/// Lay out one day's events.
///
/// All-day events are excluded; timed events are clipped to the day's
/// bounds before grouping and packing. The returned list is sorted by
/// start time (id as tie-break) and carries the raw, unclipped event
/// alongside its geometry and touch flags.
pub fn layout_day(
    events: &[CalendarEvent],
    day: &DateRange,
    config: &LayoutConfig,
) -> Vec<PositionedEvent> {
    let timed: Vec<&CalendarEvent> = events
        .iter()
        .filter(|e| !e.all_day && e.is_within(day))
        .collect();

    // Working copies clipped to the day; geometry and grouping operate on
    // these, the output carries the originals.
    let clipped: Vec<CalendarEvent> = timed
        .iter()
        .map(|e| {
            let mut c = (*e).clone();
            c.start = c.start.max(day.min);
            c.end = c.end.min(day.max).max(c.start);
            c
        })
        .collect();

    let raw: HashMap<&str, &CalendarEvent> =
        timed.iter().map(|e| (e.id.as_str(), *e)).collect();

    let mut positioned = Vec::with_capacity(clipped.len());
    for group in overlap_groups(&clipped) {
        for (event, position) in layout_group(&group, day, config) {
            let flags = touch_flags(&event, &clipped);
            let original = raw.get(event.id.as_str()).map(|e| (*e).clone()).unwrap_or(event);
            positioned.push(PositionedEvent {
                event: original,
                position,
                touching_top: flags.touching_top,
                touching_bottom: flags.touching_bottom,
            });
        }
    }

    positioned.sort_by(|a, b| {
        a.event
            .start
            .cmp(&b.event.start)
            .then_with(|| a.event.id.cmp(&b.event.id))
    });
    positioned
}
