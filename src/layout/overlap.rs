//! Overlap grouping: partition a day's timed events into maximal groups
//! connected by transitive temporal overlap.

use chrono::{DateTime, Utc};

use crate::event::CalendarEvent;

use super::types::OverlapGroup;

/// Partition events into maximal transitively connected overlap groups.
///
/// Overlap is the strict interval test (`a.start < b.end && b.start < a.end`),
/// so touching events land in separate groups. Connectivity is transitive:
/// if A overlaps B and B overlaps C, all three share a group even when A and
/// C do not overlap directly.
///
/// Events are traversed chronologically (start time, then id), which makes
/// group order and member order deterministic for identical input. A single
/// sweep suffices: sorted by start, a group closes exactly when the next
/// event starts at or after the running maximum end.
///
/// All-day events must be filtered out by the caller; every input event
/// appears in exactly one group.
pub fn overlap_groups(events: &[CalendarEvent]) -> Vec<OverlapGroup> {
    let mut sorted: Vec<&CalendarEvent> = events.iter().collect();
    sorted.sort_by(|a, b| a.start.cmp(&b.start).then_with(|| a.id.cmp(&b.id)));

    let mut groups = Vec::new();
    let mut current: Vec<CalendarEvent> = Vec::new();
    let mut group_end: Option<DateTime<Utc>> = None;

    for event in sorted {
        match group_end {
            Some(end) if event.start < end => {
                current.push(event.clone());
                group_end = Some(end.max(event.end));
            }
            Some(_) => {
                groups.push(OverlapGroup { events: std::mem::take(&mut current) });
                current.push(event.clone());
                group_end = Some(event.end);
            }
            None => {
                current.push(event.clone());
                group_end = Some(event.end);
            }
        }
    }

    if !current.is_empty() {
        groups.push(OverlapGroup { events: current });
    }

    groups
}

// ============================================================================
// Tests
// ============================================================================
