//! Touch detection: boundary-coincidence hints for adjacent events.

use crate::event::CalendarEvent;

/// Boundary-coincidence flags for one event against its day's timed set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TouchFlags {
    /// Another event ends exactly when this one starts.
    pub touching_top: bool,
    /// Another event starts exactly when this one ends.
    pub touching_bottom: bool,
}

/// Compute touch flags for `event` against the full day's timed events.
///
/// Touching is independent of overlap grouping: two non-overlapping but
/// adjacent events still touch. The flags are rendering hints only (e.g.
/// squaring off a shared edge) and carry no layout obligation.
pub fn touch_flags(event: &CalendarEvent, day_events: &[CalendarEvent]) -> TouchFlags {
    let mut flags = TouchFlags::default();

    for other in day_events {
        if other.id == event.id || other.all_day {
            continue;
        }
        if other.end == event.start {
            flags.touching_top = true;
        }
        if other.start == event.end {
            flags.touching_bottom = true;
        }
        if flags.touching_top && flags.touching_bottom {
            break;
        }
    }

    flags
}

// ============================================================================
// Tests
// ============================================================================
