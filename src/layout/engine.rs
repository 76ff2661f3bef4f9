//! Column packing and geometry for one overlap group.

use chrono::{DateTime, Utc};

use crate::config::LayoutConfig;
use crate::event::{CalendarEvent, DateRange};

use super::types::{EventPosition, OverlapGroup};

/// Column assignment for one overlap group.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnAssignment {
    /// Events in packing order (start time, longer duration first, id).
    pub events: Vec<CalendarEvent>,
    /// Column index per event, parallel to `events`.
    pub columns: Vec<usize>,
    /// Total number of columns used by the group.
    pub column_count: usize,
}

/// Greedy first-fit column packing.
///
/// Events are sorted by start time with longer duration first as tie-break
/// (id as final tie-break), then each is placed in the lowest-numbered
/// column whose previously assigned events all end at or before its start.
/// Sorted by start, only each column's latest end matters, so one running
/// end per column suffices. This uses exactly as many columns as the
/// maximum number of simultaneously active events in the group.
pub fn pack_columns(group: &OverlapGroup) -> ColumnAssignment {
    let mut events = group.events.clone();
    events.sort_by(|a, b| {
        a.start
            .cmp(&b.start)
            .then_with(|| b.duration().cmp(&a.duration()))
            .then_with(|| a.id.cmp(&b.id))
    });

    let mut columns = Vec::with_capacity(events.len());
    let mut column_ends: Vec<DateTime<Utc>> = Vec::new();

    for event in &events {
        let slot = column_ends.iter().position(|end| *end <= event.start);
        match slot {
            Some(column) => {
                column_ends[column] = event.end;
                columns.push(column);
            }
            None => {
                columns.push(column_ends.len());
                column_ends.push(event.end);
            }
        }
    }

    ColumnAssignment {
        events,
        columns,
        column_count: column_ends.len().max(1),
    }
}

/// Geometry for one event given its column assignment.
///
/// Vertical position comes from minutes since the day's start at the
/// configured pixels-per-minute scale, clamped to the day's pixel bounds.
/// Fractional pixels are preserved. Horizontal position divides the group's
/// width evenly across its columns.
pub fn position_for(
    event: &CalendarEvent,
    column: usize,
    column_count: usize,
    day: &DateRange,
    config: &LayoutConfig,
) -> EventPosition {
    let day_height = config.day_minutes as f32 * config.pixels_per_minute;

    let start_minutes = (event.start - day.min).num_seconds() as f32 / 60.0;
    let end_minutes = (event.end - day.min).num_seconds() as f32 / 60.0;

    let top = (start_minutes * config.pixels_per_minute).clamp(0.0, day_height);
    let bottom = (end_minutes * config.pixels_per_minute).clamp(0.0, day_height);

    let width_percent = 100.0 / column_count as f32;
    let left_percent = column as f32 * width_percent;

    EventPosition {
        top,
        height: bottom - top,
        left_percent,
        width_percent,
    }
}

/// Pack a group and compute each member's geometry.
pub fn layout_group(
    group: &OverlapGroup,
    day: &DateRange,
    config: &LayoutConfig,
) -> Vec<(CalendarEvent, EventPosition)> {
    let ColumnAssignment {
        events,
        columns,
        column_count,
    } = pack_columns(group);

    events
        .into_iter()
        .zip(columns)
        .map(|(event, column)| {
            let position = position_for(&event, column, column_count, day, config);
            (event, position)
        })
        .collect()
}

// ============================================================================
// Tests
// ============================================================================
