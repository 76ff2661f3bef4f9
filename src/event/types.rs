//! Core event and date-range types.

use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

// ============================================================================
// Calendar Event
// ============================================================================

/// A calendar event as known to the view core.
///
/// Identity is carried by `id`: two events with the same id are the same
/// event for merge purposes, and later-fetched data wins. Fields the
/// renderer needs but the core ignores travel in `extra`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct CalendarEvent {
    /// Unique identifier, stable across fetches.
    pub id: String,
    /// Event title.
    #[serde(default)]
    pub title: String,
    /// Start instant.
    pub start: DateTime<Utc>,
    /// End instant. Always `>= start`.
    pub end: DateTime<Utc>,
    /// Whether this is an all-day event. All-day events are excluded from
    /// timed layout and touch detection.
    #[serde(default)]
    pub all_day: bool,
    /// Opaque display color. Irrelevant to layout.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    /// Opaque passthrough fields for the renderer.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl CalendarEvent {
    /// Create a new event. An `end` earlier than `start` is clamped to
    /// `start`, yielding an instantaneous event.
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            start,
            end: end.max(start),
            all_day: false,
            color: None,
            extra: serde_json::Map::new(),
        }
    }

    /// Set the display color.
    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = Some(color.into());
        self
    }

    /// Mark as an all-day event.
    pub fn all_day_event(mut self) -> Self {
        self.all_day = true;
        self
    }

    /// Attach an opaque passthrough field.
    pub fn with_extra(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.extra.insert(key.into(), value);
        self
    }

    /// Duration of the event.
    pub fn duration(&self) -> Duration {
        self.end - self.start
    }

    /// Strict interval-overlap test: touching events do not overlap.
    pub fn overlaps_with(&self, other: &CalendarEvent) -> bool {
        self.start < other.end && other.start < self.end
    }

    /// Whether the event falls within a range (inclusive interval overlap,
    /// so events touching a range boundary are included).
    pub fn is_within(&self, range: &DateRange) -> bool {
        self.start <= range.max && self.end >= range.min
    }
}

// ============================================================================
// Date Range
// ============================================================================

/// A closed time interval `[min, max]` with `min <= max`.
///
/// Used both for requested view windows and for the cache's known-fetched
/// bound.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct DateRange {
    /// Inclusive lower bound.
    pub min: DateTime<Utc>,
    /// Inclusive upper bound.
    pub max: DateTime<Utc>,
}

impl DateRange {
    /// Create a range, swapping the bounds if given in reverse order.
    pub fn new(min: DateTime<Utc>, max: DateTime<Utc>) -> Self {
        if min <= max {
            Self { min, max }
        } else {
            Self { min: max, max: min }
        }
    }

    /// Whether `other` lies entirely within this range.
    pub fn contains(&self, other: &DateRange) -> bool {
        other.min >= self.min && other.max <= self.max
    }

    /// Whether an instant lies within this range.
    pub fn contains_instant(&self, instant: DateTime<Utc>) -> bool {
        instant >= self.min && instant <= self.max
    }

    /// Whether the two ranges share any instant.
    pub fn overlaps(&self, other: &DateRange) -> bool {
        self.min <= other.max && other.min <= self.max
    }

    /// Bounding box of the two ranges.
    pub fn union(&self, other: &DateRange) -> DateRange {
        DateRange {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }

    /// Overlapping portion of the two ranges, if any.
    pub fn intersect(&self, other: &DateRange) -> Option<DateRange> {
        let min = self.min.max(other.min);
        let max = self.max.min(other.max);
        (min <= max).then_some(DateRange { min, max })
    }

    /// Length of the range.
    pub fn duration(&self) -> Duration {
        self.max - self.min
    }
}

impl std::fmt::Display for DateRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}, {}]", self.min.to_rfc3339(), self.max.to_rfc3339())
    }
}

// ============================================================================
// View Modes
// ============================================================================

/// The navigable calendar views.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum ViewMode {
    Day,
    Week,
    Month,
    Year,
}

/// Compute the date range a view displays around an anchor date.
///
/// Weeks start on Monday. All ranges span whole days, from midnight of the
/// first day to the last second of the final day.
pub fn range_for_view(mode: ViewMode, anchor: DateTime<Utc>) -> DateRange {
    let date = anchor.date_naive();
    match mode {
        ViewMode::Day => span_days(date, date),
        ViewMode::Week => {
            let monday = date - Duration::days(date.weekday().num_days_from_monday() as i64);
            span_days(monday, monday + Duration::days(6))
        }
        ViewMode::Month => {
            let first = date.with_day(1).unwrap_or(date);
            span_days(first, last_day_of_month(first))
        }
        ViewMode::Year => {
            let jan1 = NaiveDate::from_ymd_opt(date.year(), 1, 1).unwrap_or(date);
            let dec31 = NaiveDate::from_ymd_opt(date.year(), 12, 31).unwrap_or(date);
            span_days(jan1, dec31)
        }
    }
}

fn span_days(first: NaiveDate, last: NaiveDate) -> DateRange {
    let min = first
        .and_hms_opt(0, 0, 0)
        .unwrap_or_default()
        .and_utc();
    let max = last
        .and_hms_opt(23, 59, 59)
        .unwrap_or_default()
        .and_utc();
    DateRange::new(min, max)
}

fn last_day_of_month(first: NaiveDate) -> NaiveDate {
    let next_month = if first.month() == 12 {
        NaiveDate::from_ymd_opt(first.year() + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(first.year(), first.month() + 1, 1)
    };
    next_month
        .map(|d| d - Duration::days(1))
        .unwrap_or(first)
}

// ============================================================================
// Tests
// ============================================================================
