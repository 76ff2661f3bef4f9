//! Event and date-range types for the calendar view core.
//!
//! This module defines the data model shared by the range cache, the fetch
//! coordinator, and the layout engine:
//!
//! - [`CalendarEvent`]: a time-boxed event with stable identity across fetches
//! - [`DateRange`]: a closed time interval used for view windows and cache bounds
//! - [`ViewMode`]: the navigable calendar views, with [`range_for_view`]
//!   computing the window a view displays around an anchor date

mod types;

pub use types::{range_for_view, CalendarEvent, DateRange, ViewMode};
