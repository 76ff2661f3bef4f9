//! Timegrid: calendar view core
//!
//! The engine underneath a personal calendar client: day layout geometry
//! for overlapping events, plus an incremental range cache that keeps a
//! partially-fetched remote event window in sync with navigation.
//!
//! # Architecture
//!
//! ```text
//! navigation (view switch, date change, refresh)
//!        │
//!        ▼
//! ┌──────────────────────────────────────────────┐
//! │ FetchCoordinator                             │
//! │  - debounces rapid navigation                │
//! │  - computes missing sub-ranges               │
//! │  - fetches concurrently, supersedes stale    │
//! │    cycles, merges into the RangeCache        │
//! └──────────────────────────────────────────────┘
//!        │ events visible in the requested range
//!        ▼
//! ┌──────────────────────────────────────────────┐
//! │ layout                                       │
//! │  - overlap grouping (transitive closure)     │
//! │  - greedy column packing per group           │
//! │  - touch detection for shared edges          │
//! └──────────────────────────────────────────────┘
//!        │ PositionedEvent geometry
//!        ▼
//!     renderer (out of scope)
//! ```

pub mod cache;
pub mod config;
pub mod coordinator;
pub mod error;
pub mod event;
pub mod layout;
pub mod metrics;
pub mod source;

pub use cache::RangeCache;
pub use config::{Config, FetchConfig, LayoutConfig};
pub use coordinator::{
    FetchCoordinator, FetchCoordinatorBuilder, FetchProgress, RequestOptions,
};
pub use error::{ConfigError, FetchError, Result, TimegridError};
pub use event::{range_for_view, CalendarEvent, DateRange, ViewMode};
pub use layout::{
    layout_day, overlap_groups, pack_columns, touch_flags, ColumnAssignment, EventPosition,
    OverlapGroup, PositionedEvent, TouchFlags,
};
pub use metrics::{get_metrics, HistogramSnapshot, Metrics, MetricsSnapshot};
pub use source::{EventSource, HttpEventSource, SharedEventSource, StaticEventSource};
