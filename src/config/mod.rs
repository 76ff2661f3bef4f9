//! Configuration for the timegrid calendar core.

mod settings;

pub use settings::{Config, FetchConfig, LayoutConfig};
