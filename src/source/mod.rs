//! Event sources: the transport seam between the fetch coordinator and a
//! remote calendar backend.
//!
//! # Sources
//!
//! - [`HttpEventSource`]: fetches events over HTTP from a
//!   `GET /events?timeMin=..&timeMax=..` endpoint returning
//!   `{ "events": [...] }`.
//!
//! - [`StaticEventSource`]: serves a fixed in-memory event set filtered to
//!   the requested range. Used for server-rendered defaults, offline
//!   operation, and as the controllable source in tests.

mod http;
mod memory;
mod traits;

pub use http::HttpEventSource;
pub use memory::StaticEventSource;
pub use traits::{EventSource, SharedEventSource};
