//! Read-only viewer for exported mind maps. Parses the payload embedded in a
//! static bundle page (or raw JSON) leniently and exposes drag and tooltip
//! interaction only.

pub mod payload;
pub mod viewer;

pub use payload::{parse_payload, ViewerError, ViewerPayload, PAYLOAD_ELEMENT_ID};
pub use viewer::{StaticViewer, ViewerOptions, ViewerState};
