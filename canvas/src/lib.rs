//! Node/edge geometry, hit-testing and pointer interaction shared by the
//! editor, the PNG exporter and the static viewer.

pub mod geometry;
pub mod interaction;
pub mod scene;

pub use geometry::{Bounds, Hit, Viewport, EDGE_HIT_TOLERANCE, HANDLE_WIDTH, NODE_RADIUS};
pub use interaction::{Canvas, CanvasEvent, InteractionMode, Tooltip};
pub use scene::{EdgeLine, NodeShape, Scene};
