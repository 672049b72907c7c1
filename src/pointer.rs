mod registry;
mod state;

pub use registry::{PointerHandle, PointerRegistry};
pub use state::{PointerCallback, PointerHandlers, PointerState, Rect};
