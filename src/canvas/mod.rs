// Canvas module - the shared pixel grid and its point-in-time copies
// The store owns every cell; everything else works on snapshots

pub mod snapshot;
pub mod store;

// Re-export the main canvas types for easy access
pub use snapshot::{CanvasSnapshot, PixelRequest};
pub use store::{CanvasSize, CanvasStore, MAX_CELLS};

/// Color value of one cell. Channel packing is up to the consumer.
pub type Color = i32;
