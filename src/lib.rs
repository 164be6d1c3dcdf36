//! Shared pixel canvas with periodic snapshot persistence.
//!
//! A [`CanvasStore`] is painted cell by cell from many threads and read as
//! whole-canvas snapshots. A [`PersistenceManager`] restores it at start-up
//! and writes it back whenever it has changed; something outside the core
//! (for example a [`FlushScheduler`]) decides when.

pub mod canvas;
pub mod canvas_display;
pub mod canvas_errors;
pub mod config;
pub mod flush_scheduler;
pub mod persistence;

pub use canvas::{CanvasSize, CanvasSnapshot, CanvasStore, Color, PixelRequest};
pub use canvas_errors::{CanvasError, CanvasResult};
pub use config::CanvasConfig;
pub use flush_scheduler::FlushScheduler;
pub use persistence::{
    FileStorage, FlushOutcome, MemoryStorage, PersistenceManager, PersistenceOptions,
    SnapshotStorage,
};
