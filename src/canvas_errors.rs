use log::warn;
use std::fmt;
use std::io;
use std::path::PathBuf;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Custom error types for canvas and persistence operations
#[derive(Debug)]
pub enum CanvasError {
    /// Paint coordinates outside the canvas
    OutOfBounds {
        x: i32,
        y: i32,
        width: u32,
        height: u32,
    },
    /// Zero-sized or oversized canvas dimensions
    InvalidDimensions { width: u32, height: u32 },
    /// Snapshot bytes or cells that do not describe a valid canvas
    InvalidSnapshot(String),
    /// Snapshot file could not be read (including not found)
    SnapshotRead { path: PathBuf, source: io::Error },
    /// Snapshot file could not be written
    PersistenceWrite { path: PathBuf, source: io::Error },
    /// Configuration errors
    Config(String),
}

impl fmt::Display for CanvasError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CanvasError::OutOfBounds {
                x,
                y,
                width,
                height,
            } => {
                write!(
                    f,
                    "Pixel ({}, {}) is outside the {}x{} canvas",
                    x, y, width, height
                )
            }
            CanvasError::InvalidDimensions { width, height } => {
                write!(f, "Invalid canvas dimensions {}x{}", width, height)
            }
            CanvasError::InvalidSnapshot(msg) => write!(f, "Invalid snapshot: {}", msg),
            CanvasError::SnapshotRead { path, source } => {
                write!(f, "Failed to read snapshot {}: {}", path.display(), source)
            }
            CanvasError::PersistenceWrite { path, source } => {
                write!(f, "Failed to write snapshot {}: {}", path.display(), source)
            }
            CanvasError::Config(msg) => write!(f, "Configuration error: {}", msg),
        }
    }
}

impl std::error::Error for CanvasError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CanvasError::SnapshotRead { source, .. } => Some(source),
            CanvasError::PersistenceWrite { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<bincode::Error> for CanvasError {
    fn from(err: bincode::Error) -> Self {
        CanvasError::InvalidSnapshot(err.to_string())
    }
}

impl From<serde_json::Error> for CanvasError {
    fn from(err: serde_json::Error) -> Self {
        CanvasError::Config(err.to_string())
    }
}

/// Result type alias for canvas operations
pub type CanvasResult<T> = Result<T, CanvasError>;

/// Shared lock that survives a panicked writer.
///
/// A paint is a single indexed assignment, so the protected cells can never be
/// left half-updated; the poison flag carries no information worth failing on.
pub fn read_lock<'a, T>(lock: &'a RwLock<T>, context: &str) -> RwLockReadGuard<'a, T> {
    lock.read().unwrap_or_else(|poisoned: PoisonError<_>| {
        warn!("⚠️ Recovering poisoned read lock for {}", context);
        poisoned.into_inner()
    })
}

/// Exclusive counterpart of [`read_lock`]
pub fn write_lock<'a, T>(lock: &'a RwLock<T>, context: &str) -> RwLockWriteGuard<'a, T> {
    lock.write().unwrap_or_else(|poisoned: PoisonError<_>| {
        warn!("⚠️ Recovering poisoned write lock for {}", context);
        poisoned.into_inner()
    })
}
