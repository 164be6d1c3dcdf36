// Persistence - moves canvas snapshots between the store and durable storage
// Loading never fails; flushing never propagates an error

pub mod codec;
pub mod stats;
pub mod storage;

pub use codec::{decode_snapshot, encode_snapshot, SNAPSHOT_FORMAT_VERSION, SNAPSHOT_MAGIC};
pub use stats::{FlushStats, FlushStatsSnapshot};
pub use storage::{FileStorage, MemoryStorage, SnapshotStorage};

use crate::canvas::{CanvasSize, CanvasSnapshot, CanvasStore};
use crate::canvas_errors::{CanvasError, CanvasResult};
use log::{debug, error, info, warn};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Instant;

/// Behaviour switches for the persistence manager
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PersistenceOptions {
    /// Mark the canvas dirty again when a flush fails, so the next cycle retries
    pub rearm_dirty_on_failure: bool,
}

impl Default for PersistenceOptions {
    fn default() -> Self {
        Self {
            rearm_dirty_on_failure: true,
        }
    }
}

/// What a call to [`PersistenceManager::flush_if_dirty`] did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlushOutcome {
    /// Nothing changed since the last flush; no I/O
    Clean,
    /// A snapshot of this many bytes was written
    Written { bytes: usize },
    /// Encoding or writing failed; the error was logged
    Failed,
}

pub struct PersistenceManager<S: SnapshotStorage = FileStorage> {
    storage: S,
    path: PathBuf,
    options: PersistenceOptions,
    stats: FlushStats,
    // Held from snapshot to write so files land in snapshot order
    flush_lock: Mutex<()>,
}

impl PersistenceManager<FileStorage> {
    /// Persist to a file on local disk
    pub fn with_file(path: impl Into<PathBuf>) -> Self {
        Self::new(FileStorage, path)
    }
}

impl<S: SnapshotStorage> PersistenceManager<S> {
    pub fn new(storage: S, path: impl Into<PathBuf>) -> Self {
        Self {
            storage,
            path: path.into(),
            options: PersistenceOptions::default(),
            stats: FlushStats::new(),
            flush_lock: Mutex::new(()),
        }
    }

    pub fn with_options(mut self, options: PersistenceOptions) -> Self {
        self.options = options;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn options(&self) -> PersistenceOptions {
        self.options
    }

    pub fn stats(&self) -> FlushStatsSnapshot {
        self.stats.snapshot()
    }

    /// Read and decode the stored snapshot without any fallback
    pub fn read_snapshot(&self) -> CanvasResult<CanvasSnapshot> {
        let bytes = self
            .storage
            .read(&self.path)
            .map_err(|source| CanvasError::SnapshotRead {
                path: self.path.clone(),
                source,
            })?;
        decode_snapshot(&bytes)
    }

    /// Restore the canvas from storage, or start blank at `default_size`.
    ///
    /// A missing or unreadable snapshot is expected on first start and after
    /// corruption; it is logged and never reaches the caller.
    pub fn load(&self, default_size: CanvasSize) -> CanvasStore {
        match self.read_snapshot().and_then(CanvasStore::from_snapshot) {
            Ok(store) => {
                info!(
                    "📂 Loaded {}x{} canvas from {}",
                    store.width(),
                    store.height(),
                    self.path.display()
                );
                store
            }
            Err(err) => {
                warn!(
                    "⚠️ Load failed, starting with a blank {}x{} canvas. {}",
                    default_size.width(),
                    default_size.height(),
                    err
                );
                CanvasStore::blank(default_size)
            }
        }
    }

    /// Persist the canvas if anything was painted since the last flush.
    ///
    /// The dirty flag is cleared before the copy is taken, so a paint racing
    /// with the flush is either in this snapshot or re-marks the canvas dirty.
    /// The write itself happens after the canvas lock is released, so paints
    /// are not blocked by I/O. Flushes run one at a time, which keeps the
    /// stored file in snapshot order.
    pub fn flush_if_dirty(&self, store: &CanvasStore) -> FlushOutcome {
        // Overlapping flushes would otherwise let an older snapshot land last
        let _flushing = self
            .flush_lock
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        let Some(snapshot) = store.take_dirty_snapshot() else {
            debug!("Canvas unchanged, skipping flush");
            self.stats.record_skipped();
            return FlushOutcome::Clean;
        };

        let started = Instant::now();
        match self.write_snapshot(&snapshot) {
            Ok(bytes) => {
                self.stats.record_written(bytes, started.elapsed());
                info!("💾 Canvas saved to {} ({} bytes)", self.path.display(), bytes);
                FlushOutcome::Written { bytes }
            }
            Err(err) => {
                self.stats.record_failed();
                error!("❌ {}", err);
                if self.options.rearm_dirty_on_failure {
                    store.mark_dirty();
                }
                FlushOutcome::Failed
            }
        }
    }

    fn write_snapshot(&self, snapshot: &CanvasSnapshot) -> CanvasResult<usize> {
        let bytes = encode_snapshot(snapshot)?;
        self.storage
            .write(&self.path, &bytes)
            .map_err(|source| CanvasError::PersistenceWrite {
                path: self.path.clone(),
                source,
            })?;
        Ok(bytes.len())
    }
}
