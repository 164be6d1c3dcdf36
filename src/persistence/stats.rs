use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use std::time::Duration;

/// Point-in-time view of flush activity
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FlushStatsSnapshot {
    /// Flushes that wrote a snapshot
    pub written: u64,
    /// Flushes skipped because nothing changed
    pub skipped_clean: u64,
    /// Flushes whose encode or write failed
    pub failed: u64,
    /// Size of the last snapshot written
    pub last_written_bytes: u64,
    /// Time spent encoding and writing the last snapshot
    pub last_write_duration: Duration,
}

/// Counters updated by every flush
#[derive(Debug, Default)]
pub struct FlushStats {
    written: AtomicU64,
    skipped_clean: AtomicU64,
    failed: AtomicU64,
    last_written_bytes: AtomicU64,
    last_write_duration: Mutex<Duration>,
}

impl FlushStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_skipped(&self) {
        self.skipped_clean.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_failed(&self) {
        self.failed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_written(&self, bytes: usize, elapsed: Duration) {
        self.written.fetch_add(1, Ordering::Relaxed);
        self.last_written_bytes.store(bytes as u64, Ordering::Relaxed);
        if let Ok(mut last) = self.last_write_duration.lock() {
            *last = elapsed;
        }
    }

    pub fn snapshot(&self) -> FlushStatsSnapshot {
        FlushStatsSnapshot {
            written: self.written.load(Ordering::Relaxed),
            skipped_clean: self.skipped_clean.load(Ordering::Relaxed),
            failed: self.failed.load(Ordering::Relaxed),
            last_written_bytes: self.last_written_bytes.load(Ordering::Relaxed),
            last_write_duration: self
                .last_write_duration
                .lock()
                .map(|last| *last)
                .unwrap_or_default(),
        }
    }
}
