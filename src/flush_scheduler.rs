use log::{debug, info};
use std::io;
use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::thread::{self, JoinHandle};
use std::time::Duration;

/// Background thread that runs a tick on a fixed interval until stopped.
///
/// Knows nothing about canvases; hosts hand it a closure that calls
/// `PersistenceManager::flush_if_dirty`.
pub struct FlushScheduler {
    stop_tx: Option<Sender<()>>,
    handle: Option<JoinHandle<()>>,
    interval: Duration,
}

impl FlushScheduler {
    /// Start ticking every `interval`; the first tick fires one interval from now
    pub fn start<F>(interval: Duration, mut tick: F) -> io::Result<Self>
    where
        F: FnMut() + Send + 'static,
    {
        let (stop_tx, stop_rx) = mpsc::channel::<()>();
        let handle = thread::Builder::new()
            .name("canvas-flush".to_string())
            .spawn(move || loop {
                match stop_rx.recv_timeout(interval) {
                    Err(RecvTimeoutError::Timeout) => tick(),
                    Ok(()) | Err(RecvTimeoutError::Disconnected) => {
                        debug!("Flush scheduler thread exiting");
                        break;
                    }
                }
            })?;

        info!("⏱️ Flush scheduler started ({:?} interval)", interval);
        Ok(Self {
            stop_tx: Some(stop_tx),
            handle: Some(handle),
            interval,
        })
    }

    /// Get the configured interval
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Check if the scheduler thread is still running
    pub fn is_running(&self) -> bool {
        self.handle
            .as_ref()
            .map(|handle| !handle.is_finished())
            .unwrap_or(false)
    }

    /// Stop ticking and wait for an in-flight tick to finish
    pub fn stop(mut self) {
        self.shutdown();
    }

    fn shutdown(&mut self) {
        if let Some(stop_tx) = self.stop_tx.take() {
            let _ = stop_tx.send(());
        }
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for FlushScheduler {
    fn drop(&mut self) {
        self.shutdown();
    }
}
