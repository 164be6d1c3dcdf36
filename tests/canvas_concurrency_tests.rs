//! Concurrent painters, readers and flushes against one canvas
use pixel_battle::{
    CanvasSize, CanvasStore, FlushOutcome, MemoryStorage, PersistenceManager, SnapshotStorage,
};
use std::io;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{mpsc, Arc, Barrier, Mutex};
use std::thread;
use std::time::Duration;

fn canvas(width: u32, height: u32) -> Arc<CanvasStore> {
    Arc::new(CanvasStore::blank(CanvasSize::new(width, height).unwrap()))
}

#[test]
fn test_concurrent_disjoint_writes() {
    const THREADS: u32 = 8;
    let store = canvas(64, 64);
    let barrier = Arc::new(Barrier::new(THREADS as usize));

    let handles: Vec<_> = (0..THREADS)
        .map(|t| {
            let store = store.clone();
            let barrier = barrier.clone();
            thread::spawn(move || {
                barrier.wait();
                // Thread t owns every row y with y % THREADS == t
                for y in (t..64).step_by(THREADS as usize) {
                    for x in 0..64 {
                        assert!(store.paint(x as i32, y as i32, (y * 64 + x) as i32 + 1));
                    }
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    let snapshot = store.snapshot();
    for (index, &color) in snapshot.cells.iter().enumerate() {
        assert_eq!(color, index as i32 + 1, "cell {} lost its write", index);
    }
}

#[test]
fn test_readers_never_see_torn_cells() {
    let store = canvas(32, 32);
    let running = Arc::new(AtomicBool::new(true));
    // Painters only ever write one of these two values
    let patterns = [0x0F0F_0F0F_i32, -0x0F0F_0F10_i32];

    let writer = {
        let store = store.clone();
        let running = running.clone();
        thread::spawn(move || {
            let mut round = 0usize;
            while running.load(Ordering::Relaxed) {
                let color = patterns[round % 2];
                for y in 0..32 {
                    for x in 0..32 {
                        store.paint(x, y, color);
                    }
                }
                round += 1;
            }
        })
    };

    let readers: Vec<_> = (0..4)
        .map(|_| {
            let store = store.clone();
            thread::spawn(move || {
                for _ in 0..200 {
                    let snapshot = store.snapshot();
                    assert_eq!(snapshot.cells.len(), 32 * 32);
                    assert!(snapshot
                        .cells
                        .iter()
                        .all(|c| *c == 0 || patterns.contains(c)));
                }
            })
        })
        .collect();

    for reader in readers {
        reader.join().unwrap();
    }
    running.store(false, Ordering::Relaxed);
    writer.join().unwrap();
}

#[test]
fn test_write_visible_to_later_snapshot() {
    let store = canvas(10, 10);
    for i in 0..100 {
        let (x, y) = (i % 10, i / 10);
        assert!(store.paint(x, y, i));
        assert_eq!(store.snapshot().cells[(y * 10 + x) as usize], i);
    }
}

#[test]
fn test_paints_during_flushes_are_never_lost() {
    let store = canvas(16, 16);
    let manager = Arc::new(PersistenceManager::new(MemoryStorage::new(), "map.bin"));
    let running = Arc::new(AtomicBool::new(true));

    let flusher = {
        let store = store.clone();
        let manager = manager.clone();
        let running = running.clone();
        thread::spawn(move || {
            while running.load(Ordering::Relaxed) {
                manager.flush_if_dirty(&store);
            }
        })
    };

    let painters: Vec<_> = (0..4)
        .map(|t| {
            let store = store.clone();
            thread::spawn(move || {
                for y in (t..16).step_by(4) {
                    for x in 0..16 {
                        store.paint(x, y, x * 100 + y + 1);
                    }
                }
            })
        })
        .collect();
    for painter in painters {
        painter.join().unwrap();
    }
    running.store(false, Ordering::Relaxed);
    flusher.join().unwrap();

    // Whatever the flusher raced with, one more flush brings storage up to date
    manager.flush_if_dirty(&store);
    let stored = manager.read_snapshot().expect("at least one flush happened");
    assert_eq!(stored, store.snapshot());
    assert_eq!(manager.flush_if_dirty(&store), FlushOutcome::Clean);
}

#[test]
fn test_only_one_concurrent_flusher_writes() {
    let store = canvas(4, 4);
    store.paint(0, 0, 1);
    let manager = Arc::new(PersistenceManager::new(MemoryStorage::new(), "map.bin"));
    let barrier = Arc::new(Barrier::new(8));

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let store = store.clone();
            let manager = manager.clone();
            let barrier = barrier.clone();
            thread::spawn(move || {
                barrier.wait();
                manager.flush_if_dirty(&store)
            })
        })
        .collect();
    let outcomes: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();

    let written = outcomes
        .iter()
        .filter(|o| matches!(o, FlushOutcome::Written { .. }))
        .count();
    assert_eq!(written, 1);
    assert_eq!(manager.storage().write_count(), 1);
}

/// Storage whose first write waits until the test lets it through
struct GatedStorage {
    inner: MemoryStorage,
    first_write: Mutex<Option<(mpsc::Sender<()>, mpsc::Receiver<()>)>>,
}

impl SnapshotStorage for GatedStorage {
    fn read(&self, path: &Path) -> io::Result<Vec<u8>> {
        self.inner.read(path)
    }

    fn write(&self, path: &Path, bytes: &[u8]) -> io::Result<()> {
        let gate = self.first_write.lock().unwrap().take();
        if let Some((entered_tx, release_rx)) = gate {
            entered_tx.send(()).unwrap();
            release_rx.recv().unwrap();
        }
        self.inner.write(path, bytes)
    }
}

#[test]
fn test_overlapping_flushes_keep_newest_snapshot() {
    let (entered_tx, entered_rx) = mpsc::channel();
    let (release_tx, release_rx) = mpsc::channel();
    let storage = GatedStorage {
        inner: MemoryStorage::new(),
        first_write: Mutex::new(Some((entered_tx, release_rx))),
    };
    let manager = Arc::new(PersistenceManager::new(storage, "map.bin"));
    let store = canvas(2, 2);

    store.paint(0, 0, 1);
    let slow_flush = {
        let store = store.clone();
        let manager = manager.clone();
        thread::spawn(move || manager.flush_if_dirty(&store))
    };
    entered_rx.recv().unwrap();

    // The first flush is stuck writing [1, 0, 0, 0]; paint over it and flush again
    store.paint(0, 0, 2);
    let second_flush = {
        let store = store.clone();
        let manager = manager.clone();
        thread::spawn(move || manager.flush_if_dirty(&store))
    };
    thread::sleep(Duration::from_millis(50));
    release_tx.send(()).unwrap();

    assert!(matches!(
        slow_flush.join().unwrap(),
        FlushOutcome::Written { .. }
    ));
    assert!(matches!(
        second_flush.join().unwrap(),
        FlushOutcome::Written { .. }
    ));

    let stored = manager.read_snapshot().unwrap();
    assert_eq!(stored.cells, store.snapshot().cells);
    assert_eq!(stored.cells, vec![2, 0, 0, 0]);
    assert!(!store.is_dirty());
    assert_eq!(manager.flush_if_dirty(&store), FlushOutcome::Clean);
}
