use pixel_battle::canvas_display::{print_canvas, CanvasDisplayConfig};
use pixel_battle::persistence::decode_snapshot;
use pixel_battle::{CanvasConfig, CanvasStore, FlushScheduler, PersistenceManager};
use rand::Rng;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{mpsc, Arc};
use std::thread;
use std::time::{Duration, Instant};

const BANNER: &str = r#"
  ┌─┐┬─┐ ┬┌─┐┬    ┌┐ ┌─┐┌┬┐┌┬┐┬  ┌─┐
  ├─┘│┌┴┬┘├┤ │    ├┴┐├─┤ │  │ │  ├┤
  ┴  ┴┴ └─└─┘┴─┘  └─┘┴ ┴ ┴  ┴ ┴─┘└─┘
"#;

type Host = (Arc<CanvasStore>, Arc<PersistenceManager>);

/// Load configuration from an optional JSON file, then apply environment overrides
fn load_config(path: Option<&str>) -> Result<CanvasConfig, Box<dyn std::error::Error>> {
    let config = match path {
        Some(path) => CanvasConfig::load_from_file(path)?.with_env_overrides(),
        None => CanvasConfig::from_env(),
    };
    config.validate()?;
    Ok(config)
}

/// Restore the canvas and start flushing it on the configured interval
fn open_canvas(config: &CanvasConfig) -> Result<(Host, FlushScheduler), Box<dyn std::error::Error>> {
    let manager = Arc::new(
        PersistenceManager::with_file(&config.persistence.snapshot_path)
            .with_options(config.persistence_options()),
    );
    let store = Arc::new(manager.load(config.canvas_size()?));
    println!(
        "📊 Canvas ready: {}x{} ({} cells)",
        store.width(),
        store.height(),
        store.cell_count()
    );

    let tick_store = store.clone();
    let tick_manager = manager.clone();
    let scheduler = FlushScheduler::start(config.flush_interval(), move || {
        tick_manager.flush_if_dirty(&tick_store);
    })?;

    Ok(((store, manager), scheduler))
}

/// Stop the scheduler and persist whatever it has not written yet
fn close_canvas((store, manager): &Host, scheduler: FlushScheduler) {
    scheduler.stop();
    manager.flush_if_dirty(store);
    let stats = manager.stats();
    println!(
        "💾 Flushes: {} written, {} skipped, {} failed (last {} bytes in {:?})",
        stats.written,
        stats.skipped_clean,
        stats.failed,
        stats.last_written_bytes,
        stats.last_write_duration
    );
}

fn display_config(config: &CanvasConfig) -> CanvasDisplayConfig {
    CanvasDisplayConfig {
        max_cols: config.display.preview_cols,
        max_rows: config.display.preview_rows,
        show_headers: true,
    }
}

/// Host the canvas until Ctrl+C
fn run(config_path: Option<&str>) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", BANNER);
    let config = load_config(config_path)?;
    let (host, scheduler) = open_canvas(&config)?;

    let (shutdown_tx, shutdown_rx) = mpsc::channel();
    ctrlc::set_handler(move || {
        let _ = shutdown_tx.send(());
    })?;

    println!(
        "🚀 Persisting to {} every {:?} - press Ctrl+C to stop",
        config.persistence.snapshot_path.display(),
        config.flush_interval()
    );
    let _ = shutdown_rx.recv();

    println!("\n🛑 Shutdown requested - flushing canvas...");
    close_canvas(&host, scheduler);
    Ok(())
}

/// Host the canvas with random painters for a fixed time
fn simulate(painters: usize, seconds: u64) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", BANNER);
    let config = load_config(None)?;
    let (host, scheduler) = open_canvas(&config)?;
    let (store, _) = &host;

    let running = Arc::new(AtomicBool::new(true));
    let accepted = Arc::new(AtomicU64::new(0));
    let rejected = Arc::new(AtomicU64::new(0));

    {
        let running = running.clone();
        ctrlc::set_handler(move || running.store(false, Ordering::SeqCst))?;
    }

    println!("🎨 Starting {} painters for {}s", painters, seconds);
    let handles: Vec<_> = (0..painters)
        .map(|_| {
            let store = store.clone();
            let running = running.clone();
            let accepted = accepted.clone();
            let rejected = rejected.clone();
            thread::spawn(move || {
                let mut rng = rand::thread_rng();
                // A few percent of the paints land just off the canvas
                let max_x = store.width() as i32 + 2;
                let max_y = store.height() as i32 + 2;
                while running.load(Ordering::Relaxed) {
                    let x = rng.gen_range(-2..max_x);
                    let y = rng.gen_range(-2..max_y);
                    let color = rng.gen_range(0..=0x00FF_FFFF);
                    if store.paint(x, y, color) {
                        accepted.fetch_add(1, Ordering::Relaxed);
                    } else {
                        rejected.fetch_add(1, Ordering::Relaxed);
                    }
                    thread::sleep(Duration::from_micros(200));
                }
            })
        })
        .collect();

    let started = Instant::now();
    while running.load(Ordering::SeqCst) && started.elapsed() < Duration::from_secs(seconds) {
        thread::sleep(Duration::from_millis(100));
    }
    running.store(false, Ordering::SeqCst);
    for handle in handles {
        let _ = handle.join();
    }

    println!(
        "✅ {} paints accepted, {} rejected in {:?}",
        accepted.load(Ordering::Relaxed),
        rejected.load(Ordering::Relaxed),
        started.elapsed()
    );
    close_canvas(&host, scheduler);
    print_canvas(&store.snapshot(), &display_config(&config), Some("Simulated canvas"));
    Ok(())
}

/// Decode a snapshot file and show what is in it
fn inspect(path: Option<&str>) -> Result<(), Box<dyn std::error::Error>> {
    let config = load_config(None)?;
    let path = path
        .map(std::path::PathBuf::from)
        .unwrap_or_else(|| config.persistence.snapshot_path.clone());

    let bytes = std::fs::read(&path)?;
    let snapshot = decode_snapshot(&bytes)?;
    println!("📂 {} ({} bytes)", path.display(), bytes.len());
    print_canvas(&snapshot, &display_config(&config), Some("Stored canvas"));
    Ok(())
}

fn show_help() {
    println!("{}", BANNER);
    println!("Usage: pixel_battle [command]");
    println!();
    println!("Commands:");
    println!("  run [config.json]            Host the canvas and flush it periodically (default)");
    println!("  simulate [painters] [secs]   Host the canvas with random painters");
    println!("  inspect [snapshot]           Print a stored snapshot");
    println!("  help                         Show this help message");
    println!();
    println!("Environment:");
    println!("  PIXEL_BATTLE_WIDTH / PIXEL_BATTLE_HEIGHT      Size of a new canvas");
    println!("  PIXEL_BATTLE_SNAPSHOT_PATH                    Snapshot file (default map.bin)");
    println!("  PIXEL_BATTLE_FLUSH_INTERVAL_SECS              Flush cadence (default 15)");
    println!("  PIXEL_BATTLE_REARM_ON_FAILURE                 Retry failed flushes (default true)");
    println!("  RUST_LOG                                      Log filter (default info)");
    println!();
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args: Vec<String> = std::env::args().collect();
    let arg = |index: usize| args.get(index).map(|s| s.as_str());

    match arg(1) {
        Some("help") | Some("-h") | Some("--help") => {
            show_help();
            Ok(())
        }
        Some("run") => run(arg(2)),
        None => run(None),
        Some("simulate") => {
            let painters = arg(2).and_then(|v| v.parse().ok()).unwrap_or(8);
            let seconds = arg(3).and_then(|v| v.parse().ok()).unwrap_or(10);
            simulate(painters, seconds)
        }
        Some("inspect") => inspect(arg(2)),
        Some(unknown) => {
            println!("❌ Unknown command: {}", unknown);
            println!("Run 'pixel_battle help' for usage information");
            Ok(())
        }
    }
}
