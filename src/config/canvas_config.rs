use crate::canvas::CanvasSize;
use crate::canvas_errors::{CanvasError, CanvasResult};
use crate::persistence::PersistenceOptions;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Comprehensive configuration for a canvas host
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CanvasConfig {
    pub canvas: CanvasSizeConfig,
    pub persistence: PersistenceConfig,
    pub display: DisplayConfig,
}

/// Size of a freshly created canvas (a loaded snapshot keeps its own size)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CanvasSizeConfig {
    pub width: u32,
    pub height: u32,
}

impl Default for CanvasSizeConfig {
    fn default() -> Self {
        Self {
            width: 100,
            height: 100,
        }
    }
}

/// Snapshot file and flush cadence
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PersistenceConfig {
    pub snapshot_path: PathBuf,
    /// Seconds between flush attempts
    pub flush_interval_secs: u64,
    /// Re-mark the canvas dirty when a flush fails
    pub rearm_dirty_on_failure: bool,
}

impl Default for PersistenceConfig {
    fn default() -> Self {
        Self {
            snapshot_path: PathBuf::from("map.bin"),
            flush_interval_secs: 15,
            rearm_dirty_on_failure: true,
        }
    }
}

/// Terminal preview size
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    pub preview_cols: usize,
    pub preview_rows: usize,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            preview_cols: 64,
            preview_rows: 32,
        }
    }
}

impl CanvasConfig {
    /// Load configuration from file
    pub fn load_from_file(path: &str) -> CanvasResult<Self> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| CanvasError::Config(format!("cannot read {}: {}", path, e)))?;
        let config: CanvasConfig = serde_json::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to file
    pub fn save_to_file(&self, path: &str) -> CanvasResult<()> {
        let contents = serde_json::to_string_pretty(self)?;
        std::fs::write(path, contents)
            .map_err(|e| CanvasError::Config(format!("cannot write {}: {}", path, e)))?;
        Ok(())
    }

    /// Load configuration from environment variables with fallback to defaults
    pub fn from_env() -> Self {
        Self::default().with_env_overrides()
    }

    /// Apply `PIXEL_BATTLE_*` overrides from the process environment
    pub fn with_env_overrides(mut self) -> Self {
        self.apply_overrides(|key| std::env::var(key).ok());
        self
    }

    /// Apply `PIXEL_BATTLE_*` overrides; unparsable values are ignored
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(width) = lookup("PIXEL_BATTLE_WIDTH").and_then(|v| v.parse().ok()) {
            self.canvas.width = width;
        }
        if let Some(height) = lookup("PIXEL_BATTLE_HEIGHT").and_then(|v| v.parse().ok()) {
            self.canvas.height = height;
        }
        if let Some(path) = lookup("PIXEL_BATTLE_SNAPSHOT_PATH") {
            self.persistence.snapshot_path = PathBuf::from(path);
        }
        if let Some(secs) = lookup("PIXEL_BATTLE_FLUSH_INTERVAL_SECS").and_then(|v| v.parse().ok())
        {
            self.persistence.flush_interval_secs = secs;
        }
        if let Some(rearm) = lookup("PIXEL_BATTLE_REARM_ON_FAILURE")
            .and_then(|v| v.trim().to_lowercase().parse::<bool>().ok())
        {
            self.persistence.rearm_dirty_on_failure = rearm;
        }
    }

    /// Validated default canvas size
    pub fn canvas_size(&self) -> CanvasResult<CanvasSize> {
        CanvasSize::new(self.canvas.width, self.canvas.height)
    }

    /// Get flush interval as Duration
    pub fn flush_interval(&self) -> Duration {
        Duration::from_secs(self.persistence.flush_interval_secs)
    }

    pub fn persistence_options(&self) -> PersistenceOptions {
        PersistenceOptions {
            rearm_dirty_on_failure: self.persistence.rearm_dirty_on_failure,
        }
    }

    /// Validate configuration values
    pub fn validate(&self) -> CanvasResult<()> {
        self.canvas_size()?;

        if self.persistence.flush_interval_secs == 0 {
            return Err(CanvasError::Config(
                "Flush interval must be positive".to_string(),
            ));
        }

        if self.persistence.snapshot_path.as_os_str().is_empty() {
            return Err(CanvasError::Config(
                "Snapshot path must not be empty".to_string(),
            ));
        }

        if self.display.preview_cols == 0 || self.display.preview_rows == 0 {
            return Err(CanvasError::Config(
                "Preview dimensions must be positive".to_string(),
            ));
        }

        Ok(())
    }
}
