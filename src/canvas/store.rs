// Canvas Store - fixed-size pixel grid shared by painters, readers and the persister
// One RwLock guards the cells and the dirty flag together

use super::{CanvasSnapshot, Color, PixelRequest};
use crate::canvas_errors::{read_lock, write_lock, CanvasError, CanvasResult};
use log::trace;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::RwLock;

/// Largest canvas accepted from configuration or a snapshot file (256 MiB of cells)
pub const MAX_CELLS: usize = 1 << 26;

/// Validated canvas dimensions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CanvasSize {
    width: u32,
    height: u32,
}

impl CanvasSize {
    pub fn new(width: u32, height: u32) -> CanvasResult<Self> {
        let cells = (width as usize).checked_mul(height as usize);
        match cells {
            Some(count) if count > 0 && count <= MAX_CELLS => Ok(Self { width, height }),
            _ => Err(CanvasError::InvalidDimensions { width, height }),
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn cell_count(&self) -> usize {
        self.width as usize * self.height as usize
    }
}

struct CanvasState {
    cells: Vec<Color>,
    // Atomic so the persister can clear it while holding only the shared lock
    dirty: AtomicBool,
}

pub struct CanvasStore {
    size: CanvasSize,
    state: RwLock<CanvasState>,
}

impl CanvasStore {
    /// Create a canvas with every cell set to 0
    pub fn blank(size: CanvasSize) -> Self {
        Self::from_parts(size, vec![0; size.cell_count()])
    }

    /// Create a canvas from existing cells, which must cover `width * height` exactly
    pub fn with_cells(width: u32, height: u32, cells: Vec<Color>) -> CanvasResult<Self> {
        let size = CanvasSize::new(width, height)?;
        if cells.len() != size.cell_count() {
            return Err(CanvasError::InvalidSnapshot(format!(
                "{}x{} canvas needs {} cells, got {}",
                width,
                height,
                size.cell_count(),
                cells.len()
            )));
        }
        Ok(Self::from_parts(size, cells))
    }

    /// Rebuild a canvas from a decoded snapshot
    pub fn from_snapshot(snapshot: CanvasSnapshot) -> CanvasResult<Self> {
        Self::with_cells(snapshot.width, snapshot.height, snapshot.cells)
    }

    fn from_parts(size: CanvasSize, cells: Vec<Color>) -> Self {
        Self {
            size,
            state: RwLock::new(CanvasState {
                cells,
                dirty: AtomicBool::new(false),
            }),
        }
    }

    pub fn size(&self) -> CanvasSize {
        self.size
    }

    pub fn width(&self) -> u32 {
        self.size.width
    }

    pub fn height(&self) -> u32 {
        self.size.height
    }

    pub fn cell_count(&self) -> usize {
        self.size.cell_count()
    }

    /// Map (x, y) to a cell index, rejecting anything off the canvas
    pub fn validate_coordinates(&self, x: i32, y: i32) -> CanvasResult<usize> {
        if x < 0 || y < 0 || x as u32 >= self.size.width || y as u32 >= self.size.height {
            return Err(CanvasError::OutOfBounds {
                x,
                y,
                width: self.size.width,
                height: self.size.height,
            });
        }
        Ok(y as usize * self.size.width as usize + x as usize)
    }

    /// Set one cell. Returns `false`, with no side effect, when (x, y) is off the canvas.
    pub fn paint(&self, x: i32, y: i32, color: Color) -> bool {
        let index = match self.validate_coordinates(x, y) {
            Ok(index) => index,
            Err(err) => {
                trace!("Rejected paint: {}", err);
                return false;
            }
        };

        let mut state = write_lock(&self.state, "paint");
        state.cells[index] = color;
        state.dirty.store(true, Ordering::Release);
        true
    }

    pub fn paint_request(&self, request: &PixelRequest) -> bool {
        self.paint(request.x, request.y, request.color)
    }

    /// Read a single cell
    pub fn get(&self, x: i32, y: i32) -> Option<Color> {
        let index = self.validate_coordinates(x, y).ok()?;
        Some(read_lock(&self.state, "get").cells[index])
    }

    /// Independent copy of the whole canvas
    pub fn snapshot(&self) -> CanvasSnapshot {
        let state = read_lock(&self.state, "snapshot");
        self.copy_state(&state)
    }

    fn copy_state(&self, state: &CanvasState) -> CanvasSnapshot {
        CanvasSnapshot {
            width: self.size.width,
            height: self.size.height,
            cells: state.cells.clone(),
        }
    }

    /// Whether any paint succeeded since the dirty flag was last cleared
    pub fn is_dirty(&self) -> bool {
        read_lock(&self.state, "is_dirty")
            .dirty
            .load(Ordering::Acquire)
    }

    pub fn clear_dirty(&self) {
        read_lock(&self.state, "clear_dirty")
            .dirty
            .store(false, Ordering::Release);
    }

    /// Re-arm the dirty flag after a snapshot taken for persistence was lost
    pub fn mark_dirty(&self) {
        read_lock(&self.state, "mark_dirty")
            .dirty
            .store(true, Ordering::Release);
    }

    /// Check, clear and copy in one shared-lock hold.
    ///
    /// Returns `None` when the canvas is clean. A paint that lands after this
    /// returns marks the canvas dirty again for the next cycle. Only one of
    /// several concurrent callers can observe the flag set.
    pub fn take_dirty_snapshot(&self) -> Option<CanvasSnapshot> {
        let state = read_lock(&self.state, "take_dirty_snapshot");
        if !state.dirty.swap(false, Ordering::AcqRel) {
            return None;
        }
        Some(self.copy_state(&state))
    }
}

impl fmt::Debug for CanvasStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CanvasStore")
            .field("width", &self.size.width)
            .field("height", &self.size.height)
            .field("dirty", &self.is_dirty())
            .finish()
    }
}
