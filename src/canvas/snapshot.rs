// Snapshot and request types shared by the store, persistence and callers

use super::Color;
use serde::{Deserialize, Serialize};

/// Immutable copy of the canvas at one point in time
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CanvasSnapshot {
    pub width: u32,
    pub height: u32,
    pub cells: Vec<Color>,
}

impl CanvasSnapshot {
    /// Number of cells the declared dimensions call for, if it fits in memory
    pub fn expected_cell_count(&self) -> Option<usize> {
        (self.width as usize).checked_mul(self.height as usize)
    }

    /// Cell at (x, y), row-major
    pub fn get(&self, x: u32, y: u32) -> Option<Color> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.cells
            .get(y as usize * self.width as usize + x as usize)
            .copied()
    }

    /// Number of cells holding something other than the blank value
    pub fn painted_cells(&self) -> usize {
        self.cells.iter().filter(|&&color| color != 0).count()
    }
}

/// A single paint operation as a client submits it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PixelRequest {
    pub x: i32,
    pub y: i32,
    pub color: Color,
}

impl PixelRequest {
    pub fn new(x: i32, y: i32, color: Color) -> Self {
        Self { x, y, color }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_is_row_major() {
        let snapshot = CanvasSnapshot {
            width: 3,
            height: 2,
            cells: vec![0, 1, 2, 3, 4, 5],
        };
        assert_eq!(snapshot.get(2, 0), Some(2));
        assert_eq!(snapshot.get(0, 1), Some(3));
        assert_eq!(snapshot.get(3, 0), None);
        assert_eq!(snapshot.get(0, 2), None);
    }

    #[test]
    fn test_painted_cells() {
        let snapshot = CanvasSnapshot {
            width: 2,
            height: 2,
            cells: vec![5, 0, 0, -1],
        };
        assert_eq!(snapshot.painted_cells(), 2);
        assert_eq!(snapshot.expected_cell_count(), Some(4));
    }

    #[test]
    fn test_pixel_request_json_shape() {
        let request: PixelRequest = serde_json::from_str(r#"{"x":1,"y":2,"color":255}"#).unwrap();
        assert_eq!(request, PixelRequest::new(1, 2, 255));
    }
}
