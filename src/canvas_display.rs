// Canvas Display Module - terminal preview of a canvas snapshot
// Colors are read as 0xRRGGBB; the top byte is ignored

use crate::canvas::{CanvasSnapshot, Color};
use crossterm::{
    queue,
    style::{self, Print, ResetColor, SetBackgroundColor},
};
use std::io::{self, Write};

/// Preview configuration
pub struct CanvasDisplayConfig {
    pub max_cols: usize,
    pub max_rows: usize,
    pub show_headers: bool,
}

impl Default for CanvasDisplayConfig {
    fn default() -> Self {
        Self {
            max_cols: 64,
            max_rows: 32,
            show_headers: true,
        }
    }
}

/// Nearest-neighbour resample of the canvas to at most `max_cols` x `max_rows`
pub fn downsample(snapshot: &CanvasSnapshot, max_cols: usize, max_rows: usize) -> Vec<Vec<Color>> {
    let width = snapshot.width as usize;
    let height = snapshot.height as usize;
    let cols = width.min(max_cols.max(1));
    let rows = height.min(max_rows.max(1));

    (0..rows)
        .map(|row| {
            let y = row * height / rows;
            (0..cols)
                .map(|col| {
                    let x = col * width / cols;
                    snapshot.cells.get(y * width + x).copied().unwrap_or(0)
                })
                .collect()
        })
        .collect()
}

/// Split a cell value into terminal RGB
pub fn to_terminal_color(color: Color) -> style::Color {
    let rgb = color as u32;
    style::Color::Rgb {
        r: (rgb >> 16) as u8,
        g: (rgb >> 8) as u8,
        b: rgb as u8,
    }
}

/// Render the preview into any writer, two columns per cell
pub fn render_canvas<W: Write>(
    out: &mut W,
    snapshot: &CanvasSnapshot,
    config: &CanvasDisplayConfig,
    title: Option<&str>,
) -> io::Result<()> {
    let preview = downsample(snapshot, config.max_cols, config.max_rows);

    if config.show_headers {
        let title = title.unwrap_or("Canvas");
        let preview_cols = preview.first().map(Vec::len).unwrap_or(0);
        writeln!(
            out,
            "{} - {}x{} ({} painted cells, preview {}x{})",
            title,
            snapshot.width,
            snapshot.height,
            snapshot.painted_cells(),
            preview_cols,
            preview.len()
        )?;
    }

    for row in &preview {
        for &color in row {
            queue!(out, SetBackgroundColor(to_terminal_color(color)), Print("  "))?;
        }
        queue!(out, ResetColor, Print("\n"))?;
    }
    out.flush()
}

/// Print the preview to stdout
pub fn print_canvas(snapshot: &CanvasSnapshot, config: &CanvasDisplayConfig, title: Option<&str>) {
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    if let Err(e) = render_canvas(&mut handle, snapshot, config, title) {
        log::warn!("⚠️ Failed to render canvas preview: {}", e);
    }
}
