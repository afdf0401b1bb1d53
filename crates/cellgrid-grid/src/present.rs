use std::fmt::Write;

use serde::{Deserialize, Serialize};

use crate::config::Grid;
use crate::error::GridError;
use crate::extract::CellBlocks;

/// How a single result value is rendered.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum GlyphMode {
    /// `"11"` when the value is above `threshold`, `"00"` otherwise.
    Binary { threshold: u32 },
    /// The raw value, right-aligned in a field of `width` characters and
    /// followed by one space.
    Numeric { width: usize },
}

impl Default for GlyphMode {
    fn default() -> Self {
        GlyphMode::Binary { threshold: 0 }
    }
}

impl GlyphMode {
    fn write_value(self, out: &mut String, value: u32) {
        match self {
            GlyphMode::Binary { threshold } => {
                out.push_str(if value > threshold { "11" } else { "00" });
            }
            GlyphMode::Numeric { width } => {
                // Writing into a String cannot fail.
                let _ = write!(out, "{value:>width$} ");
            }
        }
    }
}

/// Renders the first `count` cells of a canvas-sized result buffer as text.
///
/// One line per pixel row of a cell, and a blank line after every cell.
pub fn render_cells(
    grid: &Grid,
    buffer: &[u32],
    count: usize,
    mode: GlyphMode,
) -> Result<String, GridError> {
    let size = grid.cell_size() as usize;
    let mut out = String::new();

    for block in CellBlocks::new(grid, buffer, count)? {
        for row in block.chunks_exact(size) {
            for &value in row {
                mode.write_value(&mut out, value);
            }
            out.push('\n');
        }
        out.push('\n');
    }

    Ok(out)
}
