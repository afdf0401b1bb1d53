use serde::{Deserialize, Serialize};

use crate::error::GridError;

/// Work-group partitioning of the canvas for the compute stage.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum WorkgroupShape {
    /// One work-group per grid cell (edge = cell size).
    PerCell,
    /// Square tiles of `edge` pixels; the cell size must be a multiple of `edge`.
    Tile { edge: u32 },
}

impl WorkgroupShape {
    /// Work-group edge length in pixels for a given cell size.
    #[inline]
    pub fn edge(self, cell_size: u32) -> u32 {
        match self {
            WorkgroupShape::PerCell => cell_size,
            WorkgroupShape::Tile { edge } => edge,
        }
    }
}

impl Default for WorkgroupShape {
    fn default() -> Self {
        WorkgroupShape::Tile { edge: 8 }
    }
}

/// Raw grid parameters, as read from configuration.
///
/// Call [`GridConfig::build`] once at startup to obtain a validated [`Grid`].
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    /// Number of cell rows (along canvas y).
    pub rows: u32,
    /// Number of cell columns (along canvas x).
    pub cols: u32,
    /// Edge length of one square cell in pixels.
    pub cell_size: u32,
    pub workgroup: WorkgroupShape,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            rows: 60,
            cols: 30,
            cell_size: 32,
            workgroup: WorkgroupShape::default(),
        }
    }
}

impl GridConfig {
    /// Validates dimensions and work-group alignment.
    pub fn build(self) -> Result<Grid, GridError> {
        let GridConfig {
            rows,
            cols,
            cell_size,
            workgroup,
        } = self;

        if rows == 0 || cols == 0 || cell_size == 0 {
            return Err(GridError::EmptyGrid {
                rows,
                cols,
                cell_size,
            });
        }

        let overflow = GridError::Overflow {
            rows,
            cols,
            cell_size,
        };
        let canvas_width = cols.checked_mul(cell_size).ok_or(overflow.clone())?;
        let canvas_height = rows.checked_mul(cell_size).ok_or(overflow.clone())?;
        (canvas_width as usize)
            .checked_mul(canvas_height as usize)
            .ok_or(overflow)?;

        let edge = workgroup.edge(cell_size);
        if edge == 0 || cell_size % edge != 0 {
            return Err(GridError::Misaligned { cell_size, edge });
        }

        Ok(Grid {
            rows,
            cols,
            cell_size,
            workgroup_edge: edge,
        })
    }
}

/// Validated, immutable grid geometry shared by every pipeline stage.
///
/// Canvas width spans the columns and canvas height spans the rows, so cell
/// `(row, col)` covers pixels `[col * cell_size, (col + 1) * cell_size)` along x
/// and `[row * cell_size, (row + 1) * cell_size)` along y.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Grid {
    rows: u32,
    cols: u32,
    cell_size: u32,
    workgroup_edge: u32,
}

impl Grid {
    /// Grid holding exactly one cell that spans the whole canvas.
    pub fn single_cell(cell_size: u32, workgroup: WorkgroupShape) -> Result<Self, GridError> {
        GridConfig {
            rows: 1,
            cols: 1,
            cell_size,
            workgroup,
        }
        .build()
    }

    #[inline]
    pub fn rows(&self) -> u32 {
        self.rows
    }

    #[inline]
    pub fn cols(&self) -> u32 {
        self.cols
    }

    #[inline]
    pub fn cell_size(&self) -> u32 {
        self.cell_size
    }

    /// Total number of cells (the packing capacity).
    #[inline]
    pub fn cell_count(&self) -> usize {
        self.rows as usize * self.cols as usize
    }

    #[inline]
    pub fn canvas_width(&self) -> u32 {
        self.cols * self.cell_size
    }

    #[inline]
    pub fn canvas_height(&self) -> u32 {
        self.rows * self.cell_size
    }

    /// Number of pixels on the canvas.
    #[inline]
    pub fn canvas_len(&self) -> usize {
        self.canvas_width() as usize * self.canvas_height() as usize
    }

    #[inline]
    pub fn workgroup_edge(&self) -> u32 {
        self.workgroup_edge
    }

    /// Work-groups along x and y that tile the canvas exactly.
    #[inline]
    pub fn workgroup_count(&self) -> (u32, u32) {
        (
            self.canvas_width() / self.workgroup_edge,
            self.canvas_height() / self.workgroup_edge,
        )
    }
}
