use crate::config::Grid;
use crate::error::GridError;

/// Grid cell coordinate (row-major).
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct Cell {
    pub row: u32,
    pub col: u32,
}

impl Cell {
    #[inline]
    pub const fn new(row: u32, col: u32) -> Self {
        Self { row, col }
    }

    /// Cell holding shape `index`: `(index / cols, index % cols)`.
    pub fn from_index(grid: &Grid, index: usize) -> Result<Self, GridError> {
        let cells = grid.cell_count();
        if index >= cells {
            return Err(GridError::CellOutOfRange { index, cells });
        }
        let cols = grid.cols() as usize;
        Ok(Self::new((index / cols) as u32, (index % cols) as u32))
    }

    #[inline]
    pub fn index(self, grid: &Grid) -> usize {
        self.row as usize * grid.cols() as usize + self.col as usize
    }

    /// Pixel origin `(x, y)` of the cell on the canvas.
    #[inline]
    pub fn pixel_origin(self, grid: &Grid) -> (u32, u32) {
        (self.col * grid.cell_size(), self.row * grid.cell_size())
    }
}

/// Injective assignment of `count` shapes to grid cells.
///
/// Shape `i` always maps to [`Cell::from_index`]`(i)`; no cell is shared.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Placement {
    grid: Grid,
    count: usize,
}

impl Placement {
    /// Fails with [`GridError::Capacity`] when `count` exceeds the cell count.
    pub fn plan(grid: &Grid, count: usize) -> Result<Self, GridError> {
        let cells = grid.cell_count();
        if count > cells {
            return Err(GridError::Capacity {
                shapes: count,
                cells,
            });
        }
        Ok(Self { grid: *grid, count })
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.count
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    pub fn cell(&self, index: usize) -> Option<Cell> {
        if index < self.count {
            Cell::from_index(&self.grid, index).ok()
        } else {
            None
        }
    }

    pub fn cells(&self) -> impl Iterator<Item = Cell> + '_ {
        (0..self.count).filter_map(|i| self.cell(i))
    }
}
