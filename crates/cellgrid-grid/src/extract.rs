use crate::config::Grid;
use crate::error::GridError;
use crate::placement::{Cell, Placement};

fn check_len(grid: &Grid, len: usize) -> Result<(), GridError> {
    let expected = grid.canvas_len();
    if len != expected {
        return Err(GridError::BufferSize {
            expected,
            actual: len,
        });
    }
    Ok(())
}

/// Copies the `cell_size × cell_size` block of cell `index` out of a flat,
/// row-major canvas buffer (row stride = canvas width).
pub fn extract_cell<T: Copy>(grid: &Grid, buffer: &[T], index: usize) -> Result<Vec<T>, GridError> {
    check_len(grid, buffer.len())?;
    let cell = Cell::from_index(grid, index)?;
    Ok(copy_block(grid, buffer, cell))
}

fn copy_block<T: Copy>(grid: &Grid, buffer: &[T], cell: Cell) -> Vec<T> {
    let size = grid.cell_size() as usize;
    let stride = grid.canvas_width() as usize;
    let (x0, y0) = cell.pixel_origin(grid);
    let (x0, y0) = (x0 as usize, y0 as usize);

    let mut block = Vec::with_capacity(size * size);
    for row in 0..size {
        let start = (y0 + row) * stride + x0;
        block.extend_from_slice(&buffer[start..start + size]);
    }
    block
}

/// Iterator over the blocks of the first `count` cells, in placement order.
pub struct CellBlocks<'a, T> {
    grid: Grid,
    buffer: &'a [T],
    placement: Placement,
    next: usize,
}

impl<'a, T: Copy> CellBlocks<'a, T> {
    pub fn new(grid: &Grid, buffer: &'a [T], count: usize) -> Result<Self, GridError> {
        check_len(grid, buffer.len())?;
        let placement = Placement::plan(grid, count)?;
        Ok(Self {
            grid: *grid,
            buffer,
            placement,
            next: 0,
        })
    }
}

impl<T: Copy> Iterator for CellBlocks<'_, T> {
    type Item = Vec<T>;

    fn next(&mut self) -> Option<Vec<T>> {
        let cell = self.placement.cell(self.next)?;
        self.next += 1;
        Some(copy_block(&self.grid, self.buffer, cell))
    }
}
