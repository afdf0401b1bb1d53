use thiserror::Error;

/// Layout and geometry errors.
///
/// Every variant is raised before any GPU work is recorded.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GridError {
    /// More shapes than grid cells; nothing is packed.
    #[error("{shapes} shapes do not fit into a grid of {cells} cells")]
    Capacity { shapes: usize, cells: usize },

    #[error("grid dimensions must be non-zero (rows {rows}, cols {cols}, cell size {cell_size})")]
    EmptyGrid { rows: u32, cols: u32, cell_size: u32 },

    #[error("canvas of {rows}x{cols} cells at {cell_size}px overflows the pixel index range")]
    Overflow { rows: u32, cols: u32, cell_size: u32 },

    /// The cell size is not a multiple of the compute work-group edge.
    #[error("cell size {cell_size} is not divisible by work-group edge {edge}")]
    Misaligned { cell_size: u32, edge: u32 },

    #[error("shape {shape}, sub-path {sub_path}: {reason}")]
    MalformedSubPath {
        shape: usize,
        sub_path: usize,
        reason: String,
    },

    #[error("cell index {index} is outside the grid ({cells} cells)")]
    CellOutOfRange { index: usize, cells: usize },

    #[error("buffer holds {actual} values, canvas needs {expected}")]
    BufferSize { expected: usize, actual: usize },
}
