//! Grid layout for **cellgrid**: shapes, packing, and cell extraction.
//!
//! This crate holds everything that does not touch the GPU, so the geometry
//! and the text output can be tested anywhere.
//!
//! # Structure
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`config`] | `GridConfig`, validated `Grid`, `WorkgroupShape` |
//! | [`shape`] | `Shape`, `SubPath` |
//! | [`catalog`] | `ShapeCatalog` with the built-in shape set |
//! | [`placement`] | `Cell`, `Placement` (shape index → cell) |
//! | [`pack`] | Coordinate packing into canvas NDC |
//! | [`extract`] | Per-cell sub-block extraction from a flat buffer |
//! | [`present`] | Text rendering of extracted cells |
//! | [`error`] | `GridError` |
//!
//! # Quick start
//!
//! ```rust
//! use cellgrid_grid::{pack_catalog, GridConfig, ShapeCatalog};
//!
//! let grid = GridConfig::default().build().unwrap();
//! let packed = pack_catalog(&grid, &ShapeCatalog::builtin()).unwrap();
//! assert_eq!(packed.len(), 3);
//! assert_eq!(packed[1].cell.col, 1);
//! ```

pub mod catalog;
pub mod config;
pub mod error;
pub mod extract;
pub mod pack;
pub mod placement;
pub mod present;
pub mod shape;

pub use catalog::ShapeCatalog;
pub use config::{Grid, GridConfig, WorkgroupShape};
pub use error::GridError;
pub use extract::{extract_cell, CellBlocks};
pub use pack::{pack_catalog, pack_shape, pack_vertex, PackedShape};
pub use placement::{Cell, Placement};
pub use present::{render_cells, GlyphMode};
pub use shape::{Shape, SubPath, VERTEX_STRIDE};
