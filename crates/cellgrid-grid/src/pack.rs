//! Packing: maps per-shape normalized coordinates into canvas NDC.
//!
//! For each vertex:
//!
//! ```text
//! local = (coord + 1) / 2 * cell_size
//! abs   = local + cell_index * cell_size      (x: col, y: row)
//! ndc   = abs * 2 / canvas_extent - 1         (x: width, y: height)
//! ```
//!
//! Cell seams are integer multiples of `cell_size`, so neighbouring cells tile
//! the canvas without gaps or overlap.

use crate::catalog::ShapeCatalog;
use crate::config::Grid;
use crate::error::GridError;
use crate::placement::{Cell, Placement};
use crate::shape::{Shape, VERTEX_STRIDE};

/// A shape whose sub-paths are expressed in canvas NDC.
#[derive(Debug, Clone, PartialEq)]
pub struct PackedShape {
    pub cell: Cell,
    /// Flat `(x, y, z)` triples per sub-path, same layout as [`crate::SubPath`].
    pub sub_paths: Vec<Vec<f32>>,
}

impl PackedShape {
    /// Vertex count of each sub-path, in draw order.
    pub fn vertex_counts(&self) -> impl Iterator<Item = usize> + '_ {
        self.sub_paths.iter().map(|c| c.len() / VERTEX_STRIDE)
    }
}

/// Packs one vertex into the canvas-space position of `cell`.
#[inline]
pub fn pack_vertex(grid: &Grid, cell: Cell, [x, y, z]: [f32; 3]) -> [f32; 3] {
    let size = grid.cell_size() as f32;
    let (origin_x, origin_y) = cell.pixel_origin(grid);

    let abs_x = (x + 1.0) / 2.0 * size + origin_x as f32;
    let abs_y = (y + 1.0) / 2.0 * size + origin_y as f32;

    [
        abs_x * 2.0 / grid.canvas_width() as f32 - 1.0,
        abs_y * 2.0 / grid.canvas_height() as f32 - 1.0,
        z,
    ]
}

/// Packs every sub-path of `shape` into `cell`.
pub fn pack_shape(grid: &Grid, cell: Cell, shape: &Shape) -> PackedShape {
    let sub_paths = shape
        .sub_paths()
        .iter()
        .map(|sp| {
            sp.vertices()
                .flat_map(|v| pack_vertex(grid, cell, v))
                .collect()
        })
        .collect();

    PackedShape { cell, sub_paths }
}

/// Packs the whole catalog, shape `i` into cell `i`.
///
/// Capacity is checked before any vertex is transformed.
pub fn pack_catalog(grid: &Grid, catalog: &ShapeCatalog) -> Result<Vec<PackedShape>, GridError> {
    let placement = Placement::plan(grid, catalog.len())?;

    Ok(placement
        .cells()
        .zip(catalog.iter())
        .map(|(cell, shape)| pack_shape(grid, cell, shape))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{GridConfig, WorkgroupShape};

    fn grid(rows: u32, cols: u32, cell_size: u32) -> Grid {
        GridConfig {
            rows,
            cols,
            cell_size,
            workgroup: WorkgroupShape::PerCell,
        }
        .build()
        .unwrap()
    }

    fn to_pixels(grid: &Grid, [x, y, _]: [f32; 3]) -> (f32, f32) {
        (
            (x + 1.0) / 2.0 * grid.canvas_width() as f32,
            (y + 1.0) / 2.0 * grid.canvas_height() as f32,
        )
    }

    #[test]
    fn unit_corners_land_on_cell_seams() {
        let g = grid(2, 2, 4);
        let cell = Cell::new(1, 1);
        assert_eq!(pack_vertex(&g, cell, [-1.0, -1.0, 0.0]), [0.0, 0.0, 0.0]);
        assert_eq!(pack_vertex(&g, cell, [1.0, 1.0, 0.0]), [1.0, 1.0, 0.0]);
    }

    #[test]
    fn pixel_centers_are_exact() {
        let g = grid(2, 2, 4);
        let v = pack_vertex(&g, Cell::new(0, 0), [-0.75, 0.75, 0.0]);
        assert_eq!(v, [-0.875, -0.125, 0.0]);
        assert_eq!(to_pixels(&g, v), (0.5, 3.5));
    }

    #[test]
    fn z_is_passed_through() {
        let g = grid(1, 1, 8);
        assert_eq!(pack_vertex(&g, Cell::new(0, 0), [0.0, 0.0, 0.0])[2], 0.0);
    }

    #[test]
    fn packed_coordinates_stay_in_unit_range() {
        let g = grid(3, 4, 8);
        let samples = [-1.0f32, -0.6, 0.0, 0.3, 1.0];
        for index in 0..g.cell_count() {
            let cell = Cell::from_index(&g, index).unwrap();
            for &x in &samples {
                for &y in &samples {
                    let [px, py, _] = pack_vertex(&g, cell, [x, y, 0.0]);
                    assert!((-1.0..=1.0).contains(&px), "x {px} out of range");
                    assert!((-1.0..=1.0).contains(&py), "y {py} out of range");
                }
            }
        }
    }

    #[test]
    fn adjacent_cells_do_not_overlap() {
        let g = grid(2, 30, 16);
        let samples = [-0.99f32, -0.5, 0.0, 0.5, 0.99];
        for index in 0..g.cell_count() {
            let cell = Cell::from_index(&g, index).unwrap();
            let (ox, oy) = cell.pixel_origin(&g);
            let (x0, y0) = (ox as f32, oy as f32);
            let (x1, y1) = (x0 + 16.0, y0 + 16.0);
            for &x in &samples {
                for &y in &samples {
                    let (px, py) = to_pixels(&g, pack_vertex(&g, cell, [x, y, 0.0]));
                    assert!(px > x0 && px < x1, "cell {index}: x {px} outside ({x0}, {x1})");
                    assert!(py > y0 && py < y1, "cell {index}: y {py} outside ({y0}, {y1})");
                }
            }
        }
    }

    #[test]
    fn pack_catalog_places_in_order() {
        let g = grid(2, 30, 32);
        let packed = pack_catalog(&g, &ShapeCatalog::builtin()).unwrap();
        let cells: Vec<_> = packed.iter().map(|p| p.cell).collect();
        assert_eq!(cells, vec![Cell::new(0, 0), Cell::new(0, 1), Cell::new(0, 2)]);
        assert_eq!(packed[0].vertex_counts().collect::<Vec<_>>(), vec![4, 4]);
    }

    #[test]
    fn pack_catalog_rejects_over_capacity() {
        let g = grid(1, 2, 4);
        let err = pack_catalog(&g, &ShapeCatalog::builtin()).unwrap_err();
        assert_eq!(err, GridError::Capacity { shapes: 3, cells: 2 });
    }

    #[test]
    fn pack_shape_keeps_vertex_counts() {
        let g = grid(2, 2, 4);
        let shape = ShapeCatalog::square(0.5).unwrap();
        let packed = pack_shape(&g, Cell::new(1, 0), &shape);
        assert_eq!(packed.sub_paths.len(), 1);
        assert_eq!(packed.sub_paths[0].len(), 12);
    }
}
