use crate::error::GridError;

/// Floats per vertex (x, y, z).
pub const VERTEX_STRIDE: usize = 3;

/// A closed polygon stored as flat `(x, y, z)` triples in normalized [-1, 1] space.
///
/// Invariants (checked by [`SubPath::new`]):
/// - coordinate count is a non-zero multiple of [`VERTEX_STRIDE`]
/// - at least one vertex
/// - every coordinate is finite and every `z` is 0
/// - every `x` and `y` lies in [-1, 1]
#[derive(Debug, Clone, PartialEq)]
pub struct SubPath {
    coords: Vec<f32>,
}

impl SubPath {
    pub fn new(coords: Vec<f32>) -> Result<Self, GridError> {
        let malformed = |reason: String| GridError::MalformedSubPath {
            shape: 0,
            sub_path: 0,
            reason,
        };

        if coords.len() % VERTEX_STRIDE != 0 {
            return Err(malformed(format!(
                "{} coordinates is not a multiple of {VERTEX_STRIDE}",
                coords.len()
            )));
        }
        if coords.is_empty() {
            return Err(malformed("sub-path has no vertices".to_owned()));
        }

        for (i, v) in coords.chunks_exact(VERTEX_STRIDE).enumerate() {
            if !v.iter().all(|c| c.is_finite()) {
                return Err(malformed(format!("vertex {i} is not finite")));
            }
            if v[0].abs() > 1.0 || v[1].abs() > 1.0 {
                return Err(malformed(format!(
                    "vertex {i} ({}, {}) lies outside [-1, 1]",
                    v[0], v[1]
                )));
            }
            if v[2] != 0.0 {
                return Err(malformed(format!("vertex {i} has z = {} (expected 0)", v[2])));
            }
        }

        Ok(Self { coords })
    }

    /// Flat coordinate slice, `VERTEX_STRIDE` floats per vertex.
    #[inline]
    pub fn coords(&self) -> &[f32] {
        &self.coords
    }

    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.coords.len() / VERTEX_STRIDE
    }

    pub fn vertices(&self) -> impl Iterator<Item = [f32; 3]> + '_ {
        self.coords
            .chunks_exact(VERTEX_STRIDE)
            .map(|v| [v[0], v[1], v[2]])
    }
}

/// An ordered list of sub-paths drawn into the same cell.
#[derive(Debug, Clone, PartialEq)]
pub struct Shape {
    sub_paths: Vec<SubPath>,
}

impl Shape {
    /// Builds a shape from raw coordinate lists, validating every sub-path.
    pub fn new(sub_paths: Vec<Vec<f32>>) -> Result<Self, GridError> {
        let sub_paths = sub_paths
            .into_iter()
            .enumerate()
            .map(|(j, coords)| SubPath::new(coords).map_err(|e| e.at(0, j)))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { sub_paths })
    }

    #[inline]
    pub fn sub_paths(&self) -> &[SubPath] {
        &self.sub_paths
    }

    /// Total vertex count across all sub-paths.
    pub fn vertex_count(&self) -> usize {
        self.sub_paths.iter().map(SubPath::vertex_count).sum()
    }
}

impl GridError {
    /// Re-labels a sub-path error with its position in the catalog.
    pub(crate) fn at(self, shape: usize, sub_path: usize) -> Self {
        match self {
            GridError::MalformedSubPath { reason, .. } => GridError::MalformedSubPath {
                shape,
                sub_path,
                reason,
            },
            other => other,
        }
    }

    pub(crate) fn in_shape(self, shape: usize) -> Self {
        match self {
            GridError::MalformedSubPath {
                sub_path, reason, ..
            } => GridError::MalformedSubPath {
                shape,
                sub_path,
                reason,
            },
            other => other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_vertices_per_sub_path() {
        let shape = Shape::new(vec![
            vec![0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 1.0, 1.0, 0.0],
            vec![0.0, 0.0, 0.0, 0.5, 0.5, 0.0],
        ])
        .unwrap();
        assert_eq!(shape.sub_paths()[0].vertex_count(), 3);
        assert_eq!(shape.sub_paths()[1].vertex_count(), 2);
        assert_eq!(shape.vertex_count(), 5);
    }

    #[test]
    fn rejects_partial_vertex() {
        let err = Shape::new(vec![vec![0.0, 0.0, 0.0, 1.0, 1.0]]).unwrap_err();
        assert!(matches!(err, GridError::MalformedSubPath { sub_path: 0, .. }));
    }

    #[test]
    fn rejects_non_zero_z() {
        let err = SubPath::new(vec![0.0, 0.0, 0.0, 1.0, 1.0, 0.5]).unwrap_err();
        let GridError::MalformedSubPath { reason, .. } = err else {
            panic!("unexpected error variant");
        };
        assert!(reason.contains("vertex 1"));
    }

    #[test]
    fn rejects_empty_sub_path() {
        assert!(SubPath::new(vec![]).is_err());
        assert_eq!(SubPath::new(vec![0.0, 0.0, 0.0]).unwrap().vertex_count(), 1);
    }

    #[test]
    fn rejects_nan() {
        assert!(SubPath::new(vec![f32::NAN, 0.0, 0.0, 1.0, 1.0, 0.0]).is_err());
    }

    #[test]
    fn rejects_out_of_range_coordinates() {
        let err = SubPath::new(vec![2.5, 0.0, 0.0, 0.0, 0.0, 0.0]).unwrap_err();
        assert!(err.to_string().contains("outside [-1, 1]"), "{err}");
        assert!(SubPath::new(vec![0.0, -1.5, 0.0]).is_err());

        let edges = SubPath::new(vec![-1.0, 1.0, 0.0, 1.0, -1.0, 0.0]).unwrap();
        assert_eq!(edges.vertex_count(), 2);
    }

    #[test]
    fn reports_failing_sub_path_index() {
        let err = Shape::new(vec![
            vec![0.0, 0.0, 0.0, 1.0, 1.0, 0.0],
            vec![0.0, 0.0, 0.0, 1.0],
        ])
        .unwrap_err();
        assert!(matches!(err, GridError::MalformedSubPath { sub_path: 1, .. }));
    }

    #[test]
    fn vertices_iterates_triples() {
        let sp = SubPath::new(vec![-1.0, 1.0, 0.0, 1.0, -1.0, 0.0]).unwrap();
        let v: Vec<_> = sp.vertices().collect();
        assert_eq!(v, vec![[-1.0, 1.0, 0.0], [1.0, -1.0, 0.0]]);
    }
}
