use crate::error::GridError;
use crate::shape::Shape;

/// Immutable, ordered set of shapes to pack. Shape `i` lands in cell `i`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ShapeCatalog {
    shapes: Vec<Shape>,
}

impl ShapeCatalog {
    pub fn from_shapes(shapes: Vec<Shape>) -> Self {
        Self { shapes }
    }

    /// Builds a catalog from raw `shape → sub-path → coords` lists.
    pub fn from_coords(raw: Vec<Vec<Vec<f32>>>) -> Result<Self, GridError> {
        let shapes = raw
            .into_iter()
            .enumerate()
            .map(|(i, sub_paths)| Shape::new(sub_paths).map_err(|e| e.in_shape(i)))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { shapes })
    }

    /// The built-in shape set: nested squares, a notched "U", and a stepped block.
    pub fn builtin() -> Self {
        let shapes = vec![
            vec![
                vec![
                    -0.8, 0.8, 0.0, //
                    0.8, 0.8, 0.0, //
                    0.8, -0.8, 0.0, //
                    -0.8, -0.8, 0.0,
                ],
                vec![
                    -0.4, 0.4, 0.0, //
                    0.4, 0.4, 0.0, //
                    0.4, -0.4, 0.0, //
                    -0.4, -0.4, 0.0,
                ],
            ],
            vec![vec![
                -0.8, 0.8, 0.0, //
                -0.4, 0.8, 0.0, //
                -0.4, 0.0, 0.0, //
                0.4, 0.0, 0.0, //
                0.4, 0.8, 0.0, //
                0.8, 0.8, 0.0, //
                0.8, -0.8, 0.0, //
                -0.8, -0.8, 0.0,
            ]],
            vec![vec![
                -0.8, 0.0, 0.0, //
                -0.4, 0.0, 0.0, //
                -0.4, 0.8, 0.0, //
                0.4, 0.8, 0.0, //
                0.4, 0.0, 0.0, //
                0.8, 0.0, 0.0, //
                0.8, -0.8, 0.0, //
                -0.8, -0.8, 0.0,
            ]],
        ];

        // Static data; validated by `builtin_catalog_is_valid`.
        Self::from_coords(shapes).unwrap_or_default()
    }

    /// Axis-aligned square outline with half-extent `h` (centered at the origin).
    pub fn square(h: f32) -> Result<Shape, GridError> {
        Shape::new(vec![vec![
            -h, h, 0.0, //
            h, h, 0.0, //
            h, -h, 0.0, //
            -h, -h, 0.0,
        ]])
    }

    #[inline]
    pub fn shapes(&self) -> &[Shape] {
        &self.shapes
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.shapes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Shape> {
        self.shapes.iter()
    }
}
