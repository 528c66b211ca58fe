//! Scalar field input for contour tracing.

/// A rectangular scalar field with per-axis coordinates.
///
/// Values are stored row-major; `NaN` marks an invalid (masked) sample and
/// suppresses tracing in every cell touching it. `x` holds the coordinate
/// of each column, `y` the coordinate of each row, so interpolated contour
/// vertices come out directly in native coordinates.
#[derive(Debug, Clone)]
pub struct ScalarField {
    values: Vec<f64>,
    rows: usize,
    cols: usize,
    x: Vec<f64>,
    y: Vec<f64>,
}

impl ScalarField {
    /// Create a new field.
    ///
    /// # Panics
    ///
    /// Panics if `values.len() != rows * cols` or the axis vectors do not
    /// match the dimensions; these are programmer errors, not data errors.
    pub fn new(values: Vec<f64>, rows: usize, cols: usize, x: Vec<f64>, y: Vec<f64>) -> Self {
        assert_eq!(values.len(), rows * cols, "field shape mismatch");
        assert_eq!(x.len(), cols, "x axis length mismatch");
        assert_eq!(y.len(), rows, "y axis length mismatch");
        Self {
            values,
            rows,
            cols,
            x,
            y,
        }
    }

    /// Number of rows.
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Number of columns.
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Value at (row, col). `NaN` for masked samples.
    pub fn value(&self, row: usize, col: usize) -> f64 {
        self.values[row * self.cols + col]
    }

    /// Coordinate of a column.
    pub fn x(&self, col: usize) -> f64 {
        self.x[col]
    }

    /// Coordinate of a row.
    pub fn y(&self, row: usize) -> f64 {
        self.y[row]
    }
}
