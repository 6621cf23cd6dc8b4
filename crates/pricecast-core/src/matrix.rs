use crate::error::{PipelineError, PipelineResult};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Dense 2-D feature matrix, row-major `Vec<f64>`.
///
/// Every stage of the pipeline hands matrices around by value; nothing is
/// mutated in place after construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Matrix {
    data: Vec<f64>,
    rows: usize,
    cols: usize,
}

impl Matrix {
    /// Build a matrix from flat row-major data.
    pub fn new(data: Vec<f64>, rows: usize, cols: usize) -> PipelineResult<Self> {
        if data.len() != rows * cols {
            return Err(PipelineError::ShapeMismatch {
                expected: rows * cols,
                got: data.len(),
            });
        }
        Ok(Matrix { data, rows, cols })
    }

    pub fn zeros(rows: usize, cols: usize) -> Self {
        Matrix {
            data: vec![0.0; rows * cols],
            rows,
            cols,
        }
    }

    /// Build from a slice of equally sized rows.
    pub fn from_rows(rows: &[Vec<f64>]) -> PipelineResult<Self> {
        if rows.is_empty() {
            return Ok(Matrix::zeros(0, 0));
        }
        let cols = rows[0].len();
        for r in rows {
            if r.len() != cols {
                return Err(PipelineError::ShapeMismatch {
                    expected: cols,
                    got: r.len(),
                });
            }
        }
        let data: Vec<f64> = rows.iter().flat_map(|r| r.iter().copied()).collect();
        Matrix::new(data, rows.len(), cols)
    }

    /// Build column-wise from equally sized columns.
    pub fn from_columns(columns: &[Vec<f64>]) -> PipelineResult<Self> {
        if columns.is_empty() {
            return Ok(Matrix::zeros(0, 0));
        }
        let rows = columns[0].len();
        for c in columns {
            if c.len() != rows {
                return Err(PipelineError::ShapeMismatch {
                    expected: rows,
                    got: c.len(),
                });
            }
        }
        let cols = columns.len();
        let mut data = vec![0.0; rows * cols];
        for (j, c) in columns.iter().enumerate() {
            for (i, &v) in c.iter().enumerate() {
                data[i * cols + j] = v;
            }
        }
        Matrix::new(data, rows, cols)
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn is_empty(&self) -> bool {
        self.rows == 0
    }

    /// Element access. Panics if out of bounds, like slice indexing.
    #[inline]
    pub fn at(&self, i: usize, j: usize) -> f64 {
        debug_assert!(i < self.rows && j < self.cols);
        self.data[i * self.cols + j]
    }

    /// Borrow one row as a slice.
    pub fn row(&self, i: usize) -> PipelineResult<&[f64]> {
        if i >= self.rows {
            return Err(PipelineError::RowOutOfBounds {
                index: i,
                size: self.rows,
            });
        }
        let start = i * self.cols;
        Ok(&self.data[start..start + self.cols])
    }

    /// Copy one column out.
    pub fn column(&self, j: usize) -> PipelineResult<Vec<f64>> {
        if j >= self.cols {
            return Err(PipelineError::ColOutOfBounds {
                index: j,
                size: self.cols,
            });
        }
        Ok((0..self.rows).map(|i| self.data[i * self.cols + j]).collect())
    }

}

impl fmt::Display for Matrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "matrix({} x {})", self.rows, self.cols)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_construction() {
        let m = Matrix::new(vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0], 2, 3).unwrap();
        assert_eq!(m.rows(), 2);
        assert_eq!(m.cols(), 3);
        assert_eq!(m.at(1, 2), 6.0);
        assert!(Matrix::new(vec![1.0], 2, 3).is_err());
    }

    #[test]
    fn test_from_rows_and_columns() {
        let a = Matrix::from_rows(&[vec![1.0, 2.0], vec![3.0, 4.0]]).unwrap();
        let b = Matrix::from_columns(&[vec![1.0, 3.0], vec![2.0, 4.0]]).unwrap();
        assert_eq!(a, b);
        assert!(Matrix::from_rows(&[vec![1.0], vec![1.0, 2.0]]).is_err());
    }

    #[test]
    fn test_row_and_column_access() {
        let m = Matrix::new(vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0], 3, 2).unwrap();
        assert_eq!(m.row(1).unwrap(), &[3.0, 4.0]);
        assert_eq!(m.column(0).unwrap(), vec![1.0, 3.0, 5.0]);
        assert!(m.row(3).is_err());
        assert!(m.column(2).is_err());
    }

    #[test]
    fn test_display() {
        let m = Matrix::zeros(4, 2);
        assert_eq!(m.to_string(), "matrix(4 x 2)");
        assert!(!m.is_empty());
        assert_relative_eq!(m.at(3, 1), 0.0);
    }
}
