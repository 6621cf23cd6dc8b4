use pricecast_core::{Matrix, PipelineError, PipelineResult};
use serde::{Deserialize, Serialize};

/// One named column of a [`Frame`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Column {
    Categorical(Vec<String>),
    Numeric(Vec<f64>),
}

impl Column {
    pub fn len(&self) -> usize {
        match self {
            Column::Categorical(v) => v.len(),
            Column::Numeric(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_categorical(&self) -> bool {
        matches!(self, Column::Categorical(_))
    }
}

/// Ordered collection of named columns of mixed type.
///
/// Recipe steps consume a frame and produce a new one; a frame is never
/// modified once handed to a step. `to_matrix` is the hand-off point to the
/// model layer and requires every categorical column to have been encoded
/// away first.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    names: Vec<String>,
    columns: Vec<Column>,
}

impl Frame {
    pub fn new() -> Self {
        Frame::default()
    }

    /// Number of rows. A frame with no columns has zero rows.
    pub fn len(&self) -> usize {
        self.columns.first().map_or(0, Column::len)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of columns.
    pub fn width(&self) -> usize {
        self.columns.len()
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.names.iter().any(|n| n == name)
    }

    /// Append a column. The name must be unique and the length must match.
    pub fn push(&mut self, name: impl Into<String>, column: Column) -> PipelineResult<()> {
        let name = name.into();
        if self.has_column(&name) {
            return Err(PipelineError::DuplicateColumn(name));
        }
        if !self.columns.is_empty() && column.len() != self.len() {
            return Err(PipelineError::LengthMismatch {
                column: name,
                expected: self.len(),
                got: column.len(),
            });
        }
        self.names.push(name);
        self.columns.push(column);
        Ok(())
    }

    pub fn column(&self, name: &str) -> PipelineResult<&Column> {
        self.names
            .iter()
            .position(|n| n == name)
            .map(|i| &self.columns[i])
            .ok_or_else(|| PipelineError::ColumnNotFound(name.to_string()))
    }

    /// Borrow a numeric column by name.
    pub fn numeric(&self, name: &str) -> PipelineResult<&[f64]> {
        match self.column(name)? {
            Column::Numeric(v) => Ok(v),
            Column::Categorical(_) => Err(PipelineError::ColumnTypeMismatch {
                column: name.to_string(),
                expected: "numeric",
            }),
        }
    }

    /// Borrow a categorical column by name.
    pub fn categorical(&self, name: &str) -> PipelineResult<&[String]> {
        match self.column(name)? {
            Column::Categorical(v) => Ok(v),
            Column::Numeric(_) => Err(PipelineError::ColumnTypeMismatch {
                column: name.to_string(),
                expected: "categorical",
            }),
        }
    }

    /// Remove a column and return it.
    pub fn remove(&mut self, name: &str) -> PipelineResult<Column> {
        let idx = self
            .names
            .iter()
            .position(|n| n == name)
            .ok_or_else(|| PipelineError::ColumnNotFound(name.to_string()))?;
        self.names.remove(idx);
        Ok(self.columns.remove(idx))
    }

    /// Iterate over (name, column) pairs in order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Column)> {
        self.names
            .iter()
            .map(String::as_str)
            .zip(self.columns.iter())
    }

    /// New frame containing the given rows, in the given order.
    pub fn select_rows(&self, indices: &[usize]) -> PipelineResult<Frame> {
        let n = self.len();
        if let Some(&bad) = indices.iter().find(|&&i| i >= n) {
            return Err(PipelineError::RowOutOfBounds {
                index: bad,
                size: n,
            });
        }
        let mut out = Frame::new();
        for (name, col) in self.iter() {
            let picked = match col {
                Column::Categorical(v) => {
                    Column::Categorical(indices.iter().map(|&i| v[i].clone()).collect())
                }
                Column::Numeric(v) => Column::Numeric(indices.iter().map(|&i| v[i]).collect()),
            };
            out.push(name, picked)?;
        }
        Ok(out)
    }

    /// Convert to a dense matrix. Errors if any categorical column remains.
    pub fn to_matrix(&self) -> PipelineResult<Matrix> {
        let mut columns = Vec::with_capacity(self.width());
        for (name, col) in self.iter() {
            match col {
                Column::Numeric(v) => columns.push(v.clone()),
                Column::Categorical(_) => {
                    return Err(PipelineError::ColumnTypeMismatch {
                        column: name.to_string(),
                        expected: "numeric",
                    })
                }
            }
        }
        Matrix::from_columns(&columns)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Frame {
        let mut f = Frame::new();
        f.push(
            "maker",
            Column::Categorical(vec!["audi".into(), "bmw".into(), "audi".into()]),
        )
        .unwrap();
        f.push("doors", Column::Numeric(vec![3.0, 5.0, 5.0])).unwrap();
        f
    }

    #[test]
    fn test_push_and_access() {
        let f = sample();
        assert_eq!(f.len(), 3);
        assert_eq!(f.width(), 2);
        assert_eq!(f.numeric("doors").unwrap(), &[3.0, 5.0, 5.0]);
        assert_eq!(f.categorical("maker").unwrap()[1], "bmw");
        assert!(f.numeric("maker").is_err());
        assert!(f.column("missing").is_err());
    }

    #[test]
    fn test_push_rejects_duplicates_and_bad_lengths() {
        let mut f = sample();
        assert!(f.push("doors", Column::Numeric(vec![1.0, 2.0, 3.0])).is_err());
        assert!(f.push("seats", Column::Numeric(vec![1.0])).is_err());
    }

    #[test]
    fn test_select_rows() {
        let f = sample();
        let s = f.select_rows(&[2, 0]).unwrap();
        assert_eq!(s.categorical("maker").unwrap(), &["audi", "audi"]);
        assert_eq!(s.numeric("doors").unwrap(), &[5.0, 3.0]);
        assert!(f.select_rows(&[9]).is_err());
    }

    #[test]
    fn test_to_matrix_requires_numeric() {
        let f = sample();
        assert!(f.to_matrix().is_err());

        let mut g = Frame::new();
        g.push("a", Column::Numeric(vec![1.0, 2.0])).unwrap();
        g.push("b", Column::Numeric(vec![3.0, 4.0])).unwrap();
        let m = g.to_matrix().unwrap();
        assert_eq!(m.rows(), 2);
        assert_eq!(m.at(1, 0), 2.0);
        assert_eq!(m.at(0, 1), 3.0);
    }
}
