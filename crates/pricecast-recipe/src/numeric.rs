use std::collections::BTreeMap;

use pricecast_core::{PipelineError, PipelineResult};
use pricecast_data::{Column, Frame};
use serde::{Deserialize, Serialize};

use crate::step::Transform;

/// Appends pairwise product columns. A spec side ending in `*` is a prefix
/// pattern expanded against the numeric columns present at fit time, so
/// `("model_*", "doors")` crosses every model indicator with the door count.
/// Product columns are named `{left}_x_{right}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Interactions {
    specs: Vec<(String, String)>,
    pairs: Option<Vec<(String, String)>>,
}

impl Interactions {
    pub fn new(specs: Vec<(String, String)>) -> Self {
        Interactions { specs, pairs: None }
    }

    fn expand(side: &str, frame: &Frame) -> PipelineResult<Vec<String>> {
        if let Some(prefix) = side.strip_suffix('*') {
            Ok(frame
                .iter()
                .filter(|(name, col)| name.starts_with(prefix) && !col.is_categorical())
                .map(|(name, _)| name.to_string())
                .collect())
        } else {
            frame.numeric(side)?;
            Ok(vec![side.to_string()])
        }
    }
}

impl Transform for Interactions {
    fn fit(&mut self, frame: &Frame) -> PipelineResult<()> {
        let mut pairs = Vec::new();
        for (left, right) in &self.specs {
            for l in Self::expand(left, frame)? {
                for r in Self::expand(right, frame)? {
                    pairs.push((l.clone(), r.clone()));
                }
            }
        }
        self.pairs = Some(pairs);
        Ok(())
    }

    fn transform(&self, frame: &Frame) -> PipelineResult<Frame> {
        let pairs = self
            .pairs
            .as_ref()
            .ok_or_else(|| PipelineError::NotFitted("interactions".into()))?;
        let mut out = frame.clone();
        for (left, right) in pairs {
            let a = frame.numeric(left)?;
            let b = frame.numeric(right)?;
            let product: Vec<f64> = a.iter().zip(b.iter()).map(|(&x, &y)| x * y).collect();
            out.push(format!("{left}_x_{right}"), Column::Numeric(product))?;
        }
        Ok(out)
    }
}

/// Replaces one numeric column with its base-10 logarithm. Values must be
/// strictly positive; a zero or negative entry is a data error, not something
/// to paper over.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogTransform {
    column: String,
}

impl LogTransform {
    pub fn new(column: impl Into<String>) -> Self {
        LogTransform {
            column: column.into(),
        }
    }

    fn checked_log(&self, values: &[f64]) -> PipelineResult<Vec<f64>> {
        values
            .iter()
            .enumerate()
            .map(|(row, &v)| {
                if v > 0.0 {
                    Ok(v.log10())
                } else {
                    Err(PipelineError::NonPositive {
                        column: self.column.clone(),
                        row,
                        value: v,
                    })
                }
            })
            .collect()
    }
}

impl Transform for LogTransform {
    fn fit(&mut self, frame: &Frame) -> PipelineResult<()> {
        // Stateless, but fitting still validates the training data.
        self.checked_log(frame.numeric(&self.column)?)?;
        Ok(())
    }

    fn transform(&self, frame: &Frame) -> PipelineResult<Frame> {
        let mut out = Frame::new();
        for (name, col) in frame.iter() {
            let mapped = if name == self.column {
                match col {
                    Column::Numeric(v) => Column::Numeric(self.checked_log(v)?),
                    Column::Categorical(_) => {
                        return Err(PipelineError::ColumnTypeMismatch {
                            column: name.to_string(),
                            expected: "numeric",
                        })
                    }
                }
            } else {
                col.clone()
            };
            out.push(name, mapped)?;
        }
        Ok(out)
    }
}

/// Drops columns that take a single distinct value in the training data.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ZeroVariance {
    dropped: Option<Vec<String>>,
}

impl ZeroVariance {
    pub fn new() -> Self {
        ZeroVariance::default()
    }

    /// Column names removed by the fitted filter.
    pub fn dropped(&self) -> &[String] {
        self.dropped.as_deref().unwrap_or(&[])
    }
}

impl Transform for ZeroVariance {
    fn fit(&mut self, frame: &Frame) -> PipelineResult<()> {
        let mut dropped = Vec::new();
        for (name, col) in frame.iter() {
            let constant = match col {
                Column::Numeric(v) => v.windows(2).all(|w| w[0] == w[1]),
                Column::Categorical(v) => v.windows(2).all(|w| w[0] == w[1]),
            };
            if constant && !col.is_empty() {
                dropped.push(name.to_string());
            }
        }
        self.dropped = Some(dropped);
        Ok(())
    }

    fn transform(&self, frame: &Frame) -> PipelineResult<Frame> {
        let dropped = self
            .dropped
            .as_ref()
            .ok_or_else(|| PipelineError::NotFitted("zero-variance filter".into()))?;
        let mut out = Frame::new();
        for (name, col) in frame.iter() {
            if !dropped.iter().any(|d| d == name) {
                out.push(name, col.clone())?;
            }
        }
        Ok(out)
    }
}

/// Centers and scales every numeric column using training means and standard
/// deviations. A zero deviation falls back to a unit scale so constant
/// columns that slipped past the variance filter stay finite.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Standardize {
    stats: Option<BTreeMap<String, (f64, f64)>>,
}

impl Standardize {
    pub fn new() -> Self {
        Standardize::default()
    }
}

impl Transform for Standardize {
    fn fit(&mut self, frame: &Frame) -> PipelineResult<()> {
        let mut stats = BTreeMap::new();
        for (name, col) in frame.iter() {
            if let Column::Numeric(v) = col {
                if v.is_empty() {
                    return Err(PipelineError::EmptyData(name.to_string()));
                }
                let n = v.len() as f64;
                let mean = v.iter().sum::<f64>() / n;
                let var = v.iter().map(|&x| (x - mean) * (x - mean)).sum::<f64>() / n;
                let std = var.sqrt();
                let scale = if std > 1e-12 { std } else { 1.0 };
                stats.insert(name.to_string(), (mean, scale));
            }
        }
        self.stats = Some(stats);
        Ok(())
    }

    fn transform(&self, frame: &Frame) -> PipelineResult<Frame> {
        let stats = self
            .stats
            .as_ref()
            .ok_or_else(|| PipelineError::NotFitted("standardizer".into()))?;
        let mut out = Frame::new();
        for (name, col) in frame.iter() {
            let mapped = match (col, stats.get(name)) {
                (Column::Numeric(v), Some(&(mean, scale))) => {
                    Column::Numeric(v.iter().map(|&x| (x - mean) / scale).collect())
                }
                _ => col.clone(),
            };
            out.push(name, mapped)?;
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn frame() -> Frame {
        let mut f = Frame::new();
        f.push("model_a", Column::Numeric(vec![1.0, 0.0, 1.0])).unwrap();
        f.push("model_b", Column::Numeric(vec![0.0, 1.0, 0.0])).unwrap();
        f.push("doors", Column::Numeric(vec![3.0, 5.0, 5.0])).unwrap();
        f.push("seats", Column::Numeric(vec![4.0, 5.0, 7.0])).unwrap();
        f
    }

    #[test]
    fn test_interactions_expand_prefix() {
        let mut step = Interactions::new(vec![
            ("model_*".into(), "doors".into()),
            ("doors".into(), "seats".into()),
        ]);
        step.fit(&frame()).unwrap();
        let t = step.transform(&frame()).unwrap();
        assert!(t.has_column("model_a_x_doors"));
        assert!(t.has_column("model_b_x_doors"));
        assert_eq!(t.numeric("model_a_x_doors").unwrap(), &[3.0, 0.0, 5.0]);
        assert_eq!(t.numeric("doors_x_seats").unwrap(), &[12.0, 25.0, 35.0]);
    }

    #[test]
    fn test_interactions_missing_column() {
        let mut step = Interactions::new(vec![("doors".into(), "wheels".into())]);
        assert!(step.fit(&frame()).is_err());
    }

    #[test]
    fn test_log_transform() {
        let mut f = Frame::new();
        f.push("mileage", Column::Numeric(vec![10.0, 1000.0])).unwrap();
        let mut step = LogTransform::new("mileage");
        step.fit(&f).unwrap();
        let t = step.transform(&f).unwrap();
        assert_relative_eq!(t.numeric("mileage").unwrap()[0], 1.0);
        assert_relative_eq!(t.numeric("mileage").unwrap()[1], 3.0);
    }

    #[test]
    fn test_log_rejects_non_positive() {
        let mut f = Frame::new();
        f.push("mileage", Column::Numeric(vec![10.0, 0.0])).unwrap();
        let mut step = LogTransform::new("mileage");
        assert!(matches!(
            step.fit(&f),
            Err(PipelineError::NonPositive { row: 1, .. })
        ));
    }

    #[test]
    fn test_zero_variance_drops_constant() {
        let mut f = frame();
        f.push("flat", Column::Numeric(vec![2.0, 2.0, 2.0])).unwrap();
        let mut step = ZeroVariance::new();
        step.fit(&f).unwrap();
        assert_eq!(step.dropped(), &["flat"]);
        let t = step.transform(&f).unwrap();
        assert!(!t.has_column("flat"));
        assert_eq!(t.width(), 4);
    }

    #[test]
    fn test_standardize_uses_fit_stats() {
        let mut step = Standardize::new();
        step.fit(&frame()).unwrap();
        let t = step.transform(&frame()).unwrap();
        let doors = t.numeric("doors").unwrap();
        let mean: f64 = doors.iter().sum::<f64>() / 3.0;
        assert_relative_eq!(mean, 0.0, epsilon = 1e-12);

        // Fresh data is scaled with the training stats, not its own.
        let fresh = frame().select_rows(&[0]).unwrap();
        let u = step.transform(&fresh).unwrap();
        assert!(u.numeric("doors").unwrap()[0] < 0.0);
    }
}
