use std::fmt;

use pricecast_core::{Matrix, PipelineResult};
use serde::{Deserialize, Serialize};

use crate::forest::RandomForest;
use crate::knn::KnnRegressor;
use crate::lasso::Lasso;
use crate::svr::Svr;

/// Anything that maps a design matrix to target predictions.
pub trait Regressor {
    fn predict(&self, x: &Matrix) -> PipelineResult<Vec<f64>>;
}

/// The model families competing in a tuning run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Family {
    Lasso,
    Forest,
    Knn,
    Svr,
}

impl Family {
    pub const ALL: [Family; 4] = [Family::Lasso, Family::Forest, Family::Knn, Family::Svr];
}

impl fmt::Display for Family {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Family::Lasso => "lasso",
            Family::Forest => "forest",
            Family::Knn => "knn",
            Family::Svr => "svr",
        };
        write!(f, "{name}")
    }
}

/// One hyperparameter point in a family's grid.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "family", rename_all = "snake_case")]
pub enum Params {
    Lasso { penalty: f64 },
    Forest { trees: usize, mtry: usize, min_leaf: usize },
    Knn { neighbors: usize },
    Svr { cost: f64 },
}

impl Params {
    pub fn family(&self) -> Family {
        match self {
            Params::Lasso { .. } => Family::Lasso,
            Params::Forest { .. } => Family::Forest,
            Params::Knn { .. } => Family::Knn,
            Params::Svr { .. } => Family::Svr,
        }
    }

    /// Relative model complexity within a family, used to break score ties
    /// in favour of the simpler candidate. Only comparable between points of
    /// the same family.
    pub fn complexity(&self) -> f64 {
        match *self {
            // Stronger penalties mean sparser, simpler fits.
            Params::Lasso { penalty } => -penalty,
            Params::Forest { trees, mtry, min_leaf } => {
                (trees * mtry) as f64 - min_leaf as f64
            }
            // More neighbours smooth harder.
            Params::Knn { neighbors } => -(neighbors as f64),
            Params::Svr { cost } => cost,
        }
    }

    pub fn label(&self) -> String {
        match *self {
            Params::Lasso { penalty } => format!("lasso(penalty={penalty})"),
            Params::Forest { trees, mtry, min_leaf } => {
                format!("forest(trees={trees}, mtry={mtry}, min_leaf={min_leaf})")
            }
            Params::Knn { neighbors } => format!("knn(k={neighbors})"),
            Params::Svr { cost } => format!("svr(cost={cost})"),
        }
    }
}

/// A fitted model of any family. Enum dispatch keeps the final artifact
/// serializable, which a boxed trait object would not be.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FittedModel {
    Lasso(Lasso),
    Forest(RandomForest),
    Knn(KnnRegressor),
    Svr(Svr),
}

impl Regressor for FittedModel {
    fn predict(&self, x: &Matrix) -> PipelineResult<Vec<f64>> {
        match self {
            FittedModel::Lasso(m) => m.predict(x),
            FittedModel::Forest(m) => m.predict(x),
            FittedModel::Knn(m) => m.predict(x),
            FittedModel::Svr(m) => m.predict(x),
        }
    }
}

/// Fit one hyperparameter point. `seed` only matters for families with
/// stochastic training.
pub fn fit(params: &Params, x: &Matrix, y: &[f64], seed: u64) -> PipelineResult<FittedModel> {
    match *params {
        Params::Lasso { penalty } => {
            let mut model = Lasso::new(penalty);
            model.fit(x, y)?;
            Ok(FittedModel::Lasso(model))
        }
        Params::Forest { trees, mtry, min_leaf } => {
            let mut model = RandomForest::new(trees, mtry, min_leaf);
            model.fit(x, y, seed)?;
            Ok(FittedModel::Forest(model))
        }
        Params::Knn { neighbors } => {
            let mut model = KnnRegressor::new(neighbors);
            model.fit(x, y)?;
            Ok(FittedModel::Knn(model))
        }
        Params::Svr { cost } => {
            let mut model = Svr::new(cost);
            model.fit(x, y)?;
            Ok(FittedModel::Svr(model))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tiny() -> (Matrix, Vec<f64>) {
        let rows: Vec<Vec<f64>> = (0..12).map(|i| vec![i as f64, (i % 4) as f64]).collect();
        let y: Vec<f64> = rows.iter().map(|r| r[0] * 2.0 + r[1]).collect();
        (Matrix::from_rows(&rows).unwrap(), y)
    }

    #[test]
    fn test_fit_dispatches_every_family() {
        let (x, y) = tiny();
        let points = [
            Params::Lasso { penalty: 0.1 },
            Params::Forest { trees: 5, mtry: 2, min_leaf: 1 },
            Params::Knn { neighbors: 3 },
            Params::Svr { cost: 1.0 },
        ];
        for p in points {
            let model = fit(&p, &x, &y, 42).unwrap();
            let preds = model.predict(&x).unwrap();
            assert_eq!(preds.len(), y.len());
            assert!(!p.label().is_empty());
        }
    }

    #[test]
    fn test_complexity_orders_within_family() {
        assert!(
            Params::Lasso { penalty: 10.0 }.complexity()
                < Params::Lasso { penalty: 0.1 }.complexity()
        );
        assert!(
            Params::Knn { neighbors: 9 }.complexity() < Params::Knn { neighbors: 3 }.complexity()
        );
    }

    #[test]
    fn test_params_roundtrip_json() {
        let p = Params::Forest { trees: 100, mtry: 4, min_leaf: 5 };
        let blob = serde_json::to_string(&p).unwrap();
        let back: Params = serde_json::from_str(&blob).unwrap();
        assert_eq!(p, back);
        assert_eq!(back.family(), Family::Forest);
    }
}
