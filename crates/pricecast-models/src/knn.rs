use pricecast_core::{Matrix, PipelineError, PipelineResult};
use serde::{Deserialize, Serialize};

/// K-nearest-neighbours regression under Euclidean distance. Fitting just
/// stores the training data; predictions average the targets of the `k`
/// closest training rows. Assumes standardized features, otherwise wide
/// columns dominate the distance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KnnRegressor {
    pub neighbors: usize,
    x_train: Option<Matrix>,
    y_train: Vec<f64>,
}

impl KnnRegressor {
    pub fn new(neighbors: usize) -> Self {
        KnnRegressor {
            neighbors,
            x_train: None,
            y_train: Vec::new(),
        }
    }

    pub fn fit(&mut self, x: &Matrix, y: &[f64]) -> PipelineResult<()> {
        if x.rows() == 0 {
            return Err(PipelineError::EmptyData("knn training set".into()));
        }
        if y.len() != x.rows() {
            return Err(PipelineError::ShapeMismatch {
                expected: x.rows(),
                got: y.len(),
            });
        }
        if self.neighbors == 0 || self.neighbors > x.rows() {
            return Err(PipelineError::InvalidConfig(format!(
                "knn neighbors must be in 1..={}, got {}",
                x.rows(),
                self.neighbors
            )));
        }
        self.x_train = Some(x.clone());
        self.y_train = y.to_vec();
        Ok(())
    }

    pub fn predict(&self, x: &Matrix) -> PipelineResult<Vec<f64>> {
        let train = self
            .x_train
            .as_ref()
            .ok_or_else(|| PipelineError::NotFitted("knn".into()))?;
        if x.cols() != train.cols() {
            return Err(PipelineError::ShapeMismatch {
                expected: train.cols(),
                got: x.cols(),
            });
        }

        let mut out = Vec::with_capacity(x.rows());
        let mut dists: Vec<(f64, f64)> = Vec::with_capacity(train.rows());
        for i in 0..x.rows() {
            let query = x.row(i)?;
            dists.clear();
            for t in 0..train.rows() {
                let row = train.row(t)?;
                let d: f64 = query
                    .iter()
                    .zip(row.iter())
                    .map(|(&a, &b)| (a - b) * (a - b))
                    .sum();
                dists.push((d, self.y_train[t]));
            }
            dists.select_nth_unstable_by(self.neighbors - 1, |a, b| a.0.total_cmp(&b.0));
            let sum: f64 = dists[..self.neighbors].iter().map(|&(_, y)| y).sum();
            out.push(sum / self.neighbors as f64);
        }
        Ok(out)
    }
}
