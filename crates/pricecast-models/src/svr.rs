use pricecast_core::{Matrix, PipelineError, PipelineResult};
use serde::{Deserialize, Serialize};

/// Linear support vector regression with an epsilon-insensitive loss, fitted
/// by per-sample subgradient steps. The tube width and step size are scaled
/// by the target's standard deviation so the optimizer behaves the same for
/// prices in the thousands as for unit targets. Regularization strength is
/// `1 / cost`: larger cost follows the data more closely.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Svr {
    pub cost: f64,
    /// Tube half-width as a fraction of the target standard deviation.
    pub epsilon_frac: f64,
    /// Step size as a fraction of the target standard deviation.
    pub rate_frac: f64,
    pub max_iter: usize,
    weights: Option<Vec<f64>>,
    bias: f64,
}

impl Svr {
    pub fn new(cost: f64) -> Self {
        Svr {
            cost,
            epsilon_frac: 0.1,
            rate_frac: 0.01,
            max_iter: 300,
            weights: None,
            bias: 0.0,
        }
    }

    pub fn fit(&mut self, x: &Matrix, y: &[f64]) -> PipelineResult<()> {
        let n = x.rows();
        let p = x.cols();
        if n == 0 {
            return Err(PipelineError::EmptyData("svr training set".into()));
        }
        if y.len() != n {
            return Err(PipelineError::ShapeMismatch {
                expected: n,
                got: y.len(),
            });
        }
        if self.cost <= 0.0 {
            return Err(PipelineError::InvalidConfig(format!(
                "svr cost must be positive, got {}",
                self.cost
            )));
        }

        let nf = n as f64;
        let mean = y.iter().sum::<f64>() / nf;
        let std = (y.iter().map(|&v| (v - mean) * (v - mean)).sum::<f64>() / nf).sqrt();
        let scale = if std > 1e-12 { std } else { 1.0 };
        let epsilon = self.epsilon_frac * scale;
        let rate = self.rate_frac * scale;
        let shrink = rate / (self.cost * scale * nf);

        let mut weights = vec![0.0f64; p];
        let mut bias = mean;

        for _ in 0..self.max_iter {
            for i in 0..n {
                let mut pred = bias;
                for (j, &w) in weights.iter().enumerate() {
                    pred += w * x.at(i, j);
                }
                let err = pred - y[i];
                let direction = if err > epsilon {
                    -1.0
                } else if err < -epsilon {
                    1.0
                } else {
                    0.0
                };
                for (j, w) in weights.iter_mut().enumerate() {
                    *w += direction * rate * x.at(i, j) - shrink * *w;
                }
                bias += direction * rate;
            }
        }

        self.weights = Some(weights);
        self.bias = bias;
        Ok(())
    }

    pub fn predict(&self, x: &Matrix) -> PipelineResult<Vec<f64>> {
        let weights = self
            .weights
            .as_ref()
            .ok_or_else(|| PipelineError::NotFitted("svr".into()))?;
        if x.cols() != weights.len() {
            return Err(PipelineError::ShapeMismatch {
                expected: weights.len(),
                got: x.cols(),
            });
        }
        Ok((0..x.rows())
            .map(|i| {
                let mut acc = self.bias;
                for (j, &w) in weights.iter().enumerate() {
                    acc += w * x.at(i, j);
                }
                acc
            })
            .collect())
    }
}
