use pricecast_core::{Matrix, PipelineError, PipelineResult};
use serde::{Deserialize, Serialize};

/// L1-penalized linear regression fitted by cyclic coordinate descent with
/// soft thresholding. The residual vector is kept up to date across weight
/// updates, so one sweep costs O(n * p).
///
/// Works best on standardized features; the intercept is always unpenalized.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Lasso {
    pub penalty: f64,
    pub max_iter: usize,
    pub tol: f64,
    weights: Option<Vec<f64>>,
    bias: f64,
}

fn soft_threshold(value: f64, threshold: f64) -> f64 {
    if value > threshold {
        value - threshold
    } else if value < -threshold {
        value + threshold
    } else {
        0.0
    }
}

impl Lasso {
    pub fn new(penalty: f64) -> Self {
        Lasso {
            penalty,
            max_iter: 1000,
            tol: 1e-6,
            weights: None,
            bias: 0.0,
        }
    }

    pub fn weights(&self) -> Option<&[f64]> {
        self.weights.as_deref()
    }

    pub fn bias(&self) -> f64 {
        self.bias
    }

    /// Number of non-zero coefficients.
    pub fn active(&self) -> usize {
        self.weights
            .as_ref()
            .map_or(0, |w| w.iter().filter(|&&v| v != 0.0).count())
    }

    pub fn fit(&mut self, x: &Matrix, y: &[f64]) -> PipelineResult<()> {
        let n = x.rows();
        let p = x.cols();
        if n == 0 {
            return Err(PipelineError::EmptyData("lasso training set".into()));
        }
        if y.len() != n {
            return Err(PipelineError::ShapeMismatch {
                expected: n,
                got: y.len(),
            });
        }
        if self.penalty < 0.0 {
            return Err(PipelineError::InvalidConfig(format!(
                "lasso penalty must be non-negative, got {}",
                self.penalty
            )));
        }

        let nf = n as f64;
        // Per-column mean of squares, the coordinate-wise curvature.
        let mut col_sq = vec![0.0f64; p];
        for i in 0..n {
            for j in 0..p {
                let v = x.at(i, j);
                col_sq[j] += v * v;
            }
        }
        for c in col_sq.iter_mut() {
            *c /= nf;
        }

        let mut weights = vec![0.0f64; p];
        let mut bias = y.iter().sum::<f64>() / nf;
        let mut residual: Vec<f64> = y.iter().map(|&v| v - bias).collect();

        for _ in 0..self.max_iter {
            let mut max_delta = 0.0f64;

            let shift = residual.iter().sum::<f64>() / nf;
            if shift != 0.0 {
                bias += shift;
                for r in residual.iter_mut() {
                    *r -= shift;
                }
                max_delta = shift.abs();
            }

            for j in 0..p {
                if col_sq[j] == 0.0 {
                    continue;
                }
                let old = weights[j];
                let mut rho = 0.0f64;
                for i in 0..n {
                    rho += x.at(i, j) * residual[i];
                }
                rho = rho / nf + col_sq[j] * old;

                let new = soft_threshold(rho, self.penalty) / col_sq[j];
                if new != old {
                    for i in 0..n {
                        residual[i] += x.at(i, j) * (old - new);
                    }
                    weights[j] = new;
                    max_delta = max_delta.max((new - old).abs());
                }
            }

            if max_delta < self.tol {
                break;
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
            .ok_or_else(|| PipelineError::NotFitted("lasso".into()))?;
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
                    if w != 0.0 {
                        acc += w * x.at(i, j);
                    }
                }
                acc
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn line_data() -> (Matrix, Vec<f64>) {
        // y = 3 x0 - 2 x1 + 1 on standardized-looking inputs.
        let rows: Vec<Vec<f64>> = vec![
            vec![-1.5, 0.5],
            vec![-0.5, -1.0],
            vec![0.0, 1.5],
            vec![0.5, -0.5],
            vec![1.5, -0.5],
        ];
        let y: Vec<f64> = rows.iter().map(|r| 3.0 * r[0] - 2.0 * r[1] + 1.0).collect();
        (Matrix::from_rows(&rows).unwrap(), y)
    }

    #[test]
    fn test_unpenalized_recovers_line() {
        let (x, y) = line_data();
        let mut model = Lasso::new(0.0);
        model.fit(&x, &y).unwrap();
        let w = model.weights().unwrap();
        assert_relative_eq!(w[0], 3.0, epsilon = 1e-3);
        assert_relative_eq!(w[1], -2.0, epsilon = 1e-3);
        assert_relative_eq!(model.bias(), 1.0, epsilon = 1e-3);
    }

    #[test]
    fn test_large_penalty_zeroes_weights() {
        let (x, y) = line_data();
        let mut model = Lasso::new(1e6);
        model.fit(&x, &y).unwrap();
        assert_eq!(model.active(), 0);
        // All weights zero: predictions collapse to the intercept.
        let preds = model.predict(&x).unwrap();
        let mean = y.iter().sum::<f64>() / y.len() as f64;
        for p in preds {
            assert_relative_eq!(p, mean, epsilon = 1e-6);
        }
    }

    #[test]
    fn test_penalty_shrinks_monotonically() {
        let (x, y) = line_data();
        let mut loose = Lasso::new(0.01);
        loose.fit(&x, &y).unwrap();
        let mut tight = Lasso::new(1.0);
        tight.fit(&x, &y).unwrap();
        let l1 = |w: &[f64]| w.iter().map(|v| v.abs()).sum::<f64>();
        assert!(l1(tight.weights().unwrap()) < l1(loose.weights().unwrap()));
    }

    #[test]
    fn test_predict_requires_fit() {
        let (x, _) = line_data();
        assert!(Lasso::new(0.1).predict(&x).is_err());
    }
}
