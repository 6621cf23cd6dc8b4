use pricecast_core::{Matrix, PipelineError, PipelineResult};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TreeNode {
    Split {
        feature: usize,
        threshold: f64,
        left: Box<TreeNode>,
        right: Box<TreeNode>,
    },
    Leaf {
        value: f64,
    },
}

/// CART regression tree minimizing within-node squared error.
///
/// Split search sorts each feature once and scans candidate cut points with
/// running sums, so a node costs O(p * n log n) instead of the quadratic
/// scan over (feature, sample) threshold pairs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionTree {
    pub max_depth: usize,
    pub min_leaf: usize,
    root: Option<TreeNode>,
}

struct SplitCandidate {
    feature: usize,
    threshold: f64,
    cost: f64,
}

impl DecisionTree {
    pub fn new(max_depth: usize, min_leaf: usize) -> Self {
        DecisionTree {
            max_depth,
            min_leaf,
            root: None,
        }
    }

    pub fn fit(&mut self, x: &Matrix, y: &[f64]) -> PipelineResult<()> {
        if x.rows() == 0 {
            return Err(PipelineError::EmptyData("tree training set".into()));
        }
        if y.len() != x.rows() {
            return Err(PipelineError::ShapeMismatch {
                expected: x.rows(),
                got: y.len(),
            });
        }
        if self.min_leaf == 0 {
            return Err(PipelineError::InvalidConfig(
                "tree min_leaf must be at least 1".into(),
            ));
        }
        let indices: Vec<usize> = (0..x.rows()).collect();
        self.root = Some(self.build(x, y, &indices, 0));
        Ok(())
    }

    fn leaf(y: &[f64], indices: &[usize]) -> TreeNode {
        let value = indices.iter().map(|&i| y[i]).sum::<f64>() / indices.len() as f64;
        TreeNode::Leaf { value }
    }

    fn build(&self, x: &Matrix, y: &[f64], indices: &[usize], depth: usize) -> TreeNode {
        if depth >= self.max_depth || indices.len() < 2 * self.min_leaf {
            return Self::leaf(y, indices);
        }
        let split = match self.best_split(x, y, indices) {
            Some(s) => s,
            None => return Self::leaf(y, indices),
        };
        let (left_idx, right_idx): (Vec<usize>, Vec<usize>) = indices
            .iter()
            .partition(|&&i| x.at(i, split.feature) <= split.threshold);
        if left_idx.is_empty() || right_idx.is_empty() {
            return Self::leaf(y, indices);
        }
        TreeNode::Split {
            feature: split.feature,
            threshold: split.threshold,
            left: Box::new(self.build(x, y, &left_idx, depth + 1)),
            right: Box::new(self.build(x, y, &right_idx, depth + 1)),
        }
    }

    fn best_split(&self, x: &Matrix, y: &[f64], indices: &[usize]) -> Option<SplitCandidate> {
        let n = indices.len();
        let total: f64 = indices.iter().map(|&i| y[i]).sum();
        let total_sq: f64 = indices.iter().map(|&i| y[i] * y[i]).sum();
        let parent_cost = total_sq - total * total / n as f64;
        if parent_cost <= 1e-12 {
            return None;
        }

        let mut best: Option<SplitCandidate> = None;
        let mut pairs: Vec<(f64, f64)> = Vec::with_capacity(n);
        for feature in 0..x.cols() {
            pairs.clear();
            pairs.extend(indices.iter().map(|&i| (x.at(i, feature), y[i])));
            pairs.sort_by(|a, b| a.0.total_cmp(&b.0));

            let mut left_sum = 0.0f64;
            let mut left_sq = 0.0f64;
            for s in 1..n {
                let (v_prev, yv) = pairs[s - 1];
                left_sum += yv;
                left_sq += yv * yv;
                let v_next = pairs[s].0;
                if v_prev == v_next {
                    continue;
                }
                if s < self.min_leaf || n - s < self.min_leaf {
                    continue;
                }
                let right_sum = total - left_sum;
                let right_sq = total_sq - left_sq;
                let cost = (left_sq - left_sum * left_sum / s as f64)
                    + (right_sq - right_sum * right_sum / (n - s) as f64);
                if best.as_ref().map_or(true, |b| cost < b.cost) {
                    best = Some(SplitCandidate {
                        feature,
                        threshold: (v_prev + v_next) / 2.0,
                        cost,
                    });
                }
            }
        }
        best.filter(|b| b.cost < parent_cost - 1e-12)
    }

    pub fn predict_row(&self, row: &[f64]) -> PipelineResult<f64> {
        let mut node = self
            .root
            .as_ref()
            .ok_or_else(|| PipelineError::NotFitted("decision tree".into()))?;
        loop {
            match node {
                TreeNode::Leaf { value } => return Ok(*value),
                TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    node = if row[*feature] <= *threshold { left } else { right };
                }
            }
        }
    }

    pub fn predict(&self, x: &Matrix) -> PipelineResult<Vec<f64>> {
        (0..x.rows())
            .map(|i| self.predict_row(x.row(i)?))
            .collect()
    }
}
