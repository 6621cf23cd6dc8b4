use pricecast_core::{Matrix, PipelineError, PipelineResult};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::tree::DecisionTree;

/// One ensemble member: a tree trained on a bootstrap sample over a random
/// feature subset. `features` maps the tree's column space back to the full
/// design matrix.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct ForestMember {
    tree: DecisionTree,
    features: Vec<usize>,
}

/// Bagged regression forest. Each tree sees a bootstrap resample of the rows
/// and a random subset of `mtry` features; predictions are the ensemble mean.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RandomForest {
    pub trees: usize,
    pub mtry: usize,
    pub min_leaf: usize,
    pub max_depth: usize,
    members: Option<Vec<ForestMember>>,
}

impl RandomForest {
    pub fn new(trees: usize, mtry: usize, min_leaf: usize) -> Self {
        RandomForest {
            trees,
            mtry,
            min_leaf,
            max_depth: 16,
            members: None,
        }
    }

    pub fn fit(&mut self, x: &Matrix, y: &[f64], seed: u64) -> PipelineResult<()> {
        let n = x.rows();
        let p = x.cols();
        if n == 0 || p == 0 {
            return Err(PipelineError::EmptyData("forest training set".into()));
        }
        if y.len() != n {
            return Err(PipelineError::ShapeMismatch {
                expected: n,
                got: y.len(),
            });
        }
        if self.trees == 0 {
            return Err(PipelineError::InvalidConfig(
                "forest needs at least one tree".into(),
            ));
        }
        let mtry = self.mtry.clamp(1, p);

        let mut rng = StdRng::seed_from_u64(seed);
        let mut all_features: Vec<usize> = (0..p).collect();
        let mut members = Vec::with_capacity(self.trees);

        for _ in 0..self.trees {
            let sample: Vec<usize> = (0..n).map(|_| rng.gen_range(0..n)).collect();
            all_features.shuffle(&mut rng);
            let mut features: Vec<usize> = all_features[..mtry].to_vec();
            features.sort_unstable();

            let rows: Vec<Vec<f64>> = sample
                .iter()
                .map(|&i| features.iter().map(|&j| x.at(i, j)).collect())
                .collect();
            let x_sub = Matrix::from_rows(&rows)?;
            let y_sub: Vec<f64> = sample.iter().map(|&i| y[i]).collect();

            let mut tree = DecisionTree::new(self.max_depth, self.min_leaf);
            tree.fit(&x_sub, &y_sub)?;
            members.push(ForestMember { tree, features });
        }
        self.members = Some(members);
        Ok(())
    }

    pub fn predict(&self, x: &Matrix) -> PipelineResult<Vec<f64>> {
        let members = self
            .members
            .as_ref()
            .ok_or_else(|| PipelineError::NotFitted("random forest".into()))?;
        let mut out = Vec::with_capacity(x.rows());
        let mut projected = Vec::new();
        for i in 0..x.rows() {
            let row = x.row(i)?;
            let mut acc = 0.0;
            for member in members {
                projected.clear();
                projected.extend(member.features.iter().map(|&j| row[j]));
                acc += member.tree.predict_row(&projected)?;
            }
            out.push(acc / members.len() as f64);
        }
        Ok(out)
    }
}
