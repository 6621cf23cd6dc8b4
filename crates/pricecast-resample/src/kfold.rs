use crate::strata::quantile_bins;
use pricecast_core::{PipelineError, PipelineResult};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

/// One cross-validation fold: the rows to fit on and the held-out rows.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Fold {
    pub repeat: usize,
    pub fold: usize,
    pub train: Vec<usize>,
    pub holdout: Vec<usize>,
}

/// Repeated k-fold assignment, stratified on target quantile bins.
///
/// Within one repeat every row lands in exactly one holdout; repeats are
/// independent reshuffles. Each bin's shuffled rows are dealt onto a fold
/// cursor shared across bins, so every holdout mirrors the target
/// distribution, fold sizes differ by at most one row, and no fold is ever
/// empty — even when every bin holds fewer than `k` rows.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RepeatedStratifiedKFold {
    pub k: usize,
    pub repeats: usize,
    pub bins: usize,
}

impl RepeatedStratifiedKFold {
    pub fn new(k: usize, repeats: usize, bins: usize) -> Self {
        RepeatedStratifiedKFold { k, repeats, bins }
    }

    /// Produce `k * repeats` folds over `y.len()` rows.
    pub fn assign(&self, y: &[f64], seed: u64) -> PipelineResult<Vec<Fold>> {
        if self.k < 2 {
            return Err(PipelineError::InvalidConfig(format!(
                "fold count must be at least 2, got {}",
                self.k
            )));
        }
        if self.repeats < 1 {
            return Err(PipelineError::InvalidConfig(
                "repeat count must be at least 1".into(),
            ));
        }
        if y.len() < self.k {
            return Err(PipelineError::EmptyData(format!(
                "{} rows cannot fill {} folds",
                y.len(),
                self.k
            )));
        }

        let assignments = quantile_bins(y, self.bins)?;
        let mut rng = StdRng::seed_from_u64(seed);
        let mut folds = Vec::with_capacity(self.k * self.repeats);

        for repeat in 0..self.repeats {
            // fold id per row for this repeat
            let mut fold_of = vec![0usize; y.len()];
            // The cursor carries over from bin to bin. Restarting it at fold
            // 0 per bin would pile the remainders onto the low folds and
            // leave folds empty whenever every bin has fewer than k rows.
            let mut cursor = 0usize;
            for bin in 0..self.bins {
                let mut members: Vec<usize> =
                    (0..y.len()).filter(|&i| assignments[i] == bin).collect();
                members.shuffle(&mut rng);
                for &row in &members {
                    fold_of[row] = cursor % self.k;
                    cursor += 1;
                }
            }

            for fold in 0..self.k {
                let holdout: Vec<usize> =
                    (0..y.len()).filter(|&i| fold_of[i] == fold).collect();
                let train: Vec<usize> =
                    (0..y.len()).filter(|&i| fold_of[i] != fold).collect();
                folds.push(Fold {
                    repeat,
                    fold,
                    train,
                    holdout,
                });
            }
        }
        Ok(folds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn target(n: usize) -> Vec<f64> {
        (0..n).map(|i| (i as f64) * 7.3 % 101.0).collect()
    }

    #[test]
    fn test_every_row_held_out_once_per_repeat() {
        let y = target(103);
        let folds = RepeatedStratifiedKFold::new(5, 3, 4).assign(&y, 9).unwrap();
        assert_eq!(folds.len(), 15);
        for repeat in 0..3 {
            let mut seen = vec![0usize; y.len()];
            for f in folds.iter().filter(|f| f.repeat == repeat) {
                for &i in &f.holdout {
                    seen[i] += 1;
                }
            }
            assert!(seen.iter().all(|&c| c == 1), "repeat {repeat}");
        }
    }

    #[test]
    fn test_train_and_holdout_disjoint() {
        let y = target(60);
        let folds = RepeatedStratifiedKFold::new(4, 1, 2).assign(&y, 1).unwrap();
        for f in &folds {
            assert_eq!(f.train.len() + f.holdout.len(), 60);
            assert!(f.holdout.iter().all(|i| !f.train.contains(i)));
        }
    }

    #[test]
    fn test_fold_sizes_balanced() {
        let y = target(103);
        let folds = RepeatedStratifiedKFold::new(5, 1, 4).assign(&y, 2).unwrap();
        let sizes: Vec<usize> = folds.iter().map(|f| f.holdout.len()).collect();
        let min = *sizes.iter().min().unwrap();
        let max = *sizes.iter().max().unwrap();
        assert!(max - min <= 1, "{sizes:?}");
    }

    #[test]
    fn test_small_strata_never_leave_a_fold_empty() {
        // 12 rows over 10 folds with 4 bins: every bin has fewer than k
        // members, but every holdout must still get at least one row.
        let y = target(12);
        let folds = RepeatedStratifiedKFold::new(10, 2, 4).assign(&y, 3).unwrap();
        assert_eq!(folds.len(), 20);
        assert!(folds.iter().all(|f| !f.holdout.is_empty()));
        assert!(folds.iter().all(|f| !f.train.is_empty()));
    }

    #[test]
    fn test_assign_rejects_bad_config() {
        let y = target(10);
        assert!(RepeatedStratifiedKFold::new(1, 1, 2).assign(&y, 0).is_err());
        assert!(RepeatedStratifiedKFold::new(5, 0, 2).assign(&y, 0).is_err());
        assert!(RepeatedStratifiedKFold::new(20, 1, 2).assign(&y, 0).is_err());
    }
}
