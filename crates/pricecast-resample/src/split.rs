use crate::strata::quantile_bins;
use pricecast_core::{PipelineError, PipelineResult};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

/// A disjoint train/test partition, as row indices into the source data.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Split {
    pub train: Vec<usize>,
    pub test: Vec<usize>,
}

/// Split rows into train/test partitions, stratified on the target.
///
/// The target is binned into `bins` quantile bins and each bin is split
/// independently at `test_fraction`, so the target's marginal distribution
/// is approximately preserved on both sides. The seed is explicit; the same
/// seed always yields the same partition.
pub fn stratified_split(
    y: &[f64],
    test_fraction: f64,
    bins: usize,
    seed: u64,
) -> PipelineResult<Split> {
    if !(0.0..1.0).contains(&test_fraction) || test_fraction == 0.0 {
        return Err(PipelineError::InvalidConfig(format!(
            "test fraction must be in (0, 1), got {test_fraction}"
        )));
    }
    let assignments = quantile_bins(y, bins)?;

    let mut rng = StdRng::seed_from_u64(seed);
    let mut train = Vec::new();
    let mut test = Vec::new();

    for bin in 0..bins {
        let mut members: Vec<usize> = (0..y.len()).filter(|&i| assignments[i] == bin).collect();
        members.shuffle(&mut rng);
        let n_test = ((members.len() as f64) * test_fraction).round() as usize;
        test.extend_from_slice(&members[..n_test]);
        train.extend_from_slice(&members[n_test..]);
    }

    train.sort_unstable();
    test.sort_unstable();
    Ok(Split { train, test })
}
