use pricecast_core::{PipelineError, PipelineResult};

/// Assign each value to one of `n_bins` quantile bins.
///
/// Bin boundaries come from the empirical quantiles of `values`, so the bins
/// are approximately equally populated regardless of the target's shape.
/// Values equal to a boundary fall into the higher bin.
pub fn quantile_bins(values: &[f64], n_bins: usize) -> PipelineResult<Vec<usize>> {
    if values.is_empty() {
        return Err(PipelineError::EmptyData("no values to bin".into()));
    }
    if n_bins < 1 {
        return Err(PipelineError::InvalidConfig(
            "bin count must be at least 1".into(),
        ));
    }
    if n_bins == 1 {
        return Ok(vec![0; values.len()]);
    }

    let mut sorted: Vec<f64> = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));

    // Upper boundary of each bin except the last.
    let n = sorted.len();
    let cuts: Vec<f64> = (1..n_bins)
        .map(|b| {
            let pos = (b * n) / n_bins;
            sorted[pos.min(n - 1)]
        })
        .collect();

    Ok(values
        .iter()
        .map(|&v| cuts.iter().take_while(|&&c| v >= c).count())
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quantile_bins_balanced() {
        let values: Vec<f64> = (0..100).map(|i| i as f64).collect();
        let bins = quantile_bins(&values, 4).unwrap();
        let mut counts = [0usize; 4];
        for &b in &bins {
            counts[b] += 1;
        }
        for &c in &counts {
            assert!((20..=30).contains(&c), "unbalanced bin: {counts:?}");
        }
        // Monotone: larger values never land in a lower bin.
        assert!(bins[99] >= bins[0]);
    }

    #[test]
    fn test_quantile_bins_single_bin_and_errors() {
        assert!(quantile_bins(&[], 4).is_err());
        assert!(quantile_bins(&[1.0], 0).is_err());
        assert_eq!(quantile_bins(&[5.0, 6.0], 1).unwrap(), vec![0, 0]);
    }

    #[test]
    fn test_quantile_bins_boundary_values_go_up() {
        // The cut between two bins of [1, 1, 2, 2] sits at 2, and both 2s
        // land above it.
        assert_eq!(quantile_bins(&[1.0, 1.0, 2.0, 2.0], 2).unwrap(), vec![0, 0, 1, 1]);
    }

    #[test]
    fn test_quantile_bins_skewed_values() {
        // Heavily skewed data still spreads across bins.
        let values: Vec<f64> = (0..100).map(|i| (i as f64).exp2().min(1e12)).collect();
        let bins = quantile_bins(&values, 4).unwrap();
        assert!(bins.iter().any(|&b| b == 0));
        assert!(bins.iter().any(|&b| b == 3));
    }
}
