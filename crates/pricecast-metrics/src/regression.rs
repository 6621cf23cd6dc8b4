/// Mean Squared Error.
pub fn mse(y_true: &[f64], y_pred: &[f64]) -> f64 {
    assert_eq!(y_true.len(), y_pred.len());
    let n = y_true.len().max(1) as f64;
    y_true
        .iter()
        .zip(y_pred.iter())
        .map(|(&t, &p)| (t - p) * (t - p))
        .sum::<f64>()
        / n
}

/// Root Mean Squared Error.
pub fn rmse(y_true: &[f64], y_pred: &[f64]) -> f64 {
    mse(y_true, y_pred).sqrt()
}

/// Mean Absolute Error.
pub fn mae(y_true: &[f64], y_pred: &[f64]) -> f64 {
    assert_eq!(y_true.len(), y_pred.len());
    let n = y_true.len().max(1) as f64;
    y_true
        .iter()
        .zip(y_pred.iter())
        .map(|(&t, &p)| (t - p).abs())
        .sum::<f64>()
        / n
}

/// R² (coefficient of determination).
pub fn r2_score(y_true: &[f64], y_pred: &[f64]) -> f64 {
    assert_eq!(y_true.len(), y_pred.len());
    let n = y_true.len() as f64;
    let mean: f64 = y_true.iter().sum::<f64>() / n;

    let ss_res: f64 = y_true
        .iter()
        .zip(y_pred.iter())
        .map(|(&t, &p)| (t - p) * (t - p))
        .sum();
    let ss_tot: f64 = y_true.iter().map(|&t| (t - mean) * (t - mean)).sum();

    if ss_tot < 1e-15 {
        return 0.0;
    }
    1.0 - ss_res / ss_tot
}

/// Two-sample Kolmogorov-Smirnov distance: the largest gap between the two
/// empirical CDFs. Used to check that stratified partitions preserve the
/// target distribution.
pub fn ks_distance(a: &[f64], b: &[f64]) -> f64 {
    if a.is_empty() || b.is_empty() {
        return 1.0;
    }
    let mut sa: Vec<f64> = a.to_vec();
    let mut sb: Vec<f64> = b.to_vec();
    sa.sort_by(|x, y| x.total_cmp(y));
    sb.sort_by(|x, y| x.total_cmp(y));

    let (mut i, mut j) = (0usize, 0usize);
    let (na, nb) = (sa.len() as f64, sb.len() as f64);
    let mut max_gap = 0.0f64;
    while i < sa.len() && j < sb.len() {
        if sa[i] <= sb[j] {
            i += 1;
        } else {
            j += 1;
        }
        let gap = (i as f64 / na - j as f64 / nb).abs();
        if gap > max_gap {
            max_gap = gap;
        }
    }
    max_gap
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_rmse_and_mae() {
        let t = [1.0, 2.0, 3.0];
        assert_relative_eq!(rmse(&t, &t), 0.0);
        assert_relative_eq!(mae(&t, &[1.5, 2.5, 3.5]), 0.5);
        assert_relative_eq!(rmse(&[0.0, 0.0], &[3.0, 4.0]), (12.5f64).sqrt());
    }

    #[test]
    fn test_r2() {
        let t = [1.0, 2.0, 3.0, 4.0];
        assert_relative_eq!(r2_score(&t, &t), 1.0);
        // Predicting the mean gives R² = 0.
        assert_relative_eq!(r2_score(&t, &[2.5, 2.5, 2.5, 2.5]), 0.0);
        assert!(r2_score(&t, &[4.0, 3.0, 2.0, 1.0]) < 0.0);
    }

    #[test]
    fn test_ks_distance() {
        let a: Vec<f64> = (0..100).map(|i| i as f64).collect();
        assert!(ks_distance(&a, &a) < 1e-12);
        let b: Vec<f64> = (0..100).map(|i| i as f64 + 1000.0).collect();
        assert_relative_eq!(ks_distance(&a, &b), 1.0);
        // Interleaved samples from the same distribution stay close.
        let even: Vec<f64> = (0..100).map(|i| (2 * i) as f64).collect();
        let odd: Vec<f64> = (0..100).map(|i| (2 * i + 1) as f64).collect();
        assert!(ks_distance(&even, &odd) < 0.05);
    }
}
