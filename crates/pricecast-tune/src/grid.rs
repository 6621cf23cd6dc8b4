use pricecast_models::{Family, Params};

/// Build the hyperparameter grid for one family.
///
/// `levels` controls the grid resolution and `n_features` the feature count
/// of the fitted design matrix, which anchors the forest's `mtry` range.
pub fn family_grid(family: Family, levels: usize, n_features: usize) -> Vec<Params> {
    match family {
        // Penalties log-spaced from 0.01 upward, one decade per level.
        Family::Lasso => (0..levels)
            .map(|i| Params::Lasso {
                penalty: 10f64.powi(i as i32 - 2),
            })
            .collect(),
        // Fixed ensemble size, mtry swept over fractions of the feature
        // count. Duplicate points after rounding are collapsed.
        Family::Forest => {
            let p = n_features.max(1);
            let mut grid: Vec<Params> = Vec::new();
            for i in 0..levels {
                let frac = (i + 1) as f64 / levels as f64;
                let mtry = ((p as f64 * frac).round() as usize).clamp(1, p);
                let point = Params::Forest {
                    trees: 200,
                    mtry,
                    min_leaf: 5,
                };
                if !grid.contains(&point) {
                    grid.push(point);
                }
            }
            grid
        }
        // Odd neighbour counts starting at 3.
        Family::Knn => (0..levels)
            .map(|i| Params::Knn {
                neighbors: 2 * i + 3,
            })
            .collect(),
        // Costs log-spaced in base 2 around 1.
        Family::Svr => (0..levels)
            .map(|i| Params::Svr {
                cost: 2f64.powi(i as i32 - 1),
            })
            .collect(),
    }
}
