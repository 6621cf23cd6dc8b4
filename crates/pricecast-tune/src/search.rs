use log::{debug, warn};
use pricecast_core::{Matrix, PipelineError, PipelineResult};
use pricecast_data::Frame;
use pricecast_metrics::{r2_score, rmse};
use pricecast_models::{fit, Family, Params, Regressor};
use pricecast_recipe::Recipe;
use pricecast_resample::Fold;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// Score of one (grid point, fold) cell.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CellScore {
    pub point: usize,
    pub repeat: usize,
    pub fold: usize,
    pub rmse: f64,
    pub r2: f64,
}

/// Cross-validated performance of one grid point, aggregated over every
/// fold where the fit succeeded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PointSummary {
    pub params: Params,
    pub mean_rmse: f64,
    pub std_rmse: f64,
    pub mean_r2: f64,
    /// Number of successful cells behind the means.
    pub cells: usize,
}

/// Full search result for one family.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TuneTable {
    pub family: Family,
    pub points: Vec<PointSummary>,
    pub cells: Vec<CellScore>,
    /// Index into `points` of the selected candidate.
    pub best: usize,
}

impl TuneTable {
    pub fn best_point(&self) -> &PointSummary {
        &self.points[self.best]
    }
}

/// Design matrices for one fold, with the recipe fitted on the fold's
/// training rows only.
struct FoldData {
    repeat: usize,
    fold: usize,
    x_train: Matrix,
    y_train: Vec<f64>,
    x_hold: Matrix,
    y_hold: Vec<f64>,
}

fn prepare_fold(recipe: &Recipe, frame: &Frame, y: &[f64], fold: &Fold) -> PipelineResult<FoldData> {
    let train_frame = frame.select_rows(&fold.train)?;
    let hold_frame = frame.select_rows(&fold.holdout)?;
    let fitted = recipe.fit(&train_frame)?;
    Ok(FoldData {
        repeat: fold.repeat,
        fold: fold.fold,
        x_train: fitted.transform(&train_frame)?,
        y_train: fold.train.iter().map(|&i| y[i]).collect(),
        x_hold: fitted.transform(&hold_frame)?,
        y_hold: fold.holdout.iter().map(|&i| y[i]).collect(),
    })
}

/// Grid-search one family over pre-assigned cross-validation folds.
///
/// Every (point, fold) cell is independent and scored in parallel. A cell
/// whose fit fails is logged and dropped; a point with no surviving cells is
/// dropped entirely. Only when the whole grid is unusable does the family
/// fail, with [`PipelineError::GridExhausted`].
///
/// The best point has the lowest mean holdout RMSE; exact ties go to the
/// lower [`Params::complexity`], then to grid order.
pub fn tune_family(
    family: Family,
    grid: &[Params],
    recipe: &Recipe,
    frame: &Frame,
    y: &[f64],
    folds: &[Fold],
    seed: u64,
) -> PipelineResult<TuneTable> {
    if grid.is_empty() {
        return Err(PipelineError::GridExhausted {
            family: family.to_string(),
        });
    }
    if folds.is_empty() {
        return Err(PipelineError::EmptyData("fold assignments".into()));
    }

    let mut fold_data: Vec<FoldData> = folds
        .par_iter()
        .map(|fold| prepare_fold(recipe, frame, y, fold))
        .collect::<PipelineResult<_>>()?;
    // A fold without holdout rows would score as a perfect zero and drag
    // every mean down; such folds carry no information and are dropped.
    fold_data.retain(|d| {
        if d.y_hold.is_empty() {
            warn!("repeat {} fold {} has no holdout rows, skipping", d.repeat, d.fold);
        }
        !d.y_hold.is_empty()
    });
    if fold_data.is_empty() {
        return Err(PipelineError::EmptyData("fold assignments".into()));
    }

    let cells: Vec<CellScore> = (0..grid.len() * fold_data.len())
        .into_par_iter()
        .filter_map(|cell| {
            let point = cell / fold_data.len();
            let data = &fold_data[cell % fold_data.len()];
            let params = &grid[point];
            let fitted = match fit(params, &data.x_train, &data.y_train, seed.wrapping_add(cell as u64)) {
                Ok(m) => m,
                Err(e) => {
                    warn!(
                        "{} failed on repeat {} fold {}: {e}",
                        params.label(),
                        data.repeat,
                        data.fold
                    );
                    return None;
                }
            };
            let preds = match fitted.predict(&data.x_hold) {
                Ok(p) => p,
                Err(e) => {
                    warn!(
                        "{} prediction failed on repeat {} fold {}: {e}",
                        params.label(),
                        data.repeat,
                        data.fold
                    );
                    return None;
                }
            };
            Some(CellScore {
                point,
                repeat: data.repeat,
                fold: data.fold,
                rmse: rmse(&data.y_hold, &preds),
                r2: r2_score(&data.y_hold, &preds),
            })
        })
        .collect();

    let mut points = Vec::with_capacity(grid.len());
    for (idx, &params) in grid.iter().enumerate() {
        let scores: Vec<&CellScore> = cells.iter().filter(|c| c.point == idx).collect();
        if scores.is_empty() {
            continue;
        }
        let n = scores.len() as f64;
        let mean_rmse = scores.iter().map(|c| c.rmse).sum::<f64>() / n;
        let var = scores
            .iter()
            .map(|c| (c.rmse - mean_rmse) * (c.rmse - mean_rmse))
            .sum::<f64>()
            / n;
        let mean_r2 = scores.iter().map(|c| c.r2).sum::<f64>() / n;
        debug!(
            "{}: rmse {mean_rmse:.2} +/- {:.2} over {} cells",
            params.label(),
            var.sqrt(),
            scores.len()
        );
        points.push(PointSummary {
            params,
            mean_rmse,
            std_rmse: var.sqrt(),
            mean_r2,
            cells: scores.len(),
        });
    }

    if points.is_empty() {
        return Err(PipelineError::GridExhausted {
            family: family.to_string(),
        });
    }

    let mut best = 0;
    for i in 1..points.len() {
        let (a, b) = (&points[i], &points[best]);
        let better = match a.mean_rmse.total_cmp(&b.mean_rmse) {
            std::cmp::Ordering::Less => true,
            std::cmp::Ordering::Equal => {
                a.params.complexity() < b.params.complexity()
            }
            std::cmp::Ordering::Greater => false,
        };
        if better {
            best = i;
        }
    }

    Ok(TuneTable {
        family,
        points,
        cells,
        best,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pricecast_data::{listings_to_frame, synthetic::make_listings, TARGET_COLUMN};
    use pricecast_recipe::listing_recipe;
    use pricecast_resample::RepeatedStratifiedKFold;

    fn scenario(n: usize) -> (Frame, Vec<f64>, Vec<Fold>) {
        let listings = make_listings(n, 150.0, 21);
        let mut frame = listings_to_frame(&listings).unwrap();
        let y = frame.numeric(TARGET_COLUMN).unwrap().to_vec();
        frame.remove(TARGET_COLUMN).unwrap();
        let folds = RepeatedStratifiedKFold::new(3, 1, 4).assign(&y, 5).unwrap();
        (frame, y, folds)
    }

    #[test]
    fn test_tunes_a_lasso_grid() {
        let (frame, y, folds) = scenario(150);
        let recipe = listing_recipe(10, true);
        let grid = [
            Params::Lasso { penalty: 0.01 },
            Params::Lasso { penalty: 1.0 },
        ];
        let table = tune_family(Family::Lasso, &grid, &recipe, &frame, &y, &folds, 1).unwrap();
        assert_eq!(table.points.len(), 2);
        assert_eq!(table.cells.len(), 6);
        let best = table.best_point();
        // The winner is no worse than any other candidate by construction.
        assert!(table.points.iter().all(|p| best.mean_rmse <= p.mean_rmse));
        assert!(best.mean_rmse.is_finite());
    }

    #[test]
    fn test_small_data_cells_score_real_holdouts() {
        // Far fewer rows than the fold count times the bin count: every
        // scored cell must still rest on a non-empty holdout, so no cell
        // can report a vacuous zero error.
        let listings = make_listings(30, 150.0, 21);
        let mut frame = listings_to_frame(&listings).unwrap();
        let y = frame.numeric(TARGET_COLUMN).unwrap().to_vec();
        frame.remove(TARGET_COLUMN).unwrap();
        let folds = RepeatedStratifiedKFold::new(10, 1, 4).assign(&y, 5).unwrap();

        let recipe = listing_recipe(10, true);
        let grid = [Params::Lasso { penalty: 0.1 }];
        let table = tune_family(Family::Lasso, &grid, &recipe, &frame, &y, &folds, 1).unwrap();
        assert_eq!(table.cells.len(), 10);
        assert!(table.cells.iter().all(|c| c.rmse > 0.0));
        assert!(table.best_point().mean_rmse > 0.0);
    }

    #[test]
    fn test_empty_grid_is_exhausted() {
        let (frame, y, folds) = scenario(60);
        let recipe = listing_recipe(10, true);
        let err = tune_family(Family::Lasso, &[], &recipe, &frame, &y, &folds, 1).unwrap_err();
        assert!(matches!(err, PipelineError::GridExhausted { .. }));
    }

    #[test]
    fn test_all_cells_failing_is_exhausted() {
        let (frame, y, folds) = scenario(60);
        let recipe = listing_recipe(10, true);
        // Zero neighbours can never fit.
        let grid = [Params::Knn { neighbors: 0 }];
        let err = tune_family(Family::Knn, &grid, &recipe, &frame, &y, &folds, 1).unwrap_err();
        assert!(matches!(err, PipelineError::GridExhausted { .. }));
    }

    #[test]
    fn test_failing_point_is_dropped_not_fatal() {
        let (frame, y, folds) = scenario(60);
        let recipe = listing_recipe(10, true);
        let grid = [
            Params::Knn { neighbors: 0 },
            Params::Knn { neighbors: 3 },
        ];
        let table = tune_family(Family::Knn, &grid, &recipe, &frame, &y, &folds, 1).unwrap();
        assert_eq!(table.points.len(), 1);
        assert_eq!(table.best_point().params, Params::Knn { neighbors: 3 });
    }
}
