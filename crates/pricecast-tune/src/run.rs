use log::{info, warn};
use pricecast_core::{PipelineError, PipelineResult};
use pricecast_data::{drop_zero_mileage, listings_to_frame, Listing, TARGET_COLUMN};
use pricecast_metrics::{r2_score, rmse};
use pricecast_models::{fit, Family, FittedModel, Params, Regressor};
use pricecast_recipe::{listing_recipe, FittedRecipe};
use pricecast_resample::{stratified_split, RepeatedStratifiedKFold};
use serde::{Deserialize, Serialize};

use crate::config::RunConfig;
use crate::grid::family_grid;
use crate::search::{tune_family, TuneTable};

/// What happened to one family during the search. A failed family keeps its
/// error message instead of aborting the run; the competition continues with
/// whoever is left.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FamilyOutcome {
    pub family: Family,
    pub table: Option<TuneTable>,
    pub error: Option<String>,
}

/// Summary of a complete tuning run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunReport {
    /// Rows removed by the zero-mileage filter before any modelling.
    pub excluded_zero_mileage: usize,
    pub train_rows: usize,
    pub test_rows: usize,
    pub feature_names: Vec<String>,
    pub outcomes: Vec<FamilyOutcome>,
    pub winner: Params,
    /// Held-out test metrics of the winner refitted on all training rows.
    pub test_rmse: f64,
    pub test_r2: f64,
}

/// The report plus the refitted artifacts needed to predict new listings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunArtifacts {
    pub report: RunReport,
    pub recipe: FittedRecipe,
    pub model: FittedModel,
}

/// Execute a full run: filter, split, cross-validated grid search per
/// family, winner selection, and a final refit evaluated once on the test
/// partition. The test rows influence nothing before that last step.
pub fn run(config: &RunConfig, listings: Vec<Listing>) -> PipelineResult<RunArtifacts> {
    config.validate()?;

    let (listings, excluded) = drop_zero_mileage(listings);
    if listings.is_empty() {
        return Err(PipelineError::EmptyData("listings after filtering".into()));
    }

    let mut frame = listings_to_frame(&listings)?;
    let y = frame.numeric(TARGET_COLUMN)?.to_vec();
    frame.remove(TARGET_COLUMN)?;

    let split = stratified_split(&y, config.test_fraction, config.strat_bins, config.seed)?;
    let train_frame = frame.select_rows(&split.train)?;
    let test_frame = frame.select_rows(&split.test)?;
    let y_train: Vec<f64> = split.train.iter().map(|&i| y[i]).collect();
    let y_test: Vec<f64> = split.test.iter().map(|&i| y[i]).collect();
    info!(
        "{} train rows, {} test rows, {excluded} excluded for zero mileage",
        y_train.len(),
        y_test.len()
    );

    let folds = RepeatedStratifiedKFold::new(config.folds, config.repeats, config.strat_bins)
        .assign(&y_train, config.seed.wrapping_add(1))?;
    let recipe = listing_recipe(config.rare_threshold, config.drop_first);

    // Fitted once on the full training partition; reused for forest grid
    // sizing and for the winner's final refit.
    let fitted_recipe = recipe.fit(&train_frame)?;
    let n_features = fitted_recipe.width();

    let search = || -> Vec<FamilyOutcome> {
        config
            .families
            .iter()
            .enumerate()
            .map(|(idx, &family)| {
                let grid = family_grid(family, config.grid_levels, n_features);
                let seed = config.seed.wrapping_add(1000 * (idx as u64 + 1));
                match tune_family(family, &grid, &recipe, &train_frame, &y_train, &folds, seed) {
                    Ok(table) => FamilyOutcome {
                        family,
                        table: Some(table),
                        error: None,
                    },
                    Err(e) => {
                        warn!("{family} dropped from the competition: {e}");
                        FamilyOutcome {
                            family,
                            table: None,
                            error: Some(e.to_string()),
                        }
                    }
                }
            })
            .collect()
    };
    let outcomes = match config.workers {
        Some(n) => rayon::ThreadPoolBuilder::new()
            .num_threads(n)
            .build()
            .map_err(|e| PipelineError::InvalidConfig(e.to_string()))?
            .install(search),
        None => search(),
    };

    // Winner: lowest cross-validated mean RMSE across families, exact ties
    // going to the family listed first in the config.
    let mut winner: Option<&TuneTable> = None;
    for outcome in &outcomes {
        if let Some(table) = &outcome.table {
            let better = match winner {
                None => true,
                Some(best) => {
                    table.best_point().mean_rmse < best.best_point().mean_rmse
                }
            };
            if better {
                winner = Some(table);
            }
        }
    }
    let winner = winner.ok_or(PipelineError::NoViableFamily)?;
    let params = winner.best_point().params;
    info!(
        "winner: {} with cv rmse {:.2}",
        params.label(),
        winner.best_point().mean_rmse
    );

    let x_train = fitted_recipe.transform(&train_frame)?;
    let model = fit(&params, &x_train, &y_train, config.seed)?;
    let x_test = fitted_recipe.transform(&test_frame)?;
    let preds = model.predict(&x_test)?;
    let test_rmse = rmse(&y_test, &preds);
    let test_r2 = r2_score(&y_test, &preds);
    info!("test rmse {test_rmse:.2}, test r2 {test_r2:.4}");

    Ok(RunArtifacts {
        report: RunReport {
            excluded_zero_mileage: excluded,
            train_rows: y_train.len(),
            test_rows: y_test.len(),
            feature_names: fitted_recipe.feature_names().to_vec(),
            outcomes,
            winner: params,
            test_rmse,
            test_r2,
        },
        recipe: fitted_recipe,
        model,
    })
}
