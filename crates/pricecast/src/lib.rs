//! # pricecast
//!
//! Price modelling for used-vehicle listings: one pipeline from raw CSV to
//! a cross-validated model competition and a single held-out test score.
//!
//! ## Modules
//!
//! - **core** — Shared error type and the dense row-major `Matrix`
//! - **data** — Listing records, CSV loading, the mixed-type `Frame`, synthetic data
//! - **resample** — Stratified train/test split and repeated stratified k-fold
//! - **recipe** — Fit/transform feature steps: novel-category handling, rare collapse, one-hot, interactions, log mileage, variance filter, standardization
//! - **metrics** — RMSE, MAE, R², Kolmogorov-Smirnov distance
//! - **models** — Model families: lasso, random forest, KNN, linear SVR
//! - **tune** — Grid construction, parallel cross-validated search, winner selection, the run driver
//! - **store** — JSON persistence for configs, recipes, models, and reports

/// Error type and matrix.
pub use pricecast_core as core;

/// Listings, frames, and loading.
pub use pricecast_data as data;

/// Splits and folds.
pub use pricecast_resample as resample;

/// Feature engineering.
pub use pricecast_recipe as recipe;

/// Evaluation metrics.
pub use pricecast_metrics as metrics;

/// Model families.
pub use pricecast_models as models;

/// Hyperparameter search and run driver.
pub use pricecast_tune as tune;

/// Artifact persistence.
pub use pricecast_store as store;
