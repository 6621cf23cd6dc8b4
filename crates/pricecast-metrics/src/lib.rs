pub mod regression;

pub use regression::{ks_distance, mae, mse, r2_score, rmse};
