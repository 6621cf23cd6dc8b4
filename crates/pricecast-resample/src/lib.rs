pub mod kfold;
pub mod split;
pub mod strata;

pub use kfold::{Fold, RepeatedStratifiedKFold};
pub use split::{stratified_split, Split};
pub use strata::quantile_bins;
