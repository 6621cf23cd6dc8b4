pub mod config;
pub mod grid;
pub mod run;
pub mod search;

pub use config::RunConfig;
pub use grid::family_grid;
pub use run::{run, FamilyOutcome, RunArtifacts, RunReport};
pub use search::{tune_family, CellScore, PointSummary, TuneTable};
