pub mod error;
pub mod matrix;

pub use error::{PipelineError, PipelineResult};
pub use matrix::Matrix;
