use pricecast_core::{Matrix, PipelineResult};
use pricecast_data::Frame;
use serde::{Deserialize, Serialize};

use crate::step::{Step, Transform};

/// An ordered, unfitted sequence of steps.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Recipe {
    steps: Vec<Step>,
}

impl Recipe {
    pub fn new() -> Self {
        Recipe::default()
    }

    pub fn step(mut self, step: Step) -> Self {
        self.steps.push(step);
        self
    }

    /// Fit every step in order. Each step is fitted on the output of the
    /// previous one, exactly the frame it will see at transform time.
    pub fn fit(&self, frame: &Frame) -> PipelineResult<FittedRecipe> {
        let mut steps = self.steps.clone();
        let mut current = frame.clone();
        for step in steps.iter_mut() {
            step.fit(&current)?;
            current = step.transform(&current)?;
        }
        Ok(FittedRecipe {
            steps,
            feature_names: current.names().to_vec(),
        })
    }
}

/// A fitted recipe. All state was learned from the training frame passed to
/// [`Recipe::fit`]; transforming any other frame reuses that state unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FittedRecipe {
    steps: Vec<Step>,
    feature_names: Vec<String>,
}

impl FittedRecipe {
    /// Output column names, fixed at fit time.
    pub fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    pub fn width(&self) -> usize {
        self.feature_names.len()
    }

    pub fn transform_frame(&self, frame: &Frame) -> PipelineResult<Frame> {
        let mut current = frame.clone();
        for step in &self.steps {
            current = step.transform(&current)?;
        }
        Ok(current)
    }

    /// Transform a frame into the design matrix fed to models.
    pub fn transform(&self, frame: &Frame) -> PipelineResult<Matrix> {
        self.transform_frame(frame)?.to_matrix()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::listing_recipe;
    use pricecast_data::{listings_to_frame, synthetic::make_listings, TARGET_COLUMN};

    fn predictors(n: usize, seed: u64) -> Frame {
        let mut frame = listings_to_frame(&make_listings(n, 100.0, seed)).unwrap();
        frame.remove(TARGET_COLUMN).unwrap();
        frame
    }

    #[test]
    fn test_fit_then_transform_widths_agree() {
        let frame = predictors(200, 7);
        let fitted = listing_recipe(10, true).fit(&frame).unwrap();
        let m = fitted.transform(&frame).unwrap();
        assert_eq!(m.rows(), 200);
        assert_eq!(m.cols(), fitted.width());
        // Mileage survives, standardized around zero.
        assert!(fitted.feature_names().iter().any(|n| n == "mileage"));
    }

    #[test]
    fn test_unseen_rows_keep_fitted_width() {
        let train = predictors(200, 7);
        let fitted = listing_recipe(10, true).fit(&train).unwrap();
        let fresh = predictors(50, 8);
        let m = fitted.transform(&fresh).unwrap();
        assert_eq!(m.rows(), 50);
        assert_eq!(m.cols(), fitted.width());
    }

    #[test]
    fn test_fit_state_ignores_later_data() {
        let train = predictors(150, 3);
        let a = listing_recipe(10, true).fit(&train).unwrap();
        let b = listing_recipe(10, true).fit(&train).unwrap();
        // Same training frame, bit-identical fitted state.
        assert_eq!(a, b);
        let other = predictors(60, 99);
        b.transform(&other).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_rare_threshold_collapses_models() {
        let frame = predictors(200, 7);
        // Threshold above any level count: every model collapses to "other",
        // so no per-model indicator survives.
        let fitted = listing_recipe(1000, true).fit(&frame).unwrap();
        assert!(!fitted
            .feature_names()
            .iter()
            .any(|n| n.starts_with("model_") && !n.starts_with("model_other") && !n.starts_with("model_unknown")));
    }

    #[test]
    fn test_serializes_to_json() {
        let frame = predictors(100, 5);
        let fitted = listing_recipe(10, true).fit(&frame).unwrap();
        let blob = serde_json::to_string(&fitted).unwrap();
        let back: FittedRecipe = serde_json::from_str(&blob).unwrap();
        assert_eq!(fitted, back);
    }
}
