pub mod categorical;
pub mod numeric;
pub mod recipe;
pub mod step;

pub use categorical::{DummyEncode, NovelHandler, RareCollapse, OTHER_LEVEL, UNKNOWN_LEVEL};
pub use numeric::{Interactions, LogTransform, Standardize, ZeroVariance};
pub use recipe::{FittedRecipe, Recipe};
pub use step::{Step, Transform};

/// The feature recipe for vehicle listings, steps in the fixed order the
/// models expect:
///
/// 1. novel-category fallback for every categorical column
/// 2. rare-model collapse below `rare_threshold`
/// 3. one-hot encoding
/// 4. interactions: model indicators x doors, doors x seats
/// 5. log10 mileage
/// 6. zero-variance filter
/// 7. standardization
pub fn listing_recipe(rare_threshold: usize, drop_first: bool) -> Recipe {
    Recipe::new()
        .step(Step::Novel(NovelHandler::new()))
        .step(Step::Rare(RareCollapse::new("model", rare_threshold)))
        .step(Step::OneHot(DummyEncode::new(drop_first)))
        .step(Step::Interact(Interactions::new(vec![
            ("model_*".into(), "doors".into()),
            ("doors".into(), "seats".into()),
        ])))
        .step(Step::Log(LogTransform::new("mileage")))
        .step(Step::ZeroVar(ZeroVariance::new()))
        .step(Step::Scale(Standardize::new()))
}
