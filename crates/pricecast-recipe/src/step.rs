use pricecast_core::PipelineResult;
use pricecast_data::Frame;
use serde::{Deserialize, Serialize};

use crate::categorical::{DummyEncode, NovelHandler, RareCollapse};
use crate::numeric::{Interactions, LogTransform, Standardize, ZeroVariance};

/// A recipe step. `fit` learns state from a training frame, `transform`
/// applies that state to any frame with the same schema. Steps must behave
/// identically on training and unseen data once fitted.
pub trait Transform {
    fn fit(&mut self, frame: &Frame) -> PipelineResult<()>;
    fn transform(&self, frame: &Frame) -> PipelineResult<Frame>;
}

/// Closed set of step kinds, so a fitted recipe serializes to plain JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Step {
    Novel(NovelHandler),
    Rare(RareCollapse),
    OneHot(DummyEncode),
    Interact(Interactions),
    Log(LogTransform),
    ZeroVar(ZeroVariance),
    Scale(Standardize),
}

impl Transform for Step {
    fn fit(&mut self, frame: &Frame) -> PipelineResult<()> {
        match self {
            Step::Novel(s) => s.fit(frame),
            Step::Rare(s) => s.fit(frame),
            Step::OneHot(s) => s.fit(frame),
            Step::Interact(s) => s.fit(frame),
            Step::Log(s) => s.fit(frame),
            Step::ZeroVar(s) => s.fit(frame),
            Step::Scale(s) => s.fit(frame),
        }
    }

    fn transform(&self, frame: &Frame) -> PipelineResult<Frame> {
        match self {
            Step::Novel(s) => s.transform(frame),
            Step::Rare(s) => s.transform(frame),
            Step::OneHot(s) => s.transform(frame),
            Step::Interact(s) => s.transform(frame),
            Step::Log(s) => s.transform(frame),
            Step::ZeroVar(s) => s.transform(frame),
            Step::Scale(s) => s.transform(frame),
        }
    }
}
