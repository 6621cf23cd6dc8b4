use std::collections::{BTreeMap, BTreeSet};

use pricecast_core::{PipelineError, PipelineResult};
use pricecast_data::{Column, Frame};
use serde::{Deserialize, Serialize};

use crate::step::Transform;

/// Level substituted for categorical values never seen during fitting.
pub const UNKNOWN_LEVEL: &str = "unknown";

/// Level that rare categories are collapsed into.
pub const OTHER_LEVEL: &str = "other";

/// Remembers the observed domain of every categorical column and maps any
/// value outside it to [`UNKNOWN_LEVEL`]. This makes a novel category at
/// prediction time indistinguishable from an explicit "unknown" entry, so
/// downstream encoding never fails on unseen data.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NovelHandler {
    domains: Option<BTreeMap<String, BTreeSet<String>>>,
}

impl NovelHandler {
    pub fn new() -> Self {
        NovelHandler::default()
    }
}

impl Transform for NovelHandler {
    fn fit(&mut self, frame: &Frame) -> PipelineResult<()> {
        let mut domains = BTreeMap::new();
        for (name, col) in frame.iter() {
            if let Column::Categorical(values) = col {
                let domain: BTreeSet<String> = values.iter().cloned().collect();
                domains.insert(name.to_string(), domain);
            }
        }
        self.domains = Some(domains);
        Ok(())
    }

    fn transform(&self, frame: &Frame) -> PipelineResult<Frame> {
        let domains = self
            .domains
            .as_ref()
            .ok_or_else(|| PipelineError::NotFitted("novel-category handler".into()))?;
        let mut out = Frame::new();
        for (name, col) in frame.iter() {
            let mapped = match (col, domains.get(name)) {
                (Column::Categorical(values), Some(domain)) => Column::Categorical(
                    values
                        .iter()
                        .map(|v| {
                            if domain.contains(v) {
                                v.clone()
                            } else {
                                UNKNOWN_LEVEL.to_string()
                            }
                        })
                        .collect(),
                ),
                _ => col.clone(),
            };
            out.push(name, mapped)?;
        }
        Ok(out)
    }
}

/// Collapses levels of one column that occur fewer than `threshold` times in
/// the training data into [`OTHER_LEVEL`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RareCollapse {
    column: String,
    threshold: usize,
    kept: Option<BTreeSet<String>>,
}

impl RareCollapse {
    pub fn new(column: impl Into<String>, threshold: usize) -> Self {
        RareCollapse {
            column: column.into(),
            threshold,
            kept: None,
        }
    }
}

impl Transform for RareCollapse {
    fn fit(&mut self, frame: &Frame) -> PipelineResult<()> {
        let values = frame.categorical(&self.column)?;
        let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
        for v in values {
            *counts.entry(v.as_str()).or_insert(0) += 1;
        }
        self.kept = Some(
            counts
                .into_iter()
                .filter(|&(_, c)| c >= self.threshold)
                .map(|(v, _)| v.to_string())
                .collect(),
        );
        Ok(())
    }

    fn transform(&self, frame: &Frame) -> PipelineResult<Frame> {
        let kept = self
            .kept
            .as_ref()
            .ok_or_else(|| PipelineError::NotFitted(format!("rare collapse for {}", self.column)))?;
        let mut out = Frame::new();
        for (name, col) in frame.iter() {
            let mapped = if name == self.column {
                match col {
                    Column::Categorical(values) => Column::Categorical(
                        values
                            .iter()
                            .map(|v| {
                                if kept.contains(v) {
                                    v.clone()
                                } else {
                                    OTHER_LEVEL.to_string()
                                }
                            })
                            .collect(),
                    ),
                    Column::Numeric(_) => {
                        return Err(PipelineError::ColumnTypeMismatch {
                            column: name.to_string(),
                            expected: "categorical",
                        })
                    }
                }
            } else {
                col.clone()
            };
            out.push(name, mapped)?;
        }
        Ok(out)
    }
}

/// Per-column encoding plan learned at fit time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct LevelPlan {
    /// Levels that get an indicator column, in output order. Always
    /// contains [`UNKNOWN_LEVEL`] so unseen values have a home.
    retained: Vec<String>,
    /// Reference level when `drop_first` is set: the first level in sorted
    /// order that is not [`UNKNOWN_LEVEL`]. Encoded as all zeros.
    dropped: Option<String>,
}

/// One-hot encodes every categorical column in place. Indicator columns are
/// named `{column}_{level}` with levels in sorted order. An [`UNKNOWN_LEVEL`]
/// indicator is always present so values unseen at fit time have a home, and
/// it is never the dropped reference level.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DummyEncode {
    drop_first: bool,
    plans: Option<BTreeMap<String, LevelPlan>>,
}

impl DummyEncode {
    pub fn new(drop_first: bool) -> Self {
        DummyEncode {
            drop_first,
            plans: None,
        }
    }
}

impl Transform for DummyEncode {
    fn fit(&mut self, frame: &Frame) -> PipelineResult<()> {
        let mut plans = BTreeMap::new();
        for (name, col) in frame.iter() {
            if let Column::Categorical(values) = col {
                let mut levels: Vec<String> =
                    values.iter().cloned().collect::<BTreeSet<_>>().into_iter().collect();
                if !levels.iter().any(|l| l == UNKNOWN_LEVEL) {
                    levels.push(UNKNOWN_LEVEL.to_string());
                }
                // The reference level is never the unknown indicator, even
                // when a literal "unknown" sorts first among the levels.
                let dropped = if self.drop_first && levels.len() > 1 {
                    levels
                        .iter()
                        .position(|l| l != UNKNOWN_LEVEL)
                        .map(|i| levels.remove(i))
                } else {
                    None
                };
                plans.insert(name.to_string(), LevelPlan { retained: levels, dropped });
            }
        }
        self.plans = Some(plans);
        Ok(())
    }

    fn transform(&self, frame: &Frame) -> PipelineResult<Frame> {
        let plans = self
            .plans
            .as_ref()
            .ok_or_else(|| PipelineError::NotFitted("one-hot encoder".into()))?;
        let mut out = Frame::new();
        for (name, col) in frame.iter() {
            match (col, plans.get(name)) {
                (Column::Categorical(values), Some(plan)) => {
                    let mut indicators = vec![vec![0.0f64; values.len()]; plan.retained.len()];
                    for (row, v) in values.iter().enumerate() {
                        if plan.dropped.as_deref() == Some(v.as_str()) {
                            continue;
                        }
                        let slot = plan
                            .retained
                            .iter()
                            .position(|l| l == v)
                            .or_else(|| plan.retained.iter().position(|l| l == UNKNOWN_LEVEL));
                        if let Some(j) = slot {
                            indicators[j][row] = 1.0;
                        }
                    }
                    for (level, values) in plan.retained.iter().zip(indicators) {
                        out.push(format!("{name}_{level}"), Column::Numeric(values))?;
                    }
                }
                (Column::Categorical(_), None) => {
                    return Err(PipelineError::ColumnNotFound(name.to_string()))
                }
                (Column::Numeric(_), _) => out.push(name, col.clone())?,
            }
        }
        Ok(out)
    }
}
