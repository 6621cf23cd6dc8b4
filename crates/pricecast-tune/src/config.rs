use pricecast_core::{PipelineError, PipelineResult};
use pricecast_models::Family;
use serde::{Deserialize, Serialize};

/// Everything a tuning run needs, deserializable from a JSON file so runs
/// are reproducible from a checked-in config plus a seed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RunConfig {
    /// Share of rows held out as the final test set.
    pub test_fraction: f64,
    /// Folds per cross-validation repeat.
    pub folds: usize,
    /// Cross-validation repeats with reshuffled fold assignments.
    pub repeats: usize,
    /// Quantile bins used to stratify both the split and the folds.
    pub strat_bins: usize,
    /// Model levels rarer than this collapse into one bucket.
    pub rare_threshold: usize,
    /// Drop the reference level when one-hot encoding.
    pub drop_first: bool,
    /// Grid resolution per family.
    pub grid_levels: usize,
    /// Families entered into the competition, in tie-break order.
    pub families: Vec<Family>,
    /// Worker threads for the search. `None` uses all cores.
    pub workers: Option<usize>,
    pub seed: u64,
}

impl Default for RunConfig {
    fn default() -> Self {
        RunConfig {
            test_fraction: 0.2,
            folds: 10,
            repeats: 5,
            strat_bins: 4,
            rare_threshold: 1000,
            drop_first: true,
            grid_levels: 4,
            families: Family::ALL.to_vec(),
            workers: None,
            seed: 42,
        }
    }
}

impl RunConfig {
    pub fn from_json(text: &str) -> PipelineResult<Self> {
        let config: RunConfig = serde_json::from_str(text)
            .map_err(|e| PipelineError::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> PipelineResult<()> {
        if !(self.test_fraction > 0.0 && self.test_fraction < 1.0) {
            return Err(PipelineError::InvalidConfig(format!(
                "test_fraction must be in (0, 1), got {}",
                self.test_fraction
            )));
        }
        if self.folds < 2 {
            return Err(PipelineError::InvalidConfig(
                "folds must be at least 2".into(),
            ));
        }
        if self.repeats == 0 {
            return Err(PipelineError::InvalidConfig(
                "repeats must be at least 1".into(),
            ));
        }
        if self.strat_bins == 0 {
            return Err(PipelineError::InvalidConfig(
                "strat_bins must be at least 1".into(),
            ));
        }
        if self.grid_levels == 0 {
            return Err(PipelineError::InvalidConfig(
                "grid_levels must be at least 1".into(),
            ));
        }
        if self.families.is_empty() {
            return Err(PipelineError::InvalidConfig(
                "at least one model family is required".into(),
            ));
        }
        if self.workers == Some(0) {
            return Err(PipelineError::InvalidConfig(
                "workers must be at least 1 when set".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        assert!(RunConfig::default().validate().is_ok());
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let c = RunConfig::from_json(r#"{"folds": 5, "families": ["lasso", "knn"]}"#).unwrap();
        assert_eq!(c.folds, 5);
        assert_eq!(c.families, vec![Family::Lasso, Family::Knn]);
        assert_eq!(c.repeats, RunConfig::default().repeats);
    }

    #[test]
    fn test_rejects_bad_values() {
        assert!(RunConfig::from_json(r#"{"test_fraction": 1.5}"#).is_err());
        assert!(RunConfig::from_json(r#"{"folds": 1}"#).is_err());
        assert!(RunConfig::from_json(r#"{"families": []}"#).is_err());
        assert!(RunConfig::from_json(r#"{"workers": 0}"#).is_err());
        // Typos in field names are config errors, not silent defaults.
        assert!(RunConfig::from_json(r#"{"foldz": 5}"#).is_err());
    }
}
