use super::advice::compose_advice;
use super::flags::evaluate_flags;
use crate::models::{AdviceReport, FeatureReading, RangeTable, SuitabilityResult};
use crate::scoring::{ModelInput, SuitabilityModel};
use serde::{Deserialize, Serialize};

pub const DEFAULT_THRESHOLD: f64 = 0.4;

fn default_threshold() -> f64 {
    DEFAULT_THRESHOLD
}

/// One inference request: what is grown, at which stage, and what was measured.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SuitabilityQuery {
    pub crop: String,
    pub stage: String,
    #[serde(flatten)]
    pub reading: FeatureReading,
    #[serde(default = "default_threshold")]
    pub threshold: f64,
}

impl SuitabilityQuery {
    pub fn new(crop: impl Into<String>, stage: impl Into<String>, reading: FeatureReading) -> Self {
        Self {
            crop: crop.into(),
            stage: stage.into(),
            reading,
            threshold: DEFAULT_THRESHOLD,
        }
    }

    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold;
        self
    }
}

/// Joins the model score with table-driven flags and advice.
///
/// Both the table and the model are borrowed read-only, so one evaluator can
/// serve any number of queries, from any number of threads.
pub struct SuitabilityEvaluator<'a> {
    table: &'a RangeTable,
    model: &'a dyn SuitabilityModel,
}

impl<'a> SuitabilityEvaluator<'a> {
    pub fn new(table: &'a RangeTable, model: &'a dyn SuitabilityModel) -> Self {
        Self { table, model }
    }

    pub fn evaluate(&self, query: &SuitabilityQuery) -> SuitabilityResult {
        let input = ModelInput::new(&query.crop, &query.stage, query.reading);
        let score = self.model.predict_proba(&input);
        let score = if score.is_nan() { 0.0 } else { score.clamp(0.0, 1.0) };

        let report = advise(self.table, &query.crop, &query.stage, &query.reading);
        tracing::debug!(
            "Scored {}/{} at {:.3} (threshold {})",
            query.crop,
            query.stage,
            score,
            query.threshold
        );

        SuitabilityResult::new(score, query.threshold, report.flags, report.advice)
    }
}

/// Flags and advice from the range table alone. Works without a model.
pub fn advise(
    table: &RangeTable,
    crop: &str,
    stage: &str,
    reading: &FeatureReading,
) -> AdviceReport {
    let flags = evaluate_flags(table, crop, stage, reading);
    let advice = compose_advice(&flags);
    AdviceReport { flags, advice }
}
