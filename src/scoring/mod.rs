pub mod artifact;
pub mod boosting;
pub mod calibration;
pub mod encoder;
pub mod training;

pub use artifact::TrainedModel;
pub use training::{train, TrainingParams};

use crate::models::FeatureReading;

/// One row as the suitability classifier sees it.
#[derive(Debug, Clone, Copy)]
pub struct ModelInput<'a> {
    pub crop: &'a str,
    pub stage: &'a str,
    pub reading: FeatureReading,
}

impl<'a> ModelInput<'a> {
    pub fn new(crop: &'a str, stage: &'a str, reading: FeatureReading) -> Self {
        Self {
            crop,
            stage,
            reading,
        }
    }
}

/// Probability that a (crop, stage, readings) combination is suitable.
///
/// Implementations are read-only after loading and shared across callers.
pub trait SuitabilityModel: Send + Sync {
    /// Calibrated probability in `[0, 1]`. Unknown crops or stages must not
    /// fail; they contribute nothing to the score.
    fn predict_proba(&self, input: &ModelInput<'_>) -> f64;
}
