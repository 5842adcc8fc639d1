use super::boosting::BoostedStumps;
use super::calibration::IsotonicCalibrator;
use super::encoder::FeatureEncoder;
use super::training::TrainingReport;
use super::{ModelInput, SuitabilityModel};
use crate::error::{CropCareError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const FORMAT_VERSION: u32 = 1;

/// Everything needed to score a query, persisted as one JSON document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainedModel {
    pub format_version: u32,
    pub trained_at: DateTime<Utc>,
    pub encoder: FeatureEncoder,
    pub booster: BoostedStumps,
    pub calibrator: IsotonicCalibrator,
    pub report: TrainingReport,
}

impl TrainedModel {
    pub fn new(
        encoder: FeatureEncoder,
        booster: BoostedStumps,
        calibrator: IsotonicCalibrator,
        report: TrainingReport,
    ) -> Self {
        Self {
            format_version: FORMAT_VERSION,
            trained_at: Utc::now(),
            encoder,
            booster,
            calibrator,
            report,
        }
    }

    pub fn from_json_str(content: &str) -> Result<Self> {
        let model: Self = serde_json::from_str(content)
            .map_err(|e| CropCareError::MalformedModel(e.to_string()))?;
        model.validate()?;
        Ok(model)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(CropCareError::ModelUnavailable(format!(
                    "no model artifact at {}",
                    path.display()
                )));
            }
            Err(e) => return Err(e.into()),
        };

        let model = Self::from_json_str(&content)?;
        tracing::info!(
            "Loaded model trained at {} ({} stumps) from {:?}",
            model.trained_at.to_rfc3339(),
            model.booster.stumps.len(),
            path
        );
        if model.calibrator.is_identity() {
            tracing::warn!("Model has no calibration; scores are raw booster probabilities");
        }
        Ok(model)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        tracing::info!("Saved model artifact to {:?}", path);
        Ok(())
    }

    /// Reject artifacts whose parts disagree with each other.
    pub fn validate(&self) -> Result<()> {
        if self.format_version != FORMAT_VERSION {
            return Err(CropCareError::MalformedModel(format!(
                "unsupported format version {} (expected {})",
                self.format_version, FORMAT_VERSION
            )));
        }
        if !self.encoder.is_consistent() {
            return Err(CropCareError::MalformedModel(
                "encoder vocabularies are not sorted and unique".into(),
            ));
        }
        if let Some(column) = self.booster.max_column() {
            if column >= self.encoder.width() {
                return Err(CropCareError::MalformedModel(format!(
                    "stump uses column {} but the encoder produces {}",
                    column,
                    self.encoder.width()
                )));
            }
        }
        if !self.calibrator.is_consistent() {
            return Err(CropCareError::MalformedModel(
                "calibration knots are not monotone".into(),
            ));
        }
        Ok(())
    }
}

impl SuitabilityModel for TrainedModel {
    fn predict_proba(&self, input: &ModelInput<'_>) -> f64 {
        let row = self.encoder.encode(input);
        self.calibrator
            .predict(self.booster.probability(&row))
            .clamp(0.0, 1.0)
    }
}
