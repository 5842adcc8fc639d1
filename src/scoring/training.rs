use super::artifact::TrainedModel;
use super::boosting::{BoostedStumps, BoostingParams};
use super::calibration::IsotonicCalibrator;
use super::encoder::FeatureEncoder;
use super::ModelInput;
use crate::error::{CropCareError, Result};
use crate::logic::generator::SyntheticSample;
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainingParams {
    pub rounds: usize,
    pub learning_rate: f64,
    pub max_bins: usize,
    pub l2_regularization: f64,
    pub min_child_weight: f64,
    /// Share of rows held out for the evaluation report.
    pub test_fraction: f64,
    /// Share of the remaining rows held out to fit the calibrator.
    pub calibration_fraction: f64,
    pub seed: u64,
}

impl Default for TrainingParams {
    fn default() -> Self {
        let boosting = BoostingParams::default();
        Self {
            rounds: boosting.rounds,
            learning_rate: boosting.learning_rate,
            max_bins: boosting.max_bins,
            l2_regularization: boosting.l2_regularization,
            min_child_weight: boosting.min_child_weight,
            test_fraction: 0.2,
            calibration_fraction: 0.25,
            seed: 42,
        }
    }
}

impl TrainingParams {
    pub fn boosting(&self) -> BoostingParams {
        BoostingParams {
            rounds: self.rounds,
            learning_rate: self.learning_rate,
            max_bins: self.max_bins,
            l2_regularization: self.l2_regularization,
            min_child_weight: self.min_child_weight,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassMetrics {
    pub label: String,
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    pub support: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingReport {
    pub rows: usize,
    pub fit_rows: usize,
    pub calibration_rows: usize,
    pub test_rows: usize,
    pub accuracy: f64,
    pub classes: Vec<ClassMetrics>,
}

impl TrainingReport {
    /// Score held-out rows at a 0.5 cut on the calibrated probability.
    fn evaluate(predicted: &[u8], actual: &[u8]) -> (f64, Vec<ClassMetrics>) {
        let correct = predicted.iter().zip(actual).filter(|(p, a)| p == a).count();
        let accuracy = ratio(correct, actual.len());

        let classes = [(0u8, "not suitable"), (1u8, "suitable")]
            .into_iter()
            .map(|(class, label)| {
                let tp = predicted
                    .iter()
                    .zip(actual)
                    .filter(|(p, a)| **p == class && **a == class)
                    .count();
                let predicted_n = predicted.iter().filter(|p| **p == class).count();
                let support = actual.iter().filter(|a| **a == class).count();
                let precision = ratio(tp, predicted_n);
                let recall = ratio(tp, support);
                let f1 = if precision + recall > 0.0 {
                    2.0 * precision * recall / (precision + recall)
                } else {
                    0.0
                };
                ClassMetrics {
                    label: label.to_string(),
                    precision,
                    recall,
                    f1,
                    support,
                }
            })
            .collect();

        (accuracy, classes)
    }
}

impl std::fmt::Display for TrainingReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(
            f,
            "rows: {} (fit {}, calibration {}, test {})",
            self.rows, self.fit_rows, self.calibration_rows, self.test_rows
        )?;
        writeln!(f, "accuracy: {:.4}", self.accuracy)?;
        writeln!(
            f,
            "{:>14} {:>9} {:>9} {:>9} {:>9}",
            "", "precision", "recall", "f1-score", "support"
        )?;
        for class in &self.classes {
            writeln!(
                f,
                "{:>14} {:>9.2} {:>9.2} {:>9.2} {:>9}",
                class.label, class.precision, class.recall, class.f1, class.support
            )?;
        }
        Ok(())
    }
}

fn ratio(num: usize, den: usize) -> f64 {
    if den == 0 {
        0.0
    } else {
        num as f64 / den as f64
    }
}

struct Split<'a> {
    fit: Vec<&'a SyntheticSample>,
    calibration: Vec<&'a SyntheticSample>,
    test: Vec<&'a SyntheticSample>,
}

/// Shuffle each class separately and cut it by the same fractions, so every
/// partition keeps the overall class balance.
fn stratified_split<'a, R: Rng + ?Sized>(
    samples: &'a [SyntheticSample],
    params: &TrainingParams,
    rng: &mut R,
) -> Split<'a> {
    let mut split = Split {
        fit: Vec::new(),
        calibration: Vec::new(),
        test: Vec::new(),
    };

    for class in [0u8, 1u8] {
        let mut rows: Vec<&SyntheticSample> = samples.iter().filter(|s| s.label == class).collect();
        rows.shuffle(rng);

        let n_test = (rows.len() as f64 * params.test_fraction).round() as usize;
        let rest = rows.split_off(n_test.min(rows.len()));
        let n_calibration = (rest.len() as f64 * params.calibration_fraction).round() as usize;

        split.test.extend(rows);
        split.calibration.extend(&rest[..n_calibration.min(rest.len())]);
        split.fit.extend(&rest[n_calibration.min(rest.len())..]);
    }

    split
}

fn encode_rows(encoder: &FeatureEncoder, rows: &[&SyntheticSample]) -> Vec<Vec<f64>> {
    rows.iter()
        .map(|s| encoder.encode(&ModelInput::new(&s.crop, &s.stage, s.reading)))
        .collect()
}

/// Fit encoder, booster and calibrator on generated rows and score the
/// held-out test partition.
pub fn train<R: Rng + ?Sized>(
    samples: &[SyntheticSample],
    params: &TrainingParams,
    rng: &mut R,
) -> Result<TrainedModel> {
    if samples.is_empty() {
        return Err(CropCareError::EmptyDataset);
    }

    let split = stratified_split(samples, params, rng);
    tracing::info!(
        "Training split: {} fit, {} calibration, {} test",
        split.fit.len(),
        split.calibration.len(),
        split.test.len()
    );

    let encoder = FeatureEncoder::fit(samples.iter().map(|s| (s.crop.as_str(), s.stage.as_str())));
    tracing::debug!("Encoded columns: {}", encoder.column_names().join(", "));

    let fit_x = encode_rows(&encoder, &split.fit);
    let fit_y: Vec<u8> = split.fit.iter().map(|s| s.label).collect();
    let booster = BoostedStumps::fit(&fit_x, &fit_y, &params.boosting())?;

    let calibrator = if split.calibration.is_empty() {
        tracing::warn!("No calibration rows held out; using uncalibrated probabilities");
        IsotonicCalibrator::identity()
    } else {
        let points: Vec<(f64, f64)> = encode_rows(&encoder, &split.calibration)
            .iter()
            .zip(&split.calibration)
            .map(|(row, s)| (booster.probability(row), f64::from(s.label)))
            .collect();
        IsotonicCalibrator::fit(&points)
    };

    let predicted: Vec<u8> = encode_rows(&encoder, &split.test)
        .iter()
        .map(|row| u8::from(calibrator.predict(booster.probability(row)) >= 0.5))
        .collect();
    let actual: Vec<u8> = split.test.iter().map(|s| s.label).collect();
    let (accuracy, classes) = TrainingReport::evaluate(&predicted, &actual);

    let report = TrainingReport {
        rows: samples.len(),
        fit_rows: split.fit.len(),
        calibration_rows: split.calibration.len(),
        test_rows: split.test.len(),
        accuracy,
        classes,
    };
    tracing::info!("Held-out accuracy {:.4} on {} rows", accuracy, report.test_rows);

    Ok(TrainedModel::new(encoder, booster, calibrator, report))
}
