use crate::error::{CropCareError, Result};
use crate::models::{Feature, FeatureReading, Interval, RangeTable, StageEntry};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::path::Path;

/// How many labeled rows to draw per (crop, stage) and how negatives are built.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeneratorSettings {
    pub positives_per_stage: usize,
    pub negatives_per_stage: usize,
    /// Fraction of the interval width a negative may stray beyond either bound.
    pub outside_stretch: f64,
    /// Probability that a negative has two out-of-range features instead of one.
    pub two_feature_probability: f64,
}

impl Default for GeneratorSettings {
    fn default() -> Self {
        Self {
            positives_per_stage: 300,
            negatives_per_stage: 300,
            outside_stretch: 0.15,
            two_feature_probability: 0.5,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SyntheticSample {
    pub crop: String,
    pub stage: String,
    pub reading: FeatureReading,
    /// 1 = suitable, 0 = not suitable.
    pub label: u8,
}

impl SyntheticSample {
    pub fn is_positive(&self) -> bool {
        self.label == 1
    }
}

/// Draws labeled feature vectors from the normalized ideal ranges.
///
/// The random generator is always supplied by the caller; seed it once per
/// run for reproducible datasets.
#[derive(Debug, Clone, Copy, Default)]
pub struct SampleGenerator {
    settings: GeneratorSettings,
}

impl SampleGenerator {
    pub fn new(settings: GeneratorSettings) -> Self {
        Self { settings }
    }

    /// Generate rows for every declared (crop, stage), concatenated in table
    /// order. Fails before drawing anything if any stage lacks a numeric
    /// range for one of the seven features.
    pub fn generate<R: Rng + ?Sized>(
        &self,
        table: &RangeTable,
        rng: &mut R,
    ) -> Result<Vec<SyntheticSample>> {
        let mut plans = Vec::with_capacity(table.stage_count());
        for (crop, stage) in table.stages() {
            plans.push((crop, stage, sampling_ranges(crop, stage)?));
        }

        let per_stage = self.settings.positives_per_stage + self.settings.negatives_per_stage;
        let mut samples = Vec::with_capacity(plans.len() * per_stage);

        for (crop, stage, ranges) in plans {
            let before = samples.len();
            self.generate_stage(crop, &stage.stage, &ranges, rng, &mut samples);
            tracing::debug!(
                "Generated {} rows for {}/{}",
                samples.len() - before,
                crop,
                stage.stage
            );
        }

        tracing::info!(
            "Generated {} synthetic rows across {} stages",
            samples.len(),
            table.stage_count()
        );

        Ok(samples)
    }

    fn generate_stage<R: Rng + ?Sized>(
        &self,
        crop: &str,
        stage: &str,
        ranges: &[Interval; 7],
        rng: &mut R,
        out: &mut Vec<SyntheticSample>,
    ) {
        for _ in 0..self.settings.positives_per_stage {
            let values = (*ranges).map(|interval| sample_inside(interval, rng));
            out.push(SyntheticSample {
                crop: crop.to_string(),
                stage: stage.to_string(),
                reading: FeatureReading::from_values(values),
                label: 1,
            });
        }

        for _ in 0..self.settings.negatives_per_stage {
            let outside = self.pick_outside_features(rng);
            let mut values = [0.0; 7];
            for (i, feature) in Feature::ALL.iter().enumerate() {
                values[i] = if outside.contains(feature) {
                    sample_outside(ranges[i], self.settings.outside_stretch, rng)
                } else {
                    sample_inside(ranges[i], rng)
                };
            }
            out.push(SyntheticSample {
                crop: crop.to_string(),
                stage: stage.to_string(),
                reading: FeatureReading::from_values(values),
                label: 0,
            });
        }
    }

    /// One or two distinct features, chosen uniformly.
    fn pick_outside_features<R: Rng + ?Sized>(&self, rng: &mut R) -> Vec<Feature> {
        let count = if rng.gen_bool(self.settings.two_feature_probability.clamp(0.0, 1.0)) {
            2
        } else {
            1
        };
        Feature::ALL.choose_multiple(rng, count).copied().collect()
    }
}

/// Normalized sampling intervals for a stage, in `Feature::ALL` order.
fn sampling_ranges(crop: &str, stage: &StageEntry) -> Result<[Interval; 7]> {
    let mut ranges = [Interval::new(0.0, 1.0); 7];
    for (i, feature) in Feature::ALL.into_iter().enumerate() {
        if stage.declared(feature).is_none() {
            return Err(CropCareError::MissingRange {
                crop: crop.to_string(),
                stage: stage.stage.clone(),
                feature: feature.as_str().to_string(),
            });
        }
        ranges[i] = stage
            .sampling_range(feature)
            .ok_or_else(|| CropCareError::NonNumericRange {
                crop: crop.to_string(),
                stage: stage.stage.clone(),
                feature: feature.as_str().to_string(),
            })?;
    }
    Ok(ranges)
}

/// Uniform draw from `[min, max)`.
pub fn sample_inside<R: Rng + ?Sized>(interval: Interval, rng: &mut R) -> f64 {
    rng.gen_range(interval.min..interval.max)
}

/// Uniform draw from just below or just above the interval, each side with
/// equal probability: `[lo - s*w, lo)` or `(hi, hi + s*w]`.
pub fn sample_outside<R: Rng + ?Sized>(interval: Interval, stretch: f64, rng: &mut R) -> f64 {
    let lo = interval.min;
    let mut hi = interval.max;
    let mut width = hi - lo;
    if width <= 0.0 {
        width = (lo.abs() * 1e-4 + 1e-3).max(1e-3);
        hi = lo + width;
    }
    let reach = (stretch * width).max(4.0 * f64::EPSILON * lo.abs().max(1.0));

    if rng.gen_bool(0.5) {
        let x = rng.gen_range(lo - reach..lo);
        if x < lo {
            x
        } else {
            lo - reach
        }
    } else {
        let x = hi + reach - rng.gen_range(0.0..reach);
        if x > hi {
            x
        } else {
            hi + reach
        }
    }
}

pub const CSV_HEADER: [&str; 10] = [
    "crop",
    "stage",
    "N",
    "P",
    "K",
    "temperature",
    "humidity",
    "ph",
    "rainfall",
    "label",
];

pub fn write_csv<W: Write>(samples: &[SyntheticSample], writer: W) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(CSV_HEADER)?;
    for sample in samples {
        let mut record = Vec::with_capacity(CSV_HEADER.len());
        record.push(sample.crop.clone());
        record.push(sample.stage.clone());
        record.extend(sample.reading.values().iter().map(|v| v.to_string()));
        record.push(sample.label.to_string());
        wtr.write_record(&record)?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn write_csv_file(samples: &[SyntheticSample], path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let file = std::fs::File::create(path)?;
    write_csv(samples, file)?;
    tracing::info!("Wrote {} rows to {:?}", samples.len(), path);
    Ok(())
}
