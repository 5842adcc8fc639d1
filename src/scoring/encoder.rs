use super::ModelInput;
use crate::models::{normalize_key, stage_lookup_key, Feature};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// One-hot crop and stage columns followed by the seven readings, passed
/// through unchanged.
///
/// Crop keys are trimmed and lowercased, stage keys are alias-resolved, so
/// "Rice"/"irrigation" encodes the same as "rice"/"vegetative". A category
/// not seen at fit time encodes as all zeros.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct FeatureEncoder {
    crops: Vec<String>,
    stages: Vec<String>,
}

impl FeatureEncoder {
    pub fn fit<'a, I>(rows: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut crops = BTreeSet::new();
        let mut stages = BTreeSet::new();
        for (crop, stage) in rows {
            crops.insert(normalize_key(crop));
            stages.insert(stage_lookup_key(stage));
        }
        Self {
            crops: crops.into_iter().collect(),
            stages: stages.into_iter().collect(),
        }
    }

    #[cfg(test)]
    pub fn crops(&self) -> &[String] {
        &self.crops
    }

    #[cfg(test)]
    pub fn stages(&self) -> &[String] {
        &self.stages
    }

    pub fn width(&self) -> usize {
        self.crops.len() + self.stages.len() + Feature::ALL.len()
    }

    pub fn encode(&self, input: &ModelInput<'_>) -> Vec<f64> {
        let mut row = vec![0.0; self.width()];

        let crop = normalize_key(input.crop);
        if let Ok(i) = self.crops.binary_search(&crop) {
            row[i] = 1.0;
        }

        let stage = stage_lookup_key(input.stage);
        if let Ok(i) = self.stages.binary_search(&stage) {
            row[self.crops.len() + i] = 1.0;
        }

        let offset = self.crops.len() + self.stages.len();
        row[offset..].copy_from_slice(&input.reading.values());
        row
    }

    pub fn column_names(&self) -> Vec<String> {
        self.crops
            .iter()
            .map(|c| format!("crop={}", c))
            .chain(self.stages.iter().map(|s| format!("stage={}", s)))
            .chain(Feature::ALL.iter().map(|f| f.as_str().to_string()))
            .collect()
    }

    /// Vocabularies must be sorted and unique for `binary_search`.
    pub fn is_consistent(&self) -> bool {
        let sorted = |v: &[String]| v.windows(2).all(|w| w[0] < w[1]);
        sorted(&self.crops) && sorted(&self.stages)
    }
}
