use super::Feature;
use crate::error::{CropCareError, Result};
use crate::logic::normalizer::normalize_interval;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::Path;

/// A numeric `[min, max]` interval.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Interval {
    pub min: f64,
    pub max: f64,
}

impl Interval {
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// Inclusive on both ends.
    pub fn contains(&self, value: f64) -> bool {
        self.min <= value && value <= self.max
    }

    #[cfg(test)]
    pub fn width(&self) -> f64 {
        self.max - self.min
    }

    #[cfg(test)]
    pub fn midpoint(&self) -> f64 {
        (self.min + self.max) / 2.0
    }
}

impl std::fmt::Display for Interval {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}, {}]", self.min, self.max)
    }
}

/// An interval exactly as declared in the rule source. Bounds are kept as
/// raw values so the linter can report entries that are not numbers.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct RawInterval {
    pub min: Value,
    pub max: Value,
}

/// Accepts any value. An entry that is not a `{min, max}` object (null, a
/// string like "80-120", a list) reads as two null bounds so one bad entry
/// cannot fail the whole rule source.
impl<'de> Deserialize<'de> for RawInterval {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = match Value::deserialize(deserializer)? {
            Value::Object(mut bounds) => Self {
                min: bounds.remove("min").unwrap_or(Value::Null),
                max: bounds.remove("max").unwrap_or(Value::Null),
            },
            _ => Self::default(),
        };
        Ok(raw)
    }
}

impl RawInterval {
    #[cfg(test)]
    pub fn from_numbers(min: f64, max: f64) -> Self {
        Self {
            min: Value::from(min),
            max: Value::from(max),
        }
    }

    /// Both bounds as numbers, without any ordering check.
    pub fn numeric(&self) -> Option<Interval> {
        Some(Interval::new(numeric_bound(&self.min)?, numeric_bound(&self.max)?))
    }
}

/// Numbers and numeric strings are accepted; anything else (null, bools,
/// lists, NaN/inf) is not a usable bound.
pub fn numeric_bound(value: &Value) -> Option<f64> {
    let n = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    n.is_finite().then_some(n)
}

/// Render a raw bound for defect reports.
pub fn display_bound(value: &Value) -> String {
    match value {
        Value::Null => "None".to_string(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageEntry {
    pub stage: String,
    #[serde(default)]
    pub ideal_ranges: BTreeMap<String, RawInterval>,
}

impl StageEntry {
    #[cfg(test)]
    pub fn new(stage: impl Into<String>) -> Self {
        Self {
            stage: stage.into(),
            ideal_ranges: BTreeMap::new(),
        }
    }

    #[cfg(test)]
    pub fn with_range(mut self, feature: Feature, min: f64, max: f64) -> Self {
        self.ideal_ranges
            .insert(feature.as_str().to_string(), RawInterval::from_numbers(min, max));
        self
    }

    pub fn declared(&self, feature: Feature) -> Option<&RawInterval> {
        self.ideal_ranges.get(feature.as_str())
    }

    /// The interval as the farmer sees it. Used for flags; never normalized.
    pub fn raw_range(&self, feature: Feature) -> Option<Interval> {
        self.declared(feature)?.numeric()
    }

    /// The repaired interval used for synthetic sampling only.
    pub fn sampling_range(&self, feature: Feature) -> Option<Interval> {
        self.raw_range(feature)
            .map(|interval| normalize_interval(interval, feature))
    }

    #[cfg(test)]
    pub fn missing_features(&self) -> Vec<Feature> {
        Feature::ALL
            .into_iter()
            .filter(|f| self.declared(*f).is_none())
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CropEntry {
    #[serde(default)]
    pub stages: Vec<StageEntry>,
}

/// Crop → ordered stages → per-feature ideal ranges.
///
/// Loaded once per process and shared read-only afterwards. Crops iterate
/// in sorted key order so seeded generation is reproducible.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RangeTable {
    pub crops: BTreeMap<String, CropEntry>,
    /// Optional replacement for the built-in generic fallback ranges.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generic_ranges: Option<BTreeMap<String, RawInterval>>,
}

impl RangeTable {
    #[cfg(test)]
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    pub fn with_stage(mut self, crop: impl Into<String>, stage: StageEntry) -> Self {
        self.crops.entry(crop.into()).or_default().stages.push(stage);
        self
    }

    pub fn from_json_str(content: &str) -> Result<Self> {
        serde_json::from_str(content)
            .map_err(|e| CropCareError::InvalidRuleSource(format!("Failed to parse JSON: {}", e)))
    }

    pub fn from_yaml_str(content: &str) -> Result<Self> {
        serde_yaml::from_str(content)
            .map_err(|e| CropCareError::InvalidRuleSource(format!("Failed to parse YAML: {}", e)))
    }

    /// Load a rule source, choosing the format by file extension (JSON unless
    /// the file ends in `.yaml`/`.yml`).
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(CropCareError::InvalidRuleSource(format!(
                "Rule source not found at {:?}",
                path
            )));
        }

        let content = std::fs::read_to_string(path)?;
        let is_yaml = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| matches!(e.to_lowercase().as_str(), "yaml" | "yml"))
            .unwrap_or(false);

        let table = if is_yaml {
            Self::from_yaml_str(&content)?
        } else {
            Self::from_json_str(&content)?
        };

        tracing::info!(
            "Loaded rule source {:?}: {} crops, {} stages",
            path,
            table.crops.len(),
            table.stage_count()
        );

        Ok(table)
    }

    pub fn stage_count(&self) -> usize {
        self.crops.values().map(|c| c.stages.len()).sum()
    }

    /// Every declared (crop, stage) pair in iteration order.
    pub fn stages(&self) -> impl Iterator<Item = (&str, &StageEntry)> {
        self.crops
            .iter()
            .flat_map(|(crop, entry)| entry.stages.iter().map(move |s| (crop.as_str(), s)))
    }

    /// A numeric override for the generic fallback range of `feature`, if the
    /// rule source declares one.
    pub fn generic_override(&self, feature: Feature) -> Option<Interval> {
        self.generic_ranges
            .as_ref()?
            .get(feature.as_str())?
            .numeric()
    }
}
