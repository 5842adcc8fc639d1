use super::Flags;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Prediction {
    #[serde(rename = "suitable")]
    Suitable,
    #[serde(rename = "not suitable")]
    NotSuitable,
}

impl Prediction {
    /// A score at or above the threshold is suitable.
    pub fn from_score(score: f64, threshold: f64) -> Self {
        if score >= threshold {
            Prediction::Suitable
        } else {
            Prediction::NotSuitable
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Prediction::Suitable => "suitable",
            Prediction::NotSuitable => "not suitable",
        }
    }
}

impl std::fmt::Display for Prediction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Combined answer to one suitability query. Built fresh per query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SuitabilityResult {
    pub prediction: Prediction,
    pub suitability_score: f64,
    pub threshold: f64,
    pub flags: Flags,
    pub advice: String,
}

impl SuitabilityResult {
    pub fn new(score: f64, threshold: f64, flags: Flags, advice: String) -> Self {
        Self {
            prediction: Prediction::from_score(score, threshold),
            suitability_score: round3(score),
            threshold,
            flags,
            advice,
        }
    }
}

/// Flags and advice without a model score, for when scoring is unavailable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdviceReport {
    pub flags: Flags,
    pub advice: String,
}

fn round3(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}
