use super::Feature;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlagLevel {
    Low,
    Ok,
    High,
}

impl FlagLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            FlagLevel::Low => "low",
            FlagLevel::Ok => "ok",
            FlagLevel::High => "high",
        }
    }
}

impl std::fmt::Display for FlagLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Per-feature low/ok/high classification, iterated in canonical feature order.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Flags(BTreeMap<Feature, FlagLevel>);

impl Flags {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, feature: Feature, level: FlagLevel) {
        self.0.insert(feature, level);
    }

    pub fn with(mut self, feature: Feature, level: FlagLevel) -> Self {
        self.set(feature, level);
        self
    }

    pub fn get(&self, feature: Feature) -> Option<FlagLevel> {
        self.0.get(&feature).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Feature, FlagLevel)> + '_ {
        self.0.iter().map(|(f, l)| (*f, *l))
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn all_ok(&self) -> bool {
        self.0.values().all(|l| *l == FlagLevel::Ok)
    }
}

impl FromIterator<(Feature, FlagLevel)> for Flags {
    fn from_iter<I: IntoIterator<Item = (Feature, FlagLevel)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}
