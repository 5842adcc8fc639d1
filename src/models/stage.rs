use serde::{Deserialize, Serialize};

/// The four canonical growth phases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    Preplant,
    Planting,
    Vegetative,
    Harvest,
}

impl Stage {
    #[cfg(test)]
    pub const ALL: [Stage; 4] = [
        Stage::Preplant,
        Stage::Planting,
        Stage::Vegetative,
        Stage::Harvest,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Preplant => "preplant",
            Stage::Planting => "planting",
            Stage::Vegetative => "vegetative",
            Stage::Harvest => "harvest",
        }
    }

    /// Canonical names plus the legacy/activity names farmers submit.
    pub fn from_alias(s: &str) -> Option<Self> {
        match normalize_key(s).as_str() {
            "preplant" | "land_prep" | "soil_management" => Some(Stage::Preplant),
            "planting" => Some(Stage::Planting),
            "vegetative" | "irrigation" | "weed_control" | "pest_management"
            | "fertilization" => Some(Stage::Vegetative),
            "harvest" => Some(Stage::Harvest),
            _ => None,
        }
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Lookup key for crop and stage names: trimmed and lowercased.
pub fn normalize_key(s: &str) -> String {
    s.trim().to_lowercase()
}

/// Resolve a submitted stage name to the key used for table lookup: the
/// canonical stage when an alias exists, the literal (normalized) name
/// otherwise.
pub fn stage_lookup_key(stage: &str) -> String {
    match Stage::from_alias(stage) {
        Some(canonical) => canonical.as_str().to_string(),
        None => normalize_key(stage),
    }
}
