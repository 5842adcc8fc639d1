use serde::{Deserialize, Serialize};

/// One of the seven numeric readings a suitability query carries.
///
/// Declaration order is the canonical iteration order used for flags,
/// advice and generated dataset columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Feature {
    #[serde(rename = "N")]
    Nitrogen,
    #[serde(rename = "P")]
    Phosphorus,
    #[serde(rename = "K")]
    Potassium,
    #[serde(rename = "temperature")]
    Temperature,
    #[serde(rename = "humidity")]
    Humidity,
    #[serde(rename = "ph")]
    Ph,
    #[serde(rename = "rainfall")]
    Rainfall,
}

impl Feature {
    pub const ALL: [Feature; 7] = [
        Feature::Nitrogen,
        Feature::Phosphorus,
        Feature::Potassium,
        Feature::Temperature,
        Feature::Humidity,
        Feature::Ph,
        Feature::Rainfall,
    ];

    /// Key used in the rule source and in JSON output.
    pub fn as_str(&self) -> &'static str {
        match self {
            Feature::Nitrogen => "N",
            Feature::Phosphorus => "P",
            Feature::Potassium => "K",
            Feature::Temperature => "temperature",
            Feature::Humidity => "humidity",
            Feature::Ph => "ph",
            Feature::Rainfall => "rainfall",
        }
    }
}

impl std::str::FromStr for Feature {
    type Err = String;

    /// Rule source keys are matched exactly ("N", "ph", ...), with a
    /// case-insensitive fallback for the long names.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "N" => return Ok(Feature::Nitrogen),
            "P" => return Ok(Feature::Phosphorus),
            "K" => return Ok(Feature::Potassium),
            _ => {}
        }
        match s.trim().to_lowercase().as_str() {
            "n" | "nitrogen" => Ok(Feature::Nitrogen),
            "p" | "phosphorus" => Ok(Feature::Phosphorus),
            "k" | "potassium" => Ok(Feature::Potassium),
            "temperature" | "temp" => Ok(Feature::Temperature),
            "humidity" => Ok(Feature::Humidity),
            "ph" => Ok(Feature::Ph),
            "rainfall" | "rain" => Ok(Feature::Rainfall),
            _ => Err(format!("Unknown feature: {}", s)),
        }
    }
}

impl std::fmt::Display for Feature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
