use super::Feature;
use serde::{Deserialize, Serialize};

/// The seven numeric readings of one farmer query.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeatureReading {
    #[serde(rename = "N")]
    pub nitrogen: f64,
    #[serde(rename = "P")]
    pub phosphorus: f64,
    #[serde(rename = "K")]
    pub potassium: f64,
    pub temperature: f64,
    pub humidity: f64,
    pub ph: f64,
    pub rainfall: f64,
}

impl FeatureReading {
    pub fn new(
        nitrogen: f64,
        phosphorus: f64,
        potassium: f64,
        temperature: f64,
        humidity: f64,
        ph: f64,
        rainfall: f64,
    ) -> Self {
        Self {
            nitrogen,
            phosphorus,
            potassium,
            temperature,
            humidity,
            ph,
            rainfall,
        }
    }

    /// Build a reading from values in `Feature::ALL` order.
    pub fn from_values(values: [f64; 7]) -> Self {
        let [n, p, k, temperature, humidity, ph, rainfall] = values;
        Self::new(n, p, k, temperature, humidity, ph, rainfall)
    }

    pub fn value(&self, feature: Feature) -> f64 {
        match feature {
            Feature::Nitrogen => self.nitrogen,
            Feature::Phosphorus => self.phosphorus,
            Feature::Potassium => self.potassium,
            Feature::Temperature => self.temperature,
            Feature::Humidity => self.humidity,
            Feature::Ph => self.ph,
            Feature::Rainfall => self.rainfall,
        }
    }

    pub fn values(&self) -> [f64; 7] {
        Feature::ALL.map(|f| self.value(f))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn value_by_feature() {
        let reading = FeatureReading::new(90.0, 42.0, 43.0, 20.8, 82.0, 6.5, 202.9);
        assert_eq!(reading.value(Feature::Nitrogen), 90.0);
        assert_eq!(reading.value(Feature::Ph), 6.5);
        assert_eq!(reading.value(Feature::Rainfall), 202.9);
    }

    #[test]
    fn from_values_preserves_order() {
        let values = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0];
        assert_eq!(FeatureReading::from_values(values).values(), values);
    }

    #[test]
    fn serializes_with_rule_source_keys() {
        let reading = FeatureReading::new(90.0, 42.0, 43.0, 20.8, 82.0, 6.5, 202.9);
        let json = serde_json::to_value(reading).unwrap();
        assert_eq!(json["N"], 90.0);
        assert_eq!(json["ph"], 6.5);
    }
}
