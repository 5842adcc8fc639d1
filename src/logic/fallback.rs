use crate::models::{Feature, Interval, RangeTable};

/// Built-in ranges used when a (crop, stage) cannot be resolved.
pub const DEFAULT_GENERIC_RANGES: [(Feature, Interval); 7] = [
    (Feature::Nitrogen, Interval::new(80.0, 120.0)),
    (Feature::Phosphorus, Interval::new(40.0, 60.0)),
    (Feature::Potassium, Interval::new(40.0, 60.0)),
    (Feature::Temperature, Interval::new(18.0, 30.0)),
    (Feature::Humidity, Interval::new(50.0, 80.0)),
    (Feature::Ph, Interval::new(6.0, 7.0)),
    (Feature::Rainfall, Interval::new(50.0, 250.0)),
];

pub fn default_generic_range(feature: Feature) -> Interval {
    DEFAULT_GENERIC_RANGES
        .iter()
        .find(|(f, _)| *f == feature)
        .map(|(_, interval)| *interval)
        .unwrap_or(Interval::new(f64::NEG_INFINITY, f64::INFINITY))
}

/// The fallback range for `feature`: the rule source's `generic_ranges`
/// entry when it declares a numeric one, the built-in default otherwise.
pub fn generic_range(table: &RangeTable, feature: Feature) -> Interval {
    table
        .generic_override(feature)
        .unwrap_or_else(|| default_generic_range(feature))
}
