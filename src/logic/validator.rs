use crate::models::{display_bound, Feature, RangeTable, RawInterval, StageEntry};
use serde::Serialize;

pub const ALL_CLEAR: &str = "All ranges look OK";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DefectReason {
    Missing,
    NotNumeric,
    MaxBelowMin,
    MaxEqualsMin,
}

impl DefectReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            DefectReason::Missing => "range missing",
            DefectReason::NotNumeric => "min/max not numeric",
            DefectReason::MaxBelowMin => "max < min",
            DefectReason::MaxEqualsMin => "max == min",
        }
    }
}

impl std::fmt::Display for DefectReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One offending (crop, stage, feature) entry in the rule source.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RangeDefect {
    pub crop: String,
    pub stage: String,
    pub feature: String,
    pub min: String,
    pub max: String,
    pub reason: DefectReason,
}

impl std::fmt::Display for RangeDefect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "crop={}, stage={}, feature={} (min={}, max={}): {}",
            self.crop, self.stage, self.feature, self.min, self.max, self.reason
        )
    }
}

/// Lint every declared interval without repairing anything.
///
/// Reports exactly one defect per offending (crop, stage, feature): a
/// required feature that is absent, a bound that is not a number, or
/// `max <= min`. An empty result means the table is fully valid.
pub fn validate(table: &RangeTable) -> Vec<RangeDefect> {
    let mut defects = Vec::new();

    for (crop, stage) in table.stages() {
        for feature in Feature::ALL {
            match stage.declared(feature) {
                Some(raw) => {
                    if let Some(defect) = check_interval(crop, stage, feature.as_str(), raw) {
                        defects.push(defect);
                    }
                }
                None => defects.push(RangeDefect {
                    crop: crop.to_string(),
                    stage: stage.stage.clone(),
                    feature: feature.as_str().to_string(),
                    min: "None".into(),
                    max: "None".into(),
                    reason: DefectReason::Missing,
                }),
            }
        }

        // Extra keys are not required, but a declared bound should still be sane.
        for (key, raw) in &stage.ideal_ranges {
            if Feature::ALL.iter().any(|f| f.as_str() == key) {
                continue;
            }
            if let Ok(feature) = key.parse::<Feature>() {
                tracing::warn!(
                    "{}/{}: key {:?} is never read, ranges are looked up as {:?}",
                    crop,
                    stage.stage,
                    key,
                    feature.as_str()
                );
            }
            if let Some(defect) = check_interval(crop, stage, key, raw) {
                defects.push(defect);
            }
        }
    }

    tracing::debug!("Validated {} stages, {} defects", table.stage_count(), defects.len());
    defects
}

fn check_interval(
    crop: &str,
    stage: &StageEntry,
    feature: &str,
    raw: &RawInterval,
) -> Option<RangeDefect> {
    let defect = |min: String, max: String, reason| RangeDefect {
        crop: crop.to_string(),
        stage: stage.stage.clone(),
        feature: feature.to_string(),
        min,
        max,
        reason,
    };

    let Some(interval) = raw.numeric() else {
        return Some(defect(
            display_bound(&raw.min),
            display_bound(&raw.max),
            DefectReason::NotNumeric,
        ));
    };

    let (min, max) = (interval.min.to_string(), interval.max.to_string());
    if interval.max < interval.min {
        Some(defect(min, max, DefectReason::MaxBelowMin))
    } else if interval.max == interval.min {
        Some(defect(min, max, DefectReason::MaxEqualsMin))
    } else {
        None
    }
}

/// Human-readable lint report: the all-clear message or one line per defect.
pub fn render_report(defects: &[RangeDefect]) -> String {
    if defects.is_empty() {
        return ALL_CLEAR.to_string();
    }

    let mut lines = vec![format!("Found {} issues:", defects.len())];
    lines.extend(defects.iter().map(|d| format!(" - {}", d)));
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::StageEntry;
    use serde_json::Value;

    fn full_stage(name: &str) -> StageEntry {
        StageEntry::new(name)
            .with_range(Feature::Nitrogen, 80.0, 120.0)
            .with_range(Feature::Phosphorus, 40.0, 60.0)
            .with_range(Feature::Potassium, 40.0, 60.0)
            .with_range(Feature::Temperature, 18.0, 30.0)
            .with_range(Feature::Humidity, 50.0, 80.0)
            .with_range(Feature::Ph, 6.0, 7.0)
            .with_range(Feature::Rainfall, 50.0, 250.0)
    }

    #[test]
    fn valid_table_has_no_defects() {
        let table = RangeTable::new()
            .with_stage("rice", full_stage("preplant"))
            .with_stage("rice", full_stage("harvest"))
            .with_stage("maize", full_stage("planting"));
        assert!(validate(&table).is_empty());
        assert_eq!(render_report(&[]), ALL_CLEAR);
    }

    #[test]
    fn inverted_interval_is_reported() {
        let table =
            RangeTable::new().with_stage("rice", full_stage("harvest").with_range(Feature::Ph, 6.0, 5.0));
        let defects = validate(&table);
        assert_eq!(defects.len(), 1);
        assert_eq!(defects[0].reason, DefectReason::MaxBelowMin);
        assert_eq!(defects[0].feature, "ph");
        assert_eq!(defects[0].reason.as_str(), "max < min");
    }

    #[test]
    fn flat_interval_is_reported() {
        let table = RangeTable::new()
            .with_stage("maize", full_stage("planting").with_range(Feature::Potassium, 50.0, 50.0));
        let defects = validate(&table);
        assert_eq!(defects.len(), 1);
        assert_eq!(defects[0].reason, DefectReason::MaxEqualsMin);
        assert_eq!(
            defects[0].to_string(),
            "crop=maize, stage=planting, feature=K (min=50, max=50): max == min"
        );
    }

    #[test]
    fn non_numeric_bound_is_reported_without_aborting() {
        let mut stage = full_stage("vegetative");
        stage.ideal_ranges.insert(
            "N".into(),
            RawInterval {
                min: Value::from("high"),
                max: Value::from(100),
            },
        );
        let table = RangeTable::new()
            .with_stage("wheat", stage)
            .with_stage("wheat", full_stage("harvest").with_range(Feature::Humidity, 90.0, 40.0));

        let defects = validate(&table);
        assert_eq!(defects.len(), 2);
        assert_eq!(defects[0].reason, DefectReason::NotNumeric);
        assert_eq!(defects[0].min, "high");
        assert_eq!(defects[1].reason, DefectReason::MaxBelowMin);
    }

    #[test]
    fn malformed_entries_are_lint_defects() {
        let rules = r#"{"crops": {"rice": {"stages": [
            {"stage": "planting", "ideal_ranges": {
                "N": null, "P": {"min": 40, "max": 60}, "K": {"min": 40, "max": 60},
                "temperature": {"min": 20, "max": 30}, "humidity": {"min": 70, "max": 90},
                "ph": {"min": 6, "max": 7}, "rainfall": {"min": 150, "max": 300}
            }},
            {"stage": "harvest", "ideal_ranges": {
                "N": "80-120", "P": [40, 60], "K": {"min": 40, "max": 60},
                "temperature": {"min": 20, "max": 30}, "humidity": {"min": 70, "max": 90},
                "ph": {"min": 6, "max": 7}, "rainfall": {"min": 150, "max": 300}
            }}
        ]}}}"#;
        let table = RangeTable::from_json_str(rules).unwrap();

        let defects = validate(&table);
        assert_eq!(defects.len(), 3);
        assert!(defects.iter().all(|d| d.reason == DefectReason::NotNumeric));
        assert_eq!(
            defects[0].to_string(),
            "crop=rice, stage=planting, feature=N (min=None, max=None): min/max not numeric"
        );
        assert_eq!((defects[1].stage.as_str(), defects[1].feature.as_str()), ("harvest", "N"));
        assert_eq!((defects[2].stage.as_str(), defects[2].feature.as_str()), ("harvest", "P"));
    }

    #[test]
    fn missing_feature_is_reported_once() {
        let mut stage = full_stage("harvest");
        stage.ideal_ranges.remove("rainfall");
        let table = RangeTable::new().with_stage("rice", stage);

        let defects = validate(&table);
        assert_eq!(defects.len(), 1);
        assert_eq!(defects[0].reason, DefectReason::Missing);
        assert_eq!(defects[0].feature, "rainfall");
    }

    #[test]
    fn one_defect_per_offending_entry() {
        let stage = full_stage("planting")
            .with_range(Feature::Nitrogen, 10.0, 10.0)
            .with_range(Feature::Phosphorus, 60.0, 40.0)
            .with_range(Feature::Ph, 7.5, 6.5);
        let table = RangeTable::new()
            .with_stage("rice", stage.clone())
            .with_stage("maize", stage);
        assert_eq!(validate(&table).len(), 6);
    }

    #[test]
    fn extra_keys_are_checked_for_sanity_only() {
        let mut stage = full_stage("planting");
        stage
            .ideal_ranges
            .insert("moisture".into(), RawInterval::from_numbers(30.0, 20.0));
        let defects = validate(&RangeTable::new().with_stage("rice", stage));
        assert_eq!(defects.len(), 1);
        assert_eq!(defects[0].feature, "moisture");
    }

    #[test]
    fn long_name_keys_are_extra_keys() {
        let mut stage = full_stage("planting");
        stage
            .ideal_ranges
            .insert("Nitrogen".into(), RawInterval::from_numbers(100.0, 80.0));
        stage.ideal_ranges.remove("N");
        let defects = validate(&RangeTable::new().with_stage("rice", stage));

        assert_eq!(defects.len(), 2);
        assert_eq!((defects[0].feature.as_str(), defects[0].reason), ("N", DefectReason::Missing));
        assert_eq!(
            (defects[1].feature.as_str(), defects[1].reason),
            ("Nitrogen", DefectReason::MaxBelowMin)
        );
    }

    #[test]
    fn report_lists_every_defect() {
        let table = RangeTable::new().with_stage(
            "rice",
            full_stage("harvest")
                .with_range(Feature::Ph, 6.0, 5.0)
                .with_range(Feature::Potassium, 50.0, 50.0),
        );
        let report = render_report(&validate(&table));
        assert!(report.starts_with("Found 2 issues:"));
        assert_eq!(report.lines().count(), 3);
    }

    #[test]
    fn bundled_stage_guide_is_clean() {
        let table =
            RangeTable::from_json_str(include_str!("../../data/all_crops_stage_guide.json")).unwrap();
        assert_eq!(table.stage_count(), 16);
        assert!(validate(&table).is_empty(), "{}", render_report(&validate(&table)));
    }
}
