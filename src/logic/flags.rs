use super::resolver::RangeResolver;
use crate::models::{Feature, FeatureReading, FlagLevel, Flags, Interval, RangeTable};

/// ok inside the inclusive interval, low below it, high above it.
pub fn flag_for(value: f64, interval: Interval) -> FlagLevel {
    if interval.contains(value) {
        FlagLevel::Ok
    } else if value < interval.min {
        FlagLevel::Low
    } else {
        FlagLevel::High
    }
}

/// Classify every reading against the raw declared range for (crop, stage),
/// or the generic ranges when the pair cannot be resolved. Never fails and
/// always yields all seven flags.
pub fn evaluate_flags(
    table: &RangeTable,
    crop: &str,
    stage: &str,
    reading: &FeatureReading,
) -> Flags {
    let resolver = RangeResolver::new(table);
    let source = resolver.resolve(crop, stage);

    Feature::ALL
        .into_iter()
        .map(|feature| {
            let interval = resolver.flag_range(&source, feature);
            (feature, flag_for(reading.value(feature), interval))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::StageEntry;
    use proptest::prelude::*;

    fn rice_table() -> RangeTable {
        RangeTable::new().with_stage(
            "rice",
            StageEntry::new("vegetative")
                .with_range(Feature::Nitrogen, 80.0, 120.0)
                .with_range(Feature::Phosphorus, 40.0, 60.0)
                .with_range(Feature::Potassium, 40.0, 60.0)
                .with_range(Feature::Temperature, 20.0, 30.0)
                .with_range(Feature::Humidity, 70.0, 90.0)
                // declared inverted: flags use it as-is
                .with_range(Feature::Ph, 6.0, 5.0)
                .with_range(Feature::Rainfall, 150.0, 300.0),
        )
    }

    #[test]
    fn flag_boundaries_are_inclusive() {
        let interval = Interval::new(80.0, 120.0);
        assert_eq!(flag_for(80.0, interval), FlagLevel::Ok);
        assert_eq!(flag_for(120.0, interval), FlagLevel::Ok);
        assert_eq!(flag_for(79.99, interval), FlagLevel::Low);
        assert_eq!(flag_for(120.01, interval), FlagLevel::High);
    }

    #[test]
    fn nitrogen_below_range_is_low() {
        let reading = FeatureReading::new(40.0, 50.0, 50.0, 25.0, 80.0, 5.5, 200.0);
        let flags = evaluate_flags(&rice_table(), "rice", "vegetative", &reading);
        assert_eq!(flags.get(Feature::Nitrogen), Some(FlagLevel::Low));
        assert_eq!(flags.get(Feature::Phosphorus), Some(FlagLevel::Ok));
        assert_eq!(flags.get(Feature::Rainfall), Some(FlagLevel::Ok));
    }

    #[test]
    fn raw_interval_is_used_not_normalized() {
        // normalized ph would be [5, 6] and 5.5 would be ok
        let reading = FeatureReading::new(100.0, 50.0, 50.0, 25.0, 80.0, 5.5, 200.0);
        let flags = evaluate_flags(&rice_table(), "rice", "vegetative", &reading);
        assert_eq!(flags.get(Feature::Ph), Some(FlagLevel::Low));
    }

    #[test]
    fn alias_and_case_resolve_to_declared_stage() {
        // humidity 85: ok for declared [70, 90], high for generic [50, 80]
        let reading = FeatureReading::new(100.0, 50.0, 50.0, 25.0, 85.0, 5.5, 200.0);
        let flags = evaluate_flags(&rice_table(), "RICE", "Irrigation", &reading);
        assert_eq!(flags.get(Feature::Humidity), Some(FlagLevel::Ok));
        let generic = evaluate_flags(&rice_table(), "rice", "flowering", &reading);
        assert_eq!(generic.get(Feature::Humidity), Some(FlagLevel::High));
    }

    #[test]
    fn unknown_crop_uses_generic_ranges() {
        let reading = FeatureReading::new(100.0, 50.0, 50.0, 25.0, 65.0, 6.5, 100.0);
        let flags = evaluate_flags(&rice_table(), "dragonfruit", "harvest", &reading);
        assert_eq!(flags.len(), 7);
        assert!(flags.all_ok());
    }

    #[test]
    fn empty_table_still_flags_everything() {
        let reading = FeatureReading::new(0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0);
        let flags = evaluate_flags(&RangeTable::new(), "rice", "harvest", &reading);
        assert_eq!(flags.len(), 7);
        assert!(flags.iter().all(|(_, level)| level == FlagLevel::Low));
    }

    fn any_reading() -> impl Strategy<Value = FeatureReading> {
        prop::array::uniform7(-500.0f64..500.0).prop_map(FeatureReading::from_values)
    }

    proptest! {
        #[test]
        fn flags_agree_with_declared_ranges(reading in any_reading()) {
            let table = rice_table();
            let stage = &table.crops["rice"].stages[0];
            let flags = evaluate_flags(&table, "rice", "vegetative", &reading);
            for (feature, level) in flags.iter() {
                let interval = stage.raw_range(feature).unwrap();
                let value = reading.value(feature);
                match level {
                    FlagLevel::Ok => prop_assert!(interval.min <= value && value <= interval.max),
                    FlagLevel::Low => prop_assert!(value < interval.min),
                    FlagLevel::High => prop_assert!(value > interval.max),
                }
            }
        }

        #[test]
        fn generic_fallback_yields_seven_flags(
            reading in any_reading(),
            crop in "[a-z]{1,12}",
            stage in "[a-z_]{1,12}",
        ) {
            let flags = evaluate_flags(&RangeTable::new(), &crop, &stage, &reading);
            prop_assert_eq!(flags.len(), 7);
        }
    }
}
