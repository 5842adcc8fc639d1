use super::fallback::generic_range;
use super::normalizer::normalize_interval;
use crate::models::{normalize_key, stage_lookup_key, CropEntry, Feature, Interval, RangeTable, StageEntry};

/// Where the ranges for a query come from.
#[derive(Debug, Clone, Copy)]
pub enum RangeSource<'a> {
    Declared {
        crop: &'a str,
        stage: &'a StageEntry,
    },
    Generic,
}

impl RangeSource<'_> {
    pub fn is_generic(&self) -> bool {
        matches!(self, RangeSource::Generic)
    }

    pub fn describe(&self) -> String {
        match self {
            RangeSource::Declared { crop, stage } => format!("{}/{}", crop, stage.stage),
            RangeSource::Generic => "generic fallback".to_string(),
        }
    }
}

/// Case-insensitive, alias-aware lookup of (crop, stage) in a `RangeTable`.
#[derive(Debug, Clone, Copy)]
pub struct RangeResolver<'a> {
    table: &'a RangeTable,
}

impl<'a> RangeResolver<'a> {
    pub fn new(table: &'a RangeTable) -> Self {
        Self { table }
    }

    pub fn find_crop(&self, crop: &str) -> Option<(&'a str, &'a CropEntry)> {
        let key = normalize_key(crop);
        self.table
            .crops
            .iter()
            .find(|(name, _)| normalize_key(name) == key)
            .map(|(name, entry)| (name.as_str(), entry))
    }

    /// Resolve the stage through the alias table, then match the crop's
    /// declared stages case-insensitively.
    pub fn find_stage(&self, crop: &str, stage: &str) -> Option<(&'a str, &'a StageEntry)> {
        let (crop_name, entry) = self.find_crop(crop)?;
        let key = stage_lookup_key(stage);
        entry
            .stages
            .iter()
            .find(|s| normalize_key(&s.stage) == key)
            .map(|s| (crop_name, s))
    }

    /// Like `find_stage`, degrading to the generic fallback on a miss.
    pub fn resolve(&self, crop: &str, stage: &str) -> RangeSource<'a> {
        match self.find_stage(crop, stage) {
            Some((crop, stage)) => RangeSource::Declared { crop, stage },
            None => {
                tracing::debug!(
                    "No ranges for {}/{}, using generic fallback",
                    crop.trim(),
                    stage.trim()
                );
                RangeSource::Generic
            }
        }
    }

    /// The interval a reading is flagged against: the raw declared interval
    /// for a resolved stage, the generic range otherwise. A declared stage
    /// lacking a usable interval for `feature` falls back for that feature.
    pub fn flag_range(&self, source: &RangeSource<'_>, feature: Feature) -> Interval {
        match source {
            RangeSource::Declared { stage, .. } => stage
                .raw_range(feature)
                .unwrap_or_else(|| generic_range(self.table, feature)),
            RangeSource::Generic => generic_range(self.table, feature),
        }
    }

    /// The normalized interval synthetic samples are drawn from.
    pub fn sampling_range(&self, source: &RangeSource<'_>, feature: Feature) -> Interval {
        let declared = match source {
            RangeSource::Declared { stage, .. } => stage.sampling_range(feature),
            RangeSource::Generic => None,
        };
        declared.unwrap_or_else(|| normalize_interval(generic_range(self.table, feature), feature))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> RangeTable {
        RangeTable::new()
            .with_stage(
                "Rice",
                StageEntry::new("Vegetative").with_range(Feature::Nitrogen, 60.0, 90.0),
            )
            .with_stage(
                "Rice",
                StageEntry::new("harvest").with_range(Feature::Nitrogen, 20.0, 40.0),
            )
    }

    #[test]
    fn crop_lookup_is_case_insensitive() {
        let table = table();
        let resolver = RangeResolver::new(&table);
        assert_eq!(resolver.find_crop(" rice ").map(|(n, _)| n), Some("Rice"));
        assert_eq!(resolver.find_crop("RICE").map(|(n, _)| n), Some("Rice"));
        assert!(resolver.find_crop("dragonfruit").is_none());
    }

    #[test]
    fn stage_alias_resolves_before_lookup() {
        let table = table();
        let resolver = RangeResolver::new(&table);
        let (_, stage) = resolver.find_stage("rice", "irrigation").unwrap();
        assert_eq!(stage.stage, "Vegetative");
        let (_, stage) = resolver.find_stage("rice", "HARVEST").unwrap();
        assert_eq!(stage.stage, "harvest");
    }

    #[test]
    fn misses_degrade_to_generic() {
        let table = table();
        let resolver = RangeResolver::new(&table);
        assert!(resolver.resolve("dragonfruit", "harvest").is_generic());
        assert!(resolver.resolve("rice", "flowering").is_generic());
        assert!(!resolver.resolve("rice", "weed_control").is_generic());
    }

    #[test]
    fn flag_range_prefers_declared_interval() {
        let table = table();
        let resolver = RangeResolver::new(&table);
        let source = resolver.resolve("rice", "harvest");
        assert_eq!(
            resolver.flag_range(&source, Feature::Nitrogen),
            Interval::new(20.0, 40.0)
        );
        // not declared for this stage
        assert_eq!(
            resolver.flag_range(&source, Feature::Ph),
            Interval::new(6.0, 7.0)
        );
        assert_eq!(source.describe(), "Rice/harvest");
    }

    #[test]
    fn sampling_range_is_normalized() {
        let table = RangeTable::new().with_stage(
            "rice",
            StageEntry::new("harvest").with_range(Feature::Ph, 7.0, 6.0),
        );
        let resolver = RangeResolver::new(&table);

        let source = resolver.resolve("rice", "harvest");
        assert_eq!(resolver.flag_range(&source, Feature::Ph), Interval::new(7.0, 6.0));
        assert_eq!(resolver.sampling_range(&source, Feature::Ph), Interval::new(6.0, 7.0));

        let generic = resolver.resolve("dragonfruit", "harvest");
        assert_eq!(
            resolver.sampling_range(&generic, Feature::Rainfall),
            Interval::new(50.0, 250.0)
        );
    }
}
