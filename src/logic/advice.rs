use crate::models::{Feature, FlagLevel, Flags};
use std::collections::HashSet;

pub const ALL_GOOD: &str = "All good. Keep current practices.";

/// Short farmer-facing tips per (feature, direction).
#[derive(Debug, Clone, Copy)]
pub struct AdviceTemplates {
    entries: &'static [(Feature, FlagLevel, &'static str)],
}

const DEFAULT_TIPS: &[(Feature, FlagLevel, &str)] = &[
    (
        Feature::Nitrogen,
        FlagLevel::Low,
        "Nitrogen low → Apply nitrogen fertilizer (urea/CAN). Use split doses.",
    ),
    (
        Feature::Nitrogen,
        FlagLevel::High,
        "Nitrogen high → Reduce N to avoid scorch and lodging.",
    ),
    (
        Feature::Phosphorus,
        FlagLevel::Low,
        "Phosphorus low → Band-apply DAP/TSP near roots.",
    ),
    (
        Feature::Phosphorus,
        FlagLevel::High,
        "Phosphorus high → Stop extra P; can block other nutrients.",
    ),
    (
        Feature::Potassium,
        FlagLevel::Low,
        "Potassium low → Apply MOP (potash).",
    ),
    (
        Feature::Potassium,
        FlagLevel::High,
        "Potassium high → Reduce K; can affect Mg/Ca uptake.",
    ),
    (
        Feature::Temperature,
        FlagLevel::Low,
        "Temperature low → Mulch/cover; use tolerant variety.",
    ),
    (
        Feature::Temperature,
        FlagLevel::High,
        "Temperature high → Provide shade/mulch; irrigate to cool.",
    ),
    (
        Feature::Humidity,
        FlagLevel::Low,
        "Humidity low → Irrigate more; use mulch/windbreaks.",
    ),
    (
        Feature::Humidity,
        FlagLevel::High,
        "Humidity high → Improve airflow; watch for foliar diseases.",
    ),
    (
        Feature::Ph,
        FlagLevel::Low,
        "Soil pH low (acidic) → Apply lime.",
    ),
    (
        Feature::Ph,
        FlagLevel::High,
        "Soil pH high (alkaline) → Use elemental sulfur/acidifying inputs.",
    ),
    (
        Feature::Rainfall,
        FlagLevel::Low,
        "Rainfall low → Add water / increase irrigation.",
    ),
    (
        Feature::Rainfall,
        FlagLevel::High,
        "Rainfall high → Improve drainage; pause irrigation.",
    ),
];

impl AdviceTemplates {
    pub const fn new(entries: &'static [(Feature, FlagLevel, &'static str)]) -> Self {
        Self { entries }
    }

    /// `Ok` never has a tip.
    pub fn tip(&self, feature: Feature, level: FlagLevel) -> Option<&'static str> {
        if level == FlagLevel::Ok {
            return None;
        }
        self.entries
            .iter()
            .find(|(f, l, _)| *f == feature && *l == level)
            .map(|(_, _, tip)| *tip)
    }
}

impl Default for AdviceTemplates {
    fn default() -> Self {
        Self::new(DEFAULT_TIPS)
    }
}

/// Tips for the given flags in iteration order, first occurrence kept.
pub fn collect_tips<I>(templates: &AdviceTemplates, flags: I) -> Vec<&'static str>
where
    I: IntoIterator<Item = (Feature, FlagLevel)>,
{
    let mut seen = HashSet::new();
    flags
        .into_iter()
        .filter_map(|(feature, level)| templates.tip(feature, level))
        .filter(|tip| seen.insert(*tip))
        .collect()
}

/// Render tips as `- tip` lines joined by newlines, or `ALL_GOOD` when
/// nothing needs attention.
pub fn render_tips(tips: &[&str]) -> String {
    if tips.is_empty() {
        return ALL_GOOD.to_string();
    }
    tips.iter()
        .map(|tip| format!("- {}", tip))
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn compose_advice(flags: &Flags) -> String {
    compose_advice_with(&AdviceTemplates::default(), flags.iter())
}

pub fn compose_advice_with<I>(templates: &AdviceTemplates, flags: I) -> String
where
    I: IntoIterator<Item = (Feature, FlagLevel)>,
{
    render_tips(&collect_tips(templates, flags))
}
