use crate::models::{Feature, Interval};

const PH_DOMAIN: (f64, f64) = (3.0, 9.0);
const PH_COLLAPSE_HALF_BAND: f64 = 0.05;
const HUMIDITY_DOMAIN: (f64, f64) = (0.0, 100.0);
const HUMIDITY_COLLAPSE_HALF_BAND: f64 = 0.5;
const RAINFALL_COLLAPSE_WIDTH: f64 = 0.1;

/// Width added around a flat interval.
pub fn flat_widening(value: f64) -> f64 {
    (value.abs() * 1e-4 + 1e-3).max(1e-6)
}

/// Repair a declared interval so it can be sampled from.
///
/// Inverted bounds are swapped, flat intervals are widened symmetrically,
/// then feature domains are enforced (ph in [3, 9], humidity in [0, 100],
/// rainfall >= 0). The result always has `min < max`.
///
/// Only synthetic sampling goes through here. Flags are computed against the
/// raw declared interval.
pub fn normalize_interval(interval: Interval, feature: Feature) -> Interval {
    let (mut lo, mut hi) = (interval.min, interval.max);

    if hi < lo {
        std::mem::swap(&mut lo, &mut hi);
    }

    if hi == lo {
        let width = flat_widening(lo);
        lo -= width / 2.0;
        hi += width / 2.0;
    }

    match feature {
        Feature::Ph => clamp_to_domain(lo, hi, PH_DOMAIN, PH_COLLAPSE_HALF_BAND),
        Feature::Humidity => {
            clamp_to_domain(lo, hi, HUMIDITY_DOMAIN, HUMIDITY_COLLAPSE_HALF_BAND)
        }
        Feature::Rainfall => {
            let lo = lo.max(0.0);
            if hi <= lo {
                Interval::new(lo, lo + RAINFALL_COLLAPSE_WIDTH)
            } else {
                Interval::new(lo, hi)
            }
        }
        _ => Interval::new(lo, hi),
    }
}

/// Clamp to `domain`; an interval that collapses becomes a band of
/// `half_band` either side of its midpoint, kept inside the domain.
fn clamp_to_domain(lo: f64, hi: f64, domain: (f64, f64), half_band: f64) -> Interval {
    let lo = lo.max(domain.0);
    let hi = hi.min(domain.1);
    if hi > lo {
        return Interval::new(lo, hi);
    }

    let mid = ((lo + hi) / 2.0).clamp(domain.0 + half_band, domain.1 - half_band);
    Interval::new(mid - half_band, mid + half_band)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use proptest::prelude::*;

    #[test]
    fn valid_interval_is_unchanged() {
        let interval = Interval::new(80.0, 120.0);
        assert_eq!(normalize_interval(interval, Feature::Nitrogen), interval);
    }

    #[test]
    fn inverted_interval_is_swapped() {
        let fixed = normalize_interval(Interval::new(6.0, 5.0), Feature::Ph);
        assert_eq!(fixed, Interval::new(5.0, 6.0));
    }

    #[test]
    fn flat_interval_is_widened_symmetrically() {
        // width = 50 * 1e-4 + 1e-3 = 0.006
        let fixed = normalize_interval(Interval::new(50.0, 50.0), Feature::Potassium);
        assert_relative_eq!(fixed.min, 49.997, epsilon = 1e-9);
        assert_relative_eq!(fixed.max, 50.003, epsilon = 1e-9);
        assert_relative_eq!(fixed.midpoint(), 50.0, epsilon = 1e-9);
    }

    #[test]
    fn flat_interval_at_zero_uses_minimum_width() {
        let fixed = normalize_interval(Interval::new(0.0, 0.0), Feature::Nitrogen);
        assert_relative_eq!(fixed.width(), 1e-3, epsilon = 1e-12);
    }

    #[test]
    fn ph_is_clamped_to_domain() {
        let fixed = normalize_interval(Interval::new(2.0, 10.0), Feature::Ph);
        assert_eq!(fixed, Interval::new(3.0, 9.0));
    }

    #[test]
    fn ph_collapse_recenters_inside_domain() {
        let fixed = normalize_interval(Interval::new(9.5, 11.0), Feature::Ph);
        assert_relative_eq!(fixed.min, 8.9, epsilon = 1e-9);
        assert_relative_eq!(fixed.max, 9.0, epsilon = 1e-9);
    }

    #[test]
    fn humidity_collapse_uses_wider_band() {
        let fixed = normalize_interval(Interval::new(120.0, 130.0), Feature::Humidity);
        assert_relative_eq!(fixed.min, 99.0, epsilon = 1e-9);
        assert_relative_eq!(fixed.max, 100.0, epsilon = 1e-9);
    }

    #[test]
    fn rainfall_is_floored_at_zero() {
        let fixed = normalize_interval(Interval::new(-20.0, 100.0), Feature::Rainfall);
        assert_eq!(fixed, Interval::new(0.0, 100.0));

        let collapsed = normalize_interval(Interval::new(-20.0, -10.0), Feature::Rainfall);
        assert_eq!(collapsed.min, 0.0);
        assert_relative_eq!(collapsed.max, 0.1, epsilon = 1e-12);
    }

    proptest! {
        #[test]
        fn output_always_has_min_below_max(
            a in -1.0e6f64..1.0e6,
            b in -1.0e6f64..1.0e6,
            idx in 0usize..7,
        ) {
            let feature = Feature::ALL[idx];
            let fixed = normalize_interval(Interval::new(a, b), feature);
            prop_assert!(fixed.min < fixed.max, "{:?} -> {:?}", (a, b), fixed);
        }

        #[test]
        fn flat_intervals_never_stay_flat(v in -1.0e6f64..1.0e6, idx in 0usize..7) {
            let feature = Feature::ALL[idx];
            let fixed = normalize_interval(Interval::new(v, v), feature);
            prop_assert!(fixed.min < fixed.max);
        }

        #[test]
        fn domain_clamps_hold(a in -50.0f64..150.0, b in -50.0f64..150.0) {
            let ph = normalize_interval(Interval::new(a, b), Feature::Ph);
            prop_assert!(ph.min >= 3.0 - 1e-9 && ph.max <= 9.0 + 1e-9);

            let humidity = normalize_interval(Interval::new(a, b), Feature::Humidity);
            prop_assert!(humidity.min >= -1e-9 && humidity.max <= 100.0 + 1e-9);

            let rainfall = normalize_interval(Interval::new(a, b), Feature::Rainfall);
            prop_assert!(rainfall.min >= 0.0);
        }
    }
}
