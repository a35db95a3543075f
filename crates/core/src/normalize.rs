use serde::{Deserialize, Serialize};

const EPSILON: f32 = f32::EPSILON;
const SKEW_RATIO: f32 = 4.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TransformMode {
    Linear,
    Sqrt,
    Log1p,
    Asinh,
}

impl TransformMode {
    /// Clamps to non-negative, then applies the curve.
    pub fn apply(self, value: f32) -> f32 {
        let value = value.max(0.0);
        match self {
            TransformMode::Linear => value,
            TransformMode::Sqrt => value.sqrt(),
            TransformMode::Log1p => value.ln_1p(),
            TransformMode::Asinh => value.asinh(),
        }
    }
}

/// Robust value range fitted on per-cell averages.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NormalizationConfig {
    pub lo: f32,
    pub hi: f32,
    pub mode: TransformMode,
    pub t_lo: f32,
    pub t_hi: f32,
    pub denom: f32,
}

impl Default for NormalizationConfig {
    fn default() -> Self {
        Self {
            lo: 0.0,
            hi: 1.0,
            mode: TransformMode::Log1p,
            t_lo: 0.0,
            t_hi: 1.0,
            denom: 1.0,
        }
    }
}

impl NormalizationConfig {
    /// Fits the 1st/99th percentile range and picks `Log1p` for right-skewed
    /// data (`hi / median > 4`), `Sqrt` otherwise.
    pub fn fit(cell_averages: &[f32]) -> Self {
        let mut sorted: Vec<f32> = cell_averages
            .iter()
            .copied()
            .filter(|value| value.is_finite())
            .collect();
        sorted.sort_by(f32::total_cmp);

        let (Some(lo), Some(hi_raw), Some(median)) = (
            quantile(&sorted, 0.01),
            quantile(&sorted, 0.99),
            quantile(&sorted, 0.5),
        ) else {
            return Self::default();
        };
        let lo = lo.max(0.0);
        let hi = hi_raw.max(next_above(lo));
        let mode = if hi / median.max(EPSILON) > SKEW_RATIO {
            TransformMode::Log1p
        } else {
            TransformMode::Sqrt
        };
        Self::with_mode(lo, hi, mode)
    }

    pub fn with_mode(lo: f32, hi: f32, mode: TransformMode) -> Self {
        let t_lo = mode.apply(lo);
        let t_hi = mode.apply(hi);
        Self {
            lo,
            hi,
            mode,
            t_lo,
            t_hi,
            denom: (t_hi - t_lo).max(EPSILON),
        }
    }

    /// Position of `avg` inside the fitted range, before display shaping.
    pub fn unit(&self, avg: f32) -> f32 {
        let t = (self.mode.apply(avg) - self.t_lo) / self.denom;
        if t.is_nan() {
            return 0.0;
        }
        t.clamp(0.0, 1.0)
    }

    /// Clamp, then `gamma`, then `gain`, then clamp again. Gain is applied
    /// once per call and must only ever see raw averages.
    pub fn normalize(&self, avg: f32, gamma: f32, gain: f32) -> f32 {
        let t = self.unit(avg).powf(gamma);
        let t = t * gain;
        if t.is_nan() {
            return 0.0;
        }
        t.clamp(0.0, 1.0)
    }
}

/// Linear interpolation between order statistics at rank `(n - 1) * q`.
/// `sorted` must be ascending; an empty slice has no quantile.
pub fn quantile(sorted: &[f32], q: f32) -> Option<f32> {
    let last = sorted.len().checked_sub(1)?;
    let rank = last as f32 * q.clamp(0.0, 1.0);
    let lower = (rank.floor() as usize).min(last);
    let upper = (lower + 1).min(last);
    let frac = rank - lower as f32;
    Some(sorted[lower] + (sorted[upper] - sorted[lower]) * frac)
}

// Smallest step above `value` that survives f32 rounding.
fn next_above(value: f32) -> f32 {
    let nudged = value + EPSILON;
    if nudged > value {
        nudged
    } else {
        value + value.abs() * EPSILON
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f32, b: f32) -> bool {
        (a - b).abs() < 1.0e-5
    }

    #[test]
    fn empty_fit_returns_safe_default() {
        let config = NormalizationConfig::fit(&[]);
        assert_eq!(config.denom, 1.0);
        assert_eq!(config.mode, TransformMode::Log1p);
        assert_eq!(config.lo, 0.0);
        assert_eq!(config.hi, 1.0);
    }

    #[test]
    fn quantile_interpolates_between_ranks() {
        let sorted = [0.0, 10.0, 20.0, 30.0];
        assert!(approx(quantile(&sorted, 0.0).expect("q0"), 0.0));
        assert!(approx(quantile(&sorted, 0.5).expect("q50"), 15.0));
        assert!(approx(quantile(&sorted, 1.0).expect("q100"), 30.0));
        assert!(approx(quantile(&[7.0], 0.99).expect("single"), 7.0));
    }

    #[test]
    fn quantile_of_empty_slice_is_none() {
        assert_eq!(quantile(&[], 0.5), None);
        assert_eq!(quantile(&[], 0.0), None);
    }

    #[test]
    fn skewed_data_selects_log1p() {
        let config = NormalizationConfig::fit(&[1.0, 1.0, 100.0]);
        assert_eq!(config.mode, TransformMode::Log1p);
        assert!(approx(config.lo, 1.0));
        assert!(config.hi > 90.0 && config.hi <= 100.0);
        assert!(config.normalize(1.0, 1.0, 1.0) < 0.01);
        assert_eq!(config.normalize(100.0, 1.0, 1.0), 1.0);
    }

    #[test]
    fn uniform_data_selects_sqrt() {
        let config = NormalizationConfig::fit(&[2.0, 3.0, 4.0, 5.0]);
        assert_eq!(config.mode, TransformMode::Sqrt);
    }

    #[test]
    fn degenerate_range_keeps_positive_denominator() {
        let zeros = NormalizationConfig::fit(&[0.0, 0.0, 0.0]);
        assert!(zeros.denom > 0.0);
        assert!(zeros.hi > zeros.lo);
        assert_eq!(zeros.normalize(0.0, 1.0, 1.0), 0.0);

        let flat = NormalizationConfig::fit(&[250.0; 8]);
        assert!(flat.denom > 0.0);
        assert!(flat.hi > flat.lo);
        let value = flat.normalize(250.0, 1.0, 1.0);
        assert!((0.0..=1.0).contains(&value));
    }

    #[test]
    fn transform_clamps_negative_input() {
        for mode in [
            TransformMode::Linear,
            TransformMode::Sqrt,
            TransformMode::Log1p,
            TransformMode::Asinh,
        ] {
            assert_eq!(mode.apply(-5.0), 0.0);
        }
        assert!(approx(TransformMode::Asinh.apply(1.0), 1.0f32.asinh()));
    }

    #[test]
    fn normalize_is_monotonic_and_bounded() {
        let averages = [0.0, 0.5, 1.0, 2.0, 3.5, 8.0, 40.0, 400.0, 4000.0];
        let config = NormalizationConfig::fit(&averages);
        for (gamma, gain) in [(1.0, 1.0), (0.5, 1.0), (2.2, 1.0), (1.0, 3.0), (0.7, 0.4)] {
            let mut previous = 0.0f32;
            let mut value = 0.0f32;
            while value < 5000.0 {
                let t = config.normalize(value, gamma, gain);
                assert!((0.0..=1.0).contains(&t), "t={t} at {value}");
                assert!(t >= previous, "not monotonic at {value}");
                previous = t;
                value += 3.7;
            }
        }
    }

    #[test]
    fn gamma_runs_before_gain() {
        let config = NormalizationConfig::with_mode(0.0, 1.0, TransformMode::Linear);
        let t = config.normalize(0.5, 2.0, 2.0);
        assert!(approx(t, 0.5));
        // Gain first would give (0.5 * 2)^2 = 1.0.
        assert!(!approx(t, 1.0));
    }

    #[test]
    fn gain_is_applied_once() {
        let config = NormalizationConfig::with_mode(0.0, 1.0, TransformMode::Linear);
        assert!(approx(config.normalize(0.2, 1.0, 2.0), 0.4));
    }

    #[test]
    fn non_finite_averages_are_ignored_by_fit() {
        let config = NormalizationConfig::fit(&[f32::NAN, 1.0, 2.0, f32::INFINITY]);
        assert!(config.hi.is_finite());
        assert!(config.denom > 0.0);
    }
}
