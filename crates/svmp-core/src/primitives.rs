//! Statistical primitives shared by the transect, site and stratum estimators
//!
//! The `try_*` functions report [`Error::InsufficientData`] when a statistic is
//! undefined. Row-producing code resolves those cases to [`NULL_DEPTH`] instead
//! of failing, so "no data" stays distinguishable from a measured zero.

use crate::{Error, Result};
use statrs::distribution::{ContinuousCDF, Normal};
use tracing::debug;

/// Out-of-range value standing in for a missing depth or depth statistic
pub const NULL_DEPTH: f64 = -9999.0;

/// Two-sided 95% normal critical value used for the reported confidence intervals
pub const Z_95: f64 = 1.96;

/// Tolerance under which a negative variance is treated as floating-point noise
pub const NEGATIVE_VARIANCE_TOLERANCE: f64 = 1e-4;

/// Whether a depth value is the null sentinel
#[inline]
pub fn is_null_depth(value: f64) -> bool {
    value == NULL_DEPTH
}

/// Arithmetic mean, `None` for an empty slice
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}

/// Sum of squared values
pub fn sum_of_squares(values: &[f64]) -> f64 {
    values.iter().map(|v| v * v).sum()
}

/// Sample standard deviation with an `N - 1` denominator
///
/// Requires at least two observations.
pub fn try_std_dev(samples: &[f64]) -> Result<f64> {
    if samples.len() < 2 {
        return Err(Error::InsufficientData {
            expected: 2,
            actual: samples.len(),
        });
    }
    let n = samples.len() as f64;
    let mean = samples.iter().sum::<f64>() / n;
    let sum_sq_diff: f64 = samples.iter().map(|&x| (x - mean).powi(2)).sum();
    Ok((sum_sq_diff / (n - 1.0)).sqrt())
}

/// Sample standard deviation, [`NULL_DEPTH`] when fewer than two observations
pub fn std_dev(samples: &[f64]) -> f64 {
    try_std_dev(samples).unwrap_or(NULL_DEPTH)
}

/// Variance from a standard deviation
#[inline]
pub fn variance(std_dev: f64) -> f64 {
    std_dev * std_dev
}

/// Standard error of the mean from a standard deviation and sample count
#[inline]
pub fn standard_error(std_dev: f64, n: usize) -> f64 {
    std_dev / (n as f64).sqrt()
}

/// Half-width of the 95% confidence interval
#[inline]
pub fn ci95(se: f64) -> f64 {
    Z_95 * se
}

/// Coefficient of variation, `0.0` when the estimate is zero
#[inline]
pub fn coefficient_of_variation(se: f64, estimate: f64) -> f64 {
    if estimate == 0.0 {
        0.0
    } else {
        se / estimate
    }
}

/// Variance of a ratio estimator of vegetated fraction
///
/// Σ(lᵢ − p̂·Lᵢ)² / [(n − 1)·n·L̄²] where `Lᵢ` are sample lengths,
/// `lᵢ` vegetated lengths, `p̂` the pooled fraction and `L̄` the mean sample length.
pub fn ratio_estimator_variance(
    sample_lengths: &[f64],
    veg_lengths: &[f64],
    mean_fraction: f64,
    n: usize,
    mean_sample_length: f64,
) -> Result<f64> {
    if sample_lengths.len() != veg_lengths.len() {
        return Err(Error::size_mismatch(
            sample_lengths.len(),
            veg_lengths.len(),
            "ratio estimator lengths",
        ));
    }
    if n < 2 {
        return Err(Error::InsufficientData {
            expected: 2,
            actual: n,
        });
    }
    if mean_sample_length == 0.0 {
        return Err(Error::Computation(
            "mean sample length is zero".to_string(),
        ));
    }

    let numerator: f64 = sample_lengths
        .iter()
        .zip(veg_lengths)
        .map(|(&big_l, &l)| (l - mean_fraction * big_l).powi(2))
        .sum();
    let n = n as f64;
    Ok(numerator / ((n - 1.0) * n * mean_sample_length * mean_sample_length))
}

/// Two-sided normal critical value for an arbitrary confidence level
pub fn normal_critical_value(confidence_level: f64) -> Result<f64> {
    if !(confidence_level > 0.0 && confidence_level < 1.0) {
        return Err(Error::InvalidParameter(format!(
            "Confidence level {confidence_level} must be in (0, 1)"
        )));
    }
    let normal = Normal::new(0.0, 1.0).map_err(|e| {
        Error::Computation(format!("Failed to create normal distribution: {e}"))
    })?;
    Ok(normal.inverse_cdf(1.0 - (1.0 - confidence_level) / 2.0))
}

/// Clamp a slightly negative variance to zero
///
/// Values in `(-NEGATIVE_VARIANCE_TOLERANCE, 0)` become `0.0`; anything else is
/// returned untouched.
#[inline]
pub fn clamp_variance_noise(variance: f64) -> f64 {
    if variance < 0.0 && variance.abs() < NEGATIVE_VARIANCE_TOLERANCE {
        debug!(variance, "negative variance within tolerance clamped to zero");
        0.0
    } else {
        variance
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use proptest::prelude::*;

    #[test]
    fn test_std_dev_known_values() {
        let sd = try_std_dev(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]).unwrap();
        assert_relative_eq!(sd, 2.138089935299395, epsilon = 1e-12);
    }

    #[test]
    fn test_std_dev_insufficient() {
        assert!(matches!(
            try_std_dev(&[1.0]),
            Err(Error::InsufficientData { expected: 2, actual: 1 })
        ));
        assert_eq!(std_dev(&[]), NULL_DEPTH);
        assert_eq!(std_dev(&[-12.0]), NULL_DEPTH);
    }

    #[test]
    fn test_variance_se_ci() {
        assert_relative_eq!(variance(3.0), 9.0);
        assert_relative_eq!(standard_error(4.0, 4), 2.0);
        assert_relative_eq!(ci95(2.0), 3.92);
    }

    #[test]
    fn test_cv_zero_estimate() {
        assert_eq!(coefficient_of_variation(5.0, 0.0), 0.0);
        assert_relative_eq!(coefficient_of_variation(5.0, 50.0), 0.1);
    }

    #[test]
    fn test_ratio_estimator_variance_hand_computed() {
        // L = [100, 200], l = [50, 50], p = 100/300, Lbar = 150
        let p = 100.0 / 300.0;
        let var = ratio_estimator_variance(&[100.0, 200.0], &[50.0, 50.0], p, 2, 150.0).unwrap();
        let expected = ((50.0 - p * 100.0_f64).powi(2) + (50.0 - p * 200.0_f64).powi(2))
            / (1.0 * 2.0 * 150.0 * 150.0);
        assert_relative_eq!(var, expected, epsilon = 1e-15);
    }

    #[test]
    fn test_ratio_estimator_variance_guards() {
        assert!(matches!(
            ratio_estimator_variance(&[10.0], &[5.0], 0.5, 1, 10.0),
            Err(Error::InsufficientData { .. })
        ));
        assert!(matches!(
            ratio_estimator_variance(&[0.0, 0.0], &[0.0, 0.0], 0.0, 2, 0.0),
            Err(Error::Computation(_))
        ));
        assert!(matches!(
            ratio_estimator_variance(&[1.0, 2.0], &[1.0], 0.5, 2, 1.5),
            Err(Error::InvalidInput(_))
        ));
    }

    #[test]
    fn test_normal_critical_value() {
        assert_relative_eq!(normal_critical_value(0.95).unwrap(), 1.959963984540054, epsilon = 1e-6);
        assert!(normal_critical_value(1.0).is_err());
        assert!(normal_critical_value(0.0).is_err());
    }

    #[test]
    fn test_clamp_variance_noise() {
        assert_eq!(clamp_variance_noise(-5e-5), 0.0);
        assert_eq!(clamp_variance_noise(-0.5), -0.5);
        assert_eq!(clamp_variance_noise(0.25), 0.25);
    }

    proptest! {
        #[test]
        fn prop_se_and_ci_identities(values in prop::collection::vec(-60.0f64..0.0, 2..40)) {
            let sd = try_std_dev(&values).unwrap();
            let se = standard_error(sd, values.len());
            prop_assert!((se - sd / (values.len() as f64).sqrt()).abs() < 1e-12);
            prop_assert!((ci95(se) - 1.96 * se).abs() < 1e-12);
        }

        #[test]
        fn prop_pooled_fraction_scale_invariant(
            pairs in prop::collection::vec((1.0f64..500.0, 0.0f64..1.0), 2..20),
            scale in 0.01f64..100.0,
        ) {
            let sample: Vec<f64> = pairs.iter().map(|(l, _)| *l).collect();
            let veg: Vec<f64> = pairs.iter().map(|(l, f)| l * f).collect();
            let fraction = veg.iter().sum::<f64>() / sample.iter().sum::<f64>();

            let scaled_sample: Vec<f64> = sample.iter().map(|v| v * scale).collect();
            let scaled_veg: Vec<f64> = veg.iter().map(|v| v * scale).collect();
            let scaled_fraction = scaled_veg.iter().sum::<f64>() / scaled_sample.iter().sum::<f64>();
            prop_assert!((fraction - scaled_fraction).abs() < 1e-9);

            // Recomputing the variance with the rescaled fraction and mean length
            // leaves it unchanged as well.
            let n = sample.len();
            let mean_len = sample.iter().sum::<f64>() / n as f64;
            let var = ratio_estimator_variance(&sample, &veg, fraction, n, mean_len).unwrap();
            let scaled_var = ratio_estimator_variance(
                &scaled_sample, &scaled_veg, scaled_fraction, n, mean_len * scale,
            ).unwrap();
            prop_assert!((var - scaled_var).abs() <= 1e-9 * var.abs().max(1e-12));
        }
    }
}
