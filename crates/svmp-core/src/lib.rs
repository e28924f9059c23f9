//! Core types for SVMP eelgrass-coverage estimation
//!
//! This crate holds the pieces every estimator layer shares:
//!
//! - [`Error`] / [`Result`]: one error type across the workspace
//! - [`primitives`]: sample statistics, the ratio-estimator variance and the
//!   null-depth sentinel policy
//! - [`units`]: survey-feet to meters conversion
//!
//! # Example
//!
//! ```rust
//! use svmp_core::primitives::{ci95, standard_error, try_std_dev};
//!
//! let depths = [-12.0, -14.5, -11.0, -13.25];
//! let sd = try_std_dev(&depths).unwrap();
//! let se = standard_error(sd, depths.len());
//! assert!((ci95(se) - 1.96 * se).abs() < 1e-12);
//! ```

pub mod error;
pub mod primitives;
pub mod units;

pub use error::{Error, Result};
pub use primitives::{
    ci95, clamp_variance_noise, coefficient_of_variation, is_null_depth, mean,
    normal_critical_value, ratio_estimator_variance, standard_error, std_dev, sum_of_squares,
    try_std_dev, variance, NEGATIVE_VARIANCE_TOLERANCE, NULL_DEPTH, Z_95,
};
pub use units::{Units, SURVEY_FOOT_TO_METER};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{Error, Result, Units, NULL_DEPTH};
}
