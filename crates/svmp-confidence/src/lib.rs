//! Monte Carlo confidence intervals for soundwide change
//!
//! The analytic standard error of the soundwide proportional change ignores
//! the sampling error of the site draw. This crate estimates its spread
//! empirically by bootstrapping sites, perturbing each site's area by its
//! measurement error and recomputing the change thousands of times.
//!
//! # Example
//!
//! ```rust
//! use svmp_confidence::{MonteCarloConfig, MonteCarloSimulator, StratumChangeData};
//! use svmp_strata::{Sample, Site, Stratum};
//!
//! let y1 = Sample::new(Stratum::core(), vec![Site::new("core001", 100.0, 25.0)]).unwrap();
//! let y2 = Sample::new(Stratum::core(), vec![Site::new("core001", 90.0, 25.0)]).unwrap();
//! let strata = vec![StratumChangeData::from_years(y1, &y2).unwrap()];
//!
//! let config = MonteCarloConfig::builder()
//!     .with_iterations(200)
//!     .with_seed(42)
//!     .build()
//!     .unwrap();
//! let result = MonteCarloSimulator::new(config).run(&strata).unwrap();
//! assert_eq!(result.proportion_changes.len(), 200);
//! println!("{}", result.interval);
//! ```

mod monte_carlo;
mod simulation;
mod types;

pub use monte_carlo::{
    deviation_rank_half_width, soundwide_change, MonteCarloConfig, MonteCarloConfigBuilder,
    MonteCarloResult, MonteCarloSimulator, StratumChangeData, DEFAULT_ITERATIONS,
    DEFAULT_MIN_BOOTSTRAP_SITES,
};
pub use simulation::{
    bootstrap, match_sites, measurement_error, simulate_area, DEFAULT_MAX_REDRAWS,
};
pub use types::{ConfidenceInterval, ConfidenceLevel};
