//! Year-to-year change in eelgrass area
//!
//! Sites sampled in both years are paired and year-2 area is regressed on
//! year-1 area through the origin. The slope, applied to the full year-1
//! stratum estimate, gives the stratum's area change ([`ChangeStats`]); the
//! strata combine into a soundwide change and proportional change
//! ([`ChangeStatsTotal`]).
//!
//! # Example
//!
//! ```rust
//! use svmp_change::ChangeStats;
//! use svmp_strata::AnalysisStratum;
//!
//! let change = ChangeStats::from_areas(
//!     AnalysisStratum::Fringe,
//!     &[10.0, 20.0, 30.0],
//!     &[12.0, 22.0, 33.0],
//!     1000.0,
//!     0.0,
//! )
//! .unwrap();
//! assert!((change.slope - 1550.0 / 1400.0).abs() < 1e-12);
//! ```

mod change;
mod total;

pub use change::{matched_samples, ChangeStats};
pub use total::ChangeStatsTotal;
