//! Eelgrass area and area-change estimation for SVMP surveys
//!
//! The workspace is split by estimation layer; this crate re-exports them:
//!
//! - [`svmp_core`]: shared error type, sample statistics and unit conversion
//! - [`svmp_transect`]: segment aggregation into transects and site ratio estimates
//! - [`svmp_strata`]: stratum designs, extrapolation and soundwide annual totals
//! - [`svmp_change`]: paired-site regression change between two survey years
//! - [`svmp_confidence`]: Monte Carlo confidence interval of the soundwide change
//! - [`svmp_report`]: fixed-column result tables written as CSV
//!
//! # Example
//!
//! ```rust
//! use svmp_stats::prelude::*;
//!
//! let fringe = Stratum::linear(AnalysisStratum::Fringe, 40, 40_000.0, 40_000.0).unwrap();
//! let site = |id: &str, area: f64| Site::new(id, area, area / 25.0);
//! let y1 = Sample::new(fringe, vec![site("cps0001", 100.0), site("cps0002", 300.0)]).unwrap();
//! let y2 = Sample::new(fringe, vec![site("cps0001", 90.0), site("cps0002", 270.0)]).unwrap();
//!
//! let stats = SampleStats::new(&y1);
//! let (y1m, y2m) = matched_samples(&y1, &y2).unwrap();
//! let change = ChangeStats::new(&y1m, &y2m, &stats).unwrap();
//! assert!((change.change_prop + 0.1).abs() < 1e-12);
//! ```

pub use svmp_change;
pub use svmp_confidence;
pub use svmp_core;
pub use svmp_report;
pub use svmp_strata;
pub use svmp_transect;

/// Prelude module for convenient imports
pub mod prelude {
    pub use svmp_change::{matched_samples, ChangeStats, ChangeStatsTotal};
    pub use svmp_confidence::{
        soundwide_change, ConfidenceInterval, ConfidenceLevel, MonteCarloConfig,
        MonteCarloResult, MonteCarloSimulator, StratumChangeData,
    };
    pub use svmp_core::{Error, Result, Units, NULL_DEPTH};
    pub use svmp_report::{
        write_table, AnnualRow, ChangeStratumRow, ChangeTotalRow, SiteRow, SiteVisit,
        StratumAreaRow, TransectRow,
    };
    pub use svmp_strata::{
        AnalysisStratum, AnnualEstimate, Sample, SampleStats, Site, SiteCharacteristics,
        SoundwideConstants, StratifiedSites, Stratum, StratumConstants, StratumLookup,
    };
    pub use svmp_transect::{
        SegmentObservation, SiteEstimator, SiteStatistics, TransectAggregator, TransectControl,
    };
}
