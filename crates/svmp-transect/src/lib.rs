//! Transect aggregation and site-level vegetated-area estimation
//!
//! Raw survey data arrive as along-track segments tagged with depth, video
//! quality and vegetation presence. This crate turns them into:
//!
//! - per-transect sample length, vegetated length, fraction and depth extremes
//!   ([`TransectAggregator`], [`TransectStats`])
//! - per-site pooled fraction, vegetated area and its variance from the ratio
//!   estimator, plus depth summaries ([`SiteEstimator`], [`SiteStatistics`])
//!
//! # Example
//!
//! ```rust
//! use svmp_transect::{SegmentObservation, SiteEstimator, TransectAggregator, TransectControl};
//!
//! let segment = |id, veg, len| SegmentObservation {
//!     transect_id: id,
//!     date: None,
//!     depth: -3.0,
//!     video_quality: true,
//!     vegetation: veg,
//!     segment_length: len,
//! };
//! let observations = vec![segment(1, true, 30.0), segment(1, false, 70.0), segment(2, true, 50.0)];
//! let controls = vec![
//!     TransectControl::new(1, "SLPR", true, true),
//!     TransectControl::new(2, "SLPR", true, true),
//! ];
//!
//! let summary = TransectAggregator::default().aggregate(&observations, &controls).unwrap();
//! let site = SiteEstimator::from_transects(&summary.transects, 20_000.0).estimate();
//! assert!((site.vegetation_fraction - 80.0 / 150.0).abs() < 1e-12);
//! ```

mod control;
mod depth;
mod segment;
mod site;
mod transect;

pub use control::{TrackTypeFilter, TransectControl, STRAIGHT_LINE_PERPENDICULAR};
pub use depth::DepthSummary;
pub use segment::{Segment, SegmentObservation, TransectId};
pub use site::{SiteEstimator, SiteOutcome, SiteStatistics};
pub use transect::{Coverage, Transect, TransectAggregator, TransectStats, TransectSummary};
