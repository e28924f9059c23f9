//! Site-level vegetated area from pooled transect data
//!
//! The vegetated fraction is a ratio estimator pooled across transects
//! (Σ vegetated / Σ sampled), not an average of per-transect ratios. It is
//! scaled to the sample-polygon area to give the vegetated area of the site.

use crate::depth::DepthSummary;
use crate::transect::TransectStats;
use serde::{Deserialize, Serialize};
use svmp_core::{
    ci95, coefficient_of_variation, is_null_depth, ratio_estimator_variance, Error, Result,
};
use tracing::{debug, warn};

/// How a site's area statistics came about
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SiteOutcome {
    /// Pooled transect data produced a fraction
    Measured,
    /// Transects exist but none has good-quality video
    NoEffort,
    /// No qualifying transects, or vegetation known to be absent
    VegetationAbsent,
}

/// Accumulates per-transect data for one site
#[derive(Debug, Clone)]
pub struct SiteEstimator {
    sample_polygon_area: f64,
    sample_lengths: Vec<f64>,
    vegetation_lengths: Vec<f64>,
    max_depths: Vec<f64>,
    min_depths: Vec<f64>,
}

impl SiteEstimator {
    pub fn new(sample_polygon_area: f64) -> Self {
        Self {
            sample_polygon_area,
            sample_lengths: Vec::new(),
            vegetation_lengths: Vec::new(),
            max_depths: Vec::new(),
            min_depths: Vec::new(),
        }
    }

    /// Build from aggregated transects, honouring the depth usability flags
    pub fn from_transects(transects: &[TransectStats], sample_polygon_area: f64) -> Self {
        let mut estimator = Self::new(sample_polygon_area);
        for t in transects {
            estimator.add_transect(t.sample_length, t.vegetation_length);
            if t.usable_for_max_depth {
                estimator.add_max_depth(t.veg_max_depth);
            }
            if t.usable_for_min_depth {
                estimator.add_min_depth(t.veg_min_depth);
            }
        }
        estimator
    }

    pub fn add_transect(&mut self, sample_length: f64, vegetation_length: f64) {
        self.sample_lengths.push(sample_length);
        self.vegetation_lengths.push(vegetation_length);
    }

    /// Sentinel depths are dropped
    pub fn add_max_depth(&mut self, depth: f64) {
        if !is_null_depth(depth) {
            self.max_depths.push(depth);
        }
    }

    /// Sentinel depths are dropped
    pub fn add_min_depth(&mut self, depth: f64) {
        if !is_null_depth(depth) {
            self.min_depths.push(depth);
        }
    }

    /// Number of transects contributing to the area calculation
    pub fn n(&self) -> usize {
        self.sample_lengths.len()
    }

    pub fn sample_polygon_area(&self) -> f64 {
        self.sample_polygon_area
    }

    pub fn total_sample_length(&self) -> f64 {
        self.sample_lengths.iter().sum()
    }

    pub fn total_vegetation_length(&self) -> f64 {
        self.vegetation_lengths.iter().sum()
    }

    pub fn outcome(&self) -> SiteOutcome {
        if self.n() == 0 {
            SiteOutcome::VegetationAbsent
        } else if self.total_sample_length() == 0.0 {
            SiteOutcome::NoEffort
        } else {
            SiteOutcome::Measured
        }
    }

    /// Pooled fraction, `0.0` when nothing was sampled
    pub fn vegetation_fraction(&self) -> f64 {
        let sample = self.total_sample_length();
        if sample == 0.0 {
            0.0
        } else {
            self.total_vegetation_length() / sample
        }
    }

    /// Mean sample length per transect, `0.0` without transects
    pub fn mean_transect_length(&self) -> f64 {
        if self.n() == 0 {
            0.0
        } else {
            self.total_sample_length() / self.n() as f64
        }
    }

    pub fn variance_of_fraction(&self) -> Result<f64> {
        ratio_estimator_variance(
            &self.sample_lengths,
            &self.vegetation_lengths,
            self.vegetation_fraction(),
            self.n(),
            self.mean_transect_length(),
        )
    }

    pub fn vegetated_area(&self) -> f64 {
        self.vegetation_fraction() * self.sample_polygon_area
    }

    pub fn variance_of_area(&self) -> Result<f64> {
        Ok(self.variance_of_fraction()? * self.sample_polygon_area.powi(2))
    }

    pub fn standard_error_of_area(&self) -> Result<f64> {
        Ok(self.variance_of_area()?.sqrt())
    }

    pub fn max_depth_summary(&self) -> DepthSummary {
        DepthSummary::from_depths(&self.max_depths)
    }

    pub fn min_depth_summary(&self) -> DepthSummary {
        DepthSummary::from_depths(&self.min_depths)
    }

    /// Resolve every site statistic without failing
    ///
    /// Sites without transects or without effort get all-zero area statistics,
    /// including the sample area.
    /// A measured site with a single transect has no defined variance, which is
    /// reported as `None`.
    pub fn estimate(&self) -> SiteStatistics {
        let outcome = self.outcome();
        if outcome != SiteOutcome::Measured {
            let mut stats = SiteStatistics::vegetation_absent();
            stats.outcome = outcome;
            stats.n_transects = self.n();
            stats.max_depth = self.max_depth_summary();
            stats.min_depth = self.min_depth_summary();
            return stats;
        }

        let fraction_variance = match self.variance_of_fraction() {
            Ok(v) => Some(v),
            Err(Error::InsufficientData { actual, .. }) => {
                warn!(n_transects = actual, "fraction variance needs at least two transects");
                None
            }
            Err(e) => {
                warn!(error = %e, "fraction variance undefined");
                None
            }
        };
        let area = self.vegetated_area();
        let area_variance = fraction_variance.map(|v| v * self.sample_polygon_area.powi(2));
        let area_se = area_variance.map(f64::sqrt);

        debug!(
            n = self.n(),
            fraction = self.vegetation_fraction(),
            area,
            "site estimate"
        );

        SiteStatistics {
            outcome,
            n_transects: self.n(),
            vegetation_fraction: self.vegetation_fraction(),
            fraction_variance,
            sample_area: self.sample_polygon_area,
            vegetated_area: area,
            area_variance,
            area_se,
            area_cv: area_se.map(|se| coefficient_of_variation(se, area)),
            area_ci95: area_se.map(ci95),
            max_depth: self.max_depth_summary(),
            min_depth: self.min_depth_summary(),
        }
    }
}

/// Site-level estimate of vegetated area and depth distribution
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SiteStatistics {
    pub outcome: SiteOutcome,
    pub n_transects: usize,
    pub vegetation_fraction: f64,
    pub fraction_variance: Option<f64>,
    pub sample_area: f64,
    pub vegetated_area: f64,
    pub area_variance: Option<f64>,
    pub area_se: Option<f64>,
    pub area_cv: Option<f64>,
    pub area_ci95: Option<f64>,
    /// Summary of per-transect maximum vegetation depths
    pub max_depth: DepthSummary,
    /// Summary of per-transect minimum vegetation depths
    pub min_depth: DepthSummary,
}

impl SiteStatistics {
    /// Record for a site where the vegetation is absent
    pub fn vegetation_absent() -> Self {
        Self {
            outcome: SiteOutcome::VegetationAbsent,
            n_transects: 0,
            vegetation_fraction: 0.0,
            fraction_variance: Some(0.0),
            sample_area: 0.0,
            vegetated_area: 0.0,
            area_variance: Some(0.0),
            area_se: Some(0.0),
            area_cv: Some(0.0),
            area_ci95: Some(0.0),
            max_depth: DepthSummary::empty(),
            min_depth: DepthSummary::empty(),
        }
    }
}
