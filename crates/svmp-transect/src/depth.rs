//! Site-level summaries of transect depth extremes

use serde::{Deserialize, Serialize};
use svmp_core::{ci95, is_null_depth, standard_error, try_std_dev, variance, NULL_DEPTH};

/// Summary of a list of per-transect depths
///
/// Every statistic that cannot be computed holds [`NULL_DEPTH`]: range and mean
/// need one depth, spread statistics need two.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DepthSummary {
    pub n: usize,
    pub mean: f64,
    /// Numerically smallest value
    pub deepest: f64,
    /// Numerically largest value
    pub shallowest: f64,
    pub std_dev: f64,
    pub variance: f64,
    pub se: f64,
    pub ci95: f64,
}

impl DepthSummary {
    /// Summary with every statistic set to the sentinel
    pub fn empty() -> Self {
        Self {
            n: 0,
            mean: NULL_DEPTH,
            deepest: NULL_DEPTH,
            shallowest: NULL_DEPTH,
            std_dev: NULL_DEPTH,
            variance: NULL_DEPTH,
            se: NULL_DEPTH,
            ci95: NULL_DEPTH,
        }
    }

    /// Summarise depths, ignoring sentinel values
    pub fn from_depths(depths: &[f64]) -> Self {
        let known: Vec<f64> = depths.iter().copied().filter(|d| !is_null_depth(*d)).collect();
        let mut summary = Self::empty();
        summary.n = known.len();
        if known.is_empty() {
            return summary;
        }

        summary.mean = known.iter().sum::<f64>() / known.len() as f64;
        summary.deepest = known.iter().copied().fold(f64::INFINITY, f64::min);
        summary.shallowest = known.iter().copied().fold(f64::NEG_INFINITY, f64::max);

        if let Ok(sd) = try_std_dev(&known) {
            let se = standard_error(sd, known.len());
            summary.std_dev = sd;
            summary.variance = variance(sd);
            summary.se = se;
            summary.ci95 = ci95(se);
        }
        summary
    }

    pub fn has_spread(&self) -> bool {
        self.n >= 2
    }
}

impl Default for DepthSummary {
    fn default() -> Self {
        Self::empty()
    }
}
