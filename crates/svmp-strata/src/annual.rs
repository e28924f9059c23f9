//! Soundwide totals across strata for a single year

use crate::estimate::SampleStats;
use crate::stratum::AnalysisStratum;
use serde::{Deserialize, Serialize};
use svmp_core::coefficient_of_variation;

/// Sum of stratum areas and variances
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnnualEstimate {
    pub strata: Vec<AnalysisStratum>,
    pub zm_area: f64,
    pub zm_area_var: f64,
    pub se: f64,
    pub cv: f64,
}

impl AnnualEstimate {
    pub fn new(stats: &[SampleStats]) -> Self {
        Self::from_parts(
            stats.iter().map(|s| s.stratum).collect(),
            stats.iter().map(|s| s.zm_area).sum(),
            stats.iter().map(|s| s.zm_area_var).sum(),
        )
    }

    fn from_parts(strata: Vec<AnalysisStratum>, zm_area: f64, zm_area_var: f64) -> Self {
        let se = zm_area_var.max(0.0).sqrt();
        Self {
            strata,
            zm_area,
            zm_area_var,
            se,
            cv: coefficient_of_variation(se, zm_area),
        }
    }

    pub fn stratum_count(&self) -> usize {
        self.strata.len()
    }
}

impl FromIterator<SampleStats> for AnnualEstimate {
    fn from_iter<I: IntoIterator<Item = SampleStats>>(iter: I) -> Self {
        let stats: Vec<SampleStats> = iter.into_iter().collect();
        Self::new(&stats)
    }
}
