//! Row types for the result tables
//!
//! Field order is column order. Optional cells serialise as empty strings.

use crate::error::Result;
use crate::ids::SiteVisit;
use chrono::NaiveDate;
use serde::Serialize;
use svmp_change::{ChangeStats, ChangeStatsTotal};
use svmp_confidence::MonteCarloResult;
use svmp_core::Error as CoreError;
use svmp_strata::{AnnualEstimate, Sample, SampleStats, StratumDesign};
use svmp_transect::{DepthSummary, SiteStatistics, TransectStats};

/// A row with a fixed, named column list
pub trait TableRow: Serialize {
    /// Header in serialisation order
    const COLUMNS: &'static [&'static str];
}

fn flag(value: bool) -> u8 {
    u8::from(value)
}

/// Per-transect lengths, fraction and depth extremes
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TransectRow {
    pub tran_results_id: String,
    pub site_code: String,
    pub date_samp_start: NaiveDate,
    pub transect_date: Option<NaiveDate>,
    pub veg_code: String,
    pub tran_num: u32,
    pub tran_len: f64,
    pub zm_len: f64,
    pub tran_zm_frac: f64,
    pub tran_maxd: f64,
    pub tran_zm_maxd: f64,
    pub tran_zm_mind: f64,
    pub tran_mind: f64,
    pub tran_maxd_good: u8,
    pub tran_mind_good: u8,
    pub site_results_id: String,
}

impl TransectRow {
    pub fn new(visit: &SiteVisit, transect: &TransectStats) -> Self {
        Self {
            tran_results_id: visit.tran_results_id(transect.id),
            site_code: visit.site_code.clone(),
            date_samp_start: visit.start_date,
            transect_date: transect.date,
            veg_code: visit.veg_code.clone(),
            tran_num: transect.id,
            tran_len: transect.sample_length,
            zm_len: transect.vegetation_length,
            tran_zm_frac: transect.vegetation_fraction(),
            tran_maxd: transect.track_max_depth,
            tran_zm_maxd: transect.veg_max_depth,
            tran_zm_mind: transect.veg_min_depth,
            tran_mind: transect.track_min_depth,
            tran_maxd_good: flag(transect.usable_for_max_depth),
            tran_mind_good: flag(transect.usable_for_min_depth),
            site_results_id: visit.site_results_id(),
        }
    }

    /// Rows for every transect of a visit, in transect order
    pub fn for_visit(visit: &SiteVisit, transects: &[TransectStats]) -> Vec<Self> {
        transects.iter().map(|t| Self::new(visit, t)).collect()
    }
}

impl TableRow for TransectRow {
    const COLUMNS: &'static [&'static str] = &[
        "tran_results_id",
        "site_code",
        "date_samp_start",
        "transect_date",
        "veg_code",
        "tran_num",
        "tran_len",
        "zm_len",
        "tran_zm_frac",
        "tran_maxd",
        "tran_zm_maxd",
        "tran_zm_mind",
        "tran_mind",
        "tran_maxd_good",
        "tran_mind_good",
        "site_results_id",
    ];
}

/// Site-level area estimate and depth summaries
///
/// `zm_area_se` is empty when the site has too few transects for a variance.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SiteRow {
    pub site_results_id: String,
    pub site_code: String,
    pub date_samp_start: NaiveDate,
    pub veg_code: String,
    pub zm_area_n_tran: usize,
    pub zm_frac: f64,
    pub samp_area: f64,
    pub zm_area: f64,
    pub zm_area_se: Option<f64>,
    pub zm_mind_n_tran: usize,
    pub zm_mind_mean: f64,
    pub zm_mind_shallowest: f64,
    pub zm_mind_deepest: f64,
    pub zm_mind_se: f64,
    pub zm_maxd_n_tran: usize,
    pub zm_maxd_mean: f64,
    pub zm_maxd_shallowest: f64,
    pub zm_maxd_deepest: f64,
    pub zm_maxd_se: f64,
    pub sitestat_id: String,
}

impl SiteRow {
    pub fn new(visit: &SiteVisit, stats: &SiteStatistics) -> Self {
        let DepthSummary {
            n: mind_n,
            mean: mind_mean,
            shallowest: mind_shallowest,
            deepest: mind_deepest,
            se: mind_se,
            ..
        } = stats.min_depth;
        let DepthSummary {
            n: maxd_n,
            mean: maxd_mean,
            shallowest: maxd_shallowest,
            deepest: maxd_deepest,
            se: maxd_se,
            ..
        } = stats.max_depth;

        Self {
            site_results_id: visit.site_results_id(),
            site_code: visit.site_code.clone(),
            date_samp_start: visit.start_date,
            veg_code: visit.veg_code.clone(),
            zm_area_n_tran: stats.n_transects,
            zm_frac: stats.vegetation_fraction,
            samp_area: stats.sample_area,
            zm_area: stats.vegetated_area,
            zm_area_se: stats.area_se,
            zm_mind_n_tran: mind_n,
            zm_mind_mean: mind_mean,
            zm_mind_shallowest: mind_shallowest,
            zm_mind_deepest: mind_deepest,
            zm_mind_se: mind_se,
            zm_maxd_n_tran: maxd_n,
            zm_maxd_mean: maxd_mean,
            zm_maxd_shallowest: maxd_shallowest,
            zm_maxd_deepest: maxd_deepest,
            zm_maxd_se: maxd_se,
            sitestat_id: visit.sitestat_id(),
        }
    }
}

impl TableRow for SiteRow {
    const COLUMNS: &'static [&'static str] = &[
        "site_results_id",
        "site_code",
        "date_samp_start",
        "veg_code",
        "zm_area_n_tran",
        "zm_frac",
        "samp_area",
        "zm_area",
        "zm_area_se",
        "zm_mind_n_tran",
        "zm_mind_mean",
        "zm_mind_shallowest",
        "zm_mind_deepest",
        "zm_mind_se",
        "zm_maxd_n_tran",
        "zm_maxd_mean",
        "zm_maxd_shallowest",
        "zm_maxd_deepest",
        "zm_maxd_se",
        "sitestat_id",
    ];
}

/// One stratum's annual area estimate with the constants behind it
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StratumAreaRow {
    pub survey_year: i32,
    pub stratum_analysis: String,
    pub extrapolation: String,
    pub sample_group: String,
    pub zm_area_m2: f64,
    pub zm_var_m4: f64,
    pub se_m2: f64,
    pub cv: f64,
    pub ni: usize,
    #[serde(rename = "Ni")]
    pub population: Option<usize>,
    #[serde(rename = "A2")]
    pub stratum_area: Option<f64>,
    #[serde(rename = "Aij")]
    pub sampled_area: Option<f64>,
    #[serde(rename = "R")]
    pub ratio: Option<f64>,
    #[serde(rename = "LT")]
    pub shoreline_length: Option<f64>,
    #[serde(rename = "LN")]
    pub frame_length: Option<f64>,
}

impl StratumAreaRow {
    /// Census strata report their sample size as `Ni`
    pub fn new(
        survey_year: i32,
        sample_group: &str,
        sample: &Sample,
        stats: &SampleStats,
    ) -> Self {
        let mut row = Self {
            survey_year,
            stratum_analysis: stats.stratum.as_str().to_string(),
            extrapolation: stats.extrapolation.as_str().to_string(),
            sample_group: sample_group.to_string(),
            zm_area_m2: stats.zm_area,
            zm_var_m4: stats.zm_area_var,
            se_m2: stats.se,
            cv: stats.cv,
            ni: stats.ni,
            population: None,
            stratum_area: None,
            sampled_area: None,
            ratio: None,
            shoreline_length: None,
            frame_length: None,
        };
        match sample.stratum().design() {
            StratumDesign::Census => row.population = Some(stats.ni),
            StratumDesign::Area { ni, a2 } => {
                row.population = Some(ni);
                row.stratum_area = Some(a2);
                row.sampled_area = stats.aij;
                row.ratio = stats.ratio;
            }
            StratumDesign::Linear { ni, lt, ln } => {
                row.population = Some(ni);
                row.shoreline_length = Some(lt);
                row.frame_length = Some(ln);
            }
        }
        row
    }

    /// Rows for parallel slices of samples and their estimates
    pub fn for_strata(
        survey_year: i32,
        sample_group: &str,
        samples: &[Sample],
        stats: &[SampleStats],
    ) -> Result<Vec<Self>> {
        if samples.len() != stats.len() {
            let err = CoreError::size_mismatch(samples.len(), stats.len(), "stratum estimates");
            return Err(err.into());
        }
        Ok(samples
            .iter()
            .zip(stats)
            .map(|(sample, s)| Self::new(survey_year, sample_group, sample, s))
            .collect())
    }
}

impl TableRow for StratumAreaRow {
    const COLUMNS: &'static [&'static str] = &[
        "survey_year",
        "stratum_analysis",
        "extrapolation",
        "sample_group",
        "zm_area_m2",
        "zm_var_m4",
        "se_m2",
        "cv",
        "ni",
        "Ni",
        "A2",
        "Aij",
        "R",
        "LT",
        "LN",
    ];
}

/// Soundwide area estimate for one year
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnnualRow {
    pub survey_year: i32,
    pub sample_group: String,
    pub zm_area_m2: f64,
    pub zm_var_m4: f64,
    pub se_m2: f64,
    pub cv: f64,
}

impl AnnualRow {
    pub fn new(survey_year: i32, sample_group: &str, annual: &AnnualEstimate) -> Self {
        Self {
            survey_year,
            sample_group: sample_group.to_string(),
            zm_area_m2: annual.zm_area,
            zm_var_m4: annual.zm_area_var,
            se_m2: annual.se,
            cv: annual.cv,
        }
    }
}

impl TableRow for AnnualRow {
    const COLUMNS: &'static [&'static str] = &[
        "survey_year",
        "sample_group",
        "zm_area_m2",
        "zm_var_m4",
        "se_m2",
        "cv",
    ];
}

/// Change in one stratum between two survey years
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChangeStratumRow {
    pub survey_year1: i32,
    pub survey_year2: i32,
    pub stratum_analysis: String,
    pub sample_group: String,
    pub site_count: usize,
    pub slope: f64,
    pub se_slope: f64,
    pub prop_change: f64,
    pub zm_area_chg_m2: f64,
    pub se_zm_area_chg: f64,
}

impl ChangeStratumRow {
    pub fn new(
        survey_year1: i32,
        survey_year2: i32,
        sample_group: &str,
        change: &ChangeStats,
    ) -> Self {
        Self {
            survey_year1,
            survey_year2,
            stratum_analysis: change.stratum.as_str().to_string(),
            sample_group: sample_group.to_string(),
            site_count: change.site_count,
            slope: change.slope,
            se_slope: change.slope_se,
            prop_change: change.change_prop,
            zm_area_chg_m2: change.area_change,
            se_zm_area_chg: change.area_change_se,
        }
    }
}

impl TableRow for ChangeStratumRow {
    const COLUMNS: &'static [&'static str] = &[
        "survey_year1",
        "survey_year2",
        "stratum_analysis",
        "sample_group",
        "site_count",
        "slope",
        "se_slope",
        "prop_change",
        "zm_area_chg_m2",
        "se_zm_area_chg",
    ];
}

/// Soundwide change with the simulated confidence half-width
///
/// `mc_95ci` is empty when no simulation was run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChangeTotalRow {
    pub survey_year1: i32,
    pub survey_year2: i32,
    pub sample_group: String,
    pub prop_change: f64,
    pub zm_area_chg_m2: f64,
    pub se_zm_area_chg: f64,
    pub mc_95ci: Option<f64>,
}

impl ChangeTotalRow {
    pub fn new(
        survey_year1: i32,
        survey_year2: i32,
        sample_group: &str,
        total: &ChangeStatsTotal,
        simulation: Option<&MonteCarloResult>,
    ) -> Self {
        Self {
            survey_year1,
            survey_year2,
            sample_group: sample_group.to_string(),
            prop_change: total.change_prop,
            zm_area_chg_m2: total.area_change,
            se_zm_area_chg: total.area_change_se,
            mc_95ci: simulation.map(|r| r.half_width),
        }
    }
}

impl TableRow for ChangeTotalRow {
    const COLUMNS: &'static [&'static str] = &[
        "survey_year1",
        "survey_year2",
        "sample_group",
        "prop_change",
        "zm_area_chg_m2",
        "se_zm_area_chg",
        "mc_95ci",
    ];
}
