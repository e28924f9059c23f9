//! Per-stratum change between two survey years

use serde::{Deserialize, Serialize};
use svmp_core::{
    clamp_variance_noise, sum_of_squares, Error, Result, NEGATIVE_VARIANCE_TOLERANCE,
};
use svmp_strata::{AnalysisStratum, Sample, SampleStats};
use tracing::{debug, instrument, warn};

/// Sites sampled in both years, aligned by position
///
/// Year-1 order is kept; sites only present in one year are dropped.
pub fn matched_samples(y1: &Sample, y2: &Sample) -> Result<(Sample, Sample)> {
    let mut x = Vec::new();
    let mut y = Vec::new();
    for site in y1.sites() {
        if let Some(other) = y2.find(&site.id) {
            x.push(site.clone());
            y.push(other.clone());
        }
    }
    Ok((y1.with_sites(x)?, y2.with_sites(y)?))
}

/// Regression-through-origin change estimate for one stratum
///
/// `x` are the year-1 areas of the matched sites and `y` their year-2 areas.
/// The slope scales the full year-1 stratum estimate into an area change.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ChangeStats {
    pub stratum: AnalysisStratum,
    /// Number of matched sites
    pub site_count: usize,
    pub sum_x2: f64,
    pub sum_y2: f64,
    pub sum_xy: f64,
    pub slope: f64,
    pub slope_se: f64,
    pub change_prop: f64,
    pub area_change: f64,
    pub area_change_se: f64,
    /// Year-1 stratum area the change is applied to
    pub y1_zm_area: f64,
    pub y1_zm_area_var: f64,
}

impl ChangeStats {
    /// Change statistics from matched samples and the full year-1 estimate
    ///
    /// `y1m` and `y2m` must hold the same sites in the same order.
    #[instrument(skip_all, fields(stratum = %y1.stratum, matched = y1m.ni()))]
    pub fn new(y1m: &Sample, y2m: &Sample, y1: &SampleStats) -> Result<Self> {
        if y1m.ni() != y2m.ni() {
            return Err(Error::size_mismatch(y1m.ni(), y2m.ni(), "matched samples"));
        }
        if let Some((a, b)) = y1m
            .sites()
            .iter()
            .zip(y2m.sites())
            .find(|(a, b)| a.id != b.id)
        {
            return Err(Error::InvalidInput(format!(
                "matched samples are misaligned: {} paired with {}",
                a.id, b.id
            )));
        }

        Self::from_areas(
            y1.stratum,
            &y1m.zm_areas(),
            &y2m.zm_areas(),
            y1.zm_area,
            y1.zm_area_var,
        )
    }

    /// Change statistics from paired area series
    ///
    /// `xs[i]` and `ys[i]` are the two years of the same site.
    pub fn from_areas(
        stratum: AnalysisStratum,
        xs: &[f64],
        ys: &[f64],
        y1_zm_area: f64,
        y1_zm_area_var: f64,
    ) -> Result<Self> {
        if xs.len() != ys.len() {
            return Err(Error::size_mismatch(xs.len(), ys.len(), "paired areas"));
        }
        let m = xs.len();

        let sum_x2 = sum_of_squares(xs);
        let sum_y2 = sum_of_squares(ys);
        let sum_xy: f64 = xs.iter().zip(ys).map(|(x, y)| x * y).sum();

        let slope = if sum_x2 == 0.0 { 0.0 } else { sum_xy / sum_x2 };
        let slope_se = slope_variance(sum_x2, sum_y2, sum_xy, m).sqrt();
        let change_prop = slope - 1.0;
        let area_change = change_prop * y1_zm_area;

        let raw_var = y1_zm_area_var * change_prop.powi(2) + (slope_se * y1_zm_area).powi(2)
            - y1_zm_area_var * slope_se.powi(2);
        if raw_var < -NEGATIVE_VARIANCE_TOLERANCE {
            warn!(%stratum, variance = raw_var, "Negative area-change variance clamped to zero");
        }
        let area_change_se = raw_var.max(0.0).sqrt();

        debug!(%stratum, slope, slope_se, area_change, "Stratum change");
        Ok(Self {
            stratum,
            site_count: m,
            sum_x2,
            sum_y2,
            sum_xy,
            slope,
            slope_se,
            change_prop,
            area_change,
            area_change_se,
            y1_zm_area,
            y1_zm_area_var,
        })
    }
}

/// Variance of the through-origin slope, zero when undefined
fn slope_variance(sum_x2: f64, sum_y2: f64, sum_xy: f64, m: usize) -> f64 {
    if m < 2 || sum_x2 == 0.0 {
        return 0.0;
    }
    let raw = ((sum_y2 - sum_xy * sum_xy / sum_x2) / (m as f64 - 1.0)) / sum_x2;
    let clamped = clamp_variance_noise(raw);
    if clamped < 0.0 {
        warn!(variance = raw, "Negative slope variance clamped to zero");
        return 0.0;
    }
    clamped
}
