//! Stratum-level area estimates from a sample of sites

use crate::sample::Sample;
use crate::stratum::{AnalysisStratum, Extrapolation, StratumDesign};
use serde::{Deserialize, Serialize};
use svmp_core::{coefficient_of_variation, mean};
use tracing::{debug, instrument, warn};

/// Extrapolated area and variance for one stratum in one year
///
/// `aij` and `ratio` are only defined for area-extrapolated strata.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SampleStats {
    pub stratum: AnalysisStratum,
    pub extrapolation: Extrapolation,
    pub ni: usize,
    pub mean_zm_area: f64,
    /// Sample variance of the site areas (`N - 1` denominator)
    pub variance: f64,
    pub aij: Option<f64>,
    pub ratio: Option<f64>,
    pub zm_area: f64,
    pub zm_area_var: f64,
    pub se: f64,
    pub cv: f64,
}

impl SampleStats {
    #[instrument(skip(sample), fields(stratum = %sample.stratum().analysis(), ni = sample.ni()))]
    pub fn new(sample: &Sample) -> Self {
        let areas = sample.zm_areas();
        let vars = sample.zm_vars();
        let ni = areas.len();
        let mean_zm_area = mean(&areas).unwrap_or(0.0);
        let variance = site_variance(&areas, mean_zm_area);

        let mut aij = None;
        let mut ratio = None;

        let (zm_area, zm_area_var) = match sample.stratum().design() {
            StratumDesign::Census => (areas.iter().sum(), vars.iter().sum()),
            StratumDesign::Area { ni: pop, a2 } => {
                let sample_areas = sample.sample_areas();
                let total_sample_area: f64 = sample_areas.iter().sum();
                aij = Some(total_sample_area);
                warn_if_oversampled(ni, pop);

                if ni == 0 || total_sample_area <= 0.0 {
                    if ni > 0 {
                        warn!("Sample polygons have zero total area; estimate set to zero");
                    }
                    (0.0, 0.0)
                } else {
                    let r = areas.iter().sum::<f64>() / total_sample_area;
                    ratio = Some(r);
                    let area = r * a2;
                    let var = area_extrapolation_variance(&areas, &vars, &sample_areas, r, pop);
                    (area, var)
                }
            }
            StratumDesign::Linear { ni: pop, lt, ln } => {
                warn_if_oversampled(ni, pop);
                if ni == 0 {
                    (0.0, 0.0)
                } else {
                    let n = ni as f64;
                    let pop_n = pop as f64;
                    let scale = lt / ln;
                    let area = scale * mean_zm_area * pop_n;
                    let sampling = pop_n * pop_n * (1.0 - n / pop_n) * variance / n;
                    let measurement = (pop_n / n) * vars.iter().sum::<f64>();
                    (area, scale * scale * (sampling + measurement))
                }
            }
        };

        let se = zm_area_var.max(0.0).sqrt();
        let stats = Self {
            stratum: sample.stratum().analysis(),
            extrapolation: sample.stratum().extrapolation(),
            ni,
            mean_zm_area,
            variance,
            aij,
            ratio,
            zm_area,
            zm_area_var,
            se,
            cv: coefficient_of_variation(se, zm_area),
        };
        debug!(zm_area = stats.zm_area, se = stats.se, "Stratum estimate");
        stats
    }
}

/// Sample variance of site areas, zero when fewer than two sites
fn site_variance(areas: &[f64], mean: f64) -> f64 {
    if areas.len() < 2 {
        return 0.0;
    }
    let ss: f64 = areas.iter().map(|&x| (x - mean).powi(2)).sum();
    ss / (areas.len() as f64 - 1.0)
}

/// Ratio-estimator variance for area extrapolation
///
/// `Ni² (1 - ni/Ni) Σ(x - a·R)² / (ni(ni - 1)) + Ni Σvar / ni`
fn area_extrapolation_variance(
    areas: &[f64],
    vars: &[f64],
    sample_areas: &[f64],
    ratio: f64,
    population: usize,
) -> f64 {
    let n = areas.len() as f64;
    let pop_n = population as f64;

    let sampling = if areas.len() < 2 {
        0.0
    } else {
        let residual: f64 = areas
            .iter()
            .zip(sample_areas)
            .map(|(&x, &a)| (x - a * ratio).powi(2))
            .sum();
        pop_n * pop_n * (1.0 - n / pop_n) * residual / (n * (n - 1.0))
    };
    let measurement = pop_n * vars.iter().sum::<f64>() / n;
    sampling + measurement
}

fn warn_if_oversampled(ni: usize, population: usize) {
    if ni > population {
        warn!(ni, population, "More sampled sites than the stratum population");
    }
}
