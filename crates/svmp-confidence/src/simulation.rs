//! Sampling and measurement-error perturbations of site data

use rand::Rng;
use rand_distr::StandardNormal;
use svmp_core::{Error, Result};
use svmp_strata::Site;

/// Default cap on redraws when a simulated area comes out negative
pub const DEFAULT_MAX_REDRAWS: usize = 10_000;

/// Resample sites with replacement, keeping the sample size
pub fn bootstrap<R: Rng + ?Sized>(sites: &[Site], rng: &mut R) -> Vec<Site> {
    let n = sites.len();
    (0..n).map(|_| sites[rng.gen_range(0..n)].clone()).collect()
}

/// Draw `area + sqrt(variance)·z` with `z ~ N(0, 1)`, redrawing until non-negative
///
/// A site with no variance keeps its area (floored at zero).
pub fn simulate_area<R: Rng + ?Sized>(
    area: f64,
    variance: f64,
    rng: &mut R,
    max_redraws: usize,
) -> Result<f64> {
    if variance <= 0.0 {
        return Ok(area.max(0.0));
    }
    let se = variance.sqrt();
    for _ in 0..=max_redraws {
        let z: f64 = rng.sample(StandardNormal);
        let simulated = area + se * z;
        if simulated >= 0.0 {
            return Ok(simulated);
        }
    }
    Err(Error::Computation(format!(
        "no non-negative draw for area {area} (variance {variance}) after {max_redraws} redraws"
    )))
}

/// Perturb every site's area by its measurement error
pub fn measurement_error<R: Rng + ?Sized>(
    sites: &[Site],
    rng: &mut R,
    max_redraws: usize,
) -> Result<Vec<Site>> {
    sites
        .iter()
        .map(|site| {
            let zm_area = simulate_area(site.zm_area, site.zm_area_var, rng, max_redraws)
                .map_err(|e| Error::Computation(format!("site {}: {e}", site.id)))?;
            Ok(Site {
                zm_area,
                ..site.clone()
            })
        })
        .collect()
}

/// Year-2 data for each drawn year-1 site, in draw order
///
/// Duplicated draws yield duplicated matches; ids absent from `year2` are skipped.
pub fn match_sites(drawn: &[Site], year2: &[Site]) -> Vec<Site> {
    drawn
        .iter()
        .filter_map(|site| year2.iter().find(|s| s.id == site.id).cloned())
        .collect()
}
