//! Monte Carlo confidence interval for the soundwide proportional change
//!
//! Each iteration perturbs the survey data and recomputes the soundwide
//! change:
//!
//! 1. strata with at least `min_bootstrap_sites` year-1 sites that are not a
//!    census are bootstrapped (year-1 sample and year-1 matched sample; year-2
//!    matched data follow the drawn site ids)
//! 2. every site area gets simulated measurement error
//! 3. stratum estimates, stratum changes and the soundwide change are
//!    recomputed and the proportional change recorded
//!
//! The interval half-width is the mean-centred deviation rank of the recorded
//! values (see [`deviation_rank_half_width`]).

use crate::simulation::{bootstrap, match_sites, measurement_error, DEFAULT_MAX_REDRAWS};
use crate::types::{ConfidenceInterval, ConfidenceLevel};
use rand::prelude::*;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use svmp_change::{matched_samples, ChangeStats, ChangeStatsTotal};
use svmp_core::{Error, Result};
use svmp_strata::{AnnualEstimate, Sample, SampleStats};
use tracing::{debug, info, instrument};

/// Default number of Monte Carlo iterations
pub const DEFAULT_ITERATIONS: usize = 20_000;

/// Smallest year-1 sample that is bootstrapped
pub const DEFAULT_MIN_BOOTSTRAP_SITES: usize = 8;

/// Validated simulation settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonteCarloConfig {
    pub iterations: usize,
    pub confidence_level: ConfidenceLevel,
    pub min_bootstrap_sites: usize,
    pub seed: Option<u64>,
    pub max_redraws: usize,
    pub parallel: bool,
}

impl MonteCarloConfig {
    pub fn builder() -> MonteCarloConfigBuilder {
        MonteCarloConfigBuilder::default()
    }
}

impl Default for MonteCarloConfig {
    fn default() -> Self {
        Self {
            iterations: DEFAULT_ITERATIONS,
            confidence_level: ConfidenceLevel::NINETY_FIVE,
            min_bootstrap_sites: DEFAULT_MIN_BOOTSTRAP_SITES,
            seed: None,
            max_redraws: DEFAULT_MAX_REDRAWS,
            parallel: true,
        }
    }
}

/// Builder for [`MonteCarloConfig`]
#[derive(Debug, Clone)]
pub struct MonteCarloConfigBuilder {
    iterations: usize,
    confidence_level: f64,
    min_bootstrap_sites: usize,
    seed: Option<u64>,
    max_redraws: usize,
    parallel: bool,
}

impl Default for MonteCarloConfigBuilder {
    fn default() -> Self {
        Self {
            iterations: DEFAULT_ITERATIONS,
            confidence_level: 0.95,
            min_bootstrap_sites: DEFAULT_MIN_BOOTSTRAP_SITES,
            seed: None,
            max_redraws: DEFAULT_MAX_REDRAWS,
            parallel: true,
        }
    }
}

impl MonteCarloConfigBuilder {
    pub fn with_iterations(mut self, iterations: usize) -> Self {
        self.iterations = iterations;
        self
    }

    pub fn with_confidence_level(mut self, confidence_level: f64) -> Self {
        self.confidence_level = confidence_level;
        self
    }

    pub fn with_min_bootstrap_sites(mut self, sites: usize) -> Self {
        self.min_bootstrap_sites = sites;
        self
    }

    /// Set random seed for reproducibility
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_max_redraws(mut self, max_redraws: usize) -> Self {
        self.max_redraws = max_redraws;
        self
    }

    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn build(self) -> Result<MonteCarloConfig> {
        if self.iterations < 2 {
            return Err(Error::InvalidParameter(format!(
                "Monte Carlo needs at least 2 iterations, got {}",
                self.iterations
            )));
        }
        Ok(MonteCarloConfig {
            iterations: self.iterations,
            confidence_level: ConfidenceLevel::try_from(self.confidence_level)?,
            min_bootstrap_sites: self.min_bootstrap_sites,
            seed: self.seed,
            max_redraws: self.max_redraws,
            parallel: self.parallel,
        })
    }
}

/// One stratum's input to the change simulation
///
/// `y1` holds every site sampled in year 1; `y1m` and `y2m` the sites sampled
/// in both years, aligned by position.
#[derive(Debug, Clone)]
pub struct StratumChangeData {
    pub y1: Sample,
    pub y1m: Sample,
    pub y2m: Sample,
}

impl StratumChangeData {
    pub fn new(y1: Sample, y1m: Sample, y2m: Sample) -> Self {
        Self { y1, y1m, y2m }
    }

    /// Build from the full samples of both years
    pub fn from_years(y1: Sample, y2: &Sample) -> Result<Self> {
        let (y1m, y2m) = matched_samples(&y1, y2)?;
        Ok(Self { y1, y1m, y2m })
    }

    /// Unperturbed stratum estimate and change
    pub fn change(&self) -> Result<(SampleStats, ChangeStats)> {
        let y1 = SampleStats::new(&self.y1);
        let change = ChangeStats::new(&self.y1m, &self.y2m, &y1)?;
        Ok((y1, change))
    }
}

/// Soundwide change of a set of strata
pub fn soundwide_change(strata: &[StratumChangeData]) -> Result<ChangeStatsTotal> {
    let mut y1_stats = Vec::with_capacity(strata.len());
    let mut changes = Vec::with_capacity(strata.len());
    for data in strata {
        let (y1, change) = data.change()?;
        y1_stats.push(y1);
        changes.push(change);
    }
    ChangeStatsTotal::new(&changes, &AnnualEstimate::new(&y1_stats))
}

/// Outcome of a simulation run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonteCarloResult {
    /// Proportional change of every iteration, in iteration order
    pub proportion_changes: Vec<f64>,
    pub mean: f64,
    /// Deviation-rank half-width
    pub half_width: f64,
    /// `mean ± half_width`
    pub interval: ConfidenceInterval,
    pub seed: u64,
}

impl MonteCarloResult {
    pub fn iterations(&self) -> usize {
        self.proportion_changes.len()
    }
}

/// Runs the perturb-and-recompute loop
#[derive(Debug, Clone, Default)]
pub struct MonteCarloSimulator {
    config: MonteCarloConfig,
}

impl MonteCarloSimulator {
    pub fn new(config: MonteCarloConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &MonteCarloConfig {
        &self.config
    }

    #[instrument(
        skip(self, strata),
        fields(strata = strata.len(), iterations = self.config.iterations)
    )]
    pub fn run(&self, strata: &[StratumChangeData]) -> Result<MonteCarloResult> {
        let seed = self.config.seed.unwrap_or_else(|| thread_rng().gen());
        info!(
            seed,
            level = %self.config.confidence_level,
            parallel = self.config.parallel,
            "Starting Monte Carlo run"
        );

        let iteration = |i: usize| -> Result<f64> {
            let mut rng = StdRng::seed_from_u64(seed.wrapping_add(i as u64));
            self.iterate(strata, &mut rng)
        };
        let proportion_changes: Vec<f64> = if self.config.parallel {
            (0..self.config.iterations)
                .into_par_iter()
                .map(iteration)
                .collect::<Result<_>>()?
        } else {
            (0..self.config.iterations)
                .map(iteration)
                .collect::<Result<_>>()?
        };

        let level = self.config.confidence_level.value();
        let mean = proportion_changes.iter().sum::<f64>() / proportion_changes.len() as f64;
        let half_width = deviation_rank_half_width(&proportion_changes, level)?;
        let interval = ConfidenceInterval::symmetric(mean, half_width, level);
        info!(%interval, half_width, "Monte Carlo run finished");

        Ok(MonteCarloResult {
            proportion_changes,
            mean,
            half_width,
            interval,
            seed,
        })
    }

    /// One perturbed recomputation of the soundwide proportional change
    fn iterate<R: Rng>(&self, strata: &[StratumChangeData], rng: &mut R) -> Result<f64> {
        let max_redraws = self.config.max_redraws;
        let mut perturbed = Vec::with_capacity(strata.len());

        for data in strata {
            let census = data.y1.stratum().analysis().is_census();
            let (y1, y1m, y2m) = if data.y1.ni() >= self.config.min_bootstrap_sites && !census {
                let y1 = bootstrap(data.y1.sites(), rng);
                let y1m = bootstrap(data.y1m.sites(), rng);
                let y2m = match_sites(&y1m, data.y2m.sites());
                (y1, y1m, y2m)
            } else {
                (
                    data.y1.sites().to_vec(),
                    data.y1m.sites().to_vec(),
                    data.y2m.sites().to_vec(),
                )
            };

            perturbed.push(StratumChangeData::new(
                data.y1.with_sites(measurement_error(&y1, rng, max_redraws)?)?,
                data.y1m.with_sites(measurement_error(&y1m, rng, max_redraws)?)?,
                data.y2m.with_sites(measurement_error(&y2m, rng, max_redraws)?)?,
            ));
        }

        let total = soundwide_change(&perturbed)?;
        Ok(total.change_prop)
    }
}

/// Half-width of the mean-centred deviation-rank interval
///
/// Absolute deviations from the mean are sorted; with `idx = floor(n·level)`
/// the half-width is the average of the deviations at `idx - 1` and `idx`.
/// `idx` is clamped to `[1, n - 1]`.
pub fn deviation_rank_half_width(values: &[f64], confidence_level: f64) -> Result<f64> {
    let n = values.len();
    if n < 2 {
        return Err(Error::InsufficientData {
            expected: 2,
            actual: n,
        });
    }
    let level = ConfidenceLevel::new(confidence_level)?;
    if values.iter().any(|v| !v.is_finite()) {
        return Err(Error::non_finite("Monte Carlo values"));
    }

    let mean = values.iter().sum::<f64>() / n as f64;
    let mut deviations: Vec<f64> = values.iter().map(|v| (mean - v).abs()).collect();
    deviations.sort_by(f64::total_cmp);

    let idx = ((n as f64 * level.value()) as usize).clamp(1, n - 1);
    debug!(n, idx, "Deviation-rank index");
    Ok((deviations[idx - 1] + deviations[idx]) / 2.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use svmp_strata::{AnalysisStratum, Site, Stratum};

    #[test]
    fn test_config_defaults_and_validation() {
        let config = MonteCarloConfig::builder().build().unwrap();
        assert_eq!(config, MonteCarloConfig::default());
        assert_eq!(config.iterations, 20_000);
        assert_eq!(config.min_bootstrap_sites, 8);

        let config = MonteCarloConfig::builder()
            .with_iterations(100)
            .with_confidence_level(0.9)
            .with_seed(42)
            .with_parallel(false)
            .build()
            .unwrap();
        assert_eq!(config.iterations, 100);
        assert_eq!(config.seed, Some(42));
        assert_eq!(config.confidence_level.value(), 0.9);

        assert!(MonteCarloConfig::builder().with_iterations(1).build().is_err());
        assert!(MonteCarloConfig::builder()
            .with_confidence_level(1.0)
            .build()
            .is_err());
    }

    #[test]
    fn test_deviation_rank_half_width() {
        let values = [0.0, 1.0, -1.0, 2.0, -2.0, 3.0, -3.0, 4.0, -4.0, 5.0];
        let mean: f64 = values.iter().sum::<f64>() / 10.0;
        assert_relative_eq!(mean, 0.5);
        // deviations from 0.5: 0.5,0.5,1.5,1.5,2.5,2.5,3.5,3.5,4.5,4.5
        // idx = floor(10 × 0.8) = 8 → (3.5 + 4.5) / 2
        assert_relative_eq!(deviation_rank_half_width(&values, 0.8).unwrap(), 4.0);
        // idx = floor(10 × 0.95) = 9 → (4.5 + 4.5) / 2
        assert_relative_eq!(deviation_rank_half_width(&values, 0.95).unwrap(), 4.5);
    }

    #[test]
    fn test_deviation_rank_edge_cases() {
        assert!(matches!(
            deviation_rank_half_width(&[1.0], 0.95),
            Err(Error::InsufficientData { .. })
        ));
        // idx clamps to 1 for tiny levels
        assert_relative_eq!(deviation_rank_half_width(&[1.0, 3.0], 0.1).unwrap(), 1.0);
        assert!(deviation_rank_half_width(&[1.0, f64::NAN], 0.95).is_err());
        assert!(deviation_rank_half_width(&[1.0, 2.0], 0.0).is_err());
    }

    fn fringe_data(n: usize, growth: f64) -> StratumChangeData {
        let length = 4000.0 * n as f64;
        let stratum = Stratum::linear(AnalysisStratum::Fringe, 4 * n, length, length).unwrap();
        let y1: Vec<Site> = (0..n)
            .map(|i| Site::new(format!("cps{i:04}"), 100.0 + 10.0 * i as f64, 25.0))
            .collect();
        let y2: Vec<Site> = y1
            .iter()
            .map(|s| Site::new(s.id.clone(), s.zm_area * growth, 25.0))
            .collect();
        StratumChangeData::from_years(
            Sample::new(stratum, y1).unwrap(),
            &Sample::new(stratum, y2).unwrap(),
        )
        .unwrap()
    }

    #[test]
    fn test_serial_and_parallel_runs_agree() {
        let strata = vec![fringe_data(10, 1.1)];
        let build = |parallel| {
            MonteCarloConfig::builder()
                .with_iterations(64)
                .with_seed(1234)
                .with_parallel(parallel)
                .build()
                .unwrap()
        };
        let serial = MonteCarloSimulator::new(build(false)).run(&strata).unwrap();
        let parallel = MonteCarloSimulator::new(build(true)).run(&strata).unwrap();
        assert_eq!(serial.proportion_changes, parallel.proportion_changes);
        assert_eq!(serial.half_width, parallel.half_width);
        assert_eq!(serial.seed, 1234);
        assert_eq!(serial.iterations(), 64);
    }

    #[test]
    fn test_simulation_centres_on_observed_change() {
        let strata = vec![fringe_data(12, 1.2)];
        let observed = soundwide_change(&strata).unwrap().change_prop;
        assert_relative_eq!(observed, 0.2, max_relative = 1e-9);

        let config = MonteCarloConfig::builder()
            .with_iterations(500)
            .with_seed(99)
            .build()
            .unwrap();
        let result = MonteCarloSimulator::new(config).run(&strata).unwrap();
        assert!((result.mean - observed).abs() < 0.05, "mean {}", result.mean);
        assert!(result.half_width > 0.0);
        assert!(result.interval.contains(observed));
    }

    #[test]
    fn test_census_without_measurement_error_is_exact() {
        let y1 = Sample::new(
            Stratum::core(),
            (0..10).map(|i| Site::new(format!("core{i:03}"), 50.0, 0.0)).collect(),
        )
        .unwrap();
        let y2 = y1
            .with_sites(y1.sites().iter().map(|s| Site::new(s.id.clone(), 40.0, 0.0)).collect())
            .unwrap();
        let strata = vec![StratumChangeData::from_years(y1, &y2).unwrap()];
        let config = MonteCarloConfig::builder()
            .with_iterations(10)
            .with_seed(1)
            .build()
            .unwrap();
        let result = MonteCarloSimulator::new(config).run(&strata).unwrap();
        assert!(result
            .proportion_changes
            .iter()
            .all(|&p| (p + 0.2).abs() < 1e-12));
        assert!(result.half_width < 1e-12);
    }
}
