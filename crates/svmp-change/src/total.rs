//! Soundwide change across all strata

use crate::change::ChangeStats;
use serde::{Deserialize, Serialize};
use svmp_core::{Error, Result};
use svmp_strata::AnnualEstimate;
use tracing::{debug, instrument};

/// Soundwide area change and proportional change
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ChangeStatsTotal {
    pub y1_zm_area: f64,
    pub area_change: f64,
    pub area_change_se: f64,
    pub change_prop: f64,
    pub change_prop_se: f64,
}

impl ChangeStatsTotal {
    /// Combine per-stratum changes with the year-1 soundwide estimate
    ///
    /// `y1_annual` must cover the same strata as `changes`, in the same order.
    #[instrument(skip_all, fields(strata = changes.len()))]
    pub fn new(changes: &[ChangeStats], y1_annual: &AnnualEstimate) -> Result<Self> {
        if changes.len() != y1_annual.stratum_count() {
            return Err(Error::size_mismatch(
                y1_annual.stratum_count(),
                changes.len(),
                "strata in the year-1 estimate",
            ));
        }
        if let Some((change, stratum)) = changes
            .iter()
            .zip(&y1_annual.strata)
            .find(|(c, s)| c.stratum != **s)
        {
            return Err(Error::InvalidInput(format!(
                "change for stratum '{}' paired with year-1 stratum '{}'",
                change.stratum, stratum
            )));
        }

        let y1 = y1_annual.zm_area;
        let area_change: f64 = changes.iter().map(|c| c.area_change).sum();
        let area_change_se = changes
            .iter()
            .map(|c| c.area_change_se.powi(2))
            .sum::<f64>()
            .sqrt();

        let (change_prop, change_prop_se) = if y1 == 0.0 {
            (0.0, 0.0)
        } else {
            let slope_term: f64 = changes
                .iter()
                .map(|c| (c.slope_se * c.y1_zm_area).powi(2))
                .sum::<f64>()
                / y1.powi(2);
            let area_term: f64 = changes
                .iter()
                .map(|c| c.y1_zm_area_var * (c.change_prop * y1 - area_change).powi(2))
                .sum::<f64>()
                / y1.powi(4);
            (area_change / y1, (slope_term + area_term).max(0.0).sqrt())
        };

        debug!(area_change, change_prop, change_prop_se, "Soundwide change");
        Ok(Self {
            y1_zm_area: y1,
            area_change,
            area_change_se,
            change_prop,
            change_prop_se,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use svmp_strata::{AnalysisStratum, Sample, SampleStats, Site, Stratum};

    fn y1_stats(analysis: AnalysisStratum, area: f64, var: f64) -> SampleStats {
        let site = Site::new("s", area, var);
        SampleStats::new(&Sample::new(Stratum::census(analysis), vec![site]).unwrap())
    }

    #[test]
    fn test_total_combines_strata() {
        let a = ChangeStats::from_areas(
            AnalysisStratum::Core,
            &[10.0, 20.0],
            &[11.0, 22.0],
            300.0,
            9.0,
        )
        .unwrap();
        let b = ChangeStats::from_areas(
            AnalysisStratum::Fringe,
            &[10.0, 20.0, 30.0],
            &[12.0, 22.0, 33.0],
            100.0,
            4.0,
        )
        .unwrap();
        let annual = AnnualEstimate::new(&[
            y1_stats(AnalysisStratum::Core, 300.0, 9.0),
            y1_stats(AnalysisStratum::Fringe, 100.0, 4.0),
        ]);
        let total = ChangeStatsTotal::new(&[a, b], &annual).unwrap();

        assert_relative_eq!(total.y1_zm_area, 400.0);
        assert_relative_eq!(total.area_change, a.area_change + b.area_change);
        assert_relative_eq!(
            total.area_change_se,
            (a.area_change_se.powi(2) + b.area_change_se.powi(2)).sqrt()
        );
        assert_relative_eq!(total.change_prop, total.area_change / 400.0);

        let y1: f64 = 400.0;
        let term1 = ((a.slope_se * 300.0).powi(2) + (b.slope_se * 100.0).powi(2)) / y1.powi(2);
        let term2 = (9.0 * (a.change_prop * y1 - total.area_change).powi(2)
            + 4.0 * (b.change_prop * y1 - total.area_change).powi(2))
            / y1.powi(4);
        assert_relative_eq!(
            total.change_prop_se,
            (term1 + term2).sqrt(),
            max_relative = 1e-12
        );
    }

    #[test]
    fn test_uniform_change_has_no_area_term() {
        // Every stratum grew 10% exactly: slope SE and the deviation terms vanish
        let a = ChangeStats::from_areas(
            AnalysisStratum::Core,
            &[10.0, 20.0],
            &[11.0, 22.0],
            300.0,
            9.0,
        )
        .unwrap();
        let b = ChangeStats::from_areas(AnalysisStratum::Flats, &[5.0], &[5.5], 100.0, 4.0)
            .unwrap();
        let annual = AnnualEstimate::new(&[
            y1_stats(AnalysisStratum::Core, 300.0, 9.0),
            y1_stats(AnalysisStratum::Flats, 100.0, 4.0),
        ]);
        let total = ChangeStatsTotal::new(&[a, b], &annual).unwrap();
        assert_relative_eq!(total.change_prop, 0.1, max_relative = 1e-12);
        assert!(total.change_prop_se.abs() < 1e-9);
    }

    #[test]
    fn test_zero_year_one_area() {
        let a = ChangeStats::from_areas(AnalysisStratum::Core, &[], &[], 0.0, 0.0).unwrap();
        let annual = AnnualEstimate::new(&[y1_stats(AnalysisStratum::Core, 0.0, 0.0)]);
        let total = ChangeStatsTotal::new(&[a], &annual).unwrap();
        assert_eq!(total.change_prop, 0.0);
        assert_eq!(total.change_prop_se, 0.0);
    }

    #[test]
    fn test_stratum_count_mismatch() {
        let annual = AnnualEstimate::new(&[y1_stats(AnalysisStratum::Core, 1.0, 0.0)]);
        assert!(ChangeStatsTotal::new(&[], &annual).is_err());
    }

    #[test]
    fn test_strata_must_line_up() {
        let core = ChangeStats::from_areas(AnalysisStratum::Core, &[10.0], &[11.0], 300.0, 9.0)
            .unwrap();
        let fringe =
            ChangeStats::from_areas(AnalysisStratum::Fringe, &[10.0], &[12.0], 100.0, 4.0)
                .unwrap();
        let annual = AnnualEstimate::new(&[
            y1_stats(AnalysisStratum::Core, 300.0, 9.0),
            y1_stats(AnalysisStratum::Fringe, 100.0, 4.0),
        ]);
        assert!(ChangeStatsTotal::new(&[core, fringe], &annual).is_ok());

        let err = ChangeStatsTotal::new(&[fringe, core], &annual).unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
    }
}
