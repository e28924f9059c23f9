//! Per-transect lengths, vegetated fraction and depth extremes
//!
//! Depths are recorded negative below datum, so the *maximum* depth of a
//! transect is its smallest numeric value and the *minimum* depth its largest.

use crate::control::{TrackTypeFilter, TransectControl};
use crate::segment::{Segment, SegmentObservation, TransectId};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use svmp_core::{Error, Result, NULL_DEPTH};
use tracing::{debug, instrument, warn};

/// Vegetated fraction of a transect, keeping zero effort apart from zero coverage
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Coverage {
    /// No good-quality video was collected
    NoEffort,
    /// Fraction of the sampled length that was vegetated
    Measured(f64),
}

impl Coverage {
    /// Fraction with the `0.0` fallback for zero effort
    pub fn fraction_or_zero(self) -> f64 {
        match self {
            Coverage::NoEffort => 0.0,
            Coverage::Measured(f) => f,
        }
    }

    pub fn is_no_effort(self) -> bool {
        matches!(self, Coverage::NoEffort)
    }
}

/// One survey track line at a site
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transect {
    pub id: TransectId,
    pub date: Option<NaiveDate>,
    pub segments: Vec<Segment>,
}

impl Transect {
    pub fn new(id: TransectId, segments: Vec<Segment>) -> Self {
        Self {
            id,
            date: None,
            segments,
        }
    }

    pub fn with_date(mut self, date: NaiveDate) -> Self {
        self.date = Some(date);
        self
    }

    /// Summed length of good-video segments
    pub fn sample_length(&self) -> f64 {
        self.segments
            .iter()
            .filter(|s| s.is_sampled())
            .map(|s| s.length)
            .sum()
    }

    /// Summed length of good-video, vegetated segments
    pub fn vegetation_length(&self) -> f64 {
        self.segments
            .iter()
            .filter(|s| s.is_vegetated_sample())
            .map(|s| s.length)
            .sum()
    }

    fn known_depths(&self, vegetation_only: bool) -> impl Iterator<Item = f64> + '_ {
        self.segments
            .iter()
            .filter(move |s| {
                if vegetation_only {
                    s.is_vegetated_sample()
                } else {
                    s.is_sampled()
                }
            })
            .filter_map(Segment::known_depth)
    }

    /// Deepest depth (numeric minimum), [`NULL_DEPTH`] if no segment qualifies
    pub fn max_depth(&self, vegetation_only: bool) -> f64 {
        self.known_depths(vegetation_only)
            .reduce(f64::min)
            .unwrap_or(NULL_DEPTH)
    }

    /// Shallowest depth (numeric maximum), [`NULL_DEPTH`] if no segment qualifies
    pub fn min_depth(&self, vegetation_only: bool) -> f64 {
        self.known_depths(vegetation_only)
            .reduce(f64::max)
            .unwrap_or(NULL_DEPTH)
    }

    pub fn coverage(&self) -> Coverage {
        let sample = self.sample_length();
        if sample > 0.0 {
            Coverage::Measured(self.vegetation_length() / sample)
        } else {
            Coverage::NoEffort
        }
    }

    /// `vegetation_length / sample_length`, or `0.0` when nothing was sampled
    pub fn vegetation_fraction(&self) -> f64 {
        self.coverage().fraction_or_zero()
    }
}

/// Derived statistics for one transect
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransectStats {
    pub id: TransectId,
    pub date: Option<NaiveDate>,
    pub sample_length: f64,
    pub vegetation_length: f64,
    pub coverage: Coverage,
    /// Deepest good-video depth on the whole track
    pub track_max_depth: f64,
    /// Shallowest good-video depth on the whole track
    pub track_min_depth: f64,
    /// Deepest vegetated depth
    pub veg_max_depth: f64,
    /// Shallowest vegetated depth
    pub veg_min_depth: f64,
    pub usable_for_max_depth: bool,
    pub usable_for_min_depth: bool,
}

impl TransectStats {
    pub fn from_transect(transect: &Transect, control: &TransectControl) -> Self {
        Self {
            id: transect.id,
            date: transect.date,
            sample_length: transect.sample_length(),
            vegetation_length: transect.vegetation_length(),
            coverage: transect.coverage(),
            track_max_depth: transect.max_depth(false),
            track_min_depth: transect.min_depth(false),
            veg_max_depth: transect.max_depth(true),
            veg_min_depth: transect.min_depth(true),
            usable_for_max_depth: control.usable_for_max_depth,
            usable_for_min_depth: control.usable_for_min_depth,
        }
    }

    pub fn vegetation_fraction(&self) -> f64 {
        self.coverage.fraction_or_zero()
    }
}

/// Result of aggregating one site's segment table
#[derive(Debug, Clone, Default)]
pub struct TransectSummary {
    /// Transects that passed the track-type filter, ordered by id
    pub transects: Vec<TransectStats>,
    /// Transects skipped because of their track type
    pub excluded_by_track_type: usize,
    /// Transects with segments but no control row
    pub without_control: usize,
}

impl TransectSummary {
    /// Date of the first included transect
    pub fn start_date(&self) -> Option<NaiveDate> {
        self.transects.iter().find_map(|t| t.date)
    }
}

/// Groups segment observations into transects and applies the control table
#[derive(Debug, Clone, Default)]
pub struct TransectAggregator {
    filter: TrackTypeFilter,
}

impl TransectAggregator {
    pub fn new(filter: TrackTypeFilter) -> Self {
        Self { filter }
    }

    pub fn filter(&self) -> &TrackTypeFilter {
        &self.filter
    }

    /// Group segments by transect id, preserving along-track order
    ///
    /// A transect takes the date of its last dated segment.
    pub fn group(&self, observations: &[SegmentObservation]) -> BTreeMap<TransectId, Transect> {
        let mut transects: BTreeMap<TransectId, Transect> = BTreeMap::new();
        for obs in observations {
            let transect = transects
                .entry(obs.transect_id)
                .or_insert_with(|| Transect::new(obs.transect_id, Vec::new()));
            transect.segments.push(obs.segment());
            if obs.date.is_some() {
                transect.date = obs.date;
            }
        }
        transects
    }

    /// Compute statistics for every allowed transect of a site
    ///
    /// Transects are driven by the control table. A control row of an allowed
    /// track type with no segment data is an error: the transect most likely
    /// lies outside the sample polygon. Each transect may have only one
    /// control row.
    #[instrument(
        skip(self, observations, controls),
        fields(n_segments = observations.len(), n_controls = controls.len())
    )]
    pub fn aggregate(
        &self,
        observations: &[SegmentObservation],
        controls: &[TransectControl],
    ) -> Result<TransectSummary> {
        for obs in observations {
            if !(obs.segment_length.is_finite() && obs.segment_length >= 0.0) {
                return Err(Error::InvalidInput(format!(
                    "transect {} has an invalid segment length {}",
                    obs.transect_id, obs.segment_length
                )));
            }
        }

        let grouped = self.group(observations);
        let mut summary = TransectSummary::default();

        let mut controls: Vec<&TransectControl> = controls.iter().collect();
        controls.sort_by_key(|c| c.transect_id);
        if let Some(pair) = controls
            .windows(2)
            .find(|w| w[0].transect_id == w[1].transect_id)
        {
            return Err(Error::InvalidInput(format!(
                "transect {} has more than one control row",
                pair[0].transect_id
            )));
        }

        for control in &controls {
            if !self.filter.allows(&control.track_type) {
                summary.excluded_by_track_type += 1;
                continue;
            }
            let transect = grouped.get(&control.transect_id).ok_or_else(|| {
                Error::InvalidInput(format!(
                    "No transect data retrieved for transect {}, track type {}; \
                     the transect may be located outside the sample polygon",
                    control.transect_id, control.track_type
                ))
            })?;
            let stats = TransectStats::from_transect(transect, control);
            if stats.coverage.is_no_effort() {
                warn!(transect = stats.id, "transect has no good-quality video");
            }
            summary.transects.push(stats);
        }

        summary.without_control = grouped
            .keys()
            .filter(|id| !controls.iter().any(|c| c.transect_id == **id))
            .count();

        if summary.excluded_by_track_type > 0 || summary.without_control > 0 {
            warn!(
                excluded = summary.excluded_by_track_type,
                without_control = summary.without_control,
                allowed = ?self.filter.allowed(),
                "transects left out of area statistics"
            );
        }
        debug!(included = summary.transects.len(), "aggregated transects");

        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn transect() -> Transect {
        Transect::new(
            1,
            vec![
                Segment::new(-2.0, true, false, 10.0),
                Segment::new(-4.5, true, true, 20.0),
                Segment::new(-7.0, false, true, 15.0),
                Segment::new(NULL_DEPTH, true, true, 5.0),
                Segment::new(-3.0, true, true, 5.0),
            ],
        )
    }

    #[test]
    fn test_lengths_exclude_bad_video() {
        let t = transect();
        assert_relative_eq!(t.sample_length(), 40.0);
        assert_relative_eq!(t.vegetation_length(), 30.0);
        assert_relative_eq!(t.vegetation_fraction(), 0.75);
    }

    #[test]
    fn test_depth_extremes_are_inverted() {
        let t = transect();
        // Bad-video segment at -7.0 and the null sentinel never count
        assert_eq!(t.max_depth(false), -4.5);
        assert_eq!(t.min_depth(false), -2.0);
        assert_eq!(t.max_depth(true), -4.5);
        assert_eq!(t.min_depth(true), -3.0);
    }

    #[test]
    fn test_depth_sentinel_when_nothing_qualifies() {
        let t = Transect::new(
            2,
            vec![
                Segment::new(NULL_DEPTH, true, true, 3.0),
                Segment::new(-5.0, true, false, 3.0),
            ],
        );
        assert_eq!(t.max_depth(true), NULL_DEPTH);
        assert_eq!(t.min_depth(true), NULL_DEPTH);
        assert_eq!(t.max_depth(false), -5.0);
    }

    #[test]
    fn test_zero_effort_fraction() {
        let t = Transect::new(3, vec![Segment::new(-1.0, false, true, 12.0)]);
        assert_eq!(t.sample_length(), 0.0);
        assert_eq!(t.vegetation_fraction(), 0.0);
        assert_eq!(t.coverage(), Coverage::NoEffort);

        let t = Transect::new(4, vec![Segment::new(-1.0, true, false, 12.0)]);
        assert_eq!(t.coverage(), Coverage::Measured(0.0));
    }

    fn obs(id: TransectId, depth: f64, veg: bool, len: f64) -> SegmentObservation {
        SegmentObservation {
            transect_id: id,
            date: NaiveDate::from_ymd_opt(2007, 7, 12),
            depth,
            video_quality: true,
            vegetation: veg,
            segment_length: len,
        }
    }

    #[test]
    fn test_aggregate_filters_track_types() {
        let observations = vec![
            obs(1, -2.0, true, 10.0),
            obs(1, -3.0, false, 10.0),
            obs(2, -2.5, true, 8.0),
            obs(3, -1.0, true, 4.0),
            obs(9, -1.0, true, 4.0),
        ];
        let controls = vec![
            TransectControl::new(2, "SLPR", true, false),
            TransectControl::new(1, "SLPR", true, true),
            TransectControl::new(3, "SLPAR", false, false),
        ];

        let summary = TransectAggregator::default()
            .aggregate(&observations, &controls)
            .unwrap();

        assert_eq!(summary.transects.len(), 2);
        assert_eq!(summary.transects[0].id, 1);
        assert_eq!(summary.transects[1].id, 2);
        assert_eq!(summary.excluded_by_track_type, 1);
        assert_eq!(summary.without_control, 1);
        assert_relative_eq!(summary.transects[0].vegetation_fraction(), 0.5);
        assert!(summary.transects[1].usable_for_max_depth);
        assert!(!summary.transects[1].usable_for_min_depth);
        assert_eq!(summary.start_date(), NaiveDate::from_ymd_opt(2007, 7, 12));
    }

    #[test]
    fn test_aggregate_missing_transect_data() {
        let observations = vec![obs(1, -2.0, true, 10.0)];
        let controls = vec![TransectControl::new(5, "SLPR", true, true)];
        let err = TransectAggregator::default()
            .aggregate(&observations, &controls)
            .unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
    }

    #[test]
    fn test_aggregate_rejects_negative_length() {
        let observations = vec![obs(1, -2.0, true, -1.0)];
        let controls = vec![TransectControl::new(1, "SLPR", true, true)];
        assert!(TransectAggregator::default()
            .aggregate(&observations, &controls)
            .is_err());
    }

    #[test]
    fn test_aggregate_rejects_duplicate_controls() {
        let observations = vec![obs(1, -2.0, true, 10.0), obs(2, -3.0, false, 10.0)];
        let controls = vec![
            TransectControl::new(1, "SLPR", true, true),
            TransectControl::new(2, "SLPR", true, true),
            TransectControl::new(1, "SLPR", true, true),
        ];
        let err = TransectAggregator::default()
            .aggregate(&observations, &controls)
            .unwrap_err();
        assert!(matches!(err, Error::InvalidInput(ref msg) if msg.contains("transect 1")));
    }
}
