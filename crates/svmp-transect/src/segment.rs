//! Along-track segment observations

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use svmp_core::is_null_depth;

/// Transect number within a site
pub type TransectId = u32;

/// One segment between two consecutive sample points on a transect
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    /// Depth relative to datum, negative below; [`svmp_core::NULL_DEPTH`] when missing
    pub depth: f64,
    /// Video quality was good enough to classify the bottom
    pub good_video: bool,
    /// Target vegetation was present
    pub vegetated: bool,
    /// Segment length
    pub length: f64,
}

impl Segment {
    pub fn new(depth: f64, good_video: bool, vegetated: bool, length: f64) -> Self {
        Self {
            depth,
            good_video,
            vegetated,
            length,
        }
    }

    /// Counts towards the sample length
    #[inline]
    pub fn is_sampled(&self) -> bool {
        self.good_video
    }

    /// Counts towards the vegetated length
    #[inline]
    pub fn is_vegetated_sample(&self) -> bool {
        self.good_video && self.vegetated
    }

    /// Depth, unless it is the null sentinel
    #[inline]
    pub fn known_depth(&self) -> Option<f64> {
        if is_null_depth(self.depth) {
            None
        } else {
            Some(self.depth)
        }
    }
}

/// A row of the per-segment observation table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SegmentObservation {
    pub transect_id: TransectId,
    /// Survey date of the segment, if recorded
    pub date: Option<NaiveDate>,
    pub depth: f64,
    pub video_quality: bool,
    pub vegetation: bool,
    pub segment_length: f64,
}

impl SegmentObservation {
    pub fn segment(&self) -> Segment {
        Segment::new(
            self.depth,
            self.video_quality,
            self.vegetation,
            self.segment_length,
        )
    }
}
