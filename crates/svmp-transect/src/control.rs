//! Per-transect control flags and the track-type allow-list

use crate::segment::TransectId;
use serde::{Deserialize, Serialize};

/// Track type used for area and variance statistics
pub const STRAIGHT_LINE_PERPENDICULAR: &str = "SLPR";

/// A row of the per-transect control table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransectControl {
    pub transect_id: TransectId,
    pub track_type: String,
    pub usable_for_max_depth: bool,
    pub usable_for_min_depth: bool,
}

impl TransectControl {
    pub fn new(
        transect_id: TransectId,
        track_type: impl Into<String>,
        usable_for_max_depth: bool,
        usable_for_min_depth: bool,
    ) -> Self {
        Self {
            transect_id,
            track_type: track_type.into(),
            usable_for_max_depth,
            usable_for_min_depth,
        }
    }
}

/// Track types that participate in area statistics
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackTypeFilter {
    allowed: Vec<String>,
}

impl TrackTypeFilter {
    pub fn new<I, S>(allowed: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            allowed: allowed.into_iter().map(Into::into).collect(),
        }
    }

    pub fn allows(&self, track_type: &str) -> bool {
        self.allowed.iter().any(|t| t == track_type)
    }

    pub fn allowed(&self) -> &[String] {
        &self.allowed
    }
}

impl Default for TrackTypeFilter {
    fn default() -> Self {
        Self::new([STRAIGHT_LINE_PERPENDICULAR])
    }
}
