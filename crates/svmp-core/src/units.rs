//! Survey unit handling
//!
//! Site statistics tables record areas in square survey feet while the
//! soundwide estimates are reported in square meters.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Multiplier for US survey feet to meters
pub const SURVEY_FOOT_TO_METER: f64 = 0.304800609601219;

/// Conversion flag used in the site tables for survey feet to meters
pub const SF2M_FLAG: &str = "sf2m";

/// Linear unit a value was recorded in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Units {
    #[default]
    Meters,
    SurveyFeet,
}

impl Units {
    /// Factor that converts a length in these units to meters
    pub fn length_factor(self) -> f64 {
        match self {
            Units::Meters => 1.0,
            Units::SurveyFeet => SURVEY_FOOT_TO_METER,
        }
    }

    /// Factor for areas (length²)
    pub fn area_factor(self) -> f64 {
        self.length_factor().powi(2)
    }

    /// Factor for area variances (length⁴)
    pub fn area_variance_factor(self) -> f64 {
        self.length_factor().powi(4)
    }

    pub fn length_to_meters(self, value: f64) -> f64 {
        value * self.length_factor()
    }

    pub fn area_to_meters(self, value: f64) -> f64 {
        value * self.area_factor()
    }

    pub fn area_variance_to_meters(self, value: f64) -> f64 {
        value * self.area_variance_factor()
    }

    /// Parse a conversion flag as used in the source tables (`"sf2m"`)
    pub fn from_conversion_flag(flag: &str) -> Result<Self> {
        match flag {
            SF2M_FLAG => Ok(Units::SurveyFeet),
            other => Err(Error::UnsupportedConversion(other.to_string())),
        }
    }
}

impl FromStr for Units {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "m" | "meters" => Ok(Units::Meters),
            "ft" | "survey_feet" | SF2M_FLAG => Ok(Units::SurveyFeet),
            other => Err(Error::UnsupportedConversion(other.to_string())),
        }
    }
}

impl fmt::Display for Units {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Units::Meters => write!(f, "m"),
            Units::SurveyFeet => write!(f, "ft"),
        }
    }
}
