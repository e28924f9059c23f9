//! Analysis strata and their sampling-design constants

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::io::Read;
use std::str::FromStr;
use svmp_core::{Error, Result, Units};

/// Length of one fringe sampling-frame unit, in meters
pub const FRINGE_FRAME_UNIT_LENGTH_M: f64 = 1000.0;

/// Fringe sampling frame: `ni` units of fixed shoreline length
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FringeFrame {
    pub ni: usize,
    /// Total frame length in meters
    pub ln: f64,
}

impl FringeFrame {
    pub fn from_site_count(ni: usize) -> Self {
        Self {
            ni,
            ln: ni as f64 * FRINGE_FRAME_UNIT_LENGTH_M,
        }
    }
}

/// Grouping of sites that share a sampling design
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisStratum {
    Core,
    PersistentFlats,
    Flats,
    Fringe,
    WideFringe,
}

impl AnalysisStratum {
    pub const ALL: [AnalysisStratum; 5] = [
        AnalysisStratum::Core,
        AnalysisStratum::PersistentFlats,
        AnalysisStratum::Flats,
        AnalysisStratum::Fringe,
        AnalysisStratum::WideFringe,
    ];

    /// Label used in the output tables
    pub fn as_str(self) -> &'static str {
        match self {
            AnalysisStratum::Core => "core",
            AnalysisStratum::PersistentFlats => "persistent flats",
            AnalysisStratum::Flats => "flats",
            AnalysisStratum::Fringe => "fringe",
            AnalysisStratum::WideFringe => "wide fringe",
        }
    }

    /// Extrapolation the sampling design of this stratum calls for
    pub fn default_extrapolation(self) -> Extrapolation {
        match self {
            AnalysisStratum::Core | AnalysisStratum::PersistentFlats => Extrapolation::None,
            AnalysisStratum::Flats => Extrapolation::Area,
            AnalysisStratum::Fringe | AnalysisStratum::WideFringe => Extrapolation::Linear,
        }
    }

    /// Exhaustively surveyed; sampling error is zero by definition
    pub fn is_census(self) -> bool {
        matches!(self, AnalysisStratum::Core)
    }
}

impl fmt::Display for AnalysisStratum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AnalysisStratum {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "core" => Ok(AnalysisStratum::Core),
            "persistent flats" | "persistent_flats" => Ok(AnalysisStratum::PersistentFlats),
            "flats" => Ok(AnalysisStratum::Flats),
            "fringe" => Ok(AnalysisStratum::Fringe),
            "wide fringe" | "wide_fringe" => Ok(AnalysisStratum::WideFringe),
            other => Err(Error::InvalidInput(format!(
                "unknown analysis stratum '{other}'"
            ))),
        }
    }
}

/// How sampled sites are scaled up to the stratum
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Extrapolation {
    /// Census: sum of site values
    None,
    /// Scale by total stratum area over sampled area
    Area,
    /// Scale by total shoreline length over frame length
    Linear,
}

impl Extrapolation {
    pub fn as_str(self) -> &'static str {
        match self {
            Extrapolation::None => "none",
            Extrapolation::Area => "area",
            Extrapolation::Linear => "linear",
        }
    }
}

impl fmt::Display for Extrapolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Stratum-level constants as supplied by the spatial layer
///
/// `a2` is the total stratum area, `lt` the total shoreline length and `ln` the
/// frame length, all in `units`. When `ln` is absent it is derived as
/// `ni × 1000 m`, already in meters.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StratumConstants {
    #[serde(default)]
    pub ni: Option<usize>,
    #[serde(default)]
    pub a2: Option<f64>,
    #[serde(default)]
    pub lt: Option<f64>,
    #[serde(default)]
    pub ln: Option<f64>,
    #[serde(default)]
    pub units: Units,
}

impl StratumConstants {
    pub fn area(ni: usize, a2: f64) -> Self {
        Self {
            ni: Some(ni),
            a2: Some(a2),
            ..Default::default()
        }
    }

    pub fn linear(ni: usize, lt: f64) -> Self {
        Self {
            ni: Some(ni),
            lt: Some(lt),
            ..Default::default()
        }
    }

    pub fn with_frame_length(mut self, ln: f64) -> Self {
        self.ln = Some(ln);
        self
    }

    pub fn in_units(mut self, units: Units) -> Self {
        self.units = units;
        self
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Sampling design of a stratum with its constants resolved to meters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum StratumDesign {
    Census,
    Area { ni: usize, a2: f64 },
    Linear { ni: usize, lt: f64, ln: f64 },
}

/// An analysis stratum together with its extrapolation design
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Stratum {
    analysis: AnalysisStratum,
    design: StratumDesign,
}

impl Stratum {
    /// Build a stratum, checking that the constants its extrapolation needs exist
    pub fn new(
        analysis: AnalysisStratum,
        extrapolation: Extrapolation,
        constants: &StratumConstants,
    ) -> Result<Self> {
        let missing = |name: &str| Error::missing_constant(analysis.as_str(), name);
        let units = constants.units;

        let design = match extrapolation {
            Extrapolation::None => StratumDesign::Census,
            Extrapolation::Area => {
                let ni = constants.ni.filter(|&n| n > 0).ok_or_else(|| missing("Ni"))?;
                let a2 = constants.a2.ok_or_else(|| missing("A2"))?;
                StratumDesign::Area {
                    ni,
                    a2: units.area_to_meters(a2),
                }
            }
            Extrapolation::Linear => {
                let ni = constants.ni.filter(|&n| n > 0).ok_or_else(|| missing("Ni"))?;
                let lt = constants.lt.ok_or_else(|| missing("LT"))?;
                let ln = match constants.ln {
                    Some(ln) => units.length_to_meters(ln),
                    None => FringeFrame::from_site_count(ni).ln,
                };
                if ln <= 0.0 {
                    return Err(missing("LN"));
                }
                StratumDesign::Linear {
                    ni,
                    lt: units.length_to_meters(lt),
                    ln,
                }
            }
        };
        Ok(Self { analysis, design })
    }

    /// Census stratum with no extrapolation
    pub fn census(analysis: AnalysisStratum) -> Self {
        Self {
            analysis,
            design: StratumDesign::Census,
        }
    }

    pub fn core() -> Self {
        Self::census(AnalysisStratum::Core)
    }

    pub fn persistent_flats() -> Self {
        Self::census(AnalysisStratum::PersistentFlats)
    }

    /// Area-extrapolated stratum with constants already in meters
    pub fn area(analysis: AnalysisStratum, ni: usize, a2: f64) -> Result<Self> {
        Self::new(analysis, Extrapolation::Area, &StratumConstants::area(ni, a2))
    }

    /// Linearly extrapolated stratum with constants already in meters
    pub fn linear(analysis: AnalysisStratum, ni: usize, lt: f64, ln: f64) -> Result<Self> {
        Self::new(
            analysis,
            Extrapolation::Linear,
            &StratumConstants::linear(ni, lt).with_frame_length(ln),
        )
    }

    pub fn analysis(&self) -> AnalysisStratum {
        self.analysis
    }

    pub fn design(&self) -> StratumDesign {
        self.design
    }

    pub fn extrapolation(&self) -> Extrapolation {
        match self.design {
            StratumDesign::Census => Extrapolation::None,
            StratumDesign::Area { .. } => Extrapolation::Area,
            StratumDesign::Linear { .. } => Extrapolation::Linear,
        }
    }

    /// Population count, if the design has one
    pub fn population_count(&self) -> Option<usize> {
        match self.design {
            StratumDesign::Census => None,
            StratumDesign::Area { ni, .. } | StratumDesign::Linear { ni, .. } => Some(ni),
        }
    }
}

/// Stratum constants for a whole survey, keyed by analysis stratum
///
/// ```json
/// {
///   "flats":       { "ni": 61, "a2": 1.2e9, "units": "survey_feet" },
///   "fringe":      { "ni": 1820, "lt": 5.9e6, "units": "survey_feet" },
///   "wide_fringe": { "ni": 275, "lt": 9.1e5, "units": "survey_feet" }
/// }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SoundwideConstants {
    strata: BTreeMap<AnalysisStratum, StratumConstants>,
}

impl SoundwideConstants {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, analysis: AnalysisStratum, constants: StratumConstants) -> Self {
        self.strata.insert(analysis, constants);
        self
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        Ok(serde_json::from_reader(reader)?)
    }

    pub fn constants(&self, analysis: AnalysisStratum) -> Option<&StratumConstants> {
        self.strata.get(&analysis)
    }

    /// Resolve the stratum with its default extrapolation
    pub fn stratum(&self, analysis: AnalysisStratum) -> Result<Stratum> {
        self.stratum_with(analysis, analysis.default_extrapolation())
    }

    pub fn stratum_with(
        &self,
        analysis: AnalysisStratum,
        extrapolation: Extrapolation,
    ) -> Result<Stratum> {
        match extrapolation {
            Extrapolation::None => Ok(Stratum::census(analysis)),
            _ => {
                let constants = self
                    .strata
                    .get(&analysis)
                    .ok_or_else(|| Error::missing_constant(analysis.as_str(), "Ni"))?;
                Stratum::new(analysis, extrapolation, constants)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use svmp_core::SURVEY_FOOT_TO_METER;

    #[test]
    fn test_missing_constants_are_fatal() {
        let err = Stratum::new(
            AnalysisStratum::Flats,
            Extrapolation::Area,
            &StratumConstants::default(),
        )
        .unwrap_err();
        assert!(matches!(err, Error::MissingStratumConstant { ref constant, .. } if constant == "Ni"));

        let err = Stratum::new(
            AnalysisStratum::Fringe,
            Extrapolation::Linear,
            &StratumConstants {
                ni: Some(3),
                ..Default::default()
            },
        )
        .unwrap_err();
        assert!(matches!(err, Error::MissingStratumConstant { ref constant, .. } if constant == "LT"));
    }

    #[test]
    fn test_frame_length_derived_from_site_count() {
        let s = Stratum::new(
            AnalysisStratum::Fringe,
            Extrapolation::Linear,
            &StratumConstants::linear(3, 5000.0),
        )
        .unwrap();
        assert_eq!(
            s.design(),
            StratumDesign::Linear {
                ni: 3,
                lt: 5000.0,
                ln: 3000.0
            }
        );
    }

    #[test]
    fn test_constants_converted_to_meters() {
        let constants = StratumConstants::area(10, 1000.0).in_units(Units::SurveyFeet);
        let s = Stratum::new(AnalysisStratum::Flats, Extrapolation::Area, &constants).unwrap();
        match s.design() {
            StratumDesign::Area { a2, .. } => {
                assert_relative_eq!(a2, 1000.0 * SURVEY_FOOT_TO_METER.powi(2))
            }
            other => panic!("unexpected design {other:?}"),
        }

        let constants = StratumConstants::linear(2, 1000.0).in_units(Units::SurveyFeet);
        let s = Stratum::new(AnalysisStratum::Fringe, Extrapolation::Linear, &constants).unwrap();
        match s.design() {
            StratumDesign::Linear { lt, ln, .. } => {
                assert_relative_eq!(lt, 1000.0 * SURVEY_FOOT_TO_METER);
                assert_eq!(ln, 2000.0);
            }
            other => panic!("unexpected design {other:?}"),
        }
    }

    #[test]
    fn test_explicit_frame_length_in_survey_feet() {
        let json = r#"{ "ni": 3, "lt": 5000.0, "ln": 3000.0, "units": "survey_feet" }"#;
        let constants = StratumConstants::from_json_str(json).unwrap();
        let s = Stratum::new(AnalysisStratum::Fringe, Extrapolation::Linear, &constants).unwrap();
        match s.design() {
            StratumDesign::Linear { lt, ln, .. } => {
                assert_relative_eq!(lt, 5000.0 * SURVEY_FOOT_TO_METER);
                assert_relative_eq!(ln, 3000.0 * SURVEY_FOOT_TO_METER);
                assert_relative_eq!(lt / ln, 5000.0 / 3000.0, max_relative = 1e-12);
            }
            other => panic!("unexpected design {other:?}"),
        }
    }

    #[test]
    fn test_soundwide_constants_from_json() {
        let json = r#"{
            "flats": { "ni": 10, "a2": 1000.0 },
            "fringe": { "ni": 3, "lt": 5000.0, "ln": 3000.0 }
        }"#;
        let constants = SoundwideConstants::from_json_str(json).unwrap();
        let flats = constants.stratum(AnalysisStratum::Flats).unwrap();
        assert_eq!(flats.extrapolation(), Extrapolation::Area);
        assert_eq!(flats.population_count(), Some(10));

        let core = constants.stratum(AnalysisStratum::Core).unwrap();
        assert_eq!(core.extrapolation(), Extrapolation::None);

        assert!(matches!(
            constants.stratum(AnalysisStratum::WideFringe),
            Err(Error::MissingStratumConstant { .. })
        ));
    }

    #[test]
    fn test_labels_round_trip() {
        for s in AnalysisStratum::ALL {
            assert_eq!(s.as_str().parse::<AnalysisStratum>().unwrap(), s);
        }
        assert_eq!(AnalysisStratum::WideFringe.to_string(), "wide fringe");
        assert_eq!(Extrapolation::Linear.to_string(), "linear");
    }
}
