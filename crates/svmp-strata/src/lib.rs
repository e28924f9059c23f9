//! Stratified soundwide estimates of eelgrass area
//!
//! Sites are grouped into analysis strata ([`StratumLookup`],
//! [`StratifiedSites`]), each stratum's sample is extrapolated according to its
//! design ([`SampleStats`]) and the strata are summed into a soundwide total
//! ([`AnnualEstimate`]).
//!
//! | Design | Estimate |
//! |--------|----------|
//! | census | `Σ area` |
//! | area   | `A2 · Σ area / Σ a2j` |
//! | linear | `(LT / LN) · mean · Ni` |
//!
//! # Example
//!
//! ```rust
//! use svmp_strata::{AnalysisStratum, AnnualEstimate, Sample, SampleStats, Site, Stratum};
//!
//! let core = Sample::new(Stratum::core(), vec![Site::new("core001", 250.0, 0.0)]).unwrap();
//! let fringe = Sample::new(
//!     Stratum::linear(AnalysisStratum::Fringe, 3, 5000.0, 3000.0).unwrap(),
//!     vec![Site::new("cps0001", 100.0, 4.0), Site::new("cps0002", 300.0, 4.0)],
//! )
//! .unwrap();
//!
//! let annual = AnnualEstimate::new(&[SampleStats::new(&core), SampleStats::new(&fringe)]);
//! assert!((annual.zm_area - 1250.0).abs() < 1e-9);
//! ```

mod annual;
mod estimate;
mod lookup;
mod sample;
mod stratum;

pub use annual::AnnualEstimate;
pub use estimate::SampleStats;
pub use lookup::{LookupMode, SiteCharacteristics, StratifiedSites, StratumLookup};
pub use sample::{Sample, Site};
pub use stratum::{
    AnalysisStratum, Extrapolation, FringeFrame, SoundwideConstants, Stratum, StratumConstants,
    StratumDesign, FRINGE_FRAME_UNIT_LENGTH_M,
};
