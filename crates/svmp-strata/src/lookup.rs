//! Mapping from geomorphic and sampling strata to analysis strata

use crate::sample::{Sample, Site};
use crate::stratum::{AnalysisStratum, Extrapolation, SoundwideConstants};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use svmp_core::{Error, Result};
use tracing::{debug, instrument};

/// Which table of analysis strata to use
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LookupMode {
    /// Persistent flats reported on their own
    #[default]
    AreaEstimate,
    /// Persistent flats folded into core
    AreaChange,
}

/// Resolves `(geomorphic, sampling)` stratum codes to an analysis stratum
#[derive(Debug, Clone, Copy, Default)]
pub struct StratumLookup {
    mode: LookupMode,
}

impl StratumLookup {
    pub fn new(mode: LookupMode) -> Self {
        Self { mode }
    }

    pub fn area_estimate() -> Self {
        Self::new(LookupMode::AreaEstimate)
    }

    pub fn area_change() -> Self {
        Self::new(LookupMode::AreaChange)
    }

    pub fn mode(&self) -> LookupMode {
        self.mode
    }

    /// Analysis strata this table can produce, in reporting order
    pub fn strata(&self) -> &'static [AnalysisStratum] {
        match self.mode {
            LookupMode::AreaEstimate => &AnalysisStratum::ALL,
            LookupMode::AreaChange => &[
                AnalysisStratum::Core,
                AnalysisStratum::Flats,
                AnalysisStratum::Fringe,
                AnalysisStratum::WideFringe,
            ],
        }
    }

    pub fn resolve(&self, geo: &str, sampling: &str) -> Result<(AnalysisStratum, Extrapolation)> {
        let analysis = match (geo, sampling) {
            ("frw" | "fr" | "fl", "core") => AnalysisStratum::Core,
            ("fl", "persistent") => match self.mode {
                LookupMode::AreaEstimate => AnalysisStratum::PersistentFlats,
                LookupMode::AreaChange => AnalysisStratum::Core,
            },
            ("fl", "rotational") => AnalysisStratum::Flats,
            ("fr", "rotational") => AnalysisStratum::Fringe,
            ("frw", "rotational") => AnalysisStratum::WideFringe,
            _ => {
                return Err(Error::UnknownStratum {
                    geo: geo.to_string(),
                    sampling: sampling.to_string(),
                })
            }
        };
        Ok((analysis, analysis.default_extrapolation()))
    }
}

/// Stratum codes for one site in the sampling frame
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SiteCharacteristics {
    pub site_id: String,
    pub geo_stratum: String,
    pub sampling_stratum: String,
}

impl SiteCharacteristics {
    pub fn new(
        site_id: impl Into<String>,
        geo_stratum: impl Into<String>,
        sampling_stratum: impl Into<String>,
    ) -> Self {
        Self {
            site_id: site_id.into(),
            geo_stratum: geo_stratum.into(),
            sampling_stratum: sampling_stratum.into(),
        }
    }
}

/// Sampled sites grouped by analysis stratum
#[derive(Debug, Clone, Default)]
pub struct StratifiedSites {
    groups: BTreeMap<AnalysisStratum, Vec<Site>>,
    strata: Vec<AnalysisStratum>,
}

impl StratifiedSites {
    /// Group sampled sites by analysis stratum
    ///
    /// `characteristics` lists the sites sampled in the year and every one of
    /// them must have a row in `sites`. Sites landing in an area-extrapolated
    /// stratum take their polygon area from `sample_areas`, which must be in the
    /// same units as the site.
    #[instrument(skip_all, fields(mode = ?lookup.mode(), sites = characteristics.len()))]
    pub fn group(
        lookup: &StratumLookup,
        characteristics: &[SiteCharacteristics],
        sites: &[Site],
        sample_areas: &HashMap<String, f64>,
    ) -> Result<Self> {
        let by_id: HashMap<&str, &Site> = sites.iter().map(|s| (s.id.as_str(), s)).collect();

        let mut missing: Vec<&str> = characteristics
            .iter()
            .map(|c| c.site_id.as_str())
            .filter(|id| !by_id.contains_key(id))
            .collect();
        if !missing.is_empty() {
            missing.sort_unstable();
            return Err(Error::MissingSite {
                site: missing.join(","),
                context: "no row in the site statistics table".to_string(),
            });
        }

        let mut groups: BTreeMap<AnalysisStratum, Vec<Site>> = BTreeMap::new();
        for codes in characteristics {
            let (analysis, extrapolation) =
                lookup.resolve(&codes.geo_stratum, &codes.sampling_stratum)?;
            let mut site = (*by_id[codes.site_id.as_str()]).clone();
            if extrapolation == Extrapolation::Area {
                let a2j = sample_areas.get(&site.id).ok_or_else(|| {
                    Error::missing_constant(format!("{analysis} site {}", site.id), "a2j")
                })?;
                site.a2j = Some(*a2j);
            }
            groups.entry(analysis).or_default().push(site);
        }

        for group in groups.values_mut() {
            group.sort_by(|a, b| a.id.cmp(&b.id));
        }
        for (stratum, group) in &groups {
            debug!(%stratum, n = group.len(), "Grouped sites");
        }

        Ok(Self {
            groups,
            strata: lookup.strata().to_vec(),
        })
    }

    pub fn sites(&self, analysis: AnalysisStratum) -> &[Site] {
        self.groups.get(&analysis).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Analysis strata of the lookup table, in reporting order
    pub fn strata(&self) -> &[AnalysisStratum] {
        &self.strata
    }

    pub fn total_sites(&self) -> usize {
        self.groups.values().map(Vec::len).sum()
    }

    /// One sample per analysis stratum, empty where nothing was sampled
    pub fn samples(&self, constants: &SoundwideConstants) -> Result<Vec<Sample>> {
        self.strata
            .iter()
            .map(|&analysis| {
                let stratum = constants.stratum(analysis)?;
                Sample::new(stratum, self.sites(analysis).to_vec())
            })
            .collect()
    }
}
