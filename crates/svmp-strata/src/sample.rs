//! Sampled sites within a stratum

use crate::stratum::{Extrapolation, Stratum};
use serde::{Deserialize, Serialize};
use svmp_core::{Error, Result, Units};

/// One sampled site's vegetated-area estimate
///
/// `a2j` is the sample-polygon area, needed only by area-extrapolated strata.
/// Values carry the units they were measured in; [`Site::to_meters`] converts
/// them once and is a no-op afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Site {
    pub id: String,
    pub zm_area: f64,
    pub zm_area_var: f64,
    pub a2j: Option<f64>,
    pub units: Units,
}

impl Site {
    /// Site with values already in meters
    pub fn new(id: impl Into<String>, zm_area: f64, zm_area_var: f64) -> Self {
        Self {
            id: id.into(),
            zm_area,
            zm_area_var,
            a2j: None,
            units: Units::Meters,
        }
    }

    pub fn with_sample_area(mut self, a2j: f64) -> Self {
        self.a2j = Some(a2j);
        self
    }

    pub fn in_units(mut self, units: Units) -> Self {
        self.units = units;
        self
    }

    /// Convert every value to meters
    pub fn to_meters(&self) -> Self {
        let units = self.units;
        Self {
            id: self.id.clone(),
            zm_area: units.area_to_meters(self.zm_area),
            zm_area_var: units.area_variance_to_meters(self.zm_area_var),
            a2j: self.a2j.map(|a| units.area_to_meters(a)),
            units: Units::Meters,
        }
    }
}

/// The sites of one stratum sampled in one year
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    stratum: Stratum,
    sites: Vec<Site>,
}

impl Sample {
    /// Build a sample; site values are converted to meters on the way in
    ///
    /// Area-extrapolated strata need a sample-polygon area for every site.
    pub fn new(stratum: Stratum, sites: Vec<Site>) -> Result<Self> {
        if stratum.extrapolation() == Extrapolation::Area {
            if let Some(site) = sites.iter().find(|s| s.a2j.is_none()) {
                return Err(Error::missing_constant(
                    format!("{} site {}", stratum.analysis(), site.id),
                    "a2j",
                ));
            }
        }
        if let Some(site) = sites
            .iter()
            .find(|s| !s.zm_area.is_finite() || !s.zm_area_var.is_finite())
        {
            return Err(Error::non_finite(&format!("site {}", site.id)));
        }

        Ok(Self {
            stratum,
            sites: sites.iter().map(Site::to_meters).collect(),
        })
    }

    /// Sample with no sites; estimates to zero
    pub fn empty(stratum: Stratum) -> Self {
        Self {
            stratum,
            sites: Vec::new(),
        }
    }

    pub fn stratum(&self) -> &Stratum {
        &self.stratum
    }

    pub fn sites(&self) -> &[Site] {
        &self.sites
    }

    pub fn into_sites(self) -> Vec<Site> {
        self.sites
    }

    /// Number of sampled sites, `ni`
    pub fn ni(&self) -> usize {
        self.sites.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sites.is_empty()
    }

    pub fn site_ids(&self) -> Vec<&str> {
        self.sites.iter().map(|s| s.id.as_str()).collect()
    }

    pub fn zm_areas(&self) -> Vec<f64> {
        self.sites.iter().map(|s| s.zm_area).collect()
    }

    pub fn zm_vars(&self) -> Vec<f64> {
        self.sites.iter().map(|s| s.zm_area_var).collect()
    }

    /// Sample-polygon areas; zero where a site has none
    pub fn sample_areas(&self) -> Vec<f64> {
        self.sites.iter().map(|s| s.a2j.unwrap_or(0.0)).collect()
    }

    pub fn find(&self, id: &str) -> Option<&Site> {
        self.sites.iter().find(|s| s.id == id)
    }

    /// Same stratum, different sites
    pub fn with_sites(&self, sites: Vec<Site>) -> Result<Self> {
        Self::new(self.stratum, sites)
    }
}
