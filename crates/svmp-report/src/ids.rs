//! Composite keys linking transect, site and sampling-occasion rows

use crate::error::{Error, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use svmp_transect::{TransectId, TransectSummary};

/// One survey of one site for one vegetation type
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SiteVisit {
    pub site_code: String,
    /// Date of the visit's first transect
    pub start_date: NaiveDate,
    pub veg_code: String,
    /// Sampling occasion label, usually the survey year
    pub sampling_occasion: String,
}

impl SiteVisit {
    pub fn new(
        site_code: impl Into<String>,
        start_date: NaiveDate,
        veg_code: impl Into<String>,
        sampling_occasion: impl Into<String>,
    ) -> Self {
        Self {
            site_code: site_code.into(),
            start_date,
            veg_code: veg_code.into(),
            sampling_occasion: sampling_occasion.into(),
        }
    }

    /// Visit dated by the first transect in `summary`
    pub fn from_summary(
        site_code: impl Into<String>,
        summary: &TransectSummary,
        veg_code: impl Into<String>,
        sampling_occasion: impl Into<String>,
    ) -> Result<Self> {
        let site_code = site_code.into();
        let start_date = summary.start_date().ok_or_else(|| {
            Error::InvalidInput(format!("site {site_code} has no dated transects"))
        })?;
        Ok(Self::new(site_code, start_date, veg_code, sampling_occasion))
    }

    /// `{site}_{YYYYMMDD}_{veg_code}`
    pub fn site_results_id(&self) -> String {
        format!(
            "{}_{}_{}",
            self.site_code,
            self.start_date.format("%Y%m%d"),
            self.veg_code
        )
    }

    /// `{site_results_id}_{NN}`
    pub fn tran_results_id(&self, transect: TransectId) -> String {
        format!("{}_{:02}", self.site_results_id(), transect)
    }

    /// `{site}_{sampling_occasion}`
    pub fn sitestat_id(&self) -> String {
        format!("{}_{}", self.site_code, self.sampling_occasion)
    }
}
