//! Result tables for the SVMP estimation pipeline
//!
//! Each table has a row type whose fields follow the fixed column order of
//! the published results, and rows are written with the `csv` crate:
//!
//! | Table              | Row type             | Built from                     |
//! |--------------------|----------------------|--------------------------------|
//! | Transect results   | [`TransectRow`]      | `TransectStats` + [`SiteVisit`] |
//! | Site results       | [`SiteRow`]          | `SiteStatistics` + [`SiteVisit`] |
//! | Stratum area       | [`StratumAreaRow`]   | `Sample` + `SampleStats`       |
//! | Soundwide area     | [`AnnualRow`]        | `AnnualEstimate`               |
//! | Stratum change     | [`ChangeStratumRow`] | `ChangeStats`                  |
//! | Soundwide change   | [`ChangeTotalRow`]   | `ChangeStatsTotal` + Monte Carlo half-width |
//!
//! # Example
//!
//! ```rust
//! use svmp_report::{to_csv_string, StratumAreaRow};
//! use svmp_strata::{Sample, SampleStats, Site, Stratum};
//!
//! let core = Sample::new(Stratum::core(), vec![Site::new("core001", 250.0, 16.0)]).unwrap();
//! let stats = SampleStats::new(&core);
//! let row = StratumAreaRow::new(2007, "ss", &core, &stats);
//! let csv = to_csv_string(&[row]).unwrap();
//! assert!(csv.starts_with("survey_year,stratum_analysis,extrapolation"));
//! assert!(csv.contains("core,none,ss,250.0,16.0,4.0"));
//! ```

mod error;
mod ids;
mod rows;
mod writer;

pub use error::{Error, Result};
pub use ids::SiteVisit;
pub use rows::{
    AnnualRow, ChangeStratumRow, ChangeTotalRow, SiteRow, StratumAreaRow, TableRow, TransectRow,
};
pub use writer::{to_csv_string, write_rows, write_table};
