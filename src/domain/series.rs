use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::app::error::{Result, WatchError};

/// Site-scan tag selecting the fetch strategy for a series.
///
/// New source sites are supported by adding a variant here (and its
/// selector in the fetcher), never by branching in the watcher core.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SiteScan {
    Manhuaplus,
    Asurascans,
}

impl SiteScan {
    pub fn as_str(&self) -> &'static str {
        match self {
            SiteScan::Manhuaplus => "manhuaplus",
            SiteScan::Asurascans => "asurascans",
        }
    }
}

impl fmt::Display for SiteScan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SiteScan {
    type Err = WatchError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "manhuaplus" => Ok(SiteScan::Manhuaplus),
            "asurascans" => Ok(SiteScan::Asurascans),
            other => Err(WatchError::InvalidSeries(format!(
                "unknown scan tag: {other}"
            ))),
        }
    }
}

/// One tracked series: static configuration, immutable during a run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Series {
    pub id: String,
    pub title: String,
    pub url: String,
    pub scan: SiteScan,
    /// Hours of day (0-23) at which checks are due. Always sorted,
    /// deduplicated and non-empty.
    pub check_hours: Vec<u8>,
}

impl Series {
    pub fn new(
        id: String,
        title: String,
        url: String,
        scan: SiteScan,
        check_hours: Vec<u8>,
    ) -> Result<Self> {
        let check_hours = normalize_check_hours(check_hours)?;
        Ok(Self {
            id,
            title,
            url,
            scan,
            check_hours,
        })
    }

    /// Parse a comma-separated hour list like `"6,12,18"`.
    pub fn parse_check_hours(s: &str) -> Result<Vec<u8>> {
        s.split(',')
            .map(|token| {
                let token = token.trim();
                token.parse::<u8>().map_err(|_| {
                    WatchError::InvalidSeries(format!("invalid check hour: {token:?}"))
                })
            })
            .collect()
    }

    /// Render the check hours back into the `"6,12,18"` form.
    pub fn check_hours_string(&self) -> String {
        self.check_hours
            .iter()
            .map(u8::to_string)
            .collect::<Vec<_>>()
            .join(",")
    }
}

fn normalize_check_hours(mut hours: Vec<u8>) -> Result<Vec<u8>> {
    if hours.is_empty() {
        return Err(WatchError::InvalidSeries(
            "at least one check hour is required".into(),
        ));
    }
    if let Some(&bad) = hours.iter().find(|&&h| h > 23) {
        return Err(WatchError::InvalidSeries(format!(
            "check hour out of range: {bad}"
        )));
    }
    hours.sort_unstable();
    hours.dedup();
    Ok(hours)
}
