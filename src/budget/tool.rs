//! Analysis tool descriptions
//!
//! A [`ToolSpec`] ties a limits-file key to the report that tool produces
//! and to the rate at which its limit is allowed to tighten.

use serde::Deserialize;
use std::path::PathBuf;

/// How far below the stored limit a measurement may fall before the limit
/// is considered too high.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LowerBound {
    /// `max(0, limit - margin)`
    Margin(u32),
    /// `limit * percent / 100`, rounded down
    Percent(u32),
}

impl LowerBound {
    /// Lowest measurement that still counts as within budget.
    pub fn apply(&self, limit: u32) -> u32 {
        match *self {
            LowerBound::Margin(margin) => limit.saturating_sub(margin),
            LowerBound::Percent(percent) => {
                let bound = u64::from(limit) * u64::from(percent) / 100;
                u32::try_from(bound).unwrap_or(u32::MAX)
            }
        }
    }
}

/// One static analysis tool as the gate sees it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolSpec {
    /// Key in the limits file (e.g. `checkstyle`, `findbugs`)
    pub key: String,
    /// Human-readable name used in messages
    pub display_name: String,
    /// XML element counted as one violation
    pub marker: String,
    /// Location of the generated report
    pub report: PathBuf,
    /// Tightening rate for the ratchet
    pub lower_bound: LowerBound,
    /// Only analyze on development branches
    pub branch_gated: bool,
}

pub const CHECKSTYLE_KEY: &str = "checkstyle";
pub const FINDBUGS_KEY: &str = "findbugs";
pub const DETEKT_KEY: &str = "detekt";

impl ToolSpec {
    /// Checkstyle: `<error>` elements, 5% tightening.
    pub fn checkstyle(report: impl Into<PathBuf>) -> Self {
        Self {
            key: CHECKSTYLE_KEY.to_string(),
            display_name: "Checkstyle".to_string(),
            marker: "error".to_string(),
            report: report.into(),
            lower_bound: LowerBound::Percent(95),
            branch_gated: false,
        }
    }

    /// SpotBugs (stored under the historical `findbugs` key): `<BugInstance>`
    /// elements, fixed margin of 10, development branches only.
    pub fn spotbugs(report: impl Into<PathBuf>) -> Self {
        Self {
            key: FINDBUGS_KEY.to_string(),
            display_name: "SpotBugs".to_string(),
            marker: "BugInstance".to_string(),
            report: report.into(),
            lower_bound: LowerBound::Margin(10),
            branch_gated: true,
        }
    }

    /// detekt writes checkstyle-format XML, so it counts `<error>` and
    /// tightens like checkstyle.
    pub fn detekt(report: impl Into<PathBuf>) -> Self {
        Self {
            key: DETEKT_KEY.to_string(),
            display_name: "detekt".to_string(),
            marker: "error".to_string(),
            report: report.into(),
            lower_bound: LowerBound::Percent(95),
            branch_gated: false,
        }
    }
}
