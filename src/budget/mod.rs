//! Static analysis budget
//!
//! Each tool has a stored violation limit. A fresh measurement above the
//! limit fails the build. A measurement well below it lowers the stored
//! limit on a developer machine, but fails on CI so that a human commits
//! the tightened value instead of the pipeline rewriting policy.
//!
//! # Example
//!
//! ```no_run
//! use qualigate::budget::{AnalysisBudgetTracker, Decision, LimitsStore, ToolSpec};
//!
//! let tracker = AnalysisBudgetTracker::new(LimitsStore::new("static-analysis.properties"), false);
//! let tool = ToolSpec::spotbugs("target/spotbugsReports/main.xml");
//! if let Decision::Fail(reason) = tracker.evaluate(&tool, Some(12))? {
//!     eprintln!("{reason}");
//! }
//! # Ok::<(), qualigate::GateError>(())
//! ```

mod store;
mod tool;

pub use store::{validate_key, AnalysisLimits, LimitsStore, DEFAULT_LIMITS_FILE};
pub(crate) use store::sidecar;
pub use tool::{LowerBound, ToolSpec, CHECKSTYLE_KEY, DETEKT_KEY, FINDBUGS_KEY};

use crate::error::Result;
use tracing::{info, warn};

/// Why a check passed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PassReason {
    /// No limit stored for this tool
    NoLimit,
    /// The tool produced no report (nothing to analyze)
    NoReport,
    /// Measurement within `[lower bound, limit]`
    WithinBudget { actual: u32, limit: u32 },
}

/// Outcome of one budget check
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    Pass(PassReason),
    /// Limit lowered to the measured count
    Ratcheted(u32),
    Fail(String),
}

impl Decision {
    pub fn is_fail(&self) -> bool {
        matches!(self, Decision::Fail(_))
    }
}

/// Apply the budget rule to one tool.
///
/// `limits_file` names the file a human should edit when CI refuses to
/// lower the limit itself.
pub fn decide(
    tool: &ToolSpec,
    limit: Option<u32>,
    measured: Option<u32>,
    ci: bool,
    limits_file: &str,
) -> Decision {
    let Some(limit) = limit else {
        return Decision::Pass(PassReason::NoLimit);
    };
    let Some(actual) = measured else {
        return Decision::Pass(PassReason::NoReport);
    };

    if actual > limit {
        return Decision::Fail(format!(
            "Too much {} errors: actual={}, limit={}",
            tool.display_name, actual, limit
        ));
    }

    if actual < tool.lower_bound.apply(limit) {
        if ci {
            return Decision::Fail(format!(
                "{} limit is too high, must be {}. Decrease it in file {}.",
                tool.display_name, actual, limits_file
            ));
        }
        return Decision::Ratcheted(actual);
    }

    Decision::Pass(PassReason::WithinBudget { actual, limit })
}

/// Checks measurements against the stored limits and ratchets them down.
pub struct AnalysisBudgetTracker {
    store: LimitsStore,
    ci: bool,
}

impl AnalysisBudgetTracker {
    pub fn new(store: LimitsStore, ci: bool) -> Self {
        Self { store, ci }
    }

    pub fn store(&self) -> &LimitsStore {
        &self.store
    }

    pub fn is_ci(&self) -> bool {
        self.ci
    }

    /// Current limits, `None` if no limits file exists.
    pub fn limits(&self) -> Result<Option<AnalysisLimits>> {
        self.store.load()
    }

    /// Check one tool's measured violation count.
    ///
    /// `measured` is `None` when the tool produced no report. Limits are
    /// re-read on every call; a ratchet persists only its own key.
    pub fn evaluate(&self, tool: &ToolSpec, measured: Option<u32>) -> Result<Decision> {
        let limit = self.limits()?.and_then(|limits| limits.get(&tool.key));
        let decision = decide(tool, limit, measured, self.ci, &self.store.file_name());

        match &decision {
            Decision::Pass(PassReason::NoLimit) => {
                warn!("{} limit not found, skipping check", tool.key);
            }
            Decision::Pass(PassReason::NoReport) => {
                warn!(
                    "{} report not found: {}. {} skipped.",
                    tool.display_name,
                    tool.report.display(),
                    tool.display_name
                );
            }
            Decision::Pass(PassReason::WithinBudget { actual, limit }) => {
                log_success(tool, *actual, *limit);
            }
            Decision::Ratcheted(actual) => {
                self.store.update(&tool.key, *actual)?;
                info!(
                    "{} limit lowered from {} to {} in {}",
                    tool.display_name,
                    limit.unwrap_or_default(),
                    actual,
                    self.store.path().display()
                );
                log_success(tool, *actual, limit.unwrap_or_default());
            }
            Decision::Fail(reason) => {
                warn!("{}", reason);
            }
        }

        Ok(decision)
    }
}

fn log_success(tool: &ToolSpec, actual: u32, limit: u32) {
    info!(
        "{} successfully passed with {} (limit={}) errors. See the report at: {}",
        tool.display_name,
        actual,
        limit,
        tool.report.display()
    );
}

#[cfg(test)]
mod tests;
