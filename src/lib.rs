//! qualigate - static analysis budget gate
//!
//! Keeps per-tool violation limits for checkstyle, SpotBugs and detekt in
//! a properties file, compares them with freshly generated reports, and
//! ratchets them down as violations get fixed. A git-flow branch policy
//! decides where branch-gated analysis runs.

pub mod budget;
pub mod config;
pub mod detekt;
pub mod error;
pub mod git;
pub mod pipeline;
pub mod report;

pub use budget::{AnalysisBudgetTracker, AnalysisLimits, Decision, LimitsStore, ToolSpec};
pub use error::{GateError, Result};
pub use git::{BranchClassification, BranchPolicy, GitRepository, VersionControl};
pub use pipeline::{Plan, PipelineReport, ToolOutcome};
