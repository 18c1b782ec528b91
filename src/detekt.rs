//! detekt config rendering
//!
//! detekt enforces its own issue budget through `maxIssues`. The template
//! carries a `%MAX_ISSUES%` placeholder that is filled from the stored
//! `detekt` limit before detekt runs.

use std::fs;
use std::path::Path;
use tracing::{debug, info};

use crate::budget::{sidecar, AnalysisLimits, DETEKT_KEY};
use crate::error::Result;

pub const MAX_ISSUES_PLACEHOLDER: &str = "%MAX_ISSUES%";

/// Effectively unlimited when no detekt limit is stored.
const UNLIMITED_ISSUES: u32 = 99999;

/// `maxIssues` for detekt: the stored limit plus one.
pub fn max_issues(limits: Option<&AnalysisLimits>) -> u32 {
    limits
        .and_then(|l| l.get(DETEKT_KEY))
        .unwrap_or(UNLIMITED_ISSUES)
        .saturating_add(1)
}

pub fn render(template: &str, max_issues: u32) -> String {
    template.replace(MAX_ISSUES_PLACEHOLDER, &max_issues.to_string())
}

/// Render `template_path` into `output_path`, replacing any previous file.
pub fn write_config(
    template_path: &Path,
    output_path: &Path,
    limits: Option<&AnalysisLimits>,
) -> Result<u32> {
    let template = fs::read_to_string(template_path)?;
    let issues = max_issues(limits);

    if let Some(parent) = output_path.parent() {
        fs::create_dir_all(parent)?;
    }
    let tmp_file = sidecar(output_path, ".tmp");
    fs::write(&tmp_file, render(&template, issues))?;
    fs::rename(&tmp_file, output_path)?;

    debug!("Rendered {} from {}", output_path.display(), template_path.display());
    info!("detekt maxIssues set to {}", issues);
    Ok(issues)
}
