//! Check command - enforce the analysis budget

use anyhow::Result;
use console::style;

use qualigate::budget::{AnalysisBudgetTracker, Decision, LimitsStore, PassReason};
use qualigate::config::Settings;
use qualigate::git::{BranchPolicy, GitRepository};
use qualigate::pipeline::{Plan, ToolOutcome};

/// Run the check command
pub fn run(settings: &Settings, only: &[String], ci_flag: bool) -> Result<()> {
    for key in only {
        if settings.tool(key).is_none() {
            anyhow::bail!(
                "Unknown or disabled tool '{}'. Configured tools: {}",
                key,
                settings
                    .tools
                    .iter()
                    .map(|t| t.key.as_str())
                    .collect::<Vec<_>>()
                    .join(", ")
            );
        }
    }

    let tools = settings
        .tools
        .iter()
        .filter(|t| only.is_empty() || only.contains(&t.key))
        .cloned()
        .collect();

    let ci = settings.is_ci_run(ci_flag);
    let tracker = AnalysisBudgetTracker::new(LimitsStore::new(&settings.limits_file), ci);
    let plan = Plan::build(tools);

    let report = plan.run(&tracker, || {
        let repo = GitRepository::open(&settings.root)?;
        BranchPolicy::new(&repo).classify()
    })?;

    if let Some(branch) = &report.branch {
        println!(
            "Branch {} ({})",
            style(&branch.branch).cyan(),
            if branch.stable { "stable" } else { "development" }
        );
    }

    for (tool, outcome) in &report.results {
        let line = match outcome {
            ToolOutcome::Skipped(_) => format!("{} skipped on this branch", tool.display_name),
            ToolOutcome::Decided(Decision::Pass(PassReason::NoLimit)) => {
                format!("{} has no limit, not checked", tool.display_name)
            }
            ToolOutcome::Decided(Decision::Pass(PassReason::NoReport)) => {
                format!("{} produced no report, not checked", tool.display_name)
            }
            ToolOutcome::Decided(Decision::Pass(PassReason::WithinBudget { actual, limit })) => {
                format!("{} {} of {} allowed", tool.display_name, actual, limit)
            }
            ToolOutcome::Decided(Decision::Ratcheted(limit)) => format!(
                "{} limit lowered to {} in {}",
                tool.display_name,
                limit,
                tracker.store().file_name()
            ),
            ToolOutcome::Decided(Decision::Fail(reason)) => reason.clone(),
        };
        let marker = match outcome {
            ToolOutcome::Decided(Decision::Fail(_)) => style("[FAIL]").red(),
            ToolOutcome::Decided(Decision::Ratcheted(_)) => style("[DOWN]").green(),
            ToolOutcome::Decided(Decision::Pass(PassReason::WithinBudget { .. })) => {
                style("[OK]").green()
            }
            _ => style("[--]").dim(),
        };
        println!("  {} {}", marker, line);
    }

    let failures = report.failures();
    if !failures.is_empty() {
        eprintln!(
            "\n{} static analysis budget exceeded for {} tool(s)",
            style("✗").red(),
            failures.len()
        );
        std::process::exit(1);
    }

    Ok(())
}
