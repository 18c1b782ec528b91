//! Budget check pipeline
//!
//! Orchestrates a full check as an explicit step graph:
//! 1. Load the stored limits
//! 2. Classify the branch (only if a branch-gated tool has a limit)
//! 3. Measure each tool's report
//! 4. Enforce each tool's budget
//!
//! Steps run in topological order. Every tool is evaluated even after one
//! fails so the report lists all budget violations at once; infrastructure
//! errors abort the run.

use petgraph::algo::toposort;
use petgraph::graph::{DiGraph, NodeIndex};
use std::collections::HashMap;
use tracing::{debug, info, warn};

use crate::budget::{AnalysisBudgetTracker, AnalysisLimits, Decision, ToolSpec};
use crate::error::{GateError, Result};
use crate::git::BranchClassification;
use crate::report;

/// One node of the plan. Tool steps carry an index into [`Plan::tools`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Step {
    LoadLimits,
    BranchGate,
    Measure(usize),
    Enforce(usize),
}

/// Step graph for a set of tools
pub struct Plan {
    graph: DiGraph<Step, ()>,
    tools: Vec<ToolSpec>,
}

impl Plan {
    pub fn build(tools: Vec<ToolSpec>) -> Self {
        let mut graph = DiGraph::new();
        let load = graph.add_node(Step::LoadLimits);
        let gate = tools
            .iter()
            .any(|t| t.branch_gated)
            .then(|| graph.add_node(Step::BranchGate));
        if let Some(gate) = gate {
            graph.add_edge(load, gate, ());
        }

        for (idx, tool) in tools.iter().enumerate() {
            let measure = graph.add_node(Step::Measure(idx));
            let enforce = graph.add_node(Step::Enforce(idx));
            graph.add_edge(load, measure, ());
            if let (true, Some(gate)) = (tool.branch_gated, gate) {
                graph.add_edge(gate, measure, ());
            }
            graph.add_edge(measure, enforce, ());
        }

        Self { graph, tools }
    }

    pub fn tools(&self) -> &[ToolSpec] {
        &self.tools
    }

    /// Steps in execution order.
    pub fn order(&self) -> Result<Vec<Step>> {
        let sorted: Vec<NodeIndex> = toposort(&self.graph, None).map_err(|cycle| {
            GateError::Plan(format!(
                "cycle through step {:?}",
                self.graph[cycle.node_id()]
            ))
        })?;
        Ok(sorted.into_iter().map(|n| self.graph[n]).collect())
    }

    /// Execute the plan.
    ///
    /// `classify` is only called when a branch-gated tool has a stored
    /// limit; its error aborts the run.
    pub fn run<F>(&self, tracker: &AnalysisBudgetTracker, classify: F) -> Result<PipelineReport>
    where
        F: FnOnce() -> Result<BranchClassification>,
    {
        let mut classify = Some(classify);
        let mut limits: Option<AnalysisLimits> = None;
        let mut branch: Option<BranchClassification> = None;
        let mut measured: HashMap<usize, Option<u32>> = HashMap::new();
        let mut outcomes: Vec<Option<ToolOutcome>> = vec![None; self.tools.len()];

        for step in self.order()? {
            debug!("Running step {:?}", step);
            match step {
                Step::LoadLimits => {
                    limits = tracker.limits()?;
                    if limits.is_none() {
                        warn!(
                            "No limits file at {}, skipping all checks",
                            tracker.store().path().display()
                        );
                    }
                }
                Step::BranchGate => {
                    let needed = self.tools.iter().any(|t| {
                        t.branch_gated
                            && limits.as_ref().is_some_and(|l| l.get(&t.key).is_some())
                    });
                    if !needed {
                        debug!("No branch-gated tool has a limit, not querying git");
                        continue;
                    }
                    if let Some(classify) = classify.take() {
                        branch = Some(classify()?);
                    }
                }
                Step::Measure(idx) => {
                    let tool = &self.tools[idx];
                    if tool.branch_gated {
                        if let Some(reason) = gate_skip_reason(tool, branch.as_ref()) {
                            warn!("{}", reason);
                            outcomes[idx] = Some(ToolOutcome::Skipped(reason));
                            continue;
                        }
                    }
                    let has_limit = limits
                        .as_ref()
                        .is_some_and(|l| l.get(&tool.key).is_some());
                    let count = if has_limit {
                        report::measure(tool)?.map(|m| m.count)
                    } else {
                        None
                    };
                    measured.insert(idx, count);
                }
                Step::Enforce(idx) => {
                    if outcomes[idx].is_some() {
                        continue;
                    }
                    let count = measured.get(&idx).copied().flatten();
                    let decision = tracker.evaluate(&self.tools[idx], count)?;
                    outcomes[idx] = Some(ToolOutcome::Decided(decision));
                }
            }
        }

        let results = self
            .tools
            .iter()
            .zip(outcomes)
            .filter_map(|(tool, outcome)| outcome.map(|o| (tool.clone(), o)))
            .collect();
        let report = PipelineReport { branch, results };
        info!(
            "Checked {} tools, {} failed",
            report.results.len(),
            report.failures().len()
        );
        Ok(report)
    }
}

fn gate_skip_reason(tool: &ToolSpec, branch: Option<&BranchClassification>) -> Option<String> {
    let branch = branch?;
    if branch.is_development() {
        return None;
    }
    Some(format!(
        "{} check runs on development branches only (feature/, bugfix/), not on '{}'. Skipping.",
        tool.display_name, branch.branch
    ))
}

/// Per-tool result of a run
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToolOutcome {
    /// Not analyzed on this branch
    Skipped(String),
    Decided(Decision),
}

#[derive(Debug, Clone)]
pub struct PipelineReport {
    /// Branch classification, if a gated tool needed it
    pub branch: Option<BranchClassification>,
    pub results: Vec<(ToolSpec, ToolOutcome)>,
}

impl PipelineReport {
    /// Failure messages in tool order.
    pub fn failures(&self) -> Vec<&str> {
        self.results
            .iter()
            .filter_map(|(_, outcome)| match outcome {
                ToolOutcome::Decided(Decision::Fail(reason)) => Some(reason.as_str()),
                _ => None,
            })
            .collect()
    }

    pub fn is_success(&self) -> bool {
        self.failures().is_empty()
    }

    pub fn outcome(&self, key: &str) -> Option<&ToolOutcome> {
        self.results
            .iter()
            .find(|(tool, _)| tool.key == key)
            .map(|(_, outcome)| outcome)
    }
}
