//! Branch command - show git-flow classification

use anyhow::{Context, Result};
use console::style;
use std::path::Path;

use qualigate::git::{BranchPolicy, GitRepository};

/// Run the branch command
pub fn run(path: &Path, identifier_only: bool, require_development: bool) -> Result<()> {
    let repo = GitRepository::open(path)
        .with_context(|| format!("Not a git repository: {}", path.display()))?;
    let branch = BranchPolicy::new(&repo)
        .classify()
        .context("Failed to classify the current branch")?;

    if identifier_only {
        println!("{}", branch.identifier);
        return Ok(());
    }

    println!("  Branch:      {}", style(&branch.branch).cyan());
    println!(
        "  Nearest tag: {}",
        branch.nearest_tag.as_deref().unwrap_or("(none)")
    );
    println!("  Identifier:  {}", branch.identifier);
    if branch.stable {
        println!("  Class:       {}", style("stable").yellow());
    } else {
        println!("  Class:       {}", style("development").green());
    }

    if require_development && branch.stable {
        eprintln!(
            "Branch '{}' is a stable branch; branch-gated analysis does not run here",
            branch.branch
        );
        std::process::exit(1);
    }

    Ok(())
}
