//! Init command - write an example qualigate.toml

use anyhow::{Context, Result};
use console::style;
use std::io::Write;
use std::path::Path;

use qualigate::budget::LimitsStore;
use qualigate::config::{load_project_config, CONFIG_FILE};

const EXAMPLE_CONFIG: &str = r#"# qualigate configuration
# Every setting is optional; the values below are the defaults.

# Violation limits, one `tool=count` per line
limits_file = "static-analysis.properties"

# Build output directory holding the analysis reports
build_dir = "target"

# Environment variable marking a CI run (CI never rewrites limits)
ci_env = "CI"

# [tools.checkstyle]
# report = "target/reports/checkstyle/main.xml"
# lower_bound = { percent = 95 }

# [tools.findbugs]
# report = "target/spotbugsReports/main.xml"
# lower_bound = { margin = 10 }
# branch_gated = true

# [tools.detekt]
# enabled = false

# [detekt]
# template = "config/detekt.yml"
"#;

/// Run the init command
pub fn run(path: &Path) -> Result<()> {
    let repo_path = path
        .canonicalize()
        .with_context(|| format!("Path does not exist: {}", path.display()))?;

    if !repo_path.is_dir() {
        anyhow::bail!("Path is not a directory: {}", repo_path.display());
    }

    let config_path = repo_path.join(CONFIG_FILE);
    if config_path.exists() {
        println!(
            "{} Already initialized at {}",
            style("✓").green(),
            style(config_path.display()).cyan()
        );
    } else {
        std::fs::write(&config_path, EXAMPLE_CONFIG)
            .with_context(|| "Failed to create config file")?;
        println!(
            "{} Created {}",
            style("✓").green(),
            style(CONFIG_FILE).cyan()
        );
    }

    // The writer lock and temp files sit next to the limits file
    let settings = load_project_config(&repo_path)?.finalize(&repo_path)?;
    let store = LimitsStore::new(&settings.limits_file);
    let ignored: Vec<String> = [store.lock_path(), store.tmp_path()]
        .iter()
        .map(|p| {
            p.strip_prefix(&repo_path)
                .unwrap_or(p)
                .to_string_lossy()
                .replace('\\', "/")
        })
        .collect();

    let gitignore_path = repo_path.join(".gitignore");
    if gitignore_path.exists() {
        let content = std::fs::read_to_string(&gitignore_path)
            .with_context(|| format!("Failed to read {}", gitignore_path.display()))?;
        if !content.lines().any(|line| line.trim() == ignored[0]) {
            let gitignore_entry = format!("\n# qualigate\n{}\n", ignored.join("\n"));
            let mut file = std::fs::OpenOptions::new()
                .append(true)
                .open(&gitignore_path)?;
            file.write_all(gitignore_entry.as_bytes())?;
            println!(
                "{} Added lock and temp files to {}",
                style("✓").green(),
                style(".gitignore").cyan()
            );
        }
    }

    println!("\nNext steps:");
    println!("  {} Store a limit", style("qualigate limits set checkstyle 100").cyan());
    println!("  {} Check the reports", style("qualigate check").cyan());

    Ok(())
}
