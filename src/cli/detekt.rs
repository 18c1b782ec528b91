//! Render-detekt command - fill maxIssues in the detekt config

use anyhow::{Context, Result};
use std::path::PathBuf;

use qualigate::budget::LimitsStore;
use qualigate::config::Settings;
use qualigate::detekt;

pub fn run(settings: &Settings, template: Option<PathBuf>, output: Option<PathBuf>) -> Result<()> {
    let template = template
        .or_else(|| settings.detekt_template.clone())
        .context("No detekt template. Pass --template or set [detekt] template in qualigate.toml")?;
    let output = output.unwrap_or_else(|| settings.detekt_output.clone());

    let limits = LimitsStore::new(&settings.limits_file).load()?;
    let issues = detekt::write_config(&template, &output, limits.as_ref())
        .with_context(|| format!("Failed to render {}", template.display()))?;

    println!("Wrote {} (maxIssues: {})", output.display(), issues);
    Ok(())
}
