//! Project-level configuration support
//!
//! Loads per-project configuration from `qualigate.toml` in the repository
//! root. Every setting has a default, so the file is optional.
//!
//! Configuration happens in two phases. [`load_project_config`] declares
//! the defaults and layers the file over them; [`ProjectConfig::finalize`]
//! runs once everything is known and resolves paths and the tool table
//! into [`Settings`].
//!
//! # Configuration Format
//!
//! ```toml
//! # qualigate.toml
//! limits_file = "static-analysis.properties"
//! build_dir = "target"
//! ci_env = "CI"
//!
//! [tools.findbugs]
//! branch_gated = false
//!
//! [tools.pmd]
//! display_name = "PMD"
//! marker = "violation"
//! report = "target/reports/pmd/main.xml"
//! lower_bound = { margin = 5 }
//!
//! [detekt]
//! template = "config/detekt.yml"
//! ```

use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::budget::{validate_key, LowerBound, ToolSpec, DEFAULT_LIMITS_FILE};
use crate::error::{GateError, Result};

pub const CONFIG_FILE: &str = "qualigate.toml";

/// Project configuration as written in `qualigate.toml`
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProjectConfig {
    /// Limits file, relative to the repository root
    #[serde(default = "default_limits_file")]
    pub limits_file: PathBuf,

    /// Build output directory used for default report locations
    #[serde(default = "default_build_dir")]
    pub build_dir: PathBuf,

    /// Environment variable that marks a CI run
    #[serde(default = "default_ci_env")]
    pub ci_env: String,

    /// Per-tool overrides and additional tools
    #[serde(default)]
    pub tools: BTreeMap<String, ToolOverride>,

    /// detekt config rendering
    #[serde(default)]
    pub detekt: DetektConfig,
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self {
            limits_file: default_limits_file(),
            build_dir: default_build_dir(),
            ci_env: default_ci_env(),
            tools: BTreeMap::new(),
            detekt: DetektConfig::default(),
        }
    }
}

fn default_limits_file() -> PathBuf {
    PathBuf::from(DEFAULT_LIMITS_FILE)
}

fn default_build_dir() -> PathBuf {
    PathBuf::from("target")
}

fn default_ci_env() -> String {
    "CI".to_string()
}

/// Override for a built-in tool, or the full description of a new one
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct ToolOverride {
    #[serde(default)]
    pub enabled: Option<bool>,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub marker: Option<String>,
    #[serde(default)]
    pub report: Option<PathBuf>,
    #[serde(default)]
    pub lower_bound: Option<LowerBound>,
    #[serde(default)]
    pub branch_gated: Option<bool>,
}

/// Where the detekt template comes from and where the rendered config goes
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct DetektConfig {
    #[serde(default)]
    pub template: Option<PathBuf>,
    #[serde(default)]
    pub output: Option<PathBuf>,
}

/// Fully resolved configuration
#[derive(Debug, Clone)]
pub struct Settings {
    pub root: PathBuf,
    pub limits_file: PathBuf,
    pub ci_env: String,
    /// Enabled tools, built-ins first, then extra tools by key
    pub tools: Vec<ToolSpec>,
    pub detekt_template: Option<PathBuf>,
    pub detekt_output: PathBuf,
}

impl Settings {
    pub fn tool(&self, key: &str) -> Option<&ToolSpec> {
        self.tools.iter().find(|t| t.key == key)
    }

    /// CI if `--ci` was passed or the configured variable says so.
    pub fn is_ci_run(&self, flag: bool) -> bool {
        is_ci(flag, std::env::var(&self.ci_env).ok().as_deref())
    }
}

/// Environment values other than empty, `0`, `false`, `no`, `off` mean CI.
pub fn is_ci(flag: bool, env_value: Option<&str>) -> bool {
    if flag {
        return true;
    }
    match env_value.map(|v| v.trim().to_ascii_lowercase()) {
        None => false,
        Some(v) => !matches!(v.as_str(), "" | "0" | "false" | "no" | "off"),
    }
}

/// Load configuration from the repository root.
///
/// Returns defaults if there is no `qualigate.toml`. A file that exists but
/// does not parse is an error: it configures the gate's policy.
pub fn load_project_config(repo_path: &Path) -> Result<ProjectConfig> {
    let toml_path = repo_path.join(CONFIG_FILE);
    if !toml_path.exists() {
        debug!("No project config found, using defaults");
        return Ok(ProjectConfig::default());
    }

    let content = std::fs::read_to_string(&toml_path)?;
    let config: ProjectConfig = toml::from_str(&content)
        .map_err(|e| GateError::Config(format!("{}: {}", toml_path.display(), e)))?;
    debug!("Loaded project config from {}", toml_path.display());
    Ok(config)
}

impl ProjectConfig {
    /// Resolve paths against `root` and build the tool table.
    pub fn finalize(self, root: &Path) -> Result<Settings> {
        let build_dir = root.join(&self.build_dir);
        let mut overrides = self.tools;
        let mut tools = Vec::new();

        let builtins = [
            ToolSpec::checkstyle(build_dir.join("reports").join("checkstyle").join("main.xml")),
            ToolSpec::spotbugs(build_dir.join("spotbugsReports").join("main.xml")),
            ToolSpec::detekt(build_dir.join("reports").join("detekt").join("detekt.xml")),
        ];
        for mut spec in builtins {
            let over = overrides.remove(&spec.key).unwrap_or_default();
            if over.enabled == Some(false) {
                debug!("Tool {} disabled in config", spec.key);
                continue;
            }
            apply_override(&mut spec, over, root);
            tools.push(spec);
        }

        for (key, over) in overrides {
            if over.enabled == Some(false) {
                continue;
            }
            let missing = |field: &str| {
                GateError::Config(format!(
                    "tool '{}' is not built in and needs a '{}'",
                    key, field
                ))
            };
            let mut spec = ToolSpec {
                key: key.clone(),
                display_name: key.clone(),
                marker: over.marker.clone().ok_or_else(|| missing("marker"))?,
                report: over.report.clone().ok_or_else(|| missing("report"))?,
                lower_bound: LowerBound::Percent(95),
                branch_gated: false,
            };
            apply_override(&mut spec, over, root);
            tools.push(spec);
        }

        for spec in &tools {
            validate_tool(spec)?;
        }

        Ok(Settings {
            root: root.to_path_buf(),
            limits_file: root.join(&self.limits_file),
            ci_env: self.ci_env,
            tools,
            detekt_template: self.detekt.template.map(|p| root.join(p)),
            detekt_output: self
                .detekt
                .output
                .map(|p| root.join(p))
                .unwrap_or_else(|| build_dir.join("detekt.yml")),
        })
    }
}

fn validate_tool(spec: &ToolSpec) -> Result<()> {
    validate_key(&spec.key)?;
    if let LowerBound::Percent(percent) = spec.lower_bound {
        // Above 100 the lower bound exceeds the limit itself
        if percent > 100 {
            return Err(GateError::Config(format!(
                "tool '{}': lower_bound percent must be at most 100, got {}",
                spec.key, percent
            )));
        }
    }
    Ok(())
}

fn apply_override(spec: &mut ToolSpec, over: ToolOverride, root: &Path) {
    if let Some(name) = over.display_name {
        spec.display_name = name;
    }
    if let Some(marker) = over.marker {
        spec.marker = marker;
    }
    if let Some(report) = over.report {
        spec.report = root.join(report);
    }
    if let Some(bound) = over.lower_bound {
        spec.lower_bound = bound;
    }
    if let Some(gated) = over.branch_gated {
        spec.branch_gated = gated;
    }
}
