//! Configuration module for qualigate
//!
//! This module handles:
//! - Project-level configuration (qualigate.toml)
//! - Tool table overrides and additional tools
//! - CI run detection

mod project_config;

pub use project_config::{
    is_ci,
    load_project_config,
    DetektConfig,
    ProjectConfig,
    Settings,
    ToolOverride,
    CONFIG_FILE,
};
