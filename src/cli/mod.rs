//! CLI command definitions and handlers

mod branch;
mod check;
mod detekt;
mod init;
mod limits;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

use qualigate::config::{load_project_config, Settings};

/// qualigate - static analysis budget gate
#[derive(Parser, Debug)]
#[command(name = "qualigate")]
#[command(
    version,
    about = "Static analysis budget gate: ratchets checkstyle/SpotBugs/detekt violation limits",
    long_about = "qualigate compares the violation counts in freshly generated analysis \
reports with the limits stored in static-analysis.properties.\n\n\
Too many violations fail the build. Far fewer violations lower the stored limit on \
developer machines, and fail on CI so a human commits the tighter limit.",
    after_help = "\
Examples:
  qualigate check                        Check every configured tool
  qualigate check --tool checkstyle      Check one tool
  qualigate check --ci                   CI mode: never rewrite limits
  qualigate branch --identifier          Print a file-name-safe branch name
  qualigate limits set findbugs 20       Store a limit"
)]
pub struct Cli {
    /// Repository root (default: current directory)
    #[arg(long, short = 'C', global = true, default_value = ".")]
    pub path: PathBuf,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, global = true, default_value = "info", value_parser = ["error", "warn", "info", "debug", "trace"])]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Write an example qualigate.toml
    Init,

    /// Compare report violation counts with the stored limits
    #[command(after_help = "\
Exit status is 1 when any tool has too many violations, or when a limit is
too high on CI. Locally, limits that are too high are lowered in place.")]
    Check {
        /// Only check these tools (limits-file keys)
        #[arg(long = "tool", short = 't')]
        tools: Vec<String>,

        /// CI run: fail instead of lowering limits (also set by the ci_env variable)
        #[arg(long)]
        ci: bool,
    },

    /// Show how the current branch is classified
    Branch {
        /// Print only the normalized branch identifier
        #[arg(long, conflicts_with = "require_development")]
        identifier: bool,

        /// Exit with code 1 unless this is a development branch
        #[arg(long)]
        require_development: bool,
    },

    /// Show or edit stored limits
    Limits {
        #[command(subcommand)]
        action: LimitsAction,
    },

    /// Render the detekt config template with the budgeted maxIssues
    RenderDetekt {
        /// Template with a %MAX_ISSUES% placeholder (default: from qualigate.toml)
        #[arg(long)]
        template: Option<PathBuf>,

        /// Output file (default: <build_dir>/detekt.yml)
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,
    },
}

#[derive(Subcommand, Debug)]
pub enum LimitsAction {
    /// Print the stored limits
    Show,
    /// Store a limit for a tool
    Set {
        /// Limits-file key (e.g. checkstyle, findbugs, detekt)
        key: String,
        /// Non-negative violation count
        value: u32,
    },
}

/// Run the CLI with parsed arguments
pub fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Init => init::run(&cli.path),
        Commands::Check { tools, ci } => {
            let settings = load_settings(&cli.path)?;
            check::run(&settings, &tools, ci)
        }
        Commands::Branch {
            identifier,
            require_development,
        } => branch::run(&cli.path, identifier, require_development),
        Commands::Limits { action } => {
            let settings = load_settings(&cli.path)?;
            match action {
                LimitsAction::Show => limits::show(&settings),
                LimitsAction::Set { key, value } => limits::set(&settings, &key, value),
            }
        }
        Commands::RenderDetekt { template, output } => {
            let settings = load_settings(&cli.path)?;
            detekt::run(&settings, template, output)
        }
    }
}

/// Both configuration phases: defaults + file, then finalize.
fn load_settings(path: &Path) -> Result<Settings> {
    let root = path
        .canonicalize()
        .with_context(|| format!("Path does not exist: {}", path.display()))?;
    let settings = load_project_config(&root)?.finalize(&root)?;
    Ok(settings)
}
