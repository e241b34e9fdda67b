//! CLI command definitions and handlers

pub(crate) mod analyze;
mod tui;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::analysis::WalkLimits;
use crate::config::UserConfig;
use crate::navigation::Flow;

/// gitpulse - Branch divergence and commit activity explorer
#[derive(Parser, Debug)]
#[command(name = "gitpulse")]
#[command(
    version,
    about = "Explore how branches diverge and how a history evolves over time",
    after_help = "\
Examples:
  gitpulse compare                         Compare main with HEAD interactively
  gitpulse compare main feature/login      Compare two branches
  gitpulse compare --format json           JSON output for scripting
  gitpulse history v1.0 --format text      Activity report for a tag
  gitpulse history --search fix            Browse history filtered to 'fix'"
)]
pub struct Cli {
    /// Path to repository (default: current directory)
    #[arg(long, short = 'C', global = true, default_value = ".")]
    pub path: PathBuf,

    /// Log level (error, warn, info, debug, trace); RUST_LOG takes precedence
    #[arg(long, global = true, default_value = "warn", value_parser = ["error", "warn", "info", "debug", "trace"])]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Compare two refs: merge base, commits unique to each side, shared history
    #[command(after_help = "\
Keys:
  1-4        Open a detail view from the overview
  j/k        Move the cursor       Enter   Open the selected entry
  /          Search                Esc     Back / clear filter
  r          Reload                q       Quit")]
    Compare {
        /// First ref (branch, tag, or commit)
        #[arg(default_value = "main")]
        ref1: String,

        /// Second ref (branch, tag, or commit)
        #[arg(default_value = "HEAD")]
        ref2: String,

        /// Initial search filter
        #[arg(long, short = 's')]
        search: Option<String>,

        /// Output format: tui, text, json
        #[arg(long, short = 'f', default_value = "tui", value_parser = ["tui", "text", "json"])]
        format: String,

        /// Maximum commits listed per side
        #[arg(long)]
        limit: Option<usize>,
    },

    /// Explore one ref's history: timeline, activity, tags, merges
    History {
        /// Ref to walk (branch, tag, or commit)
        #[arg(default_value = "HEAD")]
        reference: String,

        /// Initial search filter
        #[arg(long, short = 's')]
        search: Option<String>,

        /// Output format: tui, text, json
        #[arg(long, short = 'f', default_value = "tui", value_parser = ["tui", "text", "json"])]
        format: String,

        /// Maximum commits scanned for activity statistics
        #[arg(long)]
        limit: Option<usize>,
    },

    /// Manage configuration (init or show)
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Initialize config file with example settings
    Init,
    /// Show the effective config and its path
    Show,
}

/// Run the CLI with parsed arguments
pub fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Compare {
            ref1,
            ref2,
            search,
            format,
            limit,
        } => {
            let config = UserConfig::load()?;
            let mut limits = config.walk;
            if let Some(limit) = limit {
                limits.ahead_limit = limit;
            }
            run_flow(&cli.path, Flow::Compare { ref1, ref2 }, search, limits, &format, &config)
        }

        Commands::History {
            reference,
            search,
            format,
            limit,
        } => {
            let config = UserConfig::load()?;
            let mut limits = config.walk;
            if let Some(limit) = limit {
                limits.history_limit = limit;
            }
            run_flow(&cli.path, Flow::History { reference }, search, limits, &format, &config)
        }

        Commands::Config { action } => run_config_action(action),
    }
}

fn run_flow(
    path: &std::path::Path,
    flow: Flow,
    search: Option<String>,
    limits: WalkLimits,
    format: &str,
    config: &UserConfig,
) -> Result<()> {
    if format == "tui" {
        tui::run(path.to_path_buf(), flow, search, limits, &config.ui)
    } else {
        analyze::run(path, &flow, search.as_deref(), limits, format)
    }
}

fn run_config_action(action: ConfigAction) -> anyhow::Result<()> {
    match action {
        ConfigAction::Init => {
            let path = UserConfig::init_user_config()?;
            println!("Config initialized at: {}", path.display());
            println!("\nOr override walk limits via environment:");
            println!("  export {}=200", crate::config::ENV_AHEAD_LIMIT);
            Ok(())
        }
        ConfigAction::Show => show_config(),
    }
}

fn show_config() -> anyhow::Result<()> {
    let config = UserConfig::load()?;
    if let Some(user_path) = UserConfig::user_config_path() {
        let status = if user_path.exists() { "✓" } else { "(not found)" };
        println!("Config: {} {}", user_path.display(), status);
    }
    println!();
    print!("{}", toml::to_string_pretty(&config)?);
    Ok(())
}
