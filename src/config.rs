//! CLI configuration and argument parsing.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::operations::OperationSettings;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const COMMIT: &str = env!("BUILD_COMMIT");
pub const BUILD_DATE: &str = env!("BUILD_DATE");

/// Charmed OpenStack upgrade CLI tool.
///
/// Builds an ordered upgrade plan for a charm-managed OpenStack cloud and
/// walks it step by step, asking the operator to continue, skip or abort.
#[derive(Parser, Debug, Clone)]
#[command(name = "cou")]
#[command(about = "Charmed OpenStack upgrade CLI tool")]
#[command(version = const_format::formatcp!(
    "{} (commit: {}, build date: {})",
    VERSION, COMMIT, BUILD_DATE
))]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,

    /// Juju model hosting the cloud (defaults to the current model)
    #[arg(short, long, env = "JUJU_MODEL", global = true)]
    pub model: Option<String>,

    /// Path to the juju binary
    #[arg(long, env = "COU_JUJU_BIN", default_value = "juju", global = true)]
    pub juju_bin: String,

    /// Ubuntu series the cloud runs on
    #[arg(long, default_value = "focal", global = true)]
    pub series: String,

    /// Target OpenStack release codename (e.g., victoria)
    #[arg(short, long, default_value = "victoria", global = true)]
    pub target: String,

    /// Control plane applications to upgrade, in order (comma separated)
    #[arg(long = "control-plane", value_delimiter = ',', global = true)]
    pub control_plane: Vec<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info", env = "COU_LOG_LEVEL", global = true)]
    pub log_level: String,
}

/// Top-level subcommands.
#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Print the upgrade plan without executing it
    Plan,

    /// Walk the upgrade plan and execute confirmed steps
    Run(RunArgs),
}

/// Options only meaningful when executing a plan.
#[derive(clap::Args, Debug, Clone)]
pub struct RunArgs {
    /// Confirm every step without prompting
    #[arg(short, long, default_value = "false")]
    pub yes: bool,

    /// Run steps marked parallel concurrently
    #[arg(long, default_value = "false")]
    pub parallel: bool,

    /// Directory receiving database backups
    #[arg(long, default_value = ".")]
    pub backup_dir: PathBuf,

    /// Minutes to wait for the model to become idle
    #[arg(long, default_value = "30")]
    pub idle_timeout: u64,

    /// Seconds between model status checks
    #[arg(long, default_value = "10")]
    pub check_interval: u64,
}

/// What the invocation should do with the generated plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Plan,
    Run,
}

/// Application configuration derived from CLI args.
#[derive(Debug, Clone)]
pub struct Config {
    pub mode: Mode,
    pub model: Option<String>,
    pub juju_bin: String,
    pub series: String,
    pub target: String,
    pub control_plane: Vec<String>,
    pub log_level: String,
    pub yes: bool,
    pub parallel: bool,
    pub backup_dir: PathBuf,
    pub idle_timeout_minutes: u64,
    pub check_interval_seconds: u64,
}

impl Config {
    /// Create config from CLI arguments.
    pub fn from_args(args: Args) -> Self {
        let defaults = OperationSettings::default();
        let (mode, run) = match args.command {
            Command::Plan => (Mode::Plan, None),
            Command::Run(run) => (Mode::Run, Some(run)),
        };

        let control_plane = args
            .control_plane
            .into_iter()
            .map(|app| app.trim().to_string())
            .filter(|app| !app.is_empty())
            .collect();

        Self {
            mode,
            model: args.model,
            juju_bin: args.juju_bin,
            series: args.series.to_lowercase(),
            target: args.target.to_lowercase(),
            control_plane,
            log_level: args.log_level,
            yes: run.as_ref().is_some_and(|r| r.yes),
            parallel: run.as_ref().is_some_and(|r| r.parallel),
            backup_dir: run
                .as_ref()
                .map(|r| r.backup_dir.clone())
                .unwrap_or(defaults.backup_dir),
            idle_timeout_minutes: run
                .as_ref()
                .map_or(defaults.idle_timeout_minutes, |r| r.idle_timeout),
            check_interval_seconds: run
                .as_ref()
                .map_or(defaults.check_interval_seconds, |r| r.check_interval.max(1)),
        }
    }

    /// Settings handed to every operation of the plan.
    pub fn operation_settings(&self) -> OperationSettings {
        OperationSettings {
            backup_dir: self.backup_dir.clone(),
            idle_timeout_minutes: self.idle_timeout_minutes,
            check_interval_seconds: self.check_interval_seconds,
        }
    }
}
