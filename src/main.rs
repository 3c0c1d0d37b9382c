//! cou - Charmed OpenStack upgrade CLI tool.
//!
//! Builds an upgrade plan for a charm-managed OpenStack cloud and walks it
//! with the operator:
//! - MySQL database backup before anything changes
//! - Keystone upgrade ahead of the rest of the control plane
//! - Control plane charm refreshes, optionally run concurrently
//! - Convergence waits between phases

mod config;
mod error;
mod juju;
mod operations;
mod output;
mod plan;
mod release;

use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use colored::Colorize;
use tracing::{debug, error};

use config::{Args, Config, Mode};
use error::CouError;
use juju::JujuCli;
use operations::OperationContext;
use output::print_run_summary;
use plan::{Executor, PlanConfig, TerminalPrompter, dump_plan, generate_plan};
use release::CloudRelease;

#[tokio::main]
async fn main() {
    let args = Args::parse();
    let config = Config::from_args(args);

    // Initialize logging
    if let Err(e) = init_tracing(&config.log_level) {
        eprintln!("Failed to initialize logging: {}", e);
        std::process::exit(1);
    }

    debug!("Starting cou - Charmed OpenStack Upgrade Tool");

    if let Err(e) = run(&config).await {
        error!("{}", e);
        std::process::exit(1);
    }
}

/// Main application logic.
async fn run(config: &Config) -> Result<()> {
    let target = CloudRelease::new(&config.series, &config.target)?;
    let plan_config = PlanConfig::new(target, config.control_plane.clone())?;
    let plan = generate_plan(&plan_config);
    debug!("Generated plan with {} steps", plan.step_count());

    println!(
        "{}",
        format!("Upgrade Plan: {} -> {}", plan_config.source, plan_config.target)
            .cyan()
            .bold()
    );
    print!("{}", dump_plan(&plan));

    if config.mode == Mode::Plan {
        return Ok(());
    }

    let client = JujuCli::new(config.juju_bin.clone(), config.model.clone());
    let ctx = OperationContext::new(Arc::new(client), config.operation_settings());
    let executor = Executor::new(&ctx, TerminalPrompter)
        .auto_approve(config.yes)
        .concurrent(config.parallel);

    println!();
    println!("{}", "Executing upgrade plan".cyan().bold());
    let report = executor.apply_plan(&plan).await?;
    print_run_summary(&report);

    if report.aborted {
        return Err(CouError::Aborted.into());
    }

    Ok(())
}

/// Initialize tracing subscriber.
fn init_tracing(log_level: &str) -> Result<()> {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(log_level))
        .map_err(|e| anyhow::anyhow!("Failed to initialize log filter: {}", e))?;

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .init();

    Ok(())
}
