//! Convergence wait: block until the model settles.

use std::time::Duration;

use anyhow::Result;
use indicatif::{ProgressBar, ProgressStyle};
use tokio::time::Instant;
use tracing::debug;

use super::OperationContext;
use crate::error::CouError;

/// Poll model status until every unit is idle.
///
/// A unit whose workload reports an error fails the wait immediately;
/// otherwise the wait gives up after `idle_timeout_minutes`.
pub async fn wait_for_idle(ctx: &OperationContext) -> Result<()> {
    let pb = create_spinner();
    pb.set_message("Waiting for all units to become idle");

    let result = poll_until_idle(ctx, &pb).await;

    pb.finish_and_clear();
    result
}

async fn poll_until_idle(ctx: &OperationContext, pb: &ProgressBar) -> Result<()> {
    let timeout = Duration::from_secs(ctx.settings.idle_timeout_minutes.saturating_mul(60));
    let interval = Duration::from_secs(ctx.settings.check_interval_seconds);
    let start = Instant::now();

    loop {
        let status = ctx.client.status().await?;

        if let Some((unit, message)) = status.errored_units().first() {
            return Err(CouError::UnitError {
                unit: unit.to_string(),
                message: message.to_string(),
            }
            .into());
        }

        if status.all_units_idle() {
            debug!("All units are idle");
            return Ok(());
        }

        let busy = status.busy_units();

        if start.elapsed() >= timeout {
            return Err(CouError::Timeout {
                operation: "model idle".to_string(),
                details: format!(
                    "{} unit(s) still busy after {} minutes: {}",
                    busy.len(),
                    ctx.settings.idle_timeout_minutes,
                    busy.join(", ")
                ),
            }
            .into());
        }

        debug!("Busy units: {}", busy.join(", "));
        pb.set_message(format!("Waiting for {} busy unit(s)", busy.len()));
        tokio::time::sleep(interval).await;
    }
}

/// Spinner for waits of unknown length.
fn create_spinner() -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} [{elapsed_precise}] {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.enable_steady_tick(Duration::from_secs(1));
    pb
}
