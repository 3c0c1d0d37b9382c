//! Juju CLI client wrapper.

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, Result};
use async_trait::async_trait;
use tokio::process::Command;
use tracing::debug;

use super::status::ModelStatus;
use crate::error::CouError;

/// Operations the upgrade steps need from the managed model.
#[async_trait]
pub trait ModelClient: Send + Sync {
    /// Current status of every application and unit.
    async fn status(&self) -> Result<ModelStatus>;

    /// Read a single charm configuration option.
    async fn get_config(&self, app: &str, key: &str) -> Result<String>;

    /// Set a single charm configuration option.
    async fn set_config(&self, app: &str, key: &str, value: &str) -> Result<()>;

    /// Refresh a charm, optionally switching it to another channel.
    async fn refresh(&self, app: &str, channel: Option<&str>) -> Result<()>;

    /// Run an action on a unit and wait for its results.
    async fn run_action(&self, unit: &str, action: &str) -> Result<BTreeMap<String, String>>;

    /// Copy a file from a unit to the local machine.
    async fn copy_from_unit(
        &self,
        unit: &str,
        remote_path: &str,
        local_path: &Path,
    ) -> Result<()>;
}

/// `ModelClient` backed by the `juju` command line.
#[derive(Debug, Clone)]
pub struct JujuCli {
    binary: String,
    model: Option<String>,
}

impl JujuCli {
    pub fn new(binary: impl Into<String>, model: Option<String>) -> Self {
        Self {
            binary: binary.into(),
            model,
        }
    }

    /// Run `juju <subcommand> [-m model] <args>` and return its stdout.
    async fn juju(&self, subcommand: &str, args: &[&str]) -> Result<Vec<u8>> {
        let mut cmd = Command::new(&self.binary);
        cmd.arg(subcommand);
        if let Some(model) = &self.model {
            cmd.args(["-m", model.as_str()]);
        }
        cmd.args(args).kill_on_drop(true);

        debug!("Running: {} {} {}", self.binary, subcommand, args.join(" "));

        let output = cmd.output().await.with_context(|| {
            format!(
                "Failed to execute '{} {}'. Is juju installed?",
                self.binary, subcommand
            )
        })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(CouError::juju(subcommand, &stderr).into());
        }

        Ok(output.stdout)
    }
}

#[async_trait]
impl ModelClient for JujuCli {
    async fn status(&self) -> Result<ModelStatus> {
        let stdout = self.juju("status", &["--format", "json"]).await?;
        ModelStatus::from_json(&stdout)
    }

    async fn get_config(&self, app: &str, key: &str) -> Result<String> {
        let stdout = self.juju("config", &[app, key]).await?;
        Ok(String::from_utf8_lossy(&stdout).trim().to_string())
    }

    async fn set_config(&self, app: &str, key: &str, value: &str) -> Result<()> {
        let pair = format!("{}={}", key, value);
        self.juju("config", &[app, pair.as_str()]).await?;
        Ok(())
    }

    async fn refresh(&self, app: &str, channel: Option<&str>) -> Result<()> {
        match channel {
            Some(channel) => self.juju("refresh", &[app, "--channel", channel]).await?,
            None => self.juju("refresh", &[app]).await?,
        };
        Ok(())
    }

    async fn run_action(&self, unit: &str, action: &str) -> Result<BTreeMap<String, String>> {
        let stdout = self
            .juju("run", &[unit, action, "--format", "json"])
            .await?;
        parse_action_results(unit, &stdout)
    }

    async fn copy_from_unit(
        &self,
        unit: &str,
        remote_path: &str,
        local_path: &Path,
    ) -> Result<()> {
        let source = format!("{}:{}", unit, remote_path);
        let target = local_path.to_string_lossy();
        self.juju("scp", &[source.as_str(), target.as_ref()]).await?;
        Ok(())
    }
}

/// Extract the flat `results` map of one unit from `juju run --format json` output.
fn parse_action_results(unit: &str, raw: &[u8]) -> Result<BTreeMap<String, String>> {
    let json: serde_json::Value =
        serde_json::from_slice(raw).context("Failed to parse juju run JSON output")?;

    let results = json
        .get(unit)
        .and_then(|u| u.get("results"))
        .and_then(|r| r.as_object())
        .ok_or_else(|| CouError::juju("run", &format!("no results reported for {}", unit)))?;

    Ok(results
        .iter()
        .filter_map(|(key, value)| match value {
            serde_json::Value::String(s) => Some((key.clone(), s.clone())),
            serde_json::Value::Number(n) => Some((key.clone(), n.to_string())),
            _ => None,
        })
        .collect())
}
