//! Side-effecting upgrade operations bound to plan steps.
//!
//! Each operation carries the named arguments it was bound with when the
//! plan was built and runs them against the managed model unchanged.

pub mod backup;
pub mod charm;
pub mod idle;

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;

use crate::juju::ModelClient;

/// Settings shared by every operation of a run.
#[derive(Debug, Clone)]
pub struct OperationSettings {
    pub backup_dir: PathBuf,
    pub idle_timeout_minutes: u64,
    pub check_interval_seconds: u64,
}

impl Default for OperationSettings {
    fn default() -> Self {
        Self {
            backup_dir: PathBuf::from("."),
            idle_timeout_minutes: 30,
            check_interval_seconds: 10,
        }
    }
}

/// Everything an operation needs to act on the cloud.
#[derive(Clone)]
pub struct OperationContext {
    pub client: Arc<dyn ModelClient>,
    pub settings: OperationSettings,
}

impl OperationContext {
    pub fn new(client: Arc<dyn ModelClient>, settings: OperationSettings) -> Self {
        Self { client, settings }
    }
}

/// A registered operation with its bound arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation {
    /// Dump the cloud's MySQL databases and copy the dump locally.
    Backup,
    /// Upgrade one OpenStack charm without action-managed-upgrade.
    ComponentUpgrade {
        app: String,
        old_origin: String,
        new_origin: String,
        channel: String,
    },
    /// Block until every unit in the model is idle.
    WaitForIdle,
}

impl Operation {
    pub fn name(&self) -> &'static str {
        match self {
            Operation::Backup => "backup",
            Operation::ComponentUpgrade { .. } => "component_upgrade",
            Operation::WaitForIdle => "wait_for_idle",
        }
    }

    /// Bound arguments as ordered `(name, value)` pairs.
    pub fn args(&self) -> Vec<(&'static str, &str)> {
        match self {
            Operation::ComponentUpgrade {
                app,
                old_origin,
                new_origin,
                channel,
            } => vec![
                ("app", app.as_str()),
                ("old_origin", old_origin.as_str()),
                ("new_origin", new_origin.as_str()),
                ("channel", channel.as_str()),
            ],
            Operation::Backup | Operation::WaitForIdle => Vec::new(),
        }
    }

    /// Run the operation; failures are returned as-is.
    pub async fn execute(&self, ctx: &OperationContext) -> Result<()> {
        match self {
            Operation::Backup => backup::backup(ctx).await.map(|_| ()),
            Operation::ComponentUpgrade {
                app,
                old_origin,
                new_origin,
                channel,
            } => {
                charm::component_upgrade(ctx.client.as_ref(), app, old_origin, new_origin, channel)
                    .await
            }
            Operation::WaitForIdle => idle::wait_for_idle(ctx).await,
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let args: Vec<String> = self
            .args()
            .iter()
            .map(|(name, value)| format!("{}={}", name, value))
            .collect();
        write!(f, "{}({})", self.name(), args.join(", "))
    }
}
