//! Model status as reported by `juju status --format json`.

use std::collections::BTreeMap;

use anyhow::{Context, Result};
use serde::Deserialize;

/// Agent status value of a unit with nothing left to do.
const AGENT_IDLE: &str = "idle";

/// Workload status value of a unit whose charm hit a hook error.
const WORKLOAD_ERROR: &str = "error";

/// Snapshot of the applications and units in a model.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ModelStatus {
    #[serde(default)]
    pub applications: BTreeMap<String, ApplicationStatus>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApplicationStatus {
    #[serde(default)]
    pub units: BTreeMap<String, UnitStatus>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UnitStatus {
    #[serde(default, rename = "workload-status")]
    pub workload_status: StatusInfo,
    #[serde(default, rename = "juju-status")]
    pub agent_status: StatusInfo,
    #[serde(default)]
    pub leader: bool,
    #[serde(default)]
    pub subordinates: BTreeMap<String, UnitStatus>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct StatusInfo {
    #[serde(default)]
    pub current: String,
    #[serde(default)]
    pub message: Option<String>,
}

impl ModelStatus {
    /// Parse the JSON document printed by `juju status --format json`.
    pub fn from_json(raw: &[u8]) -> Result<Self> {
        serde_json::from_slice(raw).context("Failed to parse juju status JSON output")
    }

    pub fn has_application(&self, app: &str) -> bool {
        self.applications.contains_key(app)
    }

    /// Name of the leader unit of an application.
    pub fn leader_unit(&self, app: &str) -> Option<&str> {
        self.applications
            .get(app)?
            .units
            .iter()
            .find(|(_, unit)| unit.leader)
            .map(|(name, _)| name.as_str())
    }

    /// All units in the model, subordinates included.
    pub fn units(&self) -> Vec<(&str, &UnitStatus)> {
        fn collect<'a>(
            units: &'a BTreeMap<String, UnitStatus>,
            out: &mut Vec<(&'a str, &'a UnitStatus)>,
        ) {
            for (name, unit) in units {
                out.push((name.as_str(), unit));
                collect(&unit.subordinates, out);
            }
        }

        let mut out = Vec::new();
        for app in self.applications.values() {
            collect(&app.units, &mut out);
        }
        out
    }

    /// Units whose agent is still executing hooks.
    pub fn busy_units(&self) -> Vec<&str> {
        self.units()
            .into_iter()
            .filter(|(_, unit)| unit.agent_status.current != AGENT_IDLE)
            .map(|(name, _)| name)
            .collect()
    }

    /// Units whose workload reports an error, with the status message.
    pub fn errored_units(&self) -> Vec<(&str, &str)> {
        self.units()
            .into_iter()
            .filter(|(_, unit)| unit.workload_status.current == WORKLOAD_ERROR)
            .map(|(name, unit)| (name, unit.workload_status.message.as_deref().unwrap_or("")))
            .collect()
    }

    pub fn all_units_idle(&self) -> bool {
        self.busy_units().is_empty()
    }
}
