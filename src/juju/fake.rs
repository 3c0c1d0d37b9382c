//! In-memory `ModelClient` recording every call, for tests.

use std::collections::{BTreeMap, HashMap, VecDeque};
use std::path::Path;
use std::sync::Mutex;
use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;

use super::client::ModelClient;
use super::status::ModelStatus;
use crate::error::CouError;

#[derive(Default)]
pub struct FakeModel {
    calls: Mutex<Vec<String>>,
    config: Mutex<HashMap<(String, String), String>>,
    statuses: Mutex<VecDeque<ModelStatus>>,
    action_results: Mutex<BTreeMap<String, String>>,
    fail_on: Mutex<Option<String>>,
    refresh_delay: Option<Duration>,
}

impl FakeModel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(self, app: &str, key: &str, value: &str) -> Self {
        self.config
            .lock()
            .unwrap()
            .insert((app.to_string(), key.to_string()), value.to_string());
        self
    }

    /// Queue status snapshots; the last one keeps being returned.
    pub fn with_statuses(self, raw: &[&str]) -> Self {
        let mut statuses = self.statuses.lock().unwrap();
        for json in raw {
            statuses.push_back(ModelStatus::from_json(json.as_bytes()).unwrap());
        }
        drop(statuses);
        self
    }

    pub fn with_action_result(self, key: &str, value: &str) -> Self {
        self.action_results
            .lock()
            .unwrap()
            .insert(key.to_string(), value.to_string());
        self
    }

    /// Fail every call whose record starts with `prefix`.
    pub fn failing_on(self, prefix: &str) -> Self {
        *self.fail_on.lock().unwrap() = Some(prefix.to_string());
        self
    }

    /// Make every refresh take `delay` before it is recorded.
    pub fn with_refresh_delay(mut self, delay: Duration) -> Self {
        self.refresh_delay = Some(delay);
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn config_value(&self, app: &str, key: &str) -> Option<String> {
        self.config
            .lock()
            .unwrap()
            .get(&(app.to_string(), key.to_string()))
            .cloned()
    }

    fn record(&self, call: String) -> Result<()> {
        let failing = self
            .fail_on
            .lock()
            .unwrap()
            .as_ref()
            .is_some_and(|prefix| call.starts_with(prefix.as_str()));
        self.calls.lock().unwrap().push(call.clone());
        if failing {
            return Err(CouError::juju("fake", &format!("injected failure: {}", call)).into());
        }
        Ok(())
    }
}

#[async_trait]
impl ModelClient for FakeModel {
    async fn status(&self) -> Result<ModelStatus> {
        self.record("status".to_string())?;
        let mut statuses = self.statuses.lock().unwrap();
        let status = if statuses.len() > 1 {
            statuses.pop_front()
        } else {
            statuses.front().cloned()
        };
        Ok(status.unwrap_or_default())
    }

    async fn get_config(&self, app: &str, key: &str) -> Result<String> {
        self.record(format!("get-config {} {}", app, key))?;
        Ok(self.config_value(app, key).unwrap_or_default())
    }

    async fn set_config(&self, app: &str, key: &str, value: &str) -> Result<()> {
        self.record(format!("set-config {} {}={}", app, key, value))?;
        self.config
            .lock()
            .unwrap()
            .insert((app.to_string(), key.to_string()), value.to_string());
        Ok(())
    }

    async fn refresh(&self, app: &str, channel: Option<&str>) -> Result<()> {
        if let Some(delay) = self.refresh_delay {
            tokio::time::sleep(delay).await;
        }
        match channel {
            Some(channel) => self.record(format!("refresh {} --channel {}", app, channel)),
            None => self.record(format!("refresh {}", app)),
        }
    }

    async fn run_action(&self, unit: &str, action: &str) -> Result<BTreeMap<String, String>> {
        self.record(format!("run {} {}", unit, action))?;
        Ok(self.action_results.lock().unwrap().clone())
    }

    async fn copy_from_unit(
        &self,
        unit: &str,
        remote_path: &str,
        local_path: &Path,
    ) -> Result<()> {
        self.record(format!(
            "scp {}:{} {}",
            unit,
            remote_path,
            local_path.display()
        ))
    }
}
