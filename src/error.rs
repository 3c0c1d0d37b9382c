//! Custom error types for cou.

use thiserror::Error;

/// Errors that can occur while planning or executing a cloud upgrade.
#[derive(Error, Debug)]
pub enum CouError {
    #[error("juju {command} failed: {details}")]
    Juju { command: String, details: String },

    #[error("Unsupported Ubuntu series: {0}")]
    UnsupportedSeries(String),

    #[error("Invalid OpenStack release: {0}")]
    InvalidRelease(String),

    #[error("Application not found in model: {0}")]
    ApplicationNotFound(String),

    #[error("Backup failed: {0}")]
    Backup(String),

    #[error("Unit {unit} is in error state: {message}")]
    UnitError { unit: String, message: String },

    #[error("Timeout waiting for {operation}: {details}")]
    Timeout { operation: String, details: String },

    #[error("Failed to read operator input: {0}")]
    Prompt(String),

    #[error("Upgrade plan aborted by operator")]
    Aborted,
}

impl CouError {
    /// Build a juju CLI error from the subcommand and its stderr.
    pub fn juju(command: &str, stderr: &str) -> Self {
        let details = stderr.trim();
        CouError::Juju {
            command: command.to_string(),
            details: if details.is_empty() {
                "no output on stderr".to_string()
            } else {
                details.lines().last().unwrap_or(details).to_string()
            },
        }
    }
}
