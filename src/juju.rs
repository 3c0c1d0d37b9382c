//! Juju model access.

pub mod client;
#[cfg(test)]
pub mod fake;
pub mod status;

pub use client::{JujuCli, ModelClient};
