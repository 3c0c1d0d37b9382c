//! Upgrade plan assembly.

use super::step::Step;
use crate::error::CouError;
use crate::operations::Operation;
use crate::release::CloudRelease;

/// Identity service, upgraded on its own before the rest of the control plane.
pub const KEYSTONE: &str = "keystone";

/// Control plane applications upgraded after keystone, in plan order.
pub const DEFAULT_CONTROL_PLANE: &[&str] = &[
    "cinder",
    "glance",
    "placement",
    "nova-cloud-controller",
    "neutron-api",
    "neutron-gateway",
];

/// What the plan upgrades and to which release.
#[derive(Debug, Clone)]
pub struct PlanConfig {
    pub target: CloudRelease,
    pub source: CloudRelease,
    pub keystone: String,
    pub control_plane: Vec<String>,
}

impl PlanConfig {
    /// Plan an upgrade to `target` from the release right before it.
    ///
    /// An empty `control_plane` selects [`DEFAULT_CONTROL_PLANE`].
    pub fn new(target: CloudRelease, control_plane: Vec<String>) -> Result<Self, CouError> {
        let source = target.previous().ok_or_else(|| {
            CouError::InvalidRelease(format!(
                "{} is the {} distro release, there is nothing to upgrade from",
                target.codename(),
                target.series()
            ))
        })?;

        let control_plane = if control_plane.is_empty() {
            DEFAULT_CONTROL_PLANE.iter().map(|s| s.to_string()).collect()
        } else {
            control_plane
        };

        Ok(Self {
            target,
            source,
            keystone: KEYSTONE.to_string(),
            control_plane,
        })
    }

    fn component_upgrade(&self, app: &str) -> Step {
        Step::new(format!("Upgrade without action-managed-upgrade {}", app)).with_operation(
            Operation::ComponentUpgrade {
                app: app.to_string(),
                old_origin: self.source.origin(),
                new_origin: self.target.origin(),
                channel: self.target.channel(),
            },
        )
    }
}

fn wait_for_upgrade() -> Step {
    Step::new("Wait for upgrade")
        .with_operation(Operation::WaitForIdle)
        .without_confirmation()
}

/// Generate the upgrade plan tree.
pub fn generate_plan(config: &PlanConfig) -> Step {
    let mut plan =
        Step::new(format!("Top level plan: upgrade to {}", config.target)).without_confirmation();

    plan.add_step(Step::new("Backup mysql databases").with_operation(Operation::Backup));

    let keystone = plan.add_step(Step::new(format!("Upgrade {}", config.keystone)));
    keystone.add_step(config.component_upgrade(&config.keystone));
    keystone.add_step(wait_for_upgrade());

    let control_plane = plan.add_step(Step::new("Upgrade control plane"));
    for app in &config.control_plane {
        control_plane.add_step(config.component_upgrade(app).parallel(true));
    }
    control_plane.add_step(wait_for_upgrade());

    plan
}
