//! Charm refresh and configuration operations.

use anyhow::Result;
use tracing::{info, warn};

use crate::juju::ModelClient;

/// Charm option holding the package origin of an OpenStack service.
pub const ORIGIN_KEY: &str = "openstack-origin";

/// Charm option that, when true, defers package upgrades to an action.
pub const ACTION_MANAGED_UPGRADE_KEY: &str = "action-managed-upgrade";

/// Upgrade a charm to the latest revision in the current channel.
pub async fn charm_upgrade(client: &dyn ModelClient, app: &str) -> Result<()> {
    info!("Upgrading {} to the latest revision in the current channel", app);
    client.refresh(app, None).await
}

/// Refresh a charm to track a target channel.
pub async fn charm_channel_refresh(
    client: &dyn ModelClient,
    app: &str,
    channel: &str,
) -> Result<()> {
    info!("Refresh {} to the {} channel", app, channel);
    client.refresh(app, Some(channel)).await
}

/// Upgrade an OpenStack application in one go, with action-managed-upgrade disabled.
pub async fn component_upgrade(
    client: &dyn ModelClient,
    app: &str,
    old_origin: &str,
    new_origin: &str,
    channel: &str,
) -> Result<()> {
    let current_origin = client.get_config(app, ORIGIN_KEY).await?;
    if current_origin == new_origin {
        info!("{} is already on {}, nothing to do", app, new_origin);
        return Ok(());
    }
    if current_origin != old_origin {
        warn!(
            "{} has {}={} but {} was expected; upgrading anyway",
            app, ORIGIN_KEY, current_origin, old_origin
        );
    }

    charm_upgrade(client, app).await?;
    client.set_config(app, ACTION_MANAGED_UPGRADE_KEY, "false").await?;
    charm_channel_refresh(client, app, channel).await?;
    client.set_config(app, ORIGIN_KEY, new_origin).await?;

    info!("{} upgraded to {}", app, new_origin);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::juju::fake::FakeModel;

    #[tokio::test]
    async fn test_component_upgrade_call_order() {
        let model = FakeModel::new().with_config("glance", ORIGIN_KEY, "distro");

        component_upgrade(
            &model,
            "glance",
            "distro",
            "cloud:focal-victoria",
            "victoria/stable",
        )
        .await
        .unwrap();

        assert_eq!(
            model.calls(),
            vec![
                "get-config glance openstack-origin",
                "refresh glance",
                "set-config glance action-managed-upgrade=false",
                "refresh glance --channel victoria/stable",
                "set-config glance openstack-origin=cloud:focal-victoria",
            ]
        );
    }

    #[tokio::test]
    async fn test_component_upgrade_already_on_target() {
        let model = FakeModel::new().with_config("cinder", ORIGIN_KEY, "cloud:focal-victoria");

        component_upgrade(
            &model,
            "cinder",
            "distro",
            "cloud:focal-victoria",
            "victoria/stable",
        )
        .await
        .unwrap();

        assert_eq!(model.calls(), vec!["get-config cinder openstack-origin"]);
    }

    #[tokio::test]
    async fn test_component_upgrade_unexpected_origin_still_upgrades() {
        let model = FakeModel::new().with_config("placement", ORIGIN_KEY, "cloud:focal-ussuri");

        component_upgrade(
            &model,
            "placement",
            "distro",
            "cloud:focal-victoria",
            "victoria/stable",
        )
        .await
        .unwrap();

        assert_eq!(
            model.config_value("placement", ORIGIN_KEY).as_deref(),
            Some("cloud:focal-victoria")
        );
    }

    #[tokio::test]
    async fn test_component_upgrade_stops_on_refresh_failure() {
        let model = FakeModel::new()
            .with_config("neutron-api", ORIGIN_KEY, "distro")
            .failing_on("refresh neutron-api --channel");

        let result = component_upgrade(
            &model,
            "neutron-api",
            "distro",
            "cloud:focal-victoria",
            "victoria/stable",
        )
        .await;

        assert!(result.is_err());
        assert_eq!(
            model.config_value("neutron-api", ORIGIN_KEY).as_deref(),
            Some("distro")
        );
    }

    #[tokio::test]
    async fn test_charm_upgrade_keeps_channel() {
        let model = FakeModel::new();
        charm_upgrade(&model, "keystone").await.unwrap();
        assert_eq!(model.calls(), vec!["refresh keystone"]);
    }
}
