//! MySQL database backup.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Local};
use tracing::info;

use super::OperationContext;
use crate::error::CouError;

/// Application running the cloud's database cluster.
const MYSQL_APP: &str = "mysql-innodb-cluster";

/// Charm action producing a compressed dump of every database.
const DUMP_ACTION: &str = "mysqldump";

/// Action result key holding the dump location on the unit.
const DUMP_RESULT_KEY: &str = "mysqldump-file";

/// Dump all databases on the cluster leader and copy the dump to the backup directory.
pub async fn backup(ctx: &OperationContext) -> Result<PathBuf> {
    info!("Backing up mysql databases");

    let status = ctx.client.status().await?;
    if !status.has_application(MYSQL_APP) {
        return Err(CouError::ApplicationNotFound(MYSQL_APP.to_string()).into());
    }
    let unit = status
        .leader_unit(MYSQL_APP)
        .ok_or_else(|| CouError::Backup(format!("no leader unit found for {}", MYSQL_APP)))?
        .to_string();

    info!("Running {} action on {}", DUMP_ACTION, unit);
    let results = ctx.client.run_action(&unit, DUMP_ACTION).await?;
    let remote_path = results.get(DUMP_RESULT_KEY).ok_or_else(|| {
        CouError::Backup(format!(
            "{} action on {} reported no {}",
            DUMP_ACTION, unit, DUMP_RESULT_KEY
        ))
    })?;

    let backup_dir = &ctx.settings.backup_dir;
    tokio::fs::create_dir_all(backup_dir)
        .await
        .with_context(|| format!("Failed to create backup directory {}", backup_dir.display()))?;

    let local_path = backup_dir.join(backup_file_name(remote_path, Local::now()));
    ctx.client
        .copy_from_unit(&unit, remote_path, &local_path)
        .await?;

    info!("Database backup saved to {}", local_path.display());
    Ok(local_path)
}

/// Local file name: `{YYYYMMDD-HHMMSS}-{remote file name}`.
fn backup_file_name(remote_path: &str, now: DateTime<Local>) -> String {
    let base = Path::new(remote_path)
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or("mysqldump.gz");
    format!("{}-{}", now.format("%Y%m%d-%H%M%S"), base)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::TimeZone;

    use super::*;
    use crate::juju::fake::FakeModel;
    use crate::operations::OperationSettings;

    const MYSQL_STATUS: &str = r#"{
        "applications": {
            "mysql-innodb-cluster": {
                "units": {
                    "mysql-innodb-cluster/0": {"juju-status": {"current": "idle"}},
                    "mysql-innodb-cluster/2": {"juju-status": {"current": "idle"}, "leader": true}
                }
            }
        }
    }"#;

    fn context(model: Arc<FakeModel>, dir: &Path) -> OperationContext {
        OperationContext::new(
            model,
            OperationSettings {
                backup_dir: dir.to_path_buf(),
                ..Default::default()
            },
        )
    }

    #[test]
    fn test_backup_file_name() {
        let now = Local.with_ymd_and_hms(2023, 10, 18, 9, 5, 30).unwrap();
        assert_eq!(
            backup_file_name("/var/backups/mysql/mysqldump-all.gz", now),
            "20231018-090530-mysqldump-all.gz"
        );
        assert_eq!(backup_file_name("/", now), "20231018-090530-mysqldump.gz");
    }

    #[tokio::test]
    async fn test_backup_uses_leader_unit() {
        let dir = tempfile::tempdir().unwrap();
        let model = Arc::new(
            FakeModel::new()
                .with_statuses(&[MYSQL_STATUS])
                .with_action_result("mysqldump-file", "/var/backups/mysql/dump.gz"),
        );

        let local = backup(&context(model.clone(), dir.path())).await.unwrap();

        assert!(local.starts_with(dir.path()));
        assert!(local.to_string_lossy().ends_with("-dump.gz"));
        let calls = model.calls();
        assert_eq!(calls[1], "run mysql-innodb-cluster/2 mysqldump");
        assert!(calls[2].starts_with("scp mysql-innodb-cluster/2:/var/backups/mysql/dump.gz "));
    }

    #[tokio::test]
    async fn test_backup_creates_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("backups").join("cloud");
        let model = Arc::new(
            FakeModel::new()
                .with_statuses(&[MYSQL_STATUS])
                .with_action_result("mysqldump-file", "/tmp/dump.gz"),
        );

        backup(&context(model, &nested)).await.unwrap();
        assert!(nested.is_dir());
    }

    #[tokio::test]
    async fn test_backup_without_mysql_application() {
        let dir = tempfile::tempdir().unwrap();
        let model = Arc::new(FakeModel::new().with_statuses(&["{}"]));

        let err = backup(&context(model, dir.path())).await.unwrap_err();
        assert_eq!(
            err.to_string(),
            "Application not found in model: mysql-innodb-cluster"
        );
    }

    #[tokio::test]
    async fn test_backup_without_leader() {
        let dir = tempfile::tempdir().unwrap();
        let status = MYSQL_STATUS.replace(", \"leader\": true", "");
        let model = Arc::new(FakeModel::new().with_statuses(&[status.as_str()]));

        let err = backup(&context(model, dir.path())).await.unwrap_err();
        assert_eq!(
            err.to_string(),
            "Backup failed: no leader unit found for mysql-innodb-cluster"
        );
    }

    #[tokio::test]
    async fn test_backup_without_dump_result() {
        let dir = tempfile::tempdir().unwrap();
        let model = Arc::new(FakeModel::new().with_statuses(&[MYSQL_STATUS]));

        let err = backup(&context(model.clone(), dir.path())).await.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<CouError>(),
            Some(CouError::Backup(_))
        ));
        assert!(!model.calls().iter().any(|c| c.starts_with("scp")));
    }
}
