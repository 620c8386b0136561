use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use anyhow::Result;
use async_trait::async_trait;
use chrono::Utc;
use crates::{
    domain::{
        entities::admin_logs::InsertAdminLogEntity,
        repositories::admin_logs::AdminLogRepository,
        value_objects::admin_logs::AuditEntry,
    },
    observability::advisory,
};
use tokio::{fs::OpenOptions, io::AsyncWriteExt};
use tracing::debug;

/// Append-only action log. Recording never fails the caller.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AuditSink {
    async fn record(&self, entry: AuditEntry);
}

/// Writes each entry to `admin_logs`, then mirrors it as one line in a plain-text file.
pub struct AuditLogger<L>
where
    L: AdminLogRepository + Send + Sync + 'static,
{
    admin_log_repo: Arc<L>,
    log_file: Option<PathBuf>,
}

impl<L> AuditLogger<L>
where
    L: AdminLogRepository + Send + Sync + 'static,
{
    pub fn new(admin_log_repo: Arc<L>, log_file: Option<PathBuf>) -> Self {
        Self {
            admin_log_repo,
            log_file,
        }
    }

    async fn append_line(&self, path: &Path, entry: &AuditEntry) -> Result<()> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .await?;

        file.write_all(format_line(entry).as_bytes()).await?;
        file.flush().await?;

        Ok(())
    }
}

pub(crate) fn format_line(entry: &AuditEntry) -> String {
    format!(
        "{} | {} | actor={} | target={} | {}\n",
        Utc::now().to_rfc3339(),
        entry.action,
        entry.actor_id,
        entry.target_id.as_deref().unwrap_or("-"),
        entry.details.as_deref().unwrap_or(""),
    )
}

#[async_trait]
impl<L> AuditSink for AuditLogger<L>
where
    L: AdminLogRepository + Send + Sync + 'static,
{
    async fn record(&self, entry: AuditEntry) {
        debug!(action = %entry.action, actor_id = %entry.actor_id, "audit_log: recording entry");

        advisory(
            "audit_log.db_write",
            self.admin_log_repo
                .create(InsertAdminLogEntity::from(entry.clone())),
        )
        .await;

        if let Some(path) = &self.log_file {
            advisory("audit_log.file_append", self.append_line(path, &entry)).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crates::domain::repositories::admin_logs::MockAdminLogRepository;

    fn entry() -> AuditEntry {
        AuditEntry::new("subscription_paid", "user-1")
            .target("user-1")
            .details("plan=month, network=polygon, tx=0xabcdef12...")
    }

    #[tokio::test]
    async fn writes_database_row_and_file_line() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("logs.txt");

        let mut repo = MockAdminLogRepository::new();
        repo.expect_create()
            .withf(|row| row.action == "subscription_paid" && row.actor_id == "user-1")
            .times(1)
            .returning(|_| Ok(()));

        let logger = AuditLogger::new(Arc::new(repo), Some(path.clone()));
        logger.record(entry()).await;
        logger.record(AuditEntry::new("http_request", "anonymous")).await;

        let contents = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].contains("subscription_paid | actor=user-1 | target=user-1"));
        assert!(lines[1].contains("http_request | actor=anonymous | target=-"));
    }

    #[tokio::test]
    async fn database_failure_still_appends_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("logs.txt");

        let mut repo = MockAdminLogRepository::new();
        repo.expect_create()
            .returning(|_| Err(anyhow::anyhow!("connection refused")));

        let logger = AuditLogger::new(Arc::new(repo), Some(path.clone()));
        logger.record(entry()).await;

        let contents = std::fs::read_to_string(&path).unwrap();
        assert!(contents.contains("subscription_paid"));
    }

    #[tokio::test]
    async fn unwritable_file_is_swallowed() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing-dir").join("logs.txt");

        let mut repo = MockAdminLogRepository::new();
        repo.expect_create().times(1).returning(|_| Ok(()));

        let logger = AuditLogger::new(Arc::new(repo), Some(path.clone()));
        logger.record(entry()).await;

        assert!(!path.exists());
    }
}
