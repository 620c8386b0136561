use std::{sync::Arc, time::Duration};

use anyhow::Result;
use crates::{
    discord::role_sync::RoleSync,
    domain::{
        repositories::{subscriptions::SubscriptionRepository, users::UserRepository},
        value_objects::admin_logs::AuditEntry,
    },
};
use tracing::{error, info};

use super::audit_log::AuditSink;

pub const ROLE_SYNC_ADD_ACTION: &str = "cron_role_sync_add";
pub const ROLE_SYNC_REMOVE_ACTION: &str = "cron_role_sync_remove";

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SweepSummary {
    pub granted: usize,
    pub revoked: usize,
    pub failed: usize,
}

/// Brings Discord roles back in line with the subscription ledger.
pub struct RoleReconciliationUseCase<U, S, R, A>
where
    U: UserRepository + Send + Sync + 'static,
    S: SubscriptionRepository + Send + Sync + 'static,
    R: RoleSync + Send + Sync + 'static,
    A: AuditSink + Send + Sync + 'static,
{
    user_repo: Arc<U>,
    subscription_repo: Arc<S>,
    role_sync: Arc<R>,
    audit: Arc<A>,
}

impl<U, S, R, A> RoleReconciliationUseCase<U, S, R, A>
where
    U: UserRepository + Send + Sync + 'static,
    S: SubscriptionRepository + Send + Sync + 'static,
    R: RoleSync + Send + Sync + 'static,
    A: AuditSink + Send + Sync + 'static,
{
    pub fn new(user_repo: Arc<U>, subscription_repo: Arc<S>, role_sync: Arc<R>, audit: Arc<A>) -> Self {
        Self {
            user_repo,
            subscription_repo,
            role_sync,
            audit,
        }
    }

    /// One pass over every linked user. A failure on one user never stops the sweep.
    pub async fn sync_all(&self) -> Result<SweepSummary> {
        let users = self.user_repo.list_with_discord().await?;
        info!(users = users.len(), "role_sync: sweep started");

        let mut summary = SweepSummary::default();
        for user in users {
            let Some(discord_id) = user.discord_id.as_deref() else {
                continue;
            };

            let active = match self.subscription_repo.find_active_by_user_id(user.id).await {
                Ok(active) => active,
                Err(err) => {
                    error!(user_id = %user.id, db_error = ?err, "role_sync: failed to load subscription");
                    summary.failed += 1;
                    continue;
                }
            };

            let entry = match active {
                Some(subscription) => {
                    if self.role_sync.grant_subscriber_role(discord_id).await {
                        summary.granted += 1;
                    } else {
                        summary.failed += 1;
                    }
                    AuditEntry::new(ROLE_SYNC_ADD_ACTION, user.id.to_string())
                        .details(format!("active subscription: {}", subscription.plan_code))
                }
                None => {
                    if self.role_sync.revoke_subscriber_role(discord_id).await {
                        summary.revoked += 1;
                    } else {
                        summary.failed += 1;
                    }
                    AuditEntry::new(ROLE_SYNC_REMOVE_ACTION, user.id.to_string())
                        .details("subscription expired or missing")
                }
            };

            self.audit.record(entry.target(user.id.to_string())).await;
        }

        info!(
            granted = summary.granted,
            revoked = summary.revoked,
            failed = summary.failed,
            "role_sync: sweep finished"
        );
        Ok(summary)
    }

    pub async fn run_loop(self: Arc<Self>, interval: Duration) {
        info!(interval_secs = interval.as_secs(), "role_sync: background loop started");
        loop {
            if let Err(err) = self.sync_all().await {
                error!(db_error = ?err, "role_sync: sweep failed");
            }

            tokio::time::sleep(interval).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::usecases::audit_log::MockAuditSink;
    use chrono::{Duration as ChronoDuration, Utc};
    use crates::{
        discord::role_sync::MockRoleSync,
        domain::{
            entities::{subscriptions::SubscriptionEntity, users::UserEntity},
            repositories::{
                subscriptions::MockSubscriptionRepository, users::MockUserRepository,
            },
        },
    };
    use uuid::Uuid;

    fn linked_user(discord_id: &str) -> UserEntity {
        UserEntity {
            id: Uuid::new_v4(),
            email: format!("{discord_id}@example.com"),
            username: discord_id.to_string(),
            password_hash: "x".to_string(),
            role: "subscriber".to_string(),
            status: "active".to_string(),
            discord_id: Some(discord_id.to_string()),
            discord_username: None,
            discord_avatar_url: None,
            created_at: Utc::now(),
        }
    }

    fn subscription(user_id: Uuid) -> SubscriptionEntity {
        SubscriptionEntity {
            id: Uuid::new_v4(),
            user_id,
            network: "solana".to_string(),
            tx_hash: "5VERv8NMvzbJMEkV8xnrLkEaWRtSz9CosKDYjCJjBRnb".to_string(),
            amount: 35.0,
            plan_code: "quarter".to_string(),
            status: "active".to_string(),
            expires_at: Utc::now() + ChronoDuration::days(60),
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn grants_active_and_revokes_lapsed() {
        let paying = linked_user("111");
        let lapsed = linked_user("222");
        let paying_id = paying.id;

        let mut users = MockUserRepository::new();
        let rows = vec![paying, lapsed];
        users
            .expect_list_with_discord()
            .returning(move || Ok(rows.clone()));

        let mut subscriptions = MockSubscriptionRepository::new();
        subscriptions
            .expect_find_active_by_user_id()
            .returning(move |id| Ok((id == paying_id).then(|| subscription(id))));

        let mut role_sync = MockRoleSync::new();
        role_sync
            .expect_grant_subscriber_role()
            .withf(|discord_id| discord_id == "111")
            .times(1)
            .returning(|_| true);
        role_sync
            .expect_revoke_subscriber_role()
            .withf(|discord_id| discord_id == "222")
            .times(1)
            .returning(|_| true);

        let mut audit = MockAuditSink::new();
        audit
            .expect_record()
            .withf(|entry| entry.action == ROLE_SYNC_ADD_ACTION)
            .times(1)
            .returning(|_| ());
        audit
            .expect_record()
            .withf(|entry| entry.action == ROLE_SYNC_REMOVE_ACTION)
            .times(1)
            .returning(|_| ());

        let usecase = RoleReconciliationUseCase::new(
            Arc::new(users),
            Arc::new(subscriptions),
            Arc::new(role_sync),
            Arc::new(audit),
        );

        let summary = usecase.sync_all().await.unwrap();
        assert_eq!(
            summary,
            SweepSummary {
                granted: 1,
                revoked: 1,
                failed: 0
            }
        );
    }

    #[tokio::test]
    async fn per_user_failures_are_skipped() {
        let broken = linked_user("333");
        let healthy = linked_user("444");
        let broken_id = broken.id;

        let mut users = MockUserRepository::new();
        let rows = vec![broken, healthy];
        users
            .expect_list_with_discord()
            .returning(move || Ok(rows.clone()));

        let mut subscriptions = MockSubscriptionRepository::new();
        subscriptions
            .expect_find_active_by_user_id()
            .returning(move |id| {
                if id == broken_id {
                    Err(anyhow::anyhow!("connection reset"))
                } else {
                    Ok(None)
                }
            });

        let mut role_sync = MockRoleSync::new();
        role_sync
            .expect_revoke_subscriber_role()
            .times(1)
            .returning(|_| false);

        let mut audit = MockAuditSink::new();
        audit.expect_record().times(1).returning(|_| ());

        let usecase = RoleReconciliationUseCase::new(
            Arc::new(users),
            Arc::new(subscriptions),
            Arc::new(role_sync),
            Arc::new(audit),
        );

        let summary = usecase.sync_all().await.unwrap();
        assert_eq!(summary.failed, 2);
        assert_eq!(summary.revoked, 0);
    }
}
