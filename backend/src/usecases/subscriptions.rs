use std::sync::Arc;

use axum::http::StatusCode;
use chrono::{Duration, Utc};
use crates::{
    discord::role_sync::RoleSync,
    domain::{
        entities::{
            subscriptions::{InsertSubscriptionEntity, SubscriptionEntity},
            users::UserEntity,
        },
        repositories::{
            subscriptions::{CreateSubscriptionError, SubscriptionRepository},
            users::UserRepository,
        },
        value_objects::{
            admin_logs::AuditEntry,
            enums::{
                networks::{Network, NetworkFamily},
                plan_codes::PlanCode,
                subscription_statuses::SubscriptionStatus,
                user_roles::UserRole,
            },
            networks::NetworkWallets,
            plans::Plan,
            subscriptions::{
                ConfirmSubscriptionRequest, CurrentSubscriptionDto, PlansAndNetworksDto,
                SubscriptionDto, SubscriptionHistoryDto,
            },
        },
    },
    observability::advisory,
    payments::{ChainVerifier, VerificationError},
};
use thiserror::Error;
use tracing::{error, info, warn};
use uuid::Uuid;

use super::audit_log::AuditSink;

pub const SUBSCRIPTION_PAID_ACTION: &str = "subscription_paid";
const MIN_TX_HASH_LEN: usize = 10;
const AUDIT_TX_PREFIX_LEN: usize = 10;

#[derive(Debug, Error)]
pub enum SubscriptionError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("payment configuration error: {0}")]
    Configuration(String),
    #[error("transaction has already been used for a subscription")]
    DuplicateTransaction,
    #[error("chain verification failed: {0}")]
    ChainVerificationFailed(VerificationError),
    #[error("insufficient payment: received {paid}, plan requires {required}")]
    InsufficientPayment { paid: f64, required: f64 },
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl SubscriptionError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            SubscriptionError::InvalidInput(_) | SubscriptionError::InsufficientPayment { .. } => {
                StatusCode::BAD_REQUEST
            }
            SubscriptionError::DuplicateTransaction => StatusCode::CONFLICT,
            SubscriptionError::ChainVerificationFailed(_) => StatusCode::UNPROCESSABLE_ENTITY,
            SubscriptionError::Configuration(_) | SubscriptionError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl From<VerificationError> for SubscriptionError {
    fn from(err: VerificationError) -> Self {
        match err {
            VerificationError::InvalidInput(message) => SubscriptionError::InvalidInput(message),
            VerificationError::MissingEndpoint(network) => {
                SubscriptionError::Configuration(format!("no RPC endpoint configured for {network}"))
            }
            other => SubscriptionError::ChainVerificationFailed(other),
        }
    }
}

pub type UseCaseResult<T> = std::result::Result<T, SubscriptionError>;

pub struct SubscriptionUseCase<S, U, V, R, A>
where
    S: SubscriptionRepository + Send + Sync + 'static,
    U: UserRepository + Send + Sync + 'static,
    V: ChainVerifier + Send + Sync + 'static,
    R: RoleSync + Send + Sync + 'static,
    A: AuditSink + Send + Sync + 'static,
{
    subscription_repo: Arc<S>,
    user_repo: Arc<U>,
    chain_verifier: Arc<V>,
    role_sync: Arc<R>,
    audit: Arc<A>,
    wallets: Arc<NetworkWallets>,
}

impl<S, U, V, R, A> SubscriptionUseCase<S, U, V, R, A>
where
    S: SubscriptionRepository + Send + Sync + 'static,
    U: UserRepository + Send + Sync + 'static,
    V: ChainVerifier + Send + Sync + 'static,
    R: RoleSync + Send + Sync + 'static,
    A: AuditSink + Send + Sync + 'static,
{
    pub fn new(
        subscription_repo: Arc<S>,
        user_repo: Arc<U>,
        chain_verifier: Arc<V>,
        role_sync: Arc<R>,
        audit: Arc<A>,
        wallets: Arc<NetworkWallets>,
    ) -> Self {
        Self {
            subscription_repo,
            user_repo,
            chain_verifier,
            role_sync,
            audit,
            wallets,
        }
    }

    pub fn plans_and_networks(&self) -> PlansAndNetworksDto {
        PlansAndNetworksDto {
            plans: Plan::all().to_vec(),
            networks: self.wallets.listing(),
        }
    }

    /// Turns an on-chain payment into an active subscription.
    ///
    /// Validation, the replay check, chain verification and persistence fail fast.
    /// Everything after the row is stored (role update, Discord grant, audit) is
    /// best-effort and cannot fail the confirmation.
    pub async fn confirm_subscription(
        &self,
        user_id: Uuid,
        request: ConfirmSubscriptionRequest,
    ) -> UseCaseResult<SubscriptionDto> {
        let plan_code = request
            .plan_code
            .trim()
            .parse::<PlanCode>()
            .map_err(SubscriptionError::InvalidInput)?;
        let network = request
            .network
            .parse::<Network>()
            .map_err(SubscriptionError::InvalidInput)?;
        let tx_hash = normalize_tx_hash(network, &request.tx_hash)?;
        let plan = plan_code.plan();
        let wallet = self.wallets.wallet_for(network).ok_or_else(|| {
            error!(%network, "subscriptions: no project wallet configured");
            SubscriptionError::Configuration(format!("no project wallet configured for {network}"))
        })?;

        info!(
            %user_id,
            %network,
            %plan_code,
            "subscriptions: confirming payment"
        );

        let already_used = self
            .subscription_repo
            .tx_hash_exists(&tx_hash)
            .await
            .map_err(|err| {
                error!(%user_id, db_error = ?err, "subscriptions: replay check failed");
                SubscriptionError::Internal(err)
            })?;
        if already_used {
            warn!(%user_id, %network, "subscriptions: transaction hash already used");
            return Err(SubscriptionError::DuplicateTransaction);
        }

        let amount = self
            .chain_verifier
            .verify_transaction(network, &tx_hash, wallet, plan.price_usd)
            .await
            .map_err(|err| {
                warn!(
                    %user_id,
                    %network,
                    error = %err,
                    "subscriptions: chain verification failed"
                );
                SubscriptionError::from(err)
            })?;

        if amount < plan.price_usd {
            warn!(
                %user_id,
                %network,
                amount,
                required = plan.price_usd,
                "subscriptions: payment below plan price"
            );
            return Err(SubscriptionError::InsufficientPayment {
                paid: amount,
                required: plan.price_usd,
            });
        }

        let subscription = self
            .subscription_repo
            .create(InsertSubscriptionEntity {
                user_id,
                network: network.to_string(),
                tx_hash: tx_hash.clone(),
                amount,
                plan_code: plan_code.to_string(),
                status: SubscriptionStatus::Active.to_string(),
                expires_at: Utc::now() + Duration::days(plan.days),
            })
            .await
            .map_err(|err| match err {
                CreateSubscriptionError::DuplicateTxHash => {
                    warn!(%user_id, %network, "subscriptions: lost race on transaction hash");
                    SubscriptionError::DuplicateTransaction
                }
                CreateSubscriptionError::Other(err) => {
                    error!(%user_id, db_error = ?err, "subscriptions: failed to store subscription");
                    SubscriptionError::Internal(err)
                }
            })?;

        let user = self.promote_to_subscriber(user_id).await;

        if let Some(discord_id) = user.as_ref().and_then(|user| user.discord_id.as_deref()) {
            self.role_sync.grant_subscriber_role(discord_id).await;
        }

        self.audit
            .record(
                AuditEntry::new(SUBSCRIPTION_PAID_ACTION, user_id.to_string())
                    .target(user_id.to_string())
                    .details(format!(
                        "plan={}, network={}, tx={}...",
                        plan_code,
                        network,
                        tx_hash.chars().take(AUDIT_TX_PREFIX_LEN).collect::<String>()
                    )),
            )
            .await;

        info!(
            %user_id,
            subscription_id = %subscription.id,
            expires_at = %subscription.expires_at,
            "subscriptions: subscription confirmed"
        );

        Ok(SubscriptionDto::try_from(subscription)?)
    }

    /// Admin roles are left untouched. Failures are logged and ignored.
    async fn promote_to_subscriber(&self, user_id: Uuid) -> Option<UserEntity> {
        let user = match self.user_repo.find_by_id(user_id).await {
            Ok(Some(user)) => user,
            Ok(None) => {
                warn!(%user_id, "subscriptions: paying user not found, entitlement not updated");
                return None;
            }
            Err(err) => {
                error!(%user_id, db_error = ?err, "subscriptions: failed to load paying user");
                return None;
            }
        };

        let role = user.role();
        if !role.is_admin() && role != UserRole::Subscriber {
            advisory(
                "subscriptions.promote_to_subscriber",
                self.user_repo.update_role(user_id, UserRole::Subscriber),
            )
            .await;
        }

        Some(user)
    }

    pub async fn current_subscription(&self, user_id: Uuid) -> UseCaseResult<CurrentSubscriptionDto> {
        let active = self
            .subscription_repo
            .find_active_by_user_id(user_id)
            .await
            .map_err(|err| {
                error!(%user_id, db_error = ?err, "subscriptions: failed to load active subscription");
                SubscriptionError::Internal(err)
            })?;

        let latest = self
            .subscription_repo
            .find_latest_by_user_id(user_id)
            .await
            .map_err(|err| {
                error!(%user_id, db_error = ?err, "subscriptions: failed to load latest subscription");
                SubscriptionError::Internal(err)
            })?;

        let to_dto = |row: Option<SubscriptionEntity>| {
            row.map(SubscriptionDto::try_from)
                .transpose()
                .map_err(|err| {
                    error!(%user_id, error = ?err, "subscriptions: stored subscription is unreadable");
                    SubscriptionError::Internal(err)
                })
        };

        Ok(CurrentSubscriptionDto {
            active: to_dto(active)?,
            latest: to_dto(latest)?,
        })
    }

    pub async fn history(&self, user_id: Uuid) -> UseCaseResult<Vec<SubscriptionHistoryDto>> {
        let rows = self
            .subscription_repo
            .list_history_by_user_id(user_id)
            .await
            .map_err(|err| {
                error!(%user_id, db_error = ?err, "subscriptions: failed to load history");
                SubscriptionError::Internal(err)
            })?;

        Ok(rows
            .into_iter()
            .filter_map(|row| {
                let subscription_id = row.id;
                SubscriptionHistoryDto::try_from(row)
                    .inspect_err(|err| {
                        warn!(%user_id, %subscription_id, error = ?err, "subscriptions: skipping unreadable history row");
                    })
                    .ok()
            })
            .collect())
    }
}

/// EVM hashes are hex and compared case-insensitively on chain, so they are stored lowercase.
/// Solana signatures are base58 and kept verbatim.
fn normalize_tx_hash(network: Network, raw: &str) -> UseCaseResult<String> {
    let tx_hash = raw.trim();
    if tx_hash.len() < MIN_TX_HASH_LEN {
        return Err(SubscriptionError::InvalidInput(format!(
            "transaction hash must be at least {MIN_TX_HASH_LEN} characters"
        )));
    }

    Ok(match network.family() {
        NetworkFamily::Evm => tx_hash.to_ascii_lowercase(),
        NetworkFamily::Solana => tx_hash.to_string(),
    })
}
