use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{
    entities::subscriptions::SubscriptionEntity,
    value_objects::{
        enums::{
            networks::Network, plan_codes::PlanCode, subscription_statuses::SubscriptionStatus,
        },
        networks::NetworkDto,
        plans::Plan,
    },
};

#[derive(Debug, Clone, Deserialize)]
pub struct ConfirmSubscriptionRequest {
    pub network: String,
    pub plan_code: String,
    pub tx_hash: String,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SubscriptionDto {
    pub id: Uuid,
    pub user_id: Uuid,
    pub plan_code: PlanCode,
    pub status: SubscriptionStatus,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<SubscriptionEntity> for SubscriptionDto {
    type Error = anyhow::Error;

    fn try_from(value: SubscriptionEntity) -> anyhow::Result<Self> {
        Ok(Self {
            id: value.id,
            user_id: value.user_id,
            plan_code: value.plan_code()?,
            status: SubscriptionStatus::from_str(&value.status),
            expires_at: value.expires_at,
            created_at: value.created_at,
        })
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SubscriptionHistoryDto {
    pub id: Uuid,
    pub network: Option<Network>,
    pub tx_hash: String,
    pub amount: f64,
    pub plan_code: PlanCode,
    pub status: SubscriptionStatus,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<SubscriptionEntity> for SubscriptionHistoryDto {
    type Error = anyhow::Error;

    fn try_from(value: SubscriptionEntity) -> anyhow::Result<Self> {
        Ok(Self {
            id: value.id,
            network: value.network.parse().ok(),
            plan_code: value.plan_code()?,
            status: SubscriptionStatus::from_str(&value.status),
            tx_hash: value.tx_hash,
            amount: value.amount,
            expires_at: value.expires_at,
            created_at: value.created_at,
        })
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct CurrentSubscriptionDto {
    pub active: Option<SubscriptionDto>,
    pub latest: Option<SubscriptionDto>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct PlansAndNetworksDto {
    pub plans: Vec<Plan>,
    pub networks: Vec<NetworkDto>,
}
