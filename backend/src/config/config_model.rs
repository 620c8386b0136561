use std::{collections::HashMap, path::PathBuf, time::Duration};

use crates::{
    discord::{oauth::DiscordOAuthConfig, role_sync::DiscordBotConfig},
    domain::value_objects::enums::networks::Network,
    payments::OnMissingEndpoint,
};

use super::stage::Stage;

#[derive(Debug, Clone)]
pub struct DotEnvyConfig {
    pub stage: Stage,
    pub backend_server: BackendServer,
    pub database: Database,
    pub user_secret: UserSecret,
    pub rate_limit: RateLimit,
    pub discord: Discord,
    pub chain: Chain,
    pub audit: Audit,
    pub role_sync: RoleSyncSchedule,
}

#[derive(Debug, Clone)]
pub struct BackendServer {
    pub port: u16,
    pub body_limit: u64,
    pub timeout: u64,
    pub cors_origins: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct Database {
    pub url: String,
}

#[derive(Debug, Clone)]
pub struct UserSecret {
    pub secret: String,
    pub access_token_expire_minutes: i64,
}

#[derive(Debug, Clone)]
pub struct RateLimit {
    pub enabled: bool,
    pub auth_per_minute: usize,
    pub discord_per_minute: usize,
    pub admin_per_minute: usize,
    pub subscriptions_per_minute: usize,
}

#[derive(Debug, Clone, Default)]
pub struct Discord {
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
    pub redirect_uri: Option<String>,
    pub bot_token: Option<String>,
    pub guild_id: Option<String>,
    pub subscriber_role_id: Option<String>,
}

impl Discord {
    pub fn oauth(&self) -> DiscordOAuthConfig {
        DiscordOAuthConfig {
            client_id: self.client_id.clone(),
            client_secret: self.client_secret.clone(),
            redirect_uri: self.redirect_uri.clone(),
        }
    }

    pub fn bot(&self) -> DiscordBotConfig {
        DiscordBotConfig {
            bot_token: self.bot_token.clone(),
            guild_id: self.guild_id.clone(),
            subscriber_role_id: self.subscriber_role_id.clone(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Chain {
    pub rpc_endpoints: HashMap<Network, String>,
    pub wallet_overrides: HashMap<Network, String>,
    /// Never false in the production stage.
    pub strict: bool,
}

impl Chain {
    pub fn on_missing_endpoint(&self) -> OnMissingEndpoint {
        OnMissingEndpoint::from_strict(self.strict)
    }
}

#[derive(Debug, Clone)]
pub struct Audit {
    pub log_file: Option<PathBuf>,
}

#[derive(Debug, Clone)]
pub struct RoleSyncSchedule {
    pub interval_hours: u64,
}

impl RoleSyncSchedule {
    /// `None` when the sweep is disabled.
    pub fn interval(&self) -> Option<Duration> {
        (self.interval_hours > 0).then(|| Duration::from_secs(self.interval_hours * 60 * 60))
    }
}
