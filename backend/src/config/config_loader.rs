use std::{collections::HashMap, path::PathBuf, str::FromStr};

use anyhow::{Context, Result};
use crates::domain::value_objects::enums::networks::Network;

use super::{
    config_model::{
        Audit, BackendServer, Chain, Database, Discord, DotEnvyConfig, RateLimit,
        RoleSyncSchedule, UserSecret,
    },
    stage::Stage,
};

pub fn load() -> Result<DotEnvyConfig> {
    dotenvy::dotenv().ok();

    load_from(|key| std::env::var(key).ok())
}

/// Builds the config from any key lookup so tests don't have to touch the process env.
pub fn load_from<F>(lookup: F) -> Result<DotEnvyConfig>
where
    F: Fn(&str) -> Option<String>,
{
    let env = Env { lookup };

    let stage = match env.optional("STAGE") {
        Some(raw) => Stage::try_from(raw.as_str())?,
        None => Stage::default(),
    };

    let backend_server = BackendServer {
        port: env.required_parse("SERVER_PORT_BACKEND")?,
        body_limit: env.required_parse("SERVER_BODY_LIMIT")?,
        timeout: env.required_parse("SERVER_TIMEOUT")?,
        cors_origins: env
            .optional("FRONTEND_CORS_ORIGINS")
            .map(|raw| {
                raw.split(',')
                    .map(str::trim)
                    .filter(|origin| !origin.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default(),
    };

    let database = Database {
        url: env.required("DATABASE_URL")?,
    };

    let user_secret = UserSecret {
        secret: env.required("JWT_USER_SECRET")?,
        access_token_expire_minutes: env.parse_or("ACCESS_TOKEN_EXPIRE_MINUTES", 60)?,
    };

    let rate_limit = RateLimit {
        enabled: env.bool_or("RATE_LIMIT_ENABLED", false)?,
        auth_per_minute: env.parse_or("RATE_LIMIT_AUTH_PER_MINUTE", 20)?,
        discord_per_minute: env.parse_or("RATE_LIMIT_DISCORD_PER_MINUTE", 30)?,
        admin_per_minute: env.parse_or("RATE_LIMIT_ADMIN_PER_MINUTE", 10)?,
        subscriptions_per_minute: env.parse_or("RATE_LIMIT_SUBSCRIPTIONS_PER_MINUTE", 10)?,
    };

    let discord = Discord {
        client_id: env.optional("DISCORD_CLIENT_ID"),
        client_secret: env.optional("DISCORD_CLIENT_SECRET"),
        redirect_uri: env.optional("DISCORD_REDIRECT_URI"),
        bot_token: env.optional("DISCORD_BOT_TOKEN"),
        guild_id: env.optional("DISCORD_GUILD_ID"),
        subscriber_role_id: env.optional("DISCORD_SUBSCRIBER_ROLE_ID"),
    };

    let mut rpc_endpoints = HashMap::new();
    let mut wallet_overrides = HashMap::new();
    for network in Network::ALL {
        let name = network.to_string().to_ascii_uppercase();

        let endpoint = env
            .optional(&format!("RPC_{name}_URL"))
            .or_else(|| env.optional(legacy_rpc_key(network)));
        if let Some(endpoint) = endpoint {
            rpc_endpoints.insert(network, endpoint);
        }

        if let Some(wallet) = env.optional(&format!("WALLET_{name}")) {
            wallet_overrides.insert(network, wallet);
        }
    }

    let chain = Chain {
        rpc_endpoints,
        wallet_overrides,
        strict: stage == Stage::Production || env.bool_or("PAYMENT_STRICT", false)?,
    };

    let audit = Audit {
        log_file: match env.optional("AUDIT_LOG_FILE") {
            Some(path) if path.eq_ignore_ascii_case("off") => None,
            Some(path) => Some(PathBuf::from(path)),
            None => Some(PathBuf::from("logs.txt")),
        },
    };

    let role_sync = RoleSyncSchedule {
        interval_hours: env.parse_or("ROLE_SYNC_INTERVAL_HOURS", 24)?,
    };

    Ok(DotEnvyConfig {
        stage,
        backend_server,
        database,
        user_secret,
        rate_limit,
        discord,
        chain,
        audit,
        role_sync,
    })
}

fn legacy_rpc_key(network: Network) -> &'static str {
    match network {
        Network::Ethereum => "ALCHEMY_ETHEREUM_URL",
        Network::Polygon => "ALCHEMY_POLYGON_URL",
        Network::Arbitrum => "ALCHEMY_ARBITRUM_URL",
        Network::Optimism => "ALCHEMY_OPTIMISM_URL",
        Network::Solana => "HELIUS_SOLANA_URL",
    }
}

struct Env<F> {
    lookup: F,
}

impl<F> Env<F>
where
    F: Fn(&str) -> Option<String>,
{
    /// Blank values count as unset.
    fn optional(&self, key: &str) -> Option<String> {
        (self.lookup)(key)
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
    }

    fn required(&self, key: &str) -> Result<String> {
        self.optional(key)
            .with_context(|| format!("{key} is missing"))
    }

    fn required_parse<T>(&self, key: &str) -> Result<T>
    where
        T: FromStr,
        T::Err: std::error::Error + Send + Sync + 'static,
    {
        self.required(key)?
            .parse()
            .with_context(|| format!("{key} is invalid"))
    }

    fn parse_or<T>(&self, key: &str, default: T) -> Result<T>
    where
        T: FromStr,
        T::Err: std::error::Error + Send + Sync + 'static,
    {
        match self.optional(key) {
            Some(raw) => raw.parse().with_context(|| format!("{key} is invalid")),
            None => Ok(default),
        }
    }

    fn bool_or(&self, key: &str, default: bool) -> Result<bool> {
        let Some(raw) = self.optional(key) else {
            return Ok(default);
        };

        match raw.to_ascii_lowercase().as_str() {
            "1" | "true" | "t" | "yes" | "y" | "on" => Ok(true),
            "0" | "false" | "f" | "no" | "n" | "off" => Ok(false),
            _ => anyhow::bail!("{key} is invalid (expected a boolean, got '{raw}')"),
        }
    }
}
