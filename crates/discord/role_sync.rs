use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use mockall::automock;
use reqwest::{Method, StatusCode, header::AUTHORIZATION};
use tracing::{info, warn};

use crate::observability::advisory;

const DISCORD_TIMEOUT: Duration = Duration::from_secs(10);

/// Grants and revokes the subscriber role in the community guild.
/// Both calls are best-effort: they report whether the change was applied and never fail.
#[automock]
#[async_trait]
pub trait RoleSync {
    async fn grant_subscriber_role(&self, discord_id: &str) -> bool;

    async fn revoke_subscriber_role(&self, discord_id: &str) -> bool;
}

#[derive(Debug, Clone, Default)]
pub struct DiscordBotConfig {
    pub bot_token: Option<String>,
    pub guild_id: Option<String>,
    pub subscriber_role_id: Option<String>,
}

#[derive(Debug, Clone)]
struct BotCredentials {
    bot_token: String,
    guild_id: String,
    role_id: String,
}

impl DiscordBotConfig {
    fn credentials(&self) -> Option<BotCredentials> {
        let non_empty = |value: &Option<String>| {
            value
                .as_deref()
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(str::to_string)
        };

        Some(BotCredentials {
            bot_token: non_empty(&self.bot_token)?,
            guild_id: non_empty(&self.guild_id)?,
            role_id: non_empty(&self.subscriber_role_id)?,
        })
    }
}

pub struct DiscordRoleClient {
    http: reqwest::Client,
    api_base: String,
    credentials: Option<BotCredentials>,
}

impl DiscordRoleClient {
    pub fn new(api_base: impl Into<String>, config: DiscordBotConfig) -> Result<Self> {
        let http = reqwest::Client::builder().timeout(DISCORD_TIMEOUT).build()?;
        let credentials = config.credentials();

        if credentials.is_none() {
            warn!("discord: bot token, guild id or subscriber role id missing, role sync disabled");
        }

        Ok(Self {
            http,
            api_base: api_base.into().trim_end_matches('/').to_string(),
            credentials,
        })
    }

    async fn try_update(
        &self,
        credentials: &BotCredentials,
        method: Method,
        discord_id: &str,
    ) -> Result<()> {
        let url = format!(
            "{}/guilds/{}/members/{}/roles/{}",
            self.api_base, credentials.guild_id, discord_id, credentials.role_id
        );
        let revoking = method == Method::DELETE;

        let resp = self
            .http
            .request(method, url)
            .header(AUTHORIZATION, format!("Bot {}", credentials.bot_token))
            .send()
            .await
            .map_err(|err| anyhow::anyhow!(err.without_url()))?;

        let status = resp.status();
        let accepted = matches!(status, StatusCode::OK | StatusCode::NO_CONTENT)
            || (revoking && status == StatusCode::NOT_FOUND);
        if !accepted {
            let body = resp.text().await.unwrap_or_default();
            anyhow::bail!("discord role update returned {status}: {body}");
        }

        info!(%discord_id, revoking, "discord: subscriber role updated");
        Ok(())
    }
}

#[async_trait]
impl RoleSync for DiscordRoleClient {
    async fn grant_subscriber_role(&self, discord_id: &str) -> bool {
        let Some(credentials) = &self.credentials else {
            warn!(%discord_id, "discord: role sync not configured, skipping grant");
            return false;
        };

        advisory(
            "discord.grant_subscriber_role",
            self.try_update(credentials, Method::PUT, discord_id),
        )
        .await
        .is_some()
    }

    async fn revoke_subscriber_role(&self, discord_id: &str) -> bool {
        let Some(credentials) = &self.credentials else {
            warn!(%discord_id, "discord: role sync not configured, skipping revoke");
            return false;
        };

        advisory(
            "discord.revoke_subscriber_role",
            self.try_update(credentials, Method::DELETE, discord_id),
        )
        .await
        .is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http_stub::{CannedResponse, StubServer};

    fn configured() -> DiscordBotConfig {
        DiscordBotConfig {
            bot_token: Some("bot-token".to_string()),
            guild_id: Some("1".to_string()),
            subscriber_role_id: Some("2".to_string()),
        }
    }

    #[test]
    fn blank_values_disable_the_client() {
        let config = DiscordBotConfig {
            guild_id: Some("   ".to_string()),
            ..configured()
        };
        assert!(config.credentials().is_none());
        assert!(configured().credentials().is_some());
    }

    #[tokio::test]
    async fn unconfigured_client_is_a_no_op() {
        let client = DiscordRoleClient::new("http://127.0.0.1:9", DiscordBotConfig::default()).unwrap();

        assert!(!client.grant_subscriber_role("42").await);
        assert!(!client.revoke_subscriber_role("42").await);
    }

    #[tokio::test]
    async fn unreachable_api_is_swallowed() {
        let client = DiscordRoleClient::new("http://127.0.0.1:9/", configured()).unwrap();

        assert!(!client.grant_subscriber_role("42").await);
        assert!(!client.revoke_subscriber_role("42").await);
    }

    #[tokio::test]
    async fn grant_puts_the_member_role_with_bot_auth() {
        let server = StubServer::start(vec![CannedResponse::empty(204)]).await;
        let client = DiscordRoleClient::new(server.url.clone(), configured()).unwrap();

        assert!(client.grant_subscriber_role("42").await);

        let requests = server.requests().await;
        assert_eq!(
            requests[0].request_line,
            "PUT /guilds/1/members/42/roles/2 HTTP/1.1"
        );
        assert_eq!(requests[0].header("authorization"), Some("Bot bot-token"));
    }

    #[tokio::test]
    async fn grant_on_unknown_member_is_not_applied() {
        let server = StubServer::start(vec![CannedResponse::text(404, r#"{"message": "Unknown Member"}"#)]).await;
        let client = DiscordRoleClient::new(server.url.clone(), configured()).unwrap();

        assert!(!client.grant_subscriber_role("42").await);
        assert_eq!(server.requests().await.len(), 1);
    }

    #[tokio::test]
    async fn revoke_treats_missing_role_as_done() {
        let server = StubServer::start(vec![
            CannedResponse::empty(200),
            CannedResponse::empty(404),
        ])
        .await;
        let client = DiscordRoleClient::new(format!("{}/", server.url), configured()).unwrap();

        assert!(client.revoke_subscriber_role("42").await);
        assert!(client.revoke_subscriber_role("43").await);

        let requests = server.requests().await;
        assert_eq!(
            requests[0].request_line,
            "DELETE /guilds/1/members/42/roles/2 HTTP/1.1"
        );
        assert_eq!(
            requests[1].request_line,
            "DELETE /guilds/1/members/43/roles/2 HTTP/1.1"
        );
        assert_eq!(requests[1].header("authorization"), Some("Bot bot-token"));
    }

    #[tokio::test]
    async fn server_error_on_revoke_is_not_applied() {
        let server = StubServer::start(vec![CannedResponse::text(500, "boom")]).await;
        let client = DiscordRoleClient::new(server.url.clone(), configured()).unwrap();

        assert!(!client.revoke_subscriber_role("42").await);
    }
}
