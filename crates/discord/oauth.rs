use std::time::Duration;

use async_trait::async_trait;
use mockall::automock;
use reqwest::header::AUTHORIZATION;
use serde::Deserialize;
use url::Url;

use super::DISCORD_CDN_BASE;
use crate::domain::value_objects::users::DiscordProfile;

const DISCORD_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, thiserror::Error)]
pub enum DiscordOAuthError {
    #[error("discord oauth is not configured")]
    NotConfigured,
    #[error("discord rejected the request: {0}")]
    Rejected(String),
    #[error("discord request failed: {0}")]
    Transport(String),
}

#[automock]
#[async_trait]
pub trait DiscordOAuth {
    fn authorize_url(&self, state: &str) -> Result<String, DiscordOAuthError>;

    /// Exchanges an authorization code and loads the `/users/@me` profile with it.
    async fn fetch_profile(&self, code: &str) -> Result<DiscordProfile, DiscordOAuthError>;
}

#[derive(Debug, Clone, Default)]
pub struct DiscordOAuthConfig {
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
    pub redirect_uri: Option<String>,
}

#[derive(Debug, Clone)]
struct OAuthApp {
    client_id: String,
    client_secret: String,
    redirect_uri: String,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

#[derive(Debug, Deserialize)]
struct DiscordUser {
    id: String,
    username: String,
    discriminator: Option<String>,
    avatar: Option<String>,
}

pub struct DiscordOAuthClient {
    http: reqwest::Client,
    api_base: String,
    app: Option<OAuthApp>,
}

impl DiscordOAuthClient {
    pub fn new(api_base: impl Into<String>, config: DiscordOAuthConfig) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder().timeout(DISCORD_TIMEOUT).build()?;

        let app = match (config.client_id, config.client_secret, config.redirect_uri) {
            (Some(client_id), Some(client_secret), Some(redirect_uri))
                if !client_id.is_empty() && !client_secret.is_empty() && !redirect_uri.is_empty() =>
            {
                Some(OAuthApp {
                    client_id,
                    client_secret,
                    redirect_uri,
                })
            }
            _ => None,
        };

        Ok(Self {
            http,
            api_base: api_base.into().trim_end_matches('/').to_string(),
            app,
        })
    }

    fn app(&self) -> Result<&OAuthApp, DiscordOAuthError> {
        self.app.as_ref().ok_or(DiscordOAuthError::NotConfigured)
    }

    async fn exchange_code(&self, app: &OAuthApp, code: &str) -> Result<String, DiscordOAuthError> {
        let form = [
            ("client_id", app.client_id.as_str()),
            ("client_secret", app.client_secret.as_str()),
            ("grant_type", "authorization_code"),
            ("code", code),
            ("redirect_uri", app.redirect_uri.as_str()),
        ];

        let resp = self
            .http
            .post(format!("{}/oauth2/token", self.api_base))
            .form(&form)
            .send()
            .await
            .map_err(|err| DiscordOAuthError::Transport(err.without_url().to_string()))?;

        if !resp.status().is_success() {
            return Err(DiscordOAuthError::Rejected(format!(
                "token exchange returned {}",
                resp.status()
            )));
        }

        let token = resp
            .json::<TokenResponse>()
            .await
            .map_err(|err| DiscordOAuthError::Rejected(err.to_string()))?;

        Ok(token.access_token)
    }
}

#[async_trait]
impl DiscordOAuth for DiscordOAuthClient {
    fn authorize_url(&self, state: &str) -> Result<String, DiscordOAuthError> {
        let app = self.app()?;

        let url = Url::parse_with_params(
            &format!("{}/oauth2/authorize", self.api_base),
            &[
                ("client_id", app.client_id.as_str()),
                ("redirect_uri", app.redirect_uri.as_str()),
                ("response_type", "code"),
                ("scope", "identify"),
                ("state", state),
                ("prompt", "consent"),
            ],
        )
        .map_err(|err| DiscordOAuthError::Rejected(err.to_string()))?;

        Ok(url.into())
    }

    async fn fetch_profile(&self, code: &str) -> Result<DiscordProfile, DiscordOAuthError> {
        let app = self.app()?;
        let access_token = self.exchange_code(app, code).await?;

        let resp = self
            .http
            .get(format!("{}/users/@me", self.api_base))
            .header(AUTHORIZATION, format!("Bearer {access_token}"))
            .send()
            .await
            .map_err(|err| DiscordOAuthError::Transport(err.without_url().to_string()))?;

        if !resp.status().is_success() {
            return Err(DiscordOAuthError::Rejected(format!(
                "profile lookup returned {}",
                resp.status()
            )));
        }

        let user = resp
            .json::<DiscordUser>()
            .await
            .map_err(|err| DiscordOAuthError::Rejected(err.to_string()))?;

        Ok(profile_from_user(user))
    }
}

fn profile_from_user(user: DiscordUser) -> DiscordProfile {
    // Migrated accounts report discriminator "0" and have unique usernames.
    let username = match user.discriminator.as_deref() {
        Some(discriminator) if !discriminator.is_empty() && discriminator != "0" => {
            format!("{}#{}", user.username, discriminator)
        }
        _ => user.username,
    };

    let avatar_url = user
        .avatar
        .map(|avatar| format!("{}/avatars/{}/{}.png", DISCORD_CDN_BASE, user.id, avatar));

    DiscordProfile {
        id: user.id,
        username,
        avatar_url,
    }
}
