use chrono::{Duration, Utc};
use jsonwebtoken::{
    Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode,
    errors::ErrorKind,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::AuthError;

const LINK_STATE_PURPOSE: &str = "discord_link";
const LINK_STATE_TTL_MINUTES: i64 = 10;

#[derive(Debug, Serialize, Deserialize)]
pub struct AccessClaims {
    pub user_id: String,
    pub exp: usize,
}

/// Signed OAuth `state`: binds a Discord callback to the user who started it.
#[derive(Debug, Serialize, Deserialize)]
pub struct LinkStateClaims {
    pub sub: String,
    pub purpose: String,
    pub exp: usize,
}

#[derive(Clone)]
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    access_token_ttl: Duration,
}

impl TokenService {
    pub fn new(secret: &str, access_token_expire_minutes: i64) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            access_token_ttl: Duration::minutes(access_token_expire_minutes),
        }
    }

    pub fn issue_access_token(&self, user_id: Uuid) -> Result<String, AuthError> {
        let claims = AccessClaims {
            user_id: user_id.to_string(),
            exp: expires_in(self.access_token_ttl),
        };

        self.sign(&claims)
    }

    pub fn verify_access_token(&self, token: &str) -> Result<Uuid, AuthError> {
        let claims = self.decode::<AccessClaims>(token)?;

        Uuid::parse_str(&claims.user_id).map_err(|_| AuthError::InvalidToken)
    }

    pub fn issue_link_state(&self, user_id: Uuid) -> Result<String, AuthError> {
        let claims = LinkStateClaims {
            sub: user_id.to_string(),
            purpose: LINK_STATE_PURPOSE.to_string(),
            exp: expires_in(Duration::minutes(LINK_STATE_TTL_MINUTES)),
        };

        self.sign(&claims)
    }

    pub fn verify_link_state(&self, state: &str) -> Result<Uuid, AuthError> {
        let claims = self.decode::<LinkStateClaims>(state)?;
        if claims.purpose != LINK_STATE_PURPOSE {
            return Err(AuthError::InvalidToken);
        }

        Uuid::parse_str(&claims.sub).map_err(|_| AuthError::InvalidToken)
    }

    fn sign<T: Serialize>(&self, claims: &T) -> Result<String, AuthError> {
        encode(&Header::new(Algorithm::HS256), claims, &self.encoding_key)
            .map_err(|err| AuthError::Internal(anyhow::anyhow!("failed to sign token: {err}")))
    }

    fn decode<T: for<'de> Deserialize<'de>>(&self, token: &str) -> Result<T, AuthError> {
        let validation = Validation::new(Algorithm::HS256);

        decode::<T>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|err| match err.kind() {
                ErrorKind::ExpiredSignature => AuthError::TokenExpired,
                _ => AuthError::InvalidToken,
            })
    }
}

fn expires_in(ttl: Duration) -> usize {
    (Utc::now() + ttl).timestamp().max(0) as usize
}
