use super::*;
use axum::http::HeaderValue;
use chrono::Utc;
use crates::domain::repositories::users::MockUserRepository;
use jsonwebtoken::{EncodingKey, Header, encode};
use mockall::predicate::eq;

const SECRET: &str = "supersecretjwtsecretforunittesting123";

fn token_service() -> TokenService {
    TokenService::new(SECRET, 60)
}

fn sample_user(id: Uuid, status: &str, role: &str) -> UserEntity {
    UserEntity {
        id,
        email: "test@example.com".to_string(),
        username: "tester".to_string(),
        password_hash: "x".to_string(),
        role: role.to_string(),
        status: status.to_string(),
        discord_id: None,
        discord_username: None,
        discord_avatar_url: None,
        created_at: Utc::now(),
    }
}

fn bearer_headers(token: &str) -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(
        AUTHORIZATION,
        HeaderValue::from_str(&format!("Bearer {token}")).unwrap(),
    );
    headers
}

#[test]
fn test_access_token_round_trip() {
    let tokens = token_service();
    let user_id = Uuid::new_v4();

    let token = tokens.issue_access_token(user_id).unwrap();
    assert_eq!(tokens.verify_access_token(&token).unwrap(), user_id);
}

#[test]
fn test_access_token_expired() {
    let claims = AccessClaims {
        user_id: "123e4567-e89b-12d3-a456-426614174000".to_string(),
        exp: 1,
    };
    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(SECRET.as_bytes()),
    )
    .unwrap();

    let result = token_service().verify_access_token(&token);
    assert!(matches!(result, Err(AuthError::TokenExpired)));
}

#[test]
fn test_access_token_invalid_signature() {
    let other = TokenService::new("wrongsecret", 60);
    let token = other.issue_access_token(Uuid::new_v4()).unwrap();

    let result = token_service().verify_access_token(&token);
    assert!(matches!(result, Err(AuthError::InvalidToken)));
}

#[test]
fn test_access_token_is_not_a_link_state() {
    let tokens = token_service();
    let token = tokens.issue_access_token(Uuid::new_v4()).unwrap();

    assert!(matches!(
        tokens.verify_link_state(&token),
        Err(AuthError::InvalidToken)
    ));
}

#[test]
fn test_link_state_round_trip() {
    let tokens = token_service();
    let user_id = Uuid::new_v4();

    let state = tokens.issue_link_state(user_id).unwrap();
    assert_eq!(tokens.verify_link_state(&state).unwrap(), user_id);
}

#[test]
fn test_password_hash_verifies() {
    let hash = hash_password("correct horse").unwrap();

    assert!(verify_password("correct horse", &hash));
    assert!(!verify_password("battery staple", &hash));
    assert!(!verify_password("correct horse", "not-a-phc-string"));
}

#[test]
fn test_bearer_token_parsing() {
    assert!(matches!(
        bearer_token(&HeaderMap::new()),
        Err(AuthError::MissingHeader)
    ));

    let mut headers = HeaderMap::new();
    headers.insert(AUTHORIZATION, HeaderValue::from_static("Basic abc"));
    assert!(matches!(bearer_token(&headers), Err(AuthError::InvalidHeader)));

    assert_eq!(bearer_token(&bearer_headers("abc")).unwrap(), "abc");
}

#[tokio::test]
async fn test_authenticate_active_user() {
    let user_id = Uuid::new_v4();
    let user = sample_user(user_id, "active", "subscriber");

    let mut users = MockUserRepository::new();
    users
        .expect_find_by_id()
        .with(eq(user_id))
        .returning(move |_| Ok(Some(user.clone())));

    let tokens = token_service();
    let token = tokens.issue_access_token(user_id).unwrap();
    let state = AuthState::new(tokens, Arc::new(users));

    let auth = state.authenticate(&bearer_headers(&token)).await.unwrap();
    assert_eq!(auth.user_id, user_id);
    assert_eq!(auth.role, UserRole::Subscriber);
}

#[tokio::test]
async fn test_authenticate_rejects_banned_user() {
    let user_id = Uuid::new_v4();
    let user = sample_user(user_id, "banned", "user");

    let mut users = MockUserRepository::new();
    users
        .expect_find_by_id()
        .returning(move |_| Ok(Some(user.clone())));

    let tokens = token_service();
    let token = tokens.issue_access_token(user_id).unwrap();
    let state = AuthState::new(tokens, Arc::new(users));

    let result = state.authenticate(&bearer_headers(&token)).await;
    assert!(matches!(result, Err(AuthError::Banned)));
}

#[tokio::test]
async fn test_authenticate_rejects_deleted_user() {
    let mut users = MockUserRepository::new();
    users.expect_find_by_id().returning(|_| Ok(None));

    let tokens = token_service();
    let token = tokens.issue_access_token(Uuid::new_v4()).unwrap();
    let state = AuthState::new(tokens, Arc::new(users));

    let result = state.authenticate(&bearer_headers(&token)).await;
    assert!(matches!(result, Err(AuthError::UserNotFound)));
}
