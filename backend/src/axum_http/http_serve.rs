use crate::{
    auth::{AuthState, TokenService},
    axum_http::{
        default_routers,
        middleware::{
            rate_limit::rate_limit,
            request_audit::{RequestAuditState, request_audit},
        },
        routers,
    },
    config::config_model::DotEnvyConfig,
    rate_limiter::RateLimiter,
    usecases::{audit_log::AuditLogger, role_reconciliation::RoleReconciliationUseCase},
};
use anyhow::Result;
use axum::{
    Extension, Router,
    http::{
        HeaderValue, Method,
        header::{AUTHORIZATION, CONTENT_TYPE},
    },
    middleware,
    routing::get,
};
use crates::{
    discord::{DISCORD_API_BASE, oauth::DiscordOAuthClient, role_sync::DiscordRoleClient},
    domain::value_objects::networks::NetworkWallets,
    infra::db::{
        postgres::postgres_connection::PgPoolSquad,
        repositories::{
            admin_logs::AdminLogPostgres, subscriptions::SubscriptionPostgres, users::UserPostgres,
        },
    },
    payments::RpcChainVerifier,
};
use std::{net::SocketAddr, sync::Arc, time::Duration};
use tokio::net::TcpListener;
use tower_http::{
    cors::{Any, CorsLayer},
    limit::RequestBodyLimitLayer,
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use tracing::{error, info, warn};

pub async fn start(config: Arc<DotEnvyConfig>, db_pool: Arc<PgPoolSquad>) -> Result<()> {
    let tokens = TokenService::new(
        &config.user_secret.secret,
        config.user_secret.access_token_expire_minutes,
    );

    let user_repository = Arc::new(UserPostgres::new(Arc::clone(&db_pool)));
    let subscription_repository = Arc::new(SubscriptionPostgres::new(Arc::clone(&db_pool)));
    let admin_log_repository = Arc::new(AdminLogPostgres::new(Arc::clone(&db_pool)));

    let audit = Arc::new(AuditLogger::new(
        admin_log_repository,
        config.audit.log_file.clone(),
    ));
    let role_sync = Arc::new(DiscordRoleClient::new(
        DISCORD_API_BASE,
        config.discord.bot(),
    )?);
    let oauth = Arc::new(DiscordOAuthClient::new(
        DISCORD_API_BASE,
        config.discord.oauth(),
    )?);
    let chain_verifier = Arc::new(RpcChainVerifier::new(
        config.chain.rpc_endpoints.clone(),
        config.chain.on_missing_endpoint(),
    )?);
    let wallets = Arc::new(NetworkWallets::with_overrides(
        config.chain.wallet_overrides.clone(),
    ));

    let auth_state = Arc::new(AuthState::new(tokens.clone(), user_repository.clone()));
    let request_audit_state = Arc::new(RequestAuditState {
        tokens: tokens.clone(),
        audit: audit.clone(),
    });

    if let Some(interval) = config.role_sync.interval() {
        let reconciliation = Arc::new(RoleReconciliationUseCase::new(
            Arc::clone(&user_repository),
            Arc::clone(&subscription_repository),
            Arc::clone(&role_sync),
            Arc::clone(&audit),
        ));
        tokio::spawn(reconciliation.run_loop(interval));
    } else {
        info!("role_sync: background sweep disabled");
    }

    let mut app = Router::new()
        .fallback(default_routers::not_found)
        .nest(
            "/api/v1/auth",
            routers::auth::routes(Arc::clone(&db_pool), tokens.clone()),
        )
        .nest(
            "/api/v1/subscriptions",
            routers::subscriptions::routes(
                Arc::clone(&db_pool),
                chain_verifier,
                Arc::clone(&role_sync),
                Arc::clone(&audit),
                wallets,
            ),
        )
        .nest(
            "/api/v1/discord",
            routers::discord::routes(
                Arc::clone(&db_pool),
                oauth,
                Arc::clone(&role_sync),
                Arc::clone(&audit),
                tokens,
            ),
        )
        .nest(
            "/api/v1/admin",
            routers::admin::routes(Arc::clone(&db_pool), Arc::clone(&audit)),
        )
        .route("/api/v1/health-check", get(default_routers::health_check))
        .layer(Extension(auth_state))
        .layer(middleware::from_fn_with_state(
            request_audit_state,
            request_audit,
        ));

    if config.rate_limit.enabled {
        let limiter = Arc::new(RateLimiter::from_config(&config.rate_limit));
        tokio::spawn(Arc::clone(&limiter).run_purge_loop());
        app = app.layer(middleware::from_fn_with_state(limiter, rate_limit));
        info!("rate_limit: enabled");
    }

    let app = app
        .layer(TimeoutLayer::new(Duration::from_secs(
            config.backend_server.timeout,
        )))
        .layer(RequestBodyLimitLayer::new(
            (config.backend_server.body_limit * 1024 * 1024).try_into()?,
        ))
        .layer(cors_layer(&config.backend_server.cors_origins))
        .layer(TraceLayer::new_for_http());

    let addr = SocketAddr::from(([0, 0, 0, 0], config.backend_server.port));
    let listener = TcpListener::bind(addr).await?;

    info!("Server is running on port {}", config.backend_server.port);
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    Ok(())
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PATCH,
            Method::PUT,
            Method::DELETE,
        ])
        .allow_headers([AUTHORIZATION, CONTENT_TYPE]);

    if origins.iter().any(|origin| origin == "*") || origins.is_empty() {
        return layer.allow_origin(Any);
    }

    let allowed = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(%origin, "http: ignoring invalid CORS origin");
                None
            }
        })
        .collect::<Vec<_>>();

    layer.allow_origin(allowed)
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            error!(error = %err, "Failed to install CTRL+C signal handler");
            std::future::pending::<()>().await;
        }
    };

    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received ctrl+C signal"),
        _ = terminate => info!("Received terminate signal"),
    }
}
