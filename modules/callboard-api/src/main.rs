use std::sync::Arc;

use anyhow::Result;
use axum::{
    http::{header, HeaderValue},
    routing::{get, post},
    Router,
};
use tower_http::set_header::SetResponseHeaderLayer;
use tracing::info;
use tracing_subscriber::EnvFilter;

use callboard_common::Config;
use callboard_store::{Accounts, EventAccess, RedisStore};

mod auth;
mod rest;

pub struct AppState {
    pub access: EventAccess<RedisStore>,
    pub accounts: Accounts<RedisStore>,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env()
                .add_directive("callboard_api=info".parse()?)
                .add_directive("callboard_store=info".parse()?),
        )
        .init();

    let config = Config::from_env();
    if config.auto_create_events {
        info!("permissive auto-create mode enabled; events are ownerless");
    }

    // One connection handle, shared by reference across all handlers.
    let store = Arc::new(RedisStore::connect(&config.redis_url).await?);

    let state = Arc::new(AppState {
        access: EventAccess::new(store.clone(), config.auto_create_events),
        accounts: Accounts::new(store),
    });

    let app = Router::new()
        // Health check
        .route("/", get(|| async { "ok" }))
        // Public polling + owner patches
        .route(
            "/events/{slug}",
            get(rest::get_event).post(rest::post_event),
        )
        // Accounts
        .route("/accounts", post(rest::register))
        .route("/sessions", post(rest::login))
        // Owner dashboard
        .route(
            "/owned-events",
            get(rest::owned_events).post(rest::create_event),
        )
        .with_state(state)
        // CORS
        .layer(
            tower_http::cors::CorsLayer::new()
                .allow_origin(tower_http::cors::Any)
                .allow_methods(tower_http::cors::Any)
                .allow_headers(tower_http::cors::Any),
        )
        // Pollers must always see the current queue, never a cached one
        .layer(SetResponseHeaderLayer::overriding(
            header::CACHE_CONTROL,
            HeaderValue::from_static("no-store"),
        ))
        // Logging layer: method + path + status + latency only
        .layer(
            tower_http::trace::TraceLayer::new_for_http().make_span_with(
                |request: &axum::http::Request<_>| {
                    tracing::info_span!(
                        "http_request",
                        method = %request.method(),
                        path = %request.uri().path(),
                    )
                },
            ),
        );

    let addr = format!("{}:{}", config.web_host, config.web_port);
    info!("Callboard API starting on {addr}");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
