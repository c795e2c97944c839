//! # undone HTTP API Module
//!
//! This module implements the HTTP server using axum.
//!
//! ## Endpoints
//!
//! - `GET /health` - Health check
//! - `POST /api/contact` - Relay the contact form by email
//! - `GET|OPTIONS /api/microcms` - CMS read proxy (CORS-enabled)
//! - `GET /api/youtube?ids=` - Video duration, views, publish date
//! - `GET /api/tiktok?urls=` - TikTok thumbnails
//! - `GET /api/dmm-thumbnail?urls=` - DMM TV preview images
//! - `POST /api/slack-jisseki` - `/jisseki` slash command
//! - `POST /api/slack-interactions` - modal submissions and button presses
//! - `GET /portfolio` - Server-rendered portfolio grid
//!
//! ## Guards
//!
//! - Origin/Referer allow-list on the contact relay and the fetchers
//! - Slack signature on the Slack endpoints (when a signing secret is set)
//! - Global rate limit (`UNDONE_RATE_LIMIT`, 0 disables)

mod error;
mod guard;
mod handlers;
mod middleware;
mod slack;
mod types;

pub use error::{ApiError, JSON_UTF8, json_response};
pub use guard::{SLACK_SIGNATURE_HEADER, SLACK_TIMESTAMP_HEADER};
pub use middleware::{GlobalRateLimiter, create_rate_limiter};
pub use slack::{
    DELETE_ACTION_ID, REGISTER_CALLBACK_ID, Registered, RegistrationError, outcome_message,
    register, registration_modal,
};
pub use types::{
    CmsErrorResponse, ContactResponse, HealthResponse, Interaction, ItemsResponse, PortfolioQuery,
};

use crate::config::Config;
use crate::upstream::{Upstream, UpstreamError};
use axum::{
    Router,
    http::{HeaderValue, header},
    middleware as axum_middleware,
    routing::{get, post},
};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;
use undone_core::{OriginGuard, SlackVerifier};

/// Request bodies above this size are rejected (contact form + Slack payloads).
const MAX_BODY_BYTES: usize = 256 * 1024;

// =============================================================================
// SERVER STATE
// =============================================================================

/// Shared server state.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub upstream: Upstream,
    pub origin_guard: Arc<OriginGuard>,
    /// `None` when no signing secret is configured.
    pub verifier: Option<Arc<SlackVerifier>>,
}

impl AppState {
    /// Build state from the effective configuration.
    pub fn new(config: Config) -> Result<Self, UpstreamError> {
        let config = Arc::new(config);
        let upstream = Upstream::new(Arc::clone(&config))?;
        let origin_guard = Arc::new(OriginGuard::new(&config.site.allowed_origins));
        let verifier = config
            .secrets
            .slack_signing_secret
            .as_deref()
            .map(|secret| Arc::new(SlackVerifier::new(secret)));
        Ok(Self {
            config,
            upstream,
            origin_guard,
            verifier,
        })
    }
}

// =============================================================================
// CORS CONFIGURATION
// =============================================================================

/// `Access-Control-Allow-Origin` of the CMS proxy.
fn cms_allow_origin(origin: &str) -> HeaderValue {
    match origin.parse::<HeaderValue>() {
        Ok(value) => {
            tracing::info!("CORS: CMS proxy allows origin: {}", origin);
            value
        }
        Err(e) => {
            tracing::warn!("CORS: Invalid origin '{}': {}, using https://undone.jp", origin, e);
            HeaderValue::from_static("https://undone.jp")
        }
    }
}

// =============================================================================
// ROUTER CREATION
// =============================================================================

/// Create the axum router with all endpoints and middleware.
///
/// Middleware stack (outer to inner):
/// 1. Tracing - logs all requests
/// 2. Body limit
/// 3. Rate Limiting - protects upstream quotas (if enabled)
/// 4. Per-route guards - origin allow-list, Slack signature
pub fn create_router(state: AppState) -> Router {
    let rate_limiter = create_rate_limiter(state.config.server.rate_limit);
    match &rate_limiter {
        Some(_) => tracing::info!(
            "Rate limiting enabled: {} requests/second",
            state.config.server.rate_limit
        ),
        None => tracing::info!("Rate limiting disabled"),
    }

    if state.verifier.is_none() {
        tracing::warn!(
            "⚠️  Slack signature verification DISABLED - Slack endpoints accept unsigned requests! \
             Set SLACK_SIGNING_SECRET to enable verification."
        );
    }

    let contact = Router::new()
        .route("/api/contact", post(handlers::contact_handler))
        .route_layer(axum_middleware::from_fn_with_state(
            state.clone(),
            guard::contact_origin_guard,
        ));

    let fetchers = Router::new()
        .route("/api/youtube", get(handlers::youtube_handler))
        .route("/api/tiktok", get(handlers::tiktok_handler))
        .route("/api/dmm-thumbnail", get(handlers::dmm_thumbnail_handler))
        .route_layer(axum_middleware::from_fn_with_state(
            state.clone(),
            guard::referer_guard,
        ));

    let cms = Router::new()
        .route(
            "/api/microcms",
            get(handlers::microcms_handler).options(handlers::microcms_preflight_handler),
        )
        .layer(
            ServiceBuilder::new()
                .layer(SetResponseHeaderLayer::overriding(
                    header::ACCESS_CONTROL_ALLOW_ORIGIN,
                    cms_allow_origin(&state.config.site.cors_origin),
                ))
                .layer(SetResponseHeaderLayer::overriding(
                    header::ACCESS_CONTROL_ALLOW_METHODS,
                    HeaderValue::from_static("GET, OPTIONS"),
                ))
                .layer(SetResponseHeaderLayer::overriding(
                    header::ACCESS_CONTROL_ALLOW_HEADERS,
                    HeaderValue::from_static("Content-Type"),
                )),
        );

    let slack = Router::new()
        .route("/api/slack-jisseki", post(slack::slash_command_handler))
        .route("/api/slack-interactions", post(slack::interaction_handler))
        .route_layer(axum_middleware::from_fn_with_state(
            state.clone(),
            guard::slack_signature_guard,
        ));

    let mut router = Router::new()
        .route("/health", get(handlers::health_handler))
        .route("/portfolio", get(handlers::portfolio_handler))
        .merge(contact)
        .merge(fetchers)
        .merge(cms)
        .merge(slack);

    if let Some(limiter) = rate_limiter {
        router = router.layer(axum_middleware::from_fn_with_state(
            limiter,
            middleware::rate_limit_middleware,
        ));
    }

    router
        .layer(axum::extract::DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

// =============================================================================
// SERVER STARTUP
// =============================================================================

/// Start the HTTP server.
pub async fn run_server(addr: &str, config: Config) -> Result<(), std::io::Error> {
    let state = AppState::new(config).map_err(std::io::Error::other)?;
    let router = create_router(state);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("undone HTTP server listening on {}", addr);

    axum::serve(listener, router).await
}
