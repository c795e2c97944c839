//! # API Endpoint Handlers
//!
//! Site-facing endpoints: health, contact relay, CMS proxy, thumbnail
//! fetchers and the portfolio page. Slack endpoints live in `slack`.

use super::{
    AppState,
    error::{ApiError, json_response},
    types::{
        CmsErrorResponse, CmsQuery, ContactResponse, HealthResponse, IdsQuery, ItemsResponse,
        PortfolioQuery,
    },
};
use crate::render::{contact_email, portfolio_page};
use axum::{
    Json,
    body::Bytes,
    extract::{Query, RawQuery, State},
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use maud::Markup;
use serde::Serialize;
use std::collections::BTreeMap;
use undone_core::{
    ContactForm, Platform, ThumbnailIndex, build_cards, facets, is_valid_youtube_id,
    parse_id_list, parse_url_list,
    portfolio::{parse_limit, urls_for, youtube_ids},
    primitives::MAX_CMS_LIMIT,
};

/// Cache policy of successful fetcher answers.
const FETCHER_CACHE_CONTROL: &str = "public, max-age=3600";

fn cached_json<T: Serialize>(body: &T) -> Response {
    let mut response = json_response(StatusCode::OK, body);
    response.headers_mut().insert(
        header::CACHE_CONTROL,
        HeaderValue::from_static(FETCHER_CACHE_CONTROL),
    );
    response
}

/// All values of a repeated query parameter.
fn query_values(raw: Option<&str>, key: &str) -> Vec<String> {
    raw.map(|q| {
        url::form_urlencoded::parse(q.as_bytes())
            .filter(|(k, _)| k == key)
            .map(|(_, v)| v.into_owned())
            .collect()
    })
    .unwrap_or_default()
}

// =============================================================================
// HEALTH HANDLER
// =============================================================================

/// Health check endpoint.
pub async fn health_handler() -> impl IntoResponse {
    Json(HealthResponse::default())
}

// =============================================================================
// CONTACT HANDLER
// =============================================================================

/// Relay a contact form to the mail provider.
pub async fn contact_handler(State(state): State<AppState>, body: Bytes) -> Result<Response, ApiError> {
    if state.config.secrets.resend_api_key.is_none() {
        return Err(ApiError::Configuration("Server configuration error"));
    }

    let form: ContactForm = serde_json::from_slice(&body)
        .map_err(|_| ApiError::BadRequest("Invalid request body".to_string()))?;
    let submission = form.validate()?;

    let email = contact_email(&submission, &state.config.site);
    state
        .upstream
        .send_email(&email)
        .await
        .map_err(ApiError::upstream("Failed to send email"))?;

    tracing::info!(event = "contact_sent", category = ?submission.category, "Contact form relayed");
    Ok(json_response(StatusCode::OK, &ContactResponse { success: true }))
}

// =============================================================================
// CMS PROXY HANDLERS
// =============================================================================

/// Relay a page of production records.
///
/// CORS headers are added by the route layer.
pub async fn microcms_handler(
    State(state): State<AppState>,
    Query(query): Query<CmsQuery>,
) -> Result<Response, ApiError> {
    let limit = parse_limit(query.limit.as_deref())?;
    if state.config.secrets.microcms_api_key.is_none() {
        return Err(ApiError::Configuration("API key not configured"));
    }

    let cms = state
        .upstream
        .list_productions_raw(limit)
        .await
        .map_err(ApiError::upstream("Internal server error"))?;

    match cms.body {
        Some(body) => Ok(json_response(StatusCode::OK, &body)),
        None => {
            let status = StatusCode::from_u16(cms.status).unwrap_or(StatusCode::BAD_GATEWAY);
            Ok(json_response(
                status,
                &CmsErrorResponse {
                    error: "Failed to fetch data from microCMS".to_string(),
                    status: cms.status,
                },
            ))
        }
    }
}

/// CORS preflight for the CMS proxy.
pub async fn microcms_preflight_handler() -> impl IntoResponse {
    (
        StatusCode::NO_CONTENT,
        [(header::ACCESS_CONTROL_MAX_AGE, "86400")],
    )
}

// =============================================================================
// THUMBNAIL FETCHER HANDLERS
// =============================================================================

/// YouTube duration, view count and publish date per video id.
pub async fn youtube_handler(
    State(state): State<AppState>,
    Query(query): Query<IdsQuery>,
) -> Result<Response, ApiError> {
    if state.config.secrets.youtube_api_key.is_none() {
        return Err(ApiError::Configuration("Missing API key"));
    }

    let ids: Vec<String> = parse_id_list(query.ids.as_deref().unwrap_or_default())
        .into_iter()
        .filter(|id| {
            let valid = is_valid_youtube_id(id);
            if !valid {
                tracing::warn!(id = %id, "Invalid YouTube ID format");
            }
            valid
        })
        .collect();
    if ids.is_empty() {
        return Ok(json_response(StatusCode::OK, &ItemsResponse::<()>::default()));
    }

    let items = state
        .upstream
        .video_details(&ids)
        .await
        .map_err(ApiError::upstream("Failed to fetch data"))?;
    Ok(cached_json(&ItemsResponse { items }))
}

/// TikTok thumbnail per video URL.
pub async fn tiktok_handler(State(state): State<AppState>, RawQuery(raw): RawQuery) -> Response {
    let urls = parse_url_list(&query_values(raw.as_deref(), "urls"));
    if urls.is_empty() {
        return json_response(StatusCode::OK, &ItemsResponse::<String>::default());
    }
    let items = state.upstream.tiktok_thumbnails(&urls).await;
    cached_json(&ItemsResponse { items })
}

/// DMM TV preview image per page URL.
pub async fn dmm_thumbnail_handler(State(state): State<AppState>, RawQuery(raw): RawQuery) -> Response {
    let urls = parse_url_list(&query_values(raw.as_deref(), "urls"));
    if urls.is_empty() {
        return json_response(StatusCode::OK, &ItemsResponse::<String>::default());
    }
    let items = state.upstream.dmm_thumbnails(&urls).await;
    cached_json(&ItemsResponse { items })
}

// =============================================================================
// PORTFOLIO HANDLER
// =============================================================================

/// Server-rendered portfolio grid.
pub async fn portfolio_handler(
    State(state): State<AppState>,
    Query(query): Query<PortfolioQuery>,
) -> Result<Markup, ApiError> {
    let list = state
        .upstream
        .list_productions(MAX_CMS_LIMIT)
        .await
        .map_err(ApiError::upstream("Failed to fetch data from microCMS"))?;
    let productions = list.contents;

    let ids = youtube_ids(&productions);
    let tiktok_urls = urls_for(&productions, Platform::TikTok);
    let dmm_urls = urls_for(&productions, Platform::DmmTv);

    let videos = async {
        if ids.is_empty() || state.config.secrets.youtube_api_key.is_none() {
            return BTreeMap::new();
        }
        state.upstream.video_details(&ids).await.unwrap_or_else(|e| {
            tracing::warn!(error = %e, "YouTube enrichment failed");
            BTreeMap::new()
        })
    };
    let (videos, tiktok, dmm) = futures::join!(
        videos,
        state.upstream.tiktok_thumbnails(&tiktok_urls),
        state.upstream.dmm_thumbnails(&dmm_urls),
    );

    let mut index = ThumbnailIndex {
        videos,
        thumbnails: tiktok,
    };
    index.thumbnails.extend(dmm);

    let filter = query.into_filter();
    let cards = build_cards(&productions, &filter, &index);
    Ok(portfolio_page(
        &cards,
        &facets(&productions),
        &filter,
        &state.config.site.site_name,
    ))
}
