//! # Slack Registration Bot
//!
//! `/jisseki <url> <role> [tag] [--featured]` registers a production in the
//! CMS. Without arguments it opens a modal instead. Each registration posts
//! a message with a delete button; pressing it removes the record again.
//!
//! Slack expects an answer within three seconds, so registrations and
//! deletions run on a spawned task and report through `response_url` or
//! `chat.postMessage`.

use super::{
    AppState,
    error::{ApiError, json_response},
    types::{Interaction, InteractionForm, SlashCommand, View},
};
use crate::upstream::{Upstream, UpstreamError};
use axum::{
    Form,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::{Value, json};
use undone_core::{CommandArgs, Platform, ProductionDraft, youtube_id};

/// `callback_id` of the registration modal.
pub const REGISTER_CALLBACK_ID: &str = "jisseki_register";

/// `action_id` of the delete button.
pub const DELETE_ACTION_ID: &str = "delete_production";

const URL_BLOCK: &str = "url_block";
const ROLE_BLOCK: &str = "role_block";
const TAG_BLOCK: &str = "tag_block";
const FEATURED_BLOCK: &str = "featured_block";
const FEATURED_OPTION: &str = "featured";

// =============================================================================
// REGISTRATION
// =============================================================================

/// A production written to the CMS.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registered {
    pub id: String,
    pub title: String,
    pub platform: Platform,
}

/// Why a registration did not happen.
#[derive(Debug, thiserror::Error)]
pub enum RegistrationError {
    /// The CMS refused the record or the bot is misconfigured.
    #[error("{0}")]
    Rejected(String),

    /// The CMS could not be reached.
    #[error(transparent)]
    Upstream(UpstreamError),
}

impl From<UpstreamError> for RegistrationError {
    fn from(e: UpstreamError) -> Self {
        match e {
            UpstreamError::NotConfigured(name) => Self::Rejected(format!("{name} not configured")),
            UpstreamError::Status { status, body, .. } => {
                Self::Rejected(format!("microCMS error: {status} {body}"))
            }
            other => Self::Upstream(other),
        }
    }
}

/// Title and release date from the platform, when it offers them.
///
/// Lookup failures are not errors; the draft falls back to a generic title.
async fn lookup_metadata(upstream: &Upstream, args: &CommandArgs) -> (Option<String>, Option<String>) {
    match Platform::detect(&args.url) {
        Platform::YouTube => {
            let Some(id) = youtube_id(&args.url) else {
                return (None, None);
            };
            if upstream.config().secrets.youtube_api_key.is_none() {
                return (None, None);
            }
            match upstream.video_snippet(&id).await {
                Ok(Some(snippet)) => (
                    Some(snippet.title),
                    Some(snippet.published_at).filter(|p| !p.is_empty()),
                ),
                Ok(None) => (None, None),
                Err(e) => {
                    tracing::debug!(error = %e, "YouTube title lookup failed");
                    (None, None)
                }
            }
        }
        Platform::TikTok => match upstream.tiktok_oembed(&args.url).await {
            Ok(embed) => (embed.title, None),
            Err(e) => {
                tracing::debug!(error = %e, "TikTok title lookup failed");
                (None, None)
            }
        },
        Platform::DmmTv | Platform::Other => (None, None),
    }
}

/// Register one production.
pub async fn register(upstream: &Upstream, args: &CommandArgs) -> Result<Registered, RegistrationError> {
    let (title, release_date) = lookup_metadata(upstream, args).await;
    let draft = ProductionDraft::new(args, title, release_date);

    if upstream.config().secrets.microcms_write_key.is_none() {
        return Err(UpstreamError::NotConfigured("MICROCMS_WRITE_KEY").into());
    }
    let id = upstream.create_production(&draft).await?;

    tracing::info!(event = "production_registered", id = %id, platform = %draft.platform, "Production registered");
    Ok(Registered {
        id,
        title: draft.title,
        platform: draft.platform,
    })
}

// =============================================================================
// MESSAGES
// =============================================================================

/// Ephemeral reply visible to the invoking user only.
pub fn ephemeral(text: &str) -> Value {
    json!({ "response_type": "ephemeral", "text": text })
}

/// Outcome message of a registration.
pub fn outcome_message(args: &CommandArgs, outcome: &Result<Registered, RegistrationError>) -> Value {
    match outcome {
        Ok(registered) => {
            let mut text = format!(
                "✅ 登録完了!\n*{}*\nプラットフォーム: {}\n担当: {}",
                registered.title, registered.platform, args.role
            );
            if let Some(tag) = args.tag() {
                text.push_str(&format!("\nタグ: {tag}"));
            }
            if args.featured {
                text.push_str("\n⭐ Featured");
            }
            json!({
                "response_type": "in_channel",
                "text": text,
                "blocks": [
                    { "type": "section", "text": { "type": "mrkdwn", "text": text } },
                    {
                        "type": "actions",
                        "elements": [{
                            "type": "button",
                            "text": { "type": "plain_text", "text": "削除" },
                            "style": "danger",
                            "action_id": DELETE_ACTION_ID,
                            "value": registered.id,
                            "confirm": {
                                "title": { "type": "plain_text", "text": "削除しますか?" },
                                "text": { "type": "mrkdwn", "text": format!("*{}* を削除します", registered.title) },
                                "confirm": { "type": "plain_text", "text": "削除" },
                                "deny": { "type": "plain_text", "text": "キャンセル" }
                            }
                        }]
                    }
                ]
            })
        }
        Err(RegistrationError::Rejected(reason)) => json!({
            "response_type": "in_channel",
            "text": format!("❌ 登録失敗: {reason}"),
        }),
        Err(e @ RegistrationError::Upstream(_)) => ephemeral(&format!("❌ エラー: {e}")),
    }
}

/// The registration modal. `channel_id` round-trips in `private_metadata`.
pub fn registration_modal(channel_id: &str) -> Value {
    let input = |block: &str, label: &str, placeholder: &str, optional: bool| {
        json!({
            "type": "input",
            "block_id": block,
            "optional": optional,
            "label": { "type": "plain_text", "text": label },
            "element": {
                "type": "plain_text_input",
                "action_id": block.trim_end_matches("_block"),
                "placeholder": { "type": "plain_text", "text": placeholder }
            }
        })
    };
    json!({
        "type": "modal",
        "callback_id": REGISTER_CALLBACK_ID,
        "private_metadata": channel_id,
        "title": { "type": "plain_text", "text": "実績登録" },
        "submit": { "type": "plain_text", "text": "登録" },
        "close": { "type": "plain_text", "text": "キャンセル" },
        "blocks": [
            input(URL_BLOCK, "URL", "https://youtu.be/xxxxx", false),
            input(ROLE_BLOCK, "担当業務", "撮影・編集", false),
            input(TAG_BLOCK, "タグ", "ドラマ", true),
            {
                "type": "input",
                "block_id": FEATURED_BLOCK,
                "optional": true,
                "label": { "type": "plain_text", "text": "表示" },
                "element": {
                    "type": "checkboxes",
                    "action_id": FEATURED_OPTION,
                    "options": [{
                        "text": { "type": "plain_text", "text": "⭐ Featured" },
                        "value": FEATURED_OPTION
                    }]
                }
            }
        ]
    })
}

/// Arguments from a submitted modal, or per-block errors.
pub fn modal_arguments(view: &View) -> Result<CommandArgs, Value> {
    let state = &view.state;
    let args = CommandArgs {
        url: state.text(URL_BLOCK, "url"),
        role: state.text(ROLE_BLOCK, "role"),
        tag: state.text(TAG_BLOCK, "tag"),
        featured: state.is_checked(FEATURED_BLOCK, FEATURED_OPTION, FEATURED_OPTION),
    };

    let mut errors = serde_json::Map::new();
    if args.url.is_empty() {
        errors.insert(URL_BLOCK.to_string(), json!("URLを入力してください"));
    }
    if args.role.is_empty() {
        errors.insert(ROLE_BLOCK.to_string(), json!("担当業務を入力してください"));
    }
    if errors.is_empty() {
        Ok(args)
    } else {
        Err(json!({ "response_action": "errors", "errors": errors }))
    }
}

// =============================================================================
// HANDLERS
// =============================================================================

/// `POST /api/slack-jisseki`
pub async fn slash_command_handler(
    State(state): State<AppState>,
    Form(command): Form<SlashCommand>,
) -> Response {
    let has_bot_token = state.config.secrets.slack_bot_token.is_some();
    if command.text.trim().is_empty() && has_bot_token {
        let view = registration_modal(&command.channel_id);
        return match state.upstream.open_view(&command.trigger_id, &view).await {
            Ok(()) => StatusCode::OK.into_response(),
            Err(e) => {
                tracing::error!(error = %e, "views.open failed");
                json_response(StatusCode::OK, &ephemeral(&format!("❌ エラー: {e}")))
            }
        };
    }

    let args = match CommandArgs::parse(&command.text).validate() {
        Ok(args) => args,
        Err(usage) => return json_response(StatusCode::OK, &ephemeral(&usage.to_string())),
    };

    let upstream = state.upstream.clone();
    let response_url = command.response_url;
    tokio::spawn(async move {
        let outcome = register(&upstream, &args).await;
        let message = outcome_message(&args, &outcome);
        if response_url.is_empty() {
            tracing::warn!("slash command without response_url; outcome dropped");
            return;
        }
        if let Err(e) = upstream.post_response(&response_url, &message).await {
            tracing::error!(error = %e, "failed to post registration outcome");
        }
    });

    json_response(StatusCode::OK, &ephemeral("⏳ 登録中..."))
}

/// `POST /api/slack-interactions`
pub async fn interaction_handler(
    State(state): State<AppState>,
    Form(form): Form<InteractionForm>,
) -> Result<Response, ApiError> {
    let interaction: Interaction = serde_json::from_str(&form.payload)
        .map_err(|_| ApiError::BadRequest("Invalid interaction payload".to_string()))?;

    match interaction {
        Interaction::ViewSubmission { view } if view.callback_id == REGISTER_CALLBACK_ID => {
            let args = match modal_arguments(&view) {
                Ok(args) => args,
                Err(errors) => return Ok(json_response(StatusCode::OK, &errors)),
            };
            let channel = view.private_metadata;
            let upstream = state.upstream.clone();
            tokio::spawn(async move {
                let outcome = register(&upstream, &args).await;
                let message = outcome_message(&args, &outcome);
                if channel.is_empty() {
                    tracing::warn!("modal submission without channel; outcome dropped");
                    return;
                }
                if let Err(e) = upstream.post_message(&channel, &message).await {
                    tracing::error!(error = %e, "failed to post registration outcome");
                }
            });
            Ok(StatusCode::OK.into_response())
        }
        Interaction::BlockActions {
            actions,
            response_url,
        } => {
            let target = actions
                .into_iter()
                .find(|a| a.action_id == DELETE_ACTION_ID)
                .and_then(|a| a.value)
                .filter(|id| !id.is_empty());
            if let Some(id) = target {
                let upstream = state.upstream.clone();
                tokio::spawn(async move { delete_and_report(&upstream, &id, response_url).await });
            }
            Ok(StatusCode::OK.into_response())
        }
        _ => Ok(StatusCode::OK.into_response()),
    }
}

async fn delete_and_report(upstream: &Upstream, id: &str, response_url: Option<String>) {
    let message = match upstream.delete_production(id).await {
        Ok(()) => {
            tracing::info!(event = "production_deleted", id = %id, "Production deleted");
            json!({ "replace_original": true, "text": "🗑️ 削除しました" })
        }
        Err(e) => {
            tracing::error!(error = %e, id = %id, "production delete failed");
            json!({
                "response_type": "ephemeral",
                "replace_original": false,
                "text": format!("❌ 削除失敗: {}", RegistrationError::from(e)),
            })
        }
    };
    let Some(response_url) = response_url.filter(|u| !u.is_empty()) else {
        return;
    };
    if let Err(e) = upstream.post_response(&response_url, &message).await {
        tracing::error!(error = %e, "failed to post delete outcome");
    }
}

// =============================================================================
// TESTS
// =============================================================================
