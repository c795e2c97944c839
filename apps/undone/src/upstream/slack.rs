use super::{Upstream, UpstreamError, ensure_success, parse, transport};
use serde::Deserialize;
use serde_json::{Value, json};

const SERVICE: &str = "Slack";

/// Envelope of every Web API answer.
#[derive(Debug, Deserialize)]
struct ApiReply {
    ok: bool,
    #[serde(default)]
    error: Option<String>,
}

impl Upstream {
    /// POST a message to an interaction's `response_url`.
    pub async fn post_response(&self, response_url: &str, message: &Value) -> Result<(), UpstreamError> {
        let response = self
            .http
            .post(response_url)
            .json(message)
            .send()
            .await
            .map_err(transport(SERVICE))?;
        ensure_success(SERVICE, response).await?;
        Ok(())
    }

    /// Call a Web API method with the bot token.
    async fn web_api(&self, method: &str, payload: &Value) -> Result<(), UpstreamError> {
        let token = self
            .config
            .secrets
            .slack_bot_token
            .as_deref()
            .ok_or(UpstreamError::NotConfigured("SLACK_BOT_TOKEN"))?;

        let url = format!("{}/{}", self.config.upstream.slack_api_url, method);
        let response = self
            .http
            .post(url)
            .bearer_auth(token)
            .json(payload)
            .send()
            .await
            .map_err(transport(SERVICE))?;
        let reply: ApiReply = ensure_success(SERVICE, response)
            .await?
            .json()
            .await
            .map_err(parse(SERVICE))?;

        if reply.ok {
            Ok(())
        } else {
            Err(UpstreamError::Status {
                service: SERVICE,
                status: 200,
                body: reply.error.unwrap_or_default(),
            })
        }
    }

    /// `views.open`
    pub async fn open_view(&self, trigger_id: &str, view: &Value) -> Result<(), UpstreamError> {
        self.web_api("views.open", &json!({ "trigger_id": trigger_id, "view": view }))
            .await
    }

    /// `chat.postMessage`; `message` supplies `text` and optional `blocks`.
    pub async fn post_message(&self, channel: &str, message: &Value) -> Result<(), UpstreamError> {
        let mut payload = message.clone();
        if let Some(object) = payload.as_object_mut() {
            object.remove("response_type");
            object.remove("replace_original");
            object.insert("channel".to_string(), Value::String(channel.to_string()));
        }
        self.web_api("chat.postMessage", &payload).await
    }
}
