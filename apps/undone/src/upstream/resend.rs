use super::{Upstream, UpstreamError, ensure_success, transport};
use serde::Serialize;

const SERVICE: &str = "Resend";

/// Body of `POST /emails`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Email {
    pub from: String,
    pub to: Vec<String>,
    pub reply_to: String,
    pub subject: String,
    pub text: String,
    pub html: String,
}

impl Upstream {
    /// Send one email through Resend.
    pub async fn send_email(&self, email: &Email) -> Result<(), UpstreamError> {
        let key = self
            .config
            .secrets
            .resend_api_key
            .as_deref()
            .ok_or(UpstreamError::NotConfigured("RESEND_API_KEY"))?;

        let url = format!("{}/emails", self.config.upstream.resend_url);
        let response = self
            .http
            .post(url)
            .bearer_auth(key)
            .json(email)
            .send()
            .await
            .map_err(transport(SERVICE))?;
        ensure_success(SERVICE, response).await?;
        Ok(())
    }
}
