use super::{Upstream, UpstreamError, ensure_success, parse, transport};
use serde::Deserialize;
use undone_core::{ProductionDraft, ProductionList};

const SERVICE: &str = "microCMS";
const USER_AGENT: &str = "undonejp-proxy/1.0";
const API_KEY_HEADER: &str = "X-MICROCMS-API-KEY";

/// Raw CMS answer relayed by the proxy.
#[derive(Debug, Clone)]
pub struct CmsResponse {
    pub status: u16,
    pub body: Option<serde_json::Value>,
}

#[derive(Deserialize)]
struct Created {
    id: String,
}

impl Upstream {
    fn productions_url(&self) -> String {
        format!("{}/productions", self.config.upstream.microcms_url)
    }

    fn read_key(&self) -> Result<&str, UpstreamError> {
        self.config
            .secrets
            .microcms_api_key
            .as_deref()
            .ok_or(UpstreamError::NotConfigured("MICROCMS_API_KEY"))
    }

    fn write_key(&self) -> Result<&str, UpstreamError> {
        self.config
            .secrets
            .microcms_write_key
            .as_deref()
            .ok_or(UpstreamError::NotConfigured("MICROCMS_WRITE_KEY"))
    }

    /// Fetch `limit` productions as untyped JSON.
    ///
    /// Non-2xx answers are returned, not raised, so the proxy can relay the
    /// status.
    pub async fn list_productions_raw(&self, limit: u32) -> Result<CmsResponse, UpstreamError> {
        let key = self.read_key()?;
        let response = self
            .http
            .get(self.productions_url())
            .query(&[("limit", limit)])
            .header(API_KEY_HEADER, key)
            .header(reqwest::header::USER_AGENT, USER_AGENT)
            .send()
            .await
            .map_err(transport(SERVICE))?;

        let status = response.status();
        if !status.is_success() {
            tracing::error!(status = status.as_u16(), "microCMS API error");
            return Ok(CmsResponse {
                status: status.as_u16(),
                body: None,
            });
        }
        let body = response.json().await.map_err(parse(SERVICE))?;
        Ok(CmsResponse {
            status: status.as_u16(),
            body: Some(body),
        })
    }

    /// Fetch `limit` productions as typed records.
    pub async fn list_productions(&self, limit: u32) -> Result<ProductionList, UpstreamError> {
        let key = self.read_key()?;
        let response = self
            .http
            .get(self.productions_url())
            .query(&[("limit", limit)])
            .header(API_KEY_HEADER, key)
            .header(reqwest::header::USER_AGENT, USER_AGENT)
            .send()
            .await
            .map_err(transport(SERVICE))?;
        ensure_success(SERVICE, response)
            .await?
            .json()
            .await
            .map_err(parse(SERVICE))
    }

    /// Create a production record; returns its id.
    pub async fn create_production(&self, draft: &ProductionDraft) -> Result<String, UpstreamError> {
        let key = self.write_key()?;
        let response = self
            .http
            .post(self.productions_url())
            .header(API_KEY_HEADER, key)
            .json(draft)
            .send()
            .await
            .map_err(transport(SERVICE))?;
        let created: Created = ensure_success(SERVICE, response)
            .await?
            .json()
            .await
            .map_err(parse(SERVICE))?;
        Ok(created.id)
    }

    /// Delete a production record.
    pub async fn delete_production(&self, id: &str) -> Result<(), UpstreamError> {
        let key = self.write_key()?;
        let mut url = reqwest::Url::parse(&self.productions_url()).map_err(|e| {
            UpstreamError::Parse {
                service: SERVICE,
                message: e.to_string(),
            }
        })?;
        // push() percent-encodes, so an id cannot escape the collection path
        url.path_segments_mut()
            .map_err(|()| UpstreamError::Parse {
                service: SERVICE,
                message: "base URL cannot have path segments".to_string(),
            })?
            .push(id);

        let response = self
            .http
            .delete(url)
            .header(API_KEY_HEADER, key)
            .send()
            .await
            .map_err(transport(SERVICE))?;
        ensure_success(SERVICE, response).await?;
        Ok(())
    }
}
