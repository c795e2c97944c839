use super::{Upstream, UpstreamError, ensure_success, parse, transport};
use futures::future::join_all;
use std::collections::BTreeMap;
use undone_core::{HostPolicy, extract_og_image};

const SERVICE: &str = "DMM TV";

/// DMM TV serves its share tags to desktop browsers only.
const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
                                  (KHTML, like Gecko) Chrome/120.0 Safari/537.36";

/// Leading part of a blocked URL kept in logs.
const LOGGED_URL_CHARS: usize = 50;

impl Upstream {
    /// Preview image of one page.
    ///
    /// `Ok(None)` when the page has no share image.
    pub async fn page_image(&self, page: &reqwest::Url) -> Result<Option<String>, UpstreamError> {
        let response = self
            .http
            .get(page.clone())
            .header(reqwest::header::USER_AGENT, BROWSER_USER_AGENT)
            .send()
            .await
            .map_err(transport(SERVICE))?;
        let html = ensure_success(SERVICE, response)
            .await?
            .text()
            .await
            .map_err(parse(SERVICE))?;
        Ok(extract_og_image(&html))
    }

    /// Preview image per DMM TV page URL, fetched in parallel.
    pub async fn dmm_thumbnails(&self, urls: &[String]) -> BTreeMap<String, String> {
        let lookups = urls.iter().map(|page_url| async move {
            let Some(target) = HostPolicy::Dmm.allow(page_url) else {
                let head: String = page_url.chars().take(LOGGED_URL_CHARS).collect();
                tracing::warn!(event = "blocked_url", policy = "dmm", url = %head, "Invalid DMM URL blocked");
                return None;
            };
            match self.page_image(&target).await {
                Ok(image) => image.map(|i| (page_url.clone(), i)),
                Err(e) => {
                    tracing::debug!(error = %e, "DMM page fetch failed");
                    None
                }
            }
        });
        join_all(lookups).await.into_iter().flatten().collect()
    }
}
