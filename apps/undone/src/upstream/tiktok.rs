use super::{Upstream, UpstreamError, ensure_success, parse, transport};
use futures::future::join_all;
use serde::Deserialize;
use std::collections::BTreeMap;
use undone_core::HostPolicy;

const SERVICE: &str = "TikTok";
const USER_AGENT: &str = "undonejp-tiktok-proxy/1.0";

/// The oEmbed fields the site uses.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct OEmbed {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub thumbnail_url: Option<String>,
}

impl Upstream {
    /// oEmbed metadata for one video URL.
    ///
    /// The URL is not checked against the host allow-list; callers that take
    /// URLs from untrusted input go through [`Upstream::tiktok_thumbnails`].
    pub async fn tiktok_oembed(&self, video_url: &str) -> Result<OEmbed, UpstreamError> {
        let response = self
            .http
            .get(&self.config.upstream.tiktok_oembed_url)
            .query(&[("url", video_url)])
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

    /// Thumbnail URL per video URL, fetched in parallel.
    ///
    /// URLs outside the TikTok allow-list, failed lookups and answers
    /// without a thumbnail yield no entry.
    pub async fn tiktok_thumbnails(&self, urls: &[String]) -> BTreeMap<String, String> {
        let lookups = urls.iter().map(|video_url| async move {
            if !HostPolicy::TikTok.allows(video_url) {
                tracing::warn!(event = "blocked_url", policy = "tiktok", "Invalid TikTok URL blocked");
                return None;
            }
            match self.tiktok_oembed(video_url).await {
                Ok(embed) => embed.thumbnail_url.map(|t| (video_url.clone(), t)),
                Err(e) => {
                    tracing::debug!(error = %e, "TikTok oEmbed lookup failed");
                    None
                }
            }
        });
        join_all(lookups).await.into_iter().flatten().collect()
    }
}
