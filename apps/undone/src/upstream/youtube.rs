use super::{Upstream, UpstreamError, ensure_success, parse, transport};
use futures::future::try_join_all;
use serde::Deserialize;
use std::collections::BTreeMap;
use undone_core::{VideoDetails, youtube_batches};

const SERVICE: &str = "YouTube";

#[derive(Debug, Default, Deserialize)]
struct VideoListResponse {
    #[serde(default)]
    items: Vec<VideoItem>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VideoItem {
    #[serde(default)]
    id: String,
    #[serde(default)]
    snippet: Option<Snippet>,
    #[serde(default)]
    content_details: Option<ContentDetails>,
    #[serde(default)]
    statistics: Option<Statistics>,
}

/// `snippet` part of a video resource.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snippet {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub published_at: String,
}

#[derive(Debug, Default, Deserialize)]
struct ContentDetails {
    duration: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Statistics {
    view_count: Option<String>,
}

impl Upstream {
    fn youtube_key(&self) -> Result<&str, UpstreamError> {
        self.config
            .secrets
            .youtube_api_key
            .as_deref()
            .ok_or(UpstreamError::NotConfigured("YOUTUBE_API_KEY"))
    }

    async fn videos(&self, part: &str, ids: &[String]) -> Result<VideoListResponse, UpstreamError> {
        let key = self.youtube_key()?;
        let url = format!("{}/videos", self.config.upstream.youtube_url);
        let joined = ids.join(",");
        let response = self
            .http
            .get(url)
            .query(&[("part", part), ("id", joined.as_str()), ("key", key)])
            .send()
            .await
            .map_err(|e| transport(SERVICE)(e.without_url()))?;

        let response = match ensure_success(SERVICE, response).await {
            Ok(response) => response,
            Err(e) => {
                // the key is part of the request URL; errors and logs carry ids only
                let sample: Vec<&String> = ids.iter().take(3).collect();
                tracing::error!(status = ?e.status(), batch = ?sample, "YouTube API error");
                return Err(e);
            }
        };
        response
            .json()
            .await
            .map_err(|e| parse(SERVICE)(e.without_url()))
    }

    /// Duration, view count and publish date for each id.
    ///
    /// Ids are fetched in batches of 50, all batches in parallel. Any failed
    /// batch fails the whole lookup.
    pub async fn video_details(
        &self,
        ids: &[String],
    ) -> Result<BTreeMap<String, VideoDetails>, UpstreamError> {
        let batches = youtube_batches(ids);
        let responses = try_join_all(
            batches
                .iter()
                .map(|batch| self.videos("snippet,contentDetails,statistics", batch)),
        )
        .await?;

        Ok(responses
            .into_iter()
            .flat_map(|r| r.items)
            .map(|item| {
                let details = VideoDetails {
                    duration: item.content_details.and_then(|c| c.duration),
                    view_count: item.statistics.and_then(|s| s.view_count),
                    published_at: item
                        .snippet
                        .map(|s| s.published_at)
                        .filter(|p| !p.is_empty()),
                };
                (item.id, details)
            })
            .collect())
    }

    /// Title and publish date of one video.
    pub async fn video_snippet(&self, id: &str) -> Result<Option<Snippet>, UpstreamError> {
        let response = self.videos("snippet", &[id.to_string()]).await?;
        Ok(response.items.into_iter().next().and_then(|item| item.snippet))
    }
}
