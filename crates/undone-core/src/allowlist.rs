//! # Outbound URL Allow-Lists
//!
//! The thumbnail fetchers take URLs from the query string and fetch them
//! server-side. Each fetcher only talks to its platform's hosts over HTTPS,
//! so a crafted URL cannot point the server at internal addresses.

use crate::primitives::{DMM_HOSTS, TIKTOK_HOSTS, YOUTUBE_BATCH_SIZE};
use std::collections::HashSet;
use url::{Host, Url};

/// Collect the `urls` query values.
///
/// The parameter may be repeated (`?urls=a&urls=b`) or given once as a
/// comma-separated list (`?urls=a,b`). A comma in a single value only
/// separates entries when the text after it is itself an http(s) URL, so
/// query strings such as `?season=a,b` stay whole. Values are trimmed,
/// empties dropped and duplicates removed keeping the first occurrence.
pub fn parse_url_list<S: AsRef<str>>(values: &[S]) -> Vec<String> {
    let raw: Vec<String> = match values {
        [single] => split_url_value(single.as_ref()),
        many => many.iter().map(|v| v.as_ref().to_string()).collect(),
    };

    let mut seen = HashSet::new();
    raw.iter()
        .map(|v| v.trim())
        .filter(|v| !v.is_empty())
        .filter(|v| seen.insert(*v))
        .map(str::to_string)
        .collect()
}

fn split_url_value(raw: &str) -> Vec<String> {
    let mut entries: Vec<String> = Vec::new();
    for piece in raw.split(',') {
        let trimmed = piece.trim();
        let starts_entry = trimmed.is_empty()
            || Url::parse(trimmed).is_ok_and(|u| matches!(u.scheme(), "http" | "https"));
        match entries.last_mut() {
            Some(last) if !starts_entry => {
                last.push(',');
                last.push_str(piece);
            }
            _ => entries.push(piece.to_string()),
        }
    }
    entries
}

/// Split comma-separated ids, trimming and dropping empties.
pub fn parse_id_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .collect()
}

/// Chunk ids into YouTube Data API batches.
pub fn youtube_batches(ids: &[String]) -> Vec<Vec<String>> {
    ids.chunks(YOUTUBE_BATCH_SIZE).map(<[String]>::to_vec).collect()
}

/// Which platform a URL is being checked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostPolicy {
    /// TikTok oEmbed lookups.
    TikTok,
    /// DMM TV page scraping.
    Dmm,
}

impl HostPolicy {
    /// Parse `raw` and return it if the policy allows fetching it.
    pub fn allow(self, raw: &str) -> Option<Url> {
        let url = Url::parse(raw).ok()?;
        if url.scheme() != "https" {
            return None;
        }
        let allowed = match self {
            Self::TikTok => tiktok_allows(&url),
            Self::Dmm => dmm_allows(&url),
        };
        allowed.then_some(url)
    }

    /// Convenience wrapper around [`HostPolicy::allow`].
    pub fn allows(self, raw: &str) -> bool {
        self.allow(raw).is_some()
    }
}

fn tiktok_allows(url: &Url) -> bool {
    match url.host() {
        Some(Host::Domain(domain)) => {
            let domain = domain.to_ascii_lowercase();
            TIKTOK_HOSTS.contains(&domain.as_str()) && !is_dotted_quad(&domain)
        }
        // IP literals are never TikTok.
        _ => false,
    }
}

fn dmm_allows(url: &Url) -> bool {
    if !url.username().is_empty() || url.password().is_some() || url.port().is_some() {
        return false;
    }
    let Some(Host::Domain(domain)) = url.host() else {
        return false;
    };
    let charset_ok = domain
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '.' || c == '-');
    charset_ok && DMM_HOSTS.contains(&domain)
}

fn is_dotted_quad(host: &str) -> bool {
    let parts: Vec<&str> = host.split('.').collect();
    parts.len() == 4
        && parts
            .iter()
            .all(|p| !p.is_empty() && p.chars().all(|c| c.is_ascii_digit()))
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn url_list_from_single_comma_value() {
        let urls = parse_url_list(&[" https://a.test , ,https://b.test,https://a.test"]);
        assert_eq!(urls, vec!["https://a.test", "https://b.test"]);
    }

    #[test]
    fn url_list_keeps_commas_inside_a_url() {
        let urls = parse_url_list(&["https://tv.dmm.com/vod/detail/?season=abc,def"]);
        assert_eq!(urls, vec!["https://tv.dmm.com/vod/detail/?season=abc,def"]);

        let urls = parse_url_list(&[
            "https://tv.dmm.com/vod/detail/?season=abc,def,https://youtu.be/x?t=1,2",
        ]);
        assert_eq!(
            urls,
            vec![
                "https://tv.dmm.com/vod/detail/?season=abc,def",
                "https://youtu.be/x?t=1,2",
            ]
        );
    }

    #[test]
    fn url_list_from_repeated_values() {
        // Repeated values are not split on commas.
        let urls = parse_url_list(&["https://a.test/?x=1,2", " https://b.test ", "https://b.test"]);
        assert_eq!(urls, vec!["https://a.test/?x=1,2", "https://b.test"]);
    }

    #[test]
    fn url_list_empty() {
        let none: [&str; 0] = [];
        assert!(parse_url_list(&none).is_empty());
        assert!(parse_url_list(&[""]).is_empty());
    }

    #[test]
    fn id_list() {
        assert_eq!(parse_id_list(" a, b ,,c"), vec!["a", "b", "c"]);
        assert!(parse_id_list("").is_empty());
    }

    #[test]
    fn batches_of_fifty() {
        let ids: Vec<String> = (0..120).map(|i| format!("{i:011}")).collect();
        let batches = youtube_batches(&ids);
        assert_eq!(batches.len(), 3);
        assert_eq!(batches[0].len(), 50);
        assert_eq!(batches[2].len(), 20);
    }

    #[test]
    fn tiktok_policy() {
        let p = HostPolicy::TikTok;
        assert!(p.allows("https://www.tiktok.com/@user/video/7300000000000000000"));
        assert!(p.allows("https://VM.TikTok.com/ZMabc/"));
        assert!(!p.allows("http://www.tiktok.com/@user/video/1"));
        assert!(!p.allows("https://tiktok.com.evil.test/"));
        assert!(!p.allows("https://127.0.0.1/"));
        assert!(!p.allows("https://[::1]/"));
        assert!(!p.allows("not a url"));
    }

    #[test]
    fn dmm_policy() {
        let p = HostPolicy::Dmm;
        assert!(p.allows("https://tv.dmm.com/vod/detail/?season=abc"));
        assert!(p.allows("https://www.tv.dmm.com/vod/"));
        assert!(!p.allows("https://dmm.com/"));
        assert!(!p.allows("http://tv.dmm.com/"));
        assert!(!p.allows("https://user:pw@tv.dmm.com/"));
        assert!(!p.allows("https://tv.dmm.com:8443/"));
        assert!(!p.allows("https://tv.dmm.com.evil.test/"));
    }

    #[test]
    fn dotted_quad_detection() {
        assert!(is_dotted_quad("10.0.0.1"));
        assert!(!is_dotted_quad("tiktok.com"));
        assert!(!is_dotted_quad("1.2.3"));
    }
}
