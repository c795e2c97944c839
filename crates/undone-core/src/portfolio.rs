//! # Portfolio Records and Cards
//!
//! CMS "production" records, the payload written by the Slack bot, and the
//! card model rendered in the portfolio grid.
//!
//! Grid order: featured first, then ascending `sortOrder` (unset last),
//! then newest `releaseDate`.

use crate::command::CommandArgs;
use crate::platform::{Platform, youtube_id, youtube_thumbnail};
use crate::primitives::MAX_CMS_LIMIT;
use crate::types::UndoneError;
use serde::{Deserialize, Deserializer, Serialize};
use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};

/// CMS fields may be `null` as well as absent.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

// =============================================================================
// CMS RECORDS
// =============================================================================

/// A production record as returned by the CMS.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Production {
    #[serde(default, deserialize_with = "null_as_default")]
    pub id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub url: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub platform: Platform,
    #[serde(default, deserialize_with = "null_as_default")]
    pub role: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub tag: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub featured: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    pub release_date: String,
    #[serde(default)]
    pub sort_order: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub published_at: Option<String>,
}

/// A page of records from the CMS list API.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductionList {
    #[serde(default)]
    pub contents: Vec<Production>,
    #[serde(default)]
    pub total_count: u64,
    #[serde(default)]
    pub offset: u64,
    #[serde(default)]
    pub limit: u64,
}

/// Parse the `limit` query parameter of the CMS proxy.
///
/// Absent means [`MAX_CMS_LIMIT`]; anything but an integer in
/// `1..=MAX_CMS_LIMIT` is rejected.
pub fn parse_limit(raw: Option<&str>) -> Result<u32, UndoneError> {
    let Some(raw) = raw else {
        return Ok(MAX_CMS_LIMIT);
    };
    raw.trim()
        .parse::<u32>()
        .ok()
        .filter(|n| (1..=MAX_CMS_LIMIT).contains(n))
        .ok_or(UndoneError::InvalidLimit)
}

/// Record written to the CMS when a production is registered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductionDraft {
    pub title: String,
    pub url: String,
    pub platform: Platform,
    pub role: String,
    pub tag: String,
    pub featured: bool,
    pub release_date: String,
    pub sort_order: i64,
}

impl ProductionDraft {
    /// Build a draft from command arguments and looked-up metadata.
    ///
    /// An empty `title` falls back to `新規作品 - <platform>`.
    pub fn new(args: &CommandArgs, title: Option<String>, release_date: Option<String>) -> Self {
        let platform = Platform::detect(&args.url);
        let title = title
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| fallback_title(platform));
        Self {
            title,
            url: args.url.clone(),
            platform,
            role: args.role.clone(),
            tag: args.tag.clone(),
            featured: args.featured,
            release_date: release_date.unwrap_or_default(),
            sort_order: 0,
        }
    }
}

/// Title used when the platform offers none.
pub fn fallback_title(platform: Platform) -> String {
    format!("新規作品 - {}", platform.label())
}

// =============================================================================
// THUMBNAIL INDEX
// =============================================================================

/// Per-video details returned by the YouTube endpoint.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoDetails {
    pub duration: Option<String>,
    pub view_count: Option<String>,
    pub published_at: Option<String>,
}

/// Enrichment gathered from the platform endpoints.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ThumbnailIndex {
    /// YouTube video id → details.
    pub videos: BTreeMap<String, VideoDetails>,
    /// Page URL → thumbnail URL (TikTok, DMM TV).
    pub thumbnails: BTreeMap<String, String>,
}

/// Distinct, valid YouTube ids referenced by `productions`, in order.
pub fn youtube_ids(productions: &[Production]) -> Vec<String> {
    let mut seen = BTreeSet::new();
    productions
        .iter()
        .filter(|p| p.platform == Platform::YouTube)
        .filter_map(|p| youtube_id(&p.url))
        .filter(|id| crate::platform::is_valid_youtube_id(id))
        .filter(|id| seen.insert(id.clone()))
        .collect()
}

/// Distinct URLs of productions on `platform`, in order.
pub fn urls_for(productions: &[Production], platform: Platform) -> Vec<String> {
    let mut seen = BTreeSet::new();
    productions
        .iter()
        .filter(|p| p.platform == platform && !p.url.is_empty())
        .map(|p| p.url.clone())
        .filter(|u| seen.insert(u.clone()))
        .collect()
}

// =============================================================================
// FILTERS
// =============================================================================

/// Grid filter. All conditions must hold.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Filter {
    #[serde(default)]
    pub platform: Option<Platform>,
    #[serde(default)]
    pub tag: Option<String>,
    #[serde(default)]
    pub featured: Option<bool>,
}

impl Filter {
    /// Whether a production passes the filter.
    pub fn matches(&self, production: &Production) -> bool {
        let platform_ok = self.platform.is_none_or(|p| p == production.platform);
        let tag_ok = self
            .tag
            .as_deref()
            .filter(|t| !t.is_empty())
            .is_none_or(|t| t == production.tag);
        let featured_ok = self.featured != Some(true) || production.featured;
        platform_ok && tag_ok && featured_ok
    }

    /// Whether any condition is set.
    pub fn is_active(&self) -> bool {
        self.platform.is_some()
            || self.tag.as_deref().is_some_and(|t| !t.is_empty())
            || self.featured == Some(true)
    }
}

/// Values offered in the filter bar.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Facets {
    pub platforms: Vec<Platform>,
    pub tags: Vec<String>,
}

/// Distinct platforms and tags, sorted.
pub fn facets(productions: &[Production]) -> Facets {
    let platforms: BTreeSet<Platform> = productions.iter().map(|p| p.platform).collect();
    let tags: BTreeSet<&str> = productions
        .iter()
        .map(|p| p.tag.as_str())
        .filter(|t| !t.is_empty())
        .collect();
    Facets {
        platforms: platforms.into_iter().collect(),
        tags: tags.into_iter().map(str::to_string).collect(),
    }
}

fn grid_order(a: &Production, b: &Production) -> Ordering {
    b.featured
        .cmp(&a.featured)
        .then_with(|| match (a.sort_order, b.sort_order) {
            (Some(x), Some(y)) => x.cmp(&y),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        })
        .then_with(|| b.release_date.cmp(&a.release_date))
}

/// Sort productions into grid order.
pub fn sort_productions(productions: &mut [Production]) {
    productions.sort_by(grid_order);
}

// =============================================================================
// CARDS
// =============================================================================

/// One tile of the portfolio grid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Card {
    pub id: String,
    pub title: String,
    pub url: String,
    pub platform: Platform,
    pub role: String,
    pub tag: Option<String>,
    pub featured: bool,
    pub thumbnail: Option<String>,
    pub duration: Option<String>,
    pub views: Option<String>,
    pub date: Option<String>,
}

impl Card {
    /// Build a card, enriching it from the thumbnail index.
    pub fn build(production: &Production, index: &ThumbnailIndex) -> Self {
        let video_id = (production.platform == Platform::YouTube)
            .then(|| youtube_id(&production.url))
            .flatten();
        let details = video_id.as_ref().and_then(|id| index.videos.get(id));

        let thumbnail = match &video_id {
            Some(id) => Some(youtube_thumbnail(id)),
            None => index.thumbnails.get(&production.url).cloned(),
        };

        let date_source = Some(production.release_date.as_str())
            .filter(|d| !d.is_empty())
            .or_else(|| details.and_then(|d| d.published_at.as_deref()));

        Self {
            id: production.id.clone(),
            title: production.title.clone(),
            url: production.url.clone(),
            platform: production.platform,
            role: production.role.clone(),
            tag: Some(production.tag.clone()).filter(|t| !t.is_empty()),
            featured: production.featured,
            thumbnail,
            duration: details
                .and_then(|d| d.duration.as_deref())
                .and_then(format_duration),
            views: details
                .and_then(|d| d.view_count.as_deref())
                .and_then(format_views),
            date: date_source.and_then(format_date),
        }
    }
}

/// Filter, order and build the grid.
pub fn build_cards(productions: &[Production], filter: &Filter, index: &ThumbnailIndex) -> Vec<Card> {
    let mut selected: Vec<Production> = productions
        .iter()
        .filter(|p| filter.matches(p))
        .cloned()
        .collect();
    sort_productions(&mut selected);
    selected.iter().map(|p| Card::build(p, index)).collect()
}

// =============================================================================
// FORMATTING
// =============================================================================

/// Format an ISO-8601 duration (`PT1H2M3S`) as `1:02:03` or `2:03`.
pub fn format_duration(iso: &str) -> Option<String> {
    let rest = iso.strip_prefix('P')?;
    let (day_part, time_part) = rest.split_once('T').unwrap_or((rest, ""));

    let mut total: u64 = 0;
    let mut number = String::new();
    for (part, is_time) in [(day_part, false), (time_part, true)] {
        for c in part.chars() {
            if c.is_ascii_digit() {
                number.push(c);
                continue;
            }
            let n: u64 = number.parse().ok()?;
            number.clear();
            let unit = match (c, is_time) {
                ('D', false) => 86_400,
                ('H', true) => 3_600,
                ('M', true) => 60,
                ('S', true) => 1,
                _ => return None,
            };
            total = total.saturating_add(n.saturating_mul(unit));
        }
        if !number.is_empty() {
            return None;
        }
    }

    let (h, m, s) = (total / 3_600, (total % 3_600) / 60, total % 60);
    Some(if h > 0 {
        format!("{h}:{m:02}:{s:02}")
    } else {
        format!("{m}:{s:02}")
    })
}

/// Format a view count for display: `987回`, `1,234回`, `12.3万回`, `1.2億回`.
pub fn format_views(raw: &str) -> Option<String> {
    let n: u64 = raw.trim().parse().ok()?;
    let scaled = |unit: u64, suffix: &str| {
        let whole = n / unit;
        let tenth = (n % unit) / (unit / 10);
        if tenth == 0 {
            format!("{whole}{suffix}回")
        } else {
            format!("{whole}.{tenth}{suffix}回")
        }
    };
    Some(if n >= 100_000_000 {
        scaled(100_000_000, "億")
    } else if n >= 10_000 {
        scaled(10_000, "万")
    } else {
        format!("{}回", group_thousands(n))
    })
}

fn group_thousands(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

/// `2024-05-01T00:00:00.000Z` → `2024.05.01`.
pub fn format_date(raw: &str) -> Option<String> {
    let date = raw.get(..10)?;
    let valid = date.char_indices().all(|(i, c)| match i {
        4 | 7 => c == '-',
        _ => c.is_ascii_digit(),
    });
    valid.then(|| date.replace('-', "."))
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn production(id: &str, url: &str, tag: &str, featured: bool, sort: Option<i64>) -> Production {
        Production {
            id: id.to_string(),
            title: format!("title {id}"),
            url: url.to_string(),
            platform: Platform::detect(url),
            role: "撮影".to_string(),
            tag: tag.to_string(),
            featured,
            release_date: String::new(),
            sort_order: sort,
            published_at: None,
        }
    }

    #[test]
    fn deserializes_cms_record_with_nulls() {
        let json = r#"{
            "id": "abc123",
            "title": "MV",
            "url": "https://youtu.be/dQw4w9WgXcQ",
            "platform": "YouTube",
            "role": null,
            "tag": null,
            "featured": null,
            "releaseDate": "2024-05-01T00:00:00.000Z",
            "sortOrder": null,
            "publishedAt": "2024-05-02T00:00:00.000Z",
            "revisedAt": "2024-05-02T00:00:00.000Z"
        }"#;
        let p: Production = serde_json::from_str(json).expect("deserialize");
        assert_eq!(p.platform, Platform::YouTube);
        assert_eq!(p.role, "");
        assert!(!p.featured);
        assert_eq!(p.sort_order, None);
    }

    #[test]
    fn limit_parameter() {
        assert_eq!(parse_limit(None).ok(), Some(100));
        assert_eq!(parse_limit(Some("10")).ok(), Some(10));
        assert_eq!(parse_limit(Some(" 1 ")).ok(), Some(1));
        for bad in ["0", "101", "-5", "ten", "", "1.5"] {
            assert!(matches!(parse_limit(Some(bad)), Err(UndoneError::InvalidLimit)), "{bad}");
        }
    }

    #[test]
    fn draft_uses_fallback_title() {
        let args = CommandArgs::parse("https://tv.dmm.com/vod/x 編集 --featured");
        let draft = ProductionDraft::new(&args, Some(String::new()), None);
        assert_eq!(draft.title, "新規作品 - DMM TV");
        assert_eq!(draft.platform, Platform::DmmTv);
        assert!(draft.featured);
        assert_eq!(draft.sort_order, 0);

        let json = serde_json::to_value(&draft).expect("serialize");
        assert_eq!(json["releaseDate"], "");
        assert_eq!(json["sortOrder"], 0);
        assert_eq!(json["platform"], "DMM TV");
    }

    #[test]
    fn filter_is_conjunctive() {
        let yt = production("1", "https://youtu.be/dQw4w9WgXcQ", "MV", true, None);
        let tt = production("2", "https://www.tiktok.com/@a/video/1", "MV", false, None);

        let f = Filter {
            platform: Some(Platform::YouTube),
            tag: Some("MV".to_string()),
            featured: None,
        };
        assert!(f.matches(&yt));
        assert!(!f.matches(&tt));

        let featured_only = Filter {
            featured: Some(true),
            ..Filter::default()
        };
        assert!(featured_only.matches(&yt));
        assert!(!featured_only.matches(&tt));
        assert!(featured_only.is_active());
        assert!(!Filter::default().is_active());

        let empty_tag = Filter {
            tag: Some(String::new()),
            ..Filter::default()
        };
        assert!(empty_tag.matches(&tt));
    }

    #[test]
    fn grid_order_featured_then_sort_then_date() {
        let mut a = production("a", "https://x.test/a", "", false, Some(2));
        a.release_date = "2024-01-01".to_string();
        let mut b = production("b", "https://x.test/b", "", false, Some(2));
        b.release_date = "2024-06-01".to_string();
        let c = production("c", "https://x.test/c", "", false, None);
        let d = production("d", "https://x.test/d", "", true, Some(9));
        let e = production("e", "https://x.test/e", "", false, Some(1));

        let mut all = vec![a, b, c, d, e];
        sort_productions(&mut all);
        let ids: Vec<&str> = all.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["d", "e", "b", "a", "c"]);
    }

    #[test]
    fn cards_are_enriched() {
        let yt = production("1", "https://www.youtube.com/watch?v=dQw4w9WgXcQ", "MV", false, None);
        let dmm = production("2", "https://tv.dmm.com/vod/x", "", false, None);
        let other = production("3", "https://vimeo.com/1", "", false, None);

        let mut index = ThumbnailIndex::default();
        index.videos.insert(
            "dQw4w9WgXcQ".to_string(),
            VideoDetails {
                duration: Some("PT3M33S".to_string()),
                view_count: Some("1234567".to_string()),
                published_at: Some("2009-10-25T06:57:33Z".to_string()),
            },
        );
        index
            .thumbnails
            .insert(dmm.url.clone(), "https://cdn.test/dmm.jpg".to_string());

        let cards = build_cards(&[yt, dmm, other], &Filter::default(), &index);
        assert_eq!(cards.len(), 3);

        let yt_card = &cards[0];
        assert_eq!(
            yt_card.thumbnail.as_deref(),
            Some("https://i.ytimg.com/vi/dQw4w9WgXcQ/hqdefault.jpg")
        );
        assert_eq!(yt_card.duration.as_deref(), Some("3:33"));
        assert_eq!(yt_card.views.as_deref(), Some("123.4万回"));
        assert_eq!(yt_card.date.as_deref(), Some("2009.10.25"));
        assert_eq!(yt_card.tag.as_deref(), Some("MV"));

        assert_eq!(cards[1].thumbnail.as_deref(), Some("https://cdn.test/dmm.jpg"));
        assert_eq!(cards[2].thumbnail, None);
        assert_eq!(cards[2].tag, None);
    }

    #[test]
    fn id_and_url_collection() {
        let items = vec![
            production("1", "https://youtu.be/dQw4w9WgXcQ", "", false, None),
            production("2", "https://youtu.be/dQw4w9WgXcQ", "", false, None),
            production("3", "https://youtu.be/bad", "", false, None),
            production("4", "https://www.tiktok.com/@a/video/1", "", false, None),
            production("5", "https://www.tiktok.com/@a/video/1", "", false, None),
        ];
        assert_eq!(youtube_ids(&items), vec!["dQw4w9WgXcQ"]);
        assert_eq!(
            urls_for(&items, Platform::TikTok),
            vec!["https://www.tiktok.com/@a/video/1"]
        );
    }

    #[test]
    fn facet_values() {
        let items = vec![
            production("1", "https://youtu.be/dQw4w9WgXcQ", "MV", false, None),
            production("2", "https://www.tiktok.com/@a/video/1", "CM", false, None),
            production("3", "https://youtu.be/abcdefghijk", "MV", false, None),
            production("4", "https://vimeo.com/1", "", false, None),
        ];
        let f = facets(&items);
        assert_eq!(f.platforms, vec![Platform::YouTube, Platform::TikTok, Platform::Other]);
        assert_eq!(f.tags, vec!["CM", "MV"]);
    }

    #[test]
    fn durations() {
        assert_eq!(format_duration("PT4M5S").as_deref(), Some("4:05"));
        assert_eq!(format_duration("PT1H2M3S").as_deref(), Some("1:02:03"));
        assert_eq!(format_duration("PT45S").as_deref(), Some("0:45"));
        assert_eq!(format_duration("P1DT1S").as_deref(), Some("24:00:01"));
        assert_eq!(format_duration("P0D").as_deref(), Some("0:00"));
        assert_eq!(format_duration("4:05"), None);
        assert_eq!(format_duration("PT5"), None);
        assert_eq!(format_duration("PT1X"), None);
    }

    #[test]
    fn views() {
        assert_eq!(format_views("987").as_deref(), Some("987回"));
        assert_eq!(format_views("1234").as_deref(), Some("1,234回"));
        assert_eq!(format_views("10000").as_deref(), Some("1万回"));
        assert_eq!(format_views("123456").as_deref(), Some("12.3万回"));
        assert_eq!(format_views("150000000").as_deref(), Some("1.5億回"));
        assert_eq!(format_views("n/a"), None);
    }

    #[test]
    fn dates() {
        assert_eq!(format_date("2024-05-01T00:00:00.000Z").as_deref(), Some("2024.05.01"));
        assert_eq!(format_date("2024-05-01").as_deref(), Some("2024.05.01"));
        assert_eq!(format_date("May 1"), None);
        assert_eq!(format_date(""), None);
    }
}
