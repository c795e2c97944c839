//! Portfolio grid page.

use maud::{DOCTYPE, Markup, PreEscaped, html};
use undone_core::{Card, Facets, Filter};

const PAGE_CSS: &str = r"
*{margin:0;padding:0;box-sizing:border-box}
body{font-family:-apple-system,BlinkMacSystemFont,'Hiragino Sans','Noto Sans JP',sans-serif;background:#07090e;color:#f5f7fa;padding:2rem 1rem}
main{max-width:1200px;margin:0 auto}
h1{font-size:1.75rem;letter-spacing:.08em;margin-bottom:1.25rem}
a{color:inherit;text-decoration:none}
.filters{display:flex;flex-wrap:wrap;gap:.75rem;align-items:center;margin-bottom:1.5rem;font-size:.9rem}
.filters select,.filters button{background:#11151d;color:#f5f7fa;border:1px solid #2a3140;border-radius:6px;padding:.35rem .6rem}
.filters .reset{color:#0a6bff}
.grid{display:grid;grid-template-columns:repeat(auto-fill,minmax(260px,1fr));gap:1.25rem}
.card{background:#11151d;border-radius:10px;overflow:hidden;display:flex;flex-direction:column;transition:transform .2s}
.card:hover{transform:translateY(-3px)}
.thumb{position:relative;aspect-ratio:16/9;background:#1c2230}
.thumb img{width:100%;height:100%;object-fit:cover;display:block}
.thumb .placeholder{position:absolute;inset:0;display:flex;align-items:center;justify-content:center;color:#5b6477;font-size:.85rem}
.badge{position:absolute;font-size:.7rem;padding:.15rem .4rem;border-radius:4px;background:rgba(0,0,0,.75)}
.badge.duration{right:.5rem;bottom:.5rem}
.badge.featured{left:.5rem;top:.5rem;background:#0a6bff}
.body{padding:.85rem 1rem 1rem;display:flex;flex-direction:column;gap:.35rem}
.title{font-weight:600;line-height:1.4}
.meta{font-size:.8rem;color:#8a93a6;display:flex;flex-wrap:wrap;gap:.6rem}
.tag{color:#0a6bff}
.empty{color:#8a93a6;padding:3rem 0;text-align:center}
";

/// Render the full portfolio page.
pub fn portfolio_page(cards: &[Card], facets: &Facets, filter: &Filter, site_name: &str) -> Markup {
    html! {
        (DOCTYPE)
        html lang="ja" {
            head {
                meta charset="utf-8";
                meta name="viewport" content="width=device-width, initial-scale=1";
                title { "Works | " (site_name) }
                style { (PreEscaped(PAGE_CSS)) }
            }
            body {
                main {
                    h1 { "WORKS" }
                    (filter_bar(facets, filter))
                    @if cards.is_empty() {
                        p.empty { "該当する実績がありません" }
                    } @else {
                        div.grid {
                            @for card in cards {
                                (card_tile(card))
                            }
                        }
                    }
                }
            }
        }
    }
}

fn filter_bar(facets: &Facets, filter: &Filter) -> Markup {
    let tag = filter.tag.as_deref().unwrap_or_default();
    html! {
        form.filters method="get" action="/portfolio" {
            select name="platform" aria-label="プラットフォーム" {
                option value="" { "すべてのプラットフォーム" }
                @for platform in &facets.platforms {
                    option value=(platform.label()) selected[filter.platform == Some(*platform)] {
                        (platform.label())
                    }
                }
            }
            select name="tag" aria-label="タグ" {
                option value="" { "すべてのタグ" }
                @for t in &facets.tags {
                    option value=(t) selected[t == tag] { (t) }
                }
            }
            label {
                input type="checkbox" name="featured" value="true" checked[filter.featured == Some(true)];
                " Featured"
            }
            button type="submit" { "絞り込む" }
            @if filter.is_active() {
                a.reset href="/portfolio" { "リセット" }
            }
        }
    }
}

/// Only http(s) URLs become links; anything else renders as a plain tile.
fn is_web_link(raw: &str) -> bool {
    url::Url::parse(raw).is_ok_and(|u| matches!(u.scheme(), "http" | "https"))
}

fn card_tile(card: &Card) -> Markup {
    html! {
        @if is_web_link(&card.url) {
            a.card href=(card.url) target="_blank" rel="noopener noreferrer" data-platform=(card.platform.label()) {
                (card_contents(card))
            }
        } @else {
            div.card data-platform=(card.platform.label()) {
                (card_contents(card))
            }
        }
    }
}

fn card_contents(card: &Card) -> Markup {
    html! {
        div.thumb {
            @if let Some(src) = &card.thumbnail {
                img src=(src) alt=(card.title) loading="lazy";
            } @else {
                div.placeholder { (card.platform.label()) }
            }
            @if let Some(duration) = &card.duration {
                span.badge.duration { (duration) }
            }
            @if card.featured {
                span.badge.featured { "Featured" }
            }
        }
        div.body {
            div.title { (card.title) }
            div.meta {
                span { (card.platform.label()) }
                @if !card.role.is_empty() {
                    span { (card.role) }
                }
                @if let Some(tag) = &card.tag {
                    span.tag { "#" (tag) }
                }
            }
            div.meta {
                @if let Some(views) = &card.views {
                    span { (views) }
                }
                @if let Some(date) = &card.date {
                    span { (date) }
                }
            }
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use undone_core::Platform;

    fn card(title: &str, platform: Platform) -> Card {
        Card {
            id: "x".to_string(),
            title: title.to_string(),
            url: "https://youtu.be/dQw4w9WgXcQ".to_string(),
            platform,
            role: "撮影".to_string(),
            tag: Some("MV".to_string()),
            featured: true,
            thumbnail: Some("https://i.ytimg.com/vi/dQw4w9WgXcQ/hqdefault.jpg".to_string()),
            duration: Some("3:33".to_string()),
            views: Some("1,234回".to_string()),
            date: Some("2024.05.01".to_string()),
        }
    }

    #[test]
    fn renders_cards() {
        let facets = Facets {
            platforms: vec![Platform::YouTube, Platform::TikTok],
            tags: vec!["MV".to_string()],
        };
        let page = portfolio_page(
            &[card("<script>x</script>", Platform::YouTube)],
            &facets,
            &Filter::default(),
            "undone.jp",
        )
        .into_string();

        assert!(page.contains("&lt;script&gt;x&lt;/script&gt;"));
        assert!(!page.contains("<script>"));
        assert!(page.contains("hqdefault.jpg"));
        assert!(page.contains("3:33"));
        assert!(page.contains("#MV"));
        assert!(page.contains(r#"<option value="TikTok">"#));
        assert!(!page.contains("リセット"));
    }

    #[test]
    fn only_web_urls_become_links() {
        let mut script = card("x", Platform::Other);
        script.url = "javascript:alert(1)".to_string();
        let mut relative = card("y", Platform::Other);
        relative.url = "/portfolio".to_string();
        let page = portfolio_page(
            &[script, relative, card("z", Platform::YouTube)],
            &Facets::default(),
            &Filter::default(),
            "undone.jp",
        )
        .into_string();

        assert!(!page.contains("javascript:"));
        assert!(!page.contains(r#"href="/portfolio" target"#));
        assert!(page.contains(r#"<div class="card" data-platform="#));
        assert!(page.contains(r#"href="https://youtu.be/dQw4w9WgXcQ""#));
    }

    #[test]
    fn marks_active_filter() {
        let facets = Facets {
            platforms: vec![Platform::YouTube, Platform::DmmTv],
            tags: vec!["CM".to_string(), "MV".to_string()],
        };
        let filter = Filter {
            platform: Some(Platform::DmmTv),
            tag: Some("MV".to_string()),
            featured: Some(true),
        };
        let page = portfolio_page(&[], &facets, &filter, "undone.jp").into_string();

        assert!(page.contains(r#"<option value="DMM TV" selected>"#));
        assert!(page.contains(r#"<option value="MV" selected>"#));
        assert!(page.contains(r#"<option value="CM">"#));
        assert!(page.contains("checked"));
        assert!(page.contains("該当する実績がありません"));
        assert!(page.contains("リセット"));
    }
}
