//! Contact-form notification mail.

use crate::config::SiteConfig;
use crate::upstream::Email;
use maud::{DOCTYPE, Markup, PreEscaped, html};
use undone_core::ContactSubmission;

const MAIL_CSS: &str = r"
body{font-family:sans-serif;line-height:1.6;color:#333}
.container{max-width:600px;margin:0 auto;padding:20px}
.header{background:#07090e;color:#fff;padding:20px;border-radius:8px 8px 0 0}
.content{background:#f9f9f9;padding:20px;border-radius:0 0 8px 8px}
.field{margin-bottom:16px}
.label{font-weight:bold;color:#0a6bff;font-size:12px;text-transform:uppercase}
.value{margin-top:4px}
.message{background:#fff;padding:16px;border-radius:8px;border:1px solid #eee;white-space:pre-wrap}
.footer{margin-top:20px;font-size:12px;color:#888}
";

const UNSELECTED: &str = "未選択";
const UNFILLED: &str = "未記入";

/// Build the notification mail for a validated submission.
pub fn contact_email(submission: &ContactSubmission, site: &SiteConfig) -> Email {
    let subject_category = submission.category.as_deref().unwrap_or("Webサイト");
    Email {
        from: site.contact_from.clone(),
        to: site.contact_to.clone(),
        reply_to: submission.email.clone(),
        subject: format!("【お問い合わせ】{} - {}", subject_category, submission.name),
        text: text_body(submission, &site.site_name),
        html: html_body(submission, &site.site_name).into_string(),
    }
}

fn text_body(s: &ContactSubmission, site_name: &str) -> String {
    format!(
        "【お問い合わせ種別】\n{}\n\n【お名前】\n{}\n\n【会社名・団体名】\n{}\n\n\
         【メールアドレス】\n{}\n\n【お問い合わせ内容】\n{}\n\n---\n\
         このメールは {} のお問い合わせフォームから送信されました。",
        s.category.as_deref().unwrap_or(UNSELECTED),
        s.name,
        s.company.as_deref().unwrap_or(UNFILLED),
        s.email,
        s.message,
        site_name,
    )
}

fn html_body(s: &ContactSubmission, site_name: &str) -> Markup {
    html! {
        (DOCTYPE)
        html {
            head {
                meta charset="utf-8";
                style { (PreEscaped(MAIL_CSS)) }
            }
            body {
                div.container {
                    div.header {
                        h2 style="margin: 0;" { "新しいお問い合わせ" }
                        p style="margin: 8px 0 0; opacity: 0.8;" { (site_name) }
                    }
                    div.content {
                        (field("お問い合わせ種別", s.category.as_deref().unwrap_or(UNSELECTED)))
                        (field("お名前", &s.name))
                        (field("会社名・団体名", s.company.as_deref().unwrap_or(UNFILLED)))
                        div.field {
                            div.label { "メールアドレス" }
                            div.value {
                                a href={ "mailto:" (s.email) } { (s.email) }
                            }
                        }
                        div.field {
                            div.label { "お問い合わせ内容" }
                            div.message {
                                @for (i, line) in s.message.lines().enumerate() {
                                    @if i > 0 { br; }
                                    (line)
                                }
                            }
                        }
                    }
                    div.footer {
                        "このメールは " (site_name) " のお問い合わせフォームから自動送信されました。"
                    }
                }
            }
        }
    }
}

fn field(label: &str, value: &str) -> Markup {
    html! {
        div.field {
            div.label { (label) }
            div.value { (value) }
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn submission() -> ContactSubmission {
        ContactSubmission {
            name: "山田 <b>太郎</b>".to_string(),
            company: None,
            email: "taro@example.jp".to_string(),
            category: Some("撮影のご依頼".to_string()),
            message: "一行目\r\n二行目 & more".to_string(),
        }
    }

    #[test]
    fn subject_and_routing() {
        let mail = contact_email(&submission(), &SiteConfig::default());
        assert_eq!(mail.subject, "【お問い合わせ】撮影のご依頼 - 山田 <b>太郎</b>");
        assert_eq!(mail.from, "Undone Contact <contact@undone.jp>");
        assert_eq!(mail.to, vec!["support@undone.jp"]);
        assert_eq!(mail.reply_to, "taro@example.jp");
    }

    #[test]
    fn subject_without_category() {
        let mut s = submission();
        s.category = None;
        let mail = contact_email(&s, &SiteConfig::default());
        assert!(mail.subject.starts_with("【お問い合わせ】Webサイト - "));
        assert!(mail.text.contains("【お問い合わせ種別】\n未選択"));
    }

    #[test]
    fn text_body_placeholders() {
        let mail = contact_email(&submission(), &SiteConfig::default());
        assert!(mail.text.contains("【会社名・団体名】\n未記入"));
        assert!(mail.text.ends_with("このメールは undone.jp のお問い合わせフォームから送信されました。"));
    }

    #[test]
    fn html_body_is_escaped() {
        let mail = contact_email(&submission(), &SiteConfig::default());
        assert!(mail.html.contains("山田 &lt;b&gt;太郎&lt;/b&gt;"));
        assert!(!mail.html.contains("<b>太郎</b>"));
        assert!(mail.html.contains("一行目<br>二行目 &amp; more"));
        assert!(mail.html.contains(r#"href="mailto:taro@example.jp""#));
        assert!(mail.html.starts_with("<!DOCTYPE html>"));
    }
}
