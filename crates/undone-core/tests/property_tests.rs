//! # Property-Based Tests
//!
//! Invariants of the request guards that must hold for any input.

use proptest::prelude::*;
use undone_core::{
    CommandArgs, ContactField, ContactForm, HostPolicy, OriginGuard, OriginHeader, SlackVerifier,
    ValidationError, parse_url_list, portfolio::format_duration, validate::check_field,
};

fn form(name: String, email: String, message: String) -> ContactForm {
    ContactForm {
        name: Some(name),
        email: Some(email),
        message: Some(message),
        ..ContactForm::default()
    }
}

// =============================================================================
// PROPERTY TESTS
// =============================================================================

proptest! {
    /// A control character anywhere in the name is always rejected.
    #[test]
    fn control_characters_never_pass_name(
        prefix in "[a-zA-Z ]{0,20}",
        suffix in "[a-zA-Z ]{0,20}",
        control in 0u8..0x20,
    ) {
        let name = format!("{prefix}{}{suffix}", char::from(control));
        let result = form(name, "a@b.co".into(), "hi".into()).validate();
        prop_assert_eq!(result, Err(ValidationError::InvalidFormat(ContactField::Name)));
    }

    /// Printable names within the limit always pass.
    #[test]
    fn printable_names_pass(name in "[a-zA-Z0-9 ぁ-ん]{1,100}") {
        prop_assert!(check_field(&name, ContactField::Name).is_ok());
    }

    /// Validation never changes accepted field values.
    #[test]
    fn validation_preserves_values(
        name in "[a-z]{1,30}",
        local in "[a-z0-9.]{1,20}",
        domain in "[a-z]{1,10}",
        message in "[a-z \n]{1,200}",
    ) {
        let email = format!("{local}@{domain}.jp");
        let sub = form(name.clone(), email.clone(), message.clone()).validate();
        prop_assert!(sub.is_ok());
        let sub = sub.expect("checked above");
        prop_assert_eq!(sub.name, name);
        prop_assert_eq!(sub.email, email);
        prop_assert_eq!(sub.message, message);
    }

    /// Signing then verifying always succeeds within the window.
    #[test]
    fn signature_round_trip(
        secret in "[a-zA-Z0-9]{8,40}",
        body in ".{0,200}",
        ts in 1_500_000_000i64..2_000_000_000,
        skew in -300i64..=300,
    ) {
        let verifier = SlackVerifier::new(&secret);
        let timestamp = ts.to_string();
        let sig = verifier.sign(&timestamp, body.as_bytes()).expect("sign");
        prop_assert!(verifier.verify(Some(&timestamp), Some(&sig), body.as_bytes(), ts + skew).is_ok());
    }

    /// Any single-byte change to the body breaks the signature.
    #[test]
    fn signature_detects_body_change(body in "[a-z]{1,100}", idx in 0usize..100) {
        let verifier = SlackVerifier::new("secret");
        let sig = verifier.sign("1700000000", body.as_bytes()).expect("sign");
        let mut tampered = body.clone().into_bytes();
        let i = idx % tampered.len();
        tampered[i] = if tampered[i] == b'z' { b'a' } else { tampered[i] + 1 };
        prop_assert!(verifier.verify(Some("1700000000"), Some(&sig), &tampered, 1_700_000_000).is_err());
    }

    /// The flag never leaks into positional arguments.
    #[test]
    fn featured_flag_is_never_positional(
        words in proptest::collection::vec("[a-z]{1,8}", 0..5),
        position in 0usize..6,
    ) {
        let mut tokens = words.clone();
        let at = position.min(tokens.len());
        tokens.insert(at, "--featured".to_string());
        let args = CommandArgs::parse(&tokens.join(" "));
        prop_assert!(args.featured);
        prop_assert_ne!(args.url.as_str(), "--featured");
        prop_assert_ne!(args.role.as_str(), "--featured");
        prop_assert_ne!(args.tag.as_str(), "--featured");
        prop_assert_eq!(args.url, words.first().cloned().unwrap_or_default());
    }

    /// URL lists never contain blanks or duplicates.
    #[test]
    fn url_list_is_clean(values in proptest::collection::vec("[a-c ,]{0,10}", 0..6)) {
        let urls = parse_url_list(&values);
        let mut seen = std::collections::HashSet::new();
        for u in &urls {
            prop_assert!(!u.is_empty());
            prop_assert_eq!(u.trim(), u.as_str());
            prop_assert!(seen.insert(u.clone()));
        }
    }

    /// Only HTTPS URLs can pass a host policy.
    #[test]
    fn host_policies_require_https(path in "[a-z0-9/]{0,20}") {
        for host in ["www.tiktok.com", "tv.dmm.com"] {
            let url = format!("http://{host}/{path}");
            prop_assert!(!HostPolicy::TikTok.allows(&url));
            prop_assert!(!HostPolicy::Dmm.allows(&url));
        }
    }

    /// Subdomains of an allowed origin are not allowed.
    #[test]
    fn origin_guard_rejects_subdomains(sub in "[a-z]{1,10}") {
        let guard = OriginGuard::default();
        let header = format!("https://{sub}.undone.jp");
        prop_assume!(sub != "www");
        prop_assert!(guard.check(Some(&header), OriginHeader::Origin).is_err());
    }

    /// Minutes and seconds always render as two digits after the first field.
    #[test]
    fn duration_fields_are_padded(m in 0u64..60, s in 0u64..60) {
        let text = format_duration(&format!("PT{m}M{s}S")).expect("valid duration");
        let (_, secs) = text.rsplit_once(':').expect("has separator");
        prop_assert_eq!(secs.len(), 2);
    }
}
