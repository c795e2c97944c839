//! # Contact Form Validation
//!
//! Guards the mail relay against header injection and oversized payloads
//! before anything reaches the email provider.
//!
//! Rules, applied per field:
//! - length in characters must not exceed the field's limit
//! - no control characters (U+0000..=U+001F, U+007F)
//! - `message` alone may contain line breaks
//! - `email` must look like `local@domain.tld`

use crate::primitives::{
    MAX_CATEGORY_LENGTH, MAX_COMPANY_LENGTH, MAX_EMAIL_LENGTH, MAX_MESSAGE_LENGTH, MAX_NAME_LENGTH,
};
use crate::types::{ContactField, ValidationError};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

/// Loose address shape: something, `@`, something, `.`, something.
static EMAIL_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email regex should compile")
});

/// Contact form as posted by the browser.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactForm {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub company: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

/// A contact form that passed validation.
///
/// Optional fields that were empty are `None`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactSubmission {
    pub name: String,
    pub company: Option<String>,
    pub email: String,
    pub category: Option<String>,
    pub message: String,
}

impl ContactForm {
    /// Validate the form.
    ///
    /// Fields are checked in the order name, email, company, category,
    /// message; the first failure is returned.
    pub fn validate(&self) -> Result<ContactSubmission, ValidationError> {
        let (Some(name), Some(email), Some(message)) = (
            non_empty(&self.name),
            non_empty(&self.email),
            non_empty(&self.message),
        ) else {
            return Err(ValidationError::MissingFields);
        };
        let company = non_empty(&self.company);
        let category = non_empty(&self.category);

        check_field(name, ContactField::Name)?;
        if !is_valid_email(email) {
            return Err(ValidationError::InvalidFormat(ContactField::Email));
        }
        if let Some(company) = company {
            check_field(company, ContactField::Company)?;
        }
        if let Some(category) = category {
            check_field(category, ContactField::Category)?;
        }
        check_field(message, ContactField::Message)?;

        Ok(ContactSubmission {
            name: name.to_string(),
            company: company.map(str::to_string),
            email: email.to_string(),
            category: category.map(str::to_string),
            message: message.to_string(),
        })
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

/// Maximum accepted length of a field, in characters.
pub const fn max_length(field: ContactField) -> usize {
    match field {
        ContactField::Name => MAX_NAME_LENGTH,
        ContactField::Company => MAX_COMPANY_LENGTH,
        ContactField::Email => MAX_EMAIL_LENGTH,
        ContactField::Category => MAX_CATEGORY_LENGTH,
        ContactField::Message => MAX_MESSAGE_LENGTH,
    }
}

/// Check length and control characters of one field.
pub fn check_field(value: &str, field: ContactField) -> Result<(), ValidationError> {
    // Line breaks in `message` are accepted on purpose, unlike the other
    // fields; the HTML mail turns them into <br>.
    let allow_line_breaks = field == ContactField::Message;

    let has_forbidden = value.chars().any(|c| {
        let control = c.is_ascii_control();
        control && !(allow_line_breaks && (c == '\n' || c == '\r'))
    });
    if has_forbidden || value.chars().count() > max_length(field) {
        return Err(ValidationError::InvalidFormat(field));
    }
    Ok(())
}

/// Address shape plus the generic field rules for `email`.
pub fn is_valid_email(email: &str) -> bool {
    EMAIL_REGEX.is_match(email) && check_field(email, ContactField::Email).is_ok()
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn form(name: &str, email: &str, message: &str) -> ContactForm {
        ContactForm {
            name: Some(name.to_string()),
            email: Some(email.to_string()),
            message: Some(message.to_string()),
            ..ContactForm::default()
        }
    }

    #[test]
    fn minimal_form_is_valid() {
        let sub = form("山田太郎", "taro@example.com", "撮影のご相談").validate();
        let sub = sub.expect("valid form");
        assert_eq!(sub.name, "山田太郎");
        assert_eq!(sub.company, None);
        assert_eq!(sub.category, None);
    }

    #[test]
    fn empty_optional_fields_become_none() {
        let mut f = form("a", "a@b.co", "hi");
        f.company = Some(String::new());
        f.category = Some(String::new());
        let sub = f.validate().expect("valid form");
        assert!(sub.company.is_none());
        assert!(sub.category.is_none());
    }

    #[test]
    fn missing_required_field() {
        assert_eq!(
            form("", "a@b.co", "hi").validate(),
            Err(ValidationError::MissingFields)
        );
        assert_eq!(
            ContactForm::default().validate(),
            Err(ValidationError::MissingFields)
        );
    }

    #[test]
    fn header_injection_in_name_is_rejected() {
        assert_eq!(
            form("Bob\r\nBcc: victim@example.com", "a@b.co", "hi").validate(),
            Err(ValidationError::InvalidFormat(ContactField::Name))
        );
        assert_eq!(
            form("tab\there", "a@b.co", "hi").validate(),
            Err(ValidationError::InvalidFormat(ContactField::Name))
        );
    }

    #[test]
    fn message_may_span_lines() {
        assert!(form("a", "a@b.co", "line one\r\nline two\n").validate().is_ok());
        assert_eq!(
            form("a", "a@b.co", "bell\u{7}").validate(),
            Err(ValidationError::InvalidFormat(ContactField::Message))
        );
        assert!(check_field("a\nb", ContactField::Company).is_err());
        assert!(check_field("a\nb", ContactField::Message).is_ok());
    }

    #[test]
    fn email_shape() {
        assert!(is_valid_email("user.name+tag@sub.example.co.jp"));
        assert!(!is_valid_email("no-at-sign.example.com"));
        assert!(!is_valid_email("user@nodot"));
        assert!(!is_valid_email("two words@example.com"));
        assert!(!is_valid_email("a@b@c.com"));
    }

    #[test]
    fn email_checked_before_company() {
        let mut f = form("a", "broken", "hi");
        f.company = Some("x\u{0}".to_string());
        assert_eq!(
            f.validate(),
            Err(ValidationError::InvalidFormat(ContactField::Email))
        );
    }

    #[test]
    fn length_limits_count_characters() {
        let name = "あ".repeat(MAX_NAME_LENGTH);
        assert!(check_field(&name, ContactField::Name).is_ok());
        let name = "あ".repeat(MAX_NAME_LENGTH + 1);
        assert!(check_field(&name, ContactField::Name).is_err());

        let long_message = "x".repeat(MAX_MESSAGE_LENGTH + 1);
        assert_eq!(
            form("a", "a@b.co", &long_message).validate(),
            Err(ValidationError::InvalidFormat(ContactField::Message))
        );
    }

    #[test]
    fn delete_character_is_rejected() {
        let mut f = form("a", "a@b.co", "hi");
        f.category = Some("撮影\u{7f}".to_string());
        assert_eq!(
            f.validate(),
            Err(ValidationError::InvalidFormat(ContactField::Category))
        );
    }
}
