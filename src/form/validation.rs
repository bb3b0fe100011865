use crate::i18n::{Language, LanguageStrings};
use regex::Regex;
use std::collections::BTreeMap;
use std::sync::OnceLock;

/// Field name -> localized error message.
pub type FieldErrors = BTreeMap<String, String>;

/// Field name -> raw value as typed by the user.
pub type FieldValues = BTreeMap<String, String>;

static EMAIL_REGEX: OnceLock<Regex> = OnceLock::new();

/// Loose RFC 5322 check: something@something.something, no whitespace, one `@`.
pub fn is_valid_email(email: &str) -> bool {
    EMAIL_REGEX
        .get_or_init(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid email regex"))
        .is_match(email.trim())
}

/// Which localized message a missing value reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MissingMessage {
    /// "This field is required."
    Field,
    /// Asks for a project type or a description of the project
    ProjectType,
}

impl MissingMessage {
    fn localized(self, strings: &LanguageStrings) -> &'static str {
        match self {
            Self::Field => strings.field_required,
            Self::ProjectType => strings.project_type_required,
        }
    }
}

/// A single rule applied to a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Check {
    /// Non-empty after trimming
    Required,
    /// Email format; empty values pass (combine with `Required`)
    Email,
    /// Required unless the named sibling field is filled in
    RequiredUnless(&'static str, MissingMessage),
    /// At most this many characters
    MaxLength(usize),
}

/// A field and the checks it must pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldSpec {
    pub name: &'static str,
    pub checks: Vec<Check>,
}

impl FieldSpec {
    pub fn new(name: &'static str, checks: &[Check]) -> Self {
        Self {
            name,
            checks: checks.to_vec(),
        }
    }

    /// Run the checks in order and return the first failure's message.
    pub fn validate(&self, values: &FieldValues, lang: Language) -> Option<String> {
        let strings = lang.strings();
        let value = values.get(self.name).map(|v| v.trim()).unwrap_or("");

        for check in &self.checks {
            match *check {
                Check::Required if value.is_empty() => {
                    return Some(strings.field_required.to_string());
                }
                Check::Email if !value.is_empty() && !is_valid_email(value) => {
                    return Some(strings.invalid_email.to_string());
                }
                Check::RequiredUnless(other, message) if value.is_empty() => {
                    let other_filled = values
                        .get(other)
                        .map(|v| !v.trim().is_empty())
                        .unwrap_or(false);
                    if !other_filled {
                        return Some(message.localized(strings).to_string());
                    }
                }
                Check::MaxLength(max) if value.chars().count() > max => {
                    return Some(strings.field_too_long.replace("{max}", &max.to_string()));
                }
                _ => {}
            }
        }

        None
    }
}

/// Validate every field, collecting one message per failing field.
pub fn validate_fields(fields: &[FieldSpec], values: &FieldValues, lang: Language) -> FieldErrors {
    fields
        .iter()
        .filter_map(|field| {
            field
                .validate(values, lang)
                .map(|message| (field.name.to_string(), message))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn values(pairs: &[(&str, &str)]) -> FieldValues {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    // ==================== Email Tests ====================

    #[test]
    fn test_email_accepts_valid() {
        assert!(is_valid_email("a@b.co"));
        assert!(is_valid_email("jane@x.com"));
        assert!(is_valid_email("first.last+tag@studio.example.ir"));
        assert!(is_valid_email("  padded@x.com  "));
    }

    #[test]
    fn test_email_rejects_invalid() {
        assert!(!is_valid_email("a@b"));
        assert!(!is_valid_email("@b.co"));
        assert!(!is_valid_email("a@@b.co"));
        assert!(!is_valid_email("not-an-email"));
        assert!(!is_valid_email("a b@c.com"));
        assert!(!is_valid_email(""));
    }

    // ==================== Check Tests ====================

    #[test]
    fn test_required_rejects_whitespace() {
        let field = FieldSpec::new("name", &[Check::Required]);
        let error = field.validate(&values(&[("name", "   ")]), Language::ENGLISH);
        assert_eq!(error.as_deref(), Some("This field is required."));
        assert!(field.validate(&values(&[("name", "Jane")]), Language::ENGLISH).is_none());
    }

    #[test]
    fn test_email_check_skips_empty_values() {
        let field = FieldSpec::new("email", &[Check::Email]);
        assert!(field.validate(&values(&[]), Language::ENGLISH).is_none());
        assert!(field
            .validate(&values(&[("email", "bad")]), Language::ENGLISH)
            .is_some());
    }

    #[test]
    fn test_required_then_email_reports_required_first() {
        let field = FieldSpec::new("email", &[Check::Required, Check::Email]);
        let error = field.validate(&values(&[]), Language::ENGLISH).unwrap();
        assert_eq!(error, Language::ENGLISH.strings().field_required);
    }

    #[test]
    fn test_required_unless_sibling() {
        let field = FieldSpec::new(
            "projectType",
            &[Check::RequiredUnless("projectTypeOther", MissingMessage::ProjectType)],
        );
        assert_eq!(
            field.validate(&values(&[]), Language::ENGLISH).as_deref(),
            Some(Language::ENGLISH.strings().project_type_required)
        );
        assert!(field
            .validate(&values(&[("projectTypeOther", "Mobile game")]), Language::ENGLISH)
            .is_none());
        assert!(field
            .validate(&values(&[("projectType", "branding")]), Language::ENGLISH)
            .is_none());
    }

    #[test]
    fn test_required_unless_uses_its_own_message() {
        let field = FieldSpec::new(
            "phone",
            &[Check::RequiredUnless("email", MissingMessage::Field)],
        );
        let error = field.validate(&values(&[]), Language::PERSIAN).unwrap();
        assert_eq!(error, Language::PERSIAN.strings().field_required);
        assert_ne!(error, Language::PERSIAN.strings().project_type_required);
        assert!(field
            .validate(&values(&[("email", "jane@x.com")]), Language::PERSIAN)
            .is_none());
    }

    #[test]
    fn test_max_length_counts_characters() {
        let field = FieldSpec::new("name", &[Check::MaxLength(4)]);
        // Four Persian letters are more than four bytes but exactly four chars
        assert!(field.validate(&values(&[("name", "آریو")]), Language::PERSIAN).is_none());
        let error = field
            .validate(&values(&[("name", "Ario Studio")]), Language::ENGLISH)
            .unwrap();
        assert!(error.contains('4'));
    }

    #[test]
    fn test_messages_are_localized() {
        let field = FieldSpec::new("name", &[Check::Required]);
        let error = field.validate(&values(&[]), Language::PERSIAN).unwrap();
        assert_eq!(error, Language::PERSIAN.strings().field_required);
    }

    #[test]
    fn test_validate_fields_collects_each_failure() {
        let fields = vec![
            FieldSpec::new("name", &[Check::Required]),
            FieldSpec::new("email", &[Check::Required, Check::Email]),
            FieldSpec::new("company", &[Check::MaxLength(100)]),
        ];
        let errors = validate_fields(&fields, &values(&[("email", "nope")]), Language::ENGLISH);
        assert_eq!(errors.len(), 2);
        assert!(errors.contains_key("name"));
        assert_eq!(errors["email"], Language::ENGLISH.strings().invalid_email);
    }
}
