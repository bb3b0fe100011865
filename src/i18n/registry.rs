//! Language registry: Single source of truth for all supported languages.
//!
//! The site is bilingual. Persian is the primary audience and is rendered
//! right-to-left; English is the canonical language that content falls back
//! to when a requested translation is missing.

use crate::i18n::strings::{LanguageStrings, ENGLISH_STRINGS, PERSIAN_STRINGS};
use std::sync::OnceLock;

/// Writing direction of a language.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextDirection {
    Ltr,
    Rtl,
}

impl TextDirection {
    /// Value for the HTML `dir` attribute.
    pub fn as_html(&self) -> &'static str {
        match self {
            TextDirection::Ltr => "ltr",
            TextDirection::Rtl => "rtl",
        }
    }

    /// CSS `text-align` value for the start of a line.
    pub fn text_align(&self) -> &'static str {
        match self {
            TextDirection::Ltr => "left",
            TextDirection::Rtl => "right",
        }
    }
}

/// Configuration for a supported language.
#[derive(Debug, Clone)]
pub struct LanguageConfig {
    /// ISO 639-1 language code (e.g., "fa", "en")
    pub code: &'static str,

    /// English name of the language (e.g., "Persian")
    pub name: &'static str,

    /// Native name of the language (e.g., "فارسی")
    pub native_name: &'static str,

    /// Writing direction
    pub direction: TextDirection,

    /// Whether this is the canonical fallback language (only one should be true)
    pub is_canonical: bool,

    /// Whether this language is enabled for use
    pub enabled: bool,

    /// User-facing strings for this language
    pub strings: &'static LanguageStrings,
}

/// Global language registry singleton.
pub struct LanguageRegistry {
    languages: Vec<LanguageConfig>,
}

static REGISTRY: OnceLock<LanguageRegistry> = OnceLock::new();

impl LanguageRegistry {
    /// Get the global language registry instance.
    pub fn get() -> &'static LanguageRegistry {
        REGISTRY.get_or_init(|| LanguageRegistry {
            languages: default_languages(),
        })
    }

    /// Get a language configuration by its code.
    ///
    /// Codes are matched case-insensitively so `EN` and `en` are the same.
    pub fn get_by_code(&self, code: &str) -> Option<&LanguageConfig> {
        self.languages
            .iter()
            .find(|lang| lang.code.eq_ignore_ascii_case(code.trim()))
    }

    /// The language content falls back to, if one is marked canonical.
    pub fn canonical(&self) -> Option<&LanguageConfig> {
        self.languages.iter().find(|lang| lang.is_canonical)
    }
}

fn default_languages() -> Vec<LanguageConfig> {
    vec![
        LanguageConfig {
            code: "fa",
            name: "Persian",
            native_name: "فارسی",
            direction: TextDirection::Rtl,
            is_canonical: false,
            enabled: true,
            strings: &PERSIAN_STRINGS,
        },
        LanguageConfig {
            code: "en",
            name: "English",
            native_name: "English",
            direction: TextDirection::Ltr,
            is_canonical: true,
            enabled: true,
            strings: &ENGLISH_STRINGS,
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_get_returns_singleton() {
        let registry1 = LanguageRegistry::get();
        let registry2 = LanguageRegistry::get();
        assert!(std::ptr::eq(registry1, registry2));
    }

    #[test]
    fn test_get_by_code_persian() {
        let config = LanguageRegistry::get().get_by_code("fa").unwrap();
        assert_eq!(config.name, "Persian");
        assert_eq!(config.direction, TextDirection::Rtl);
        assert!(!config.is_canonical);
    }

    #[test]
    fn test_get_by_code_is_case_insensitive() {
        let config = LanguageRegistry::get().get_by_code(" EN ").unwrap();
        assert_eq!(config.code, "en");
    }

    #[test]
    fn test_get_by_code_nonexistent() {
        assert!(LanguageRegistry::get().get_by_code("de").is_none());
    }

    #[test]
    fn test_canonical_is_english() {
        let canonical = LanguageRegistry::get().canonical().unwrap();
        assert_eq!(canonical.code, "en");
        assert_eq!(canonical.direction, TextDirection::Ltr);
    }

    #[test]
    fn test_single_canonical_language() {
        let registry = LanguageRegistry::get();
        assert_eq!(
            registry.languages.iter().filter(|l| l.is_canonical).count(),
            1
        );
    }

    #[test]
    fn test_direction_html_values() {
        assert_eq!(TextDirection::Rtl.as_html(), "rtl");
        assert_eq!(TextDirection::Ltr.as_html(), "ltr");
        assert_eq!(TextDirection::Rtl.text_align(), "right");
    }
}
