//! Language type: validated handle into the registry.

use crate::i18n::{LanguageConfig, LanguageRegistry, LanguageStrings, TextDirection};
use anyhow::{bail, Result};
use serde::{Serialize, Serializer};
use std::fmt;

/// A validated language.
///
/// Only supported, enabled languages can be constructed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Language {
    /// ISO 639-1 language code (e.g., "fa", "en")
    code: &'static str,
}

impl Language {
    pub const PERSIAN: Language = Language { code: "fa" };
    pub const ENGLISH: Language = Language { code: "en" };

    /// Create a Language from a language code string.
    ///
    /// # Returns
    /// * `Ok(Language)` if the code is valid and the language is enabled
    /// * `Err` if the code is not found or the language is disabled
    pub fn from_code(code: &str) -> Result<Language> {
        let registry = LanguageRegistry::get();

        match registry.get_by_code(code) {
            Some(config) if config.enabled => Ok(Language { code: config.code }),
            Some(_) => bail!("Language '{}' is not enabled", code),
            None => bail!("Unknown language code: '{}'", code),
        }
    }

    /// Parse a code, returning `fallback` for unknown or missing codes.
    pub fn from_code_or(code: Option<&str>, fallback: Language) -> Language {
        code.and_then(|c| Language::from_code(c).ok())
            .unwrap_or(fallback)
    }

    /// The canonical fallback language (English unless the registry says otherwise).
    pub fn canonical() -> Language {
        LanguageRegistry::get()
            .canonical()
            .map(|config| Language { code: config.code })
            .unwrap_or(Language::ENGLISH)
    }

    pub fn code(&self) -> &'static str {
        self.code
    }

    /// Get the full language configuration from the registry.
    ///
    /// # Panics
    /// Panics if the code is not in the registry, which cannot happen for a
    /// Language built through `from_code` or the constants.
    pub fn config(&self) -> &'static LanguageConfig {
        LanguageRegistry::get()
            .get_by_code(self.code)
            .expect("Language code should always be valid")
    }

    pub fn native_name(&self) -> &'static str {
        self.config().native_name
    }

    pub fn direction(&self) -> TextDirection {
        self.config().direction
    }

    /// User-facing strings for this language.
    pub fn strings(&self) -> &'static LanguageStrings {
        self.config().strings
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code)
    }
}

impl Serialize for Language {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ==================== Constant Tests ====================

    #[test]
    fn test_persian_constant() {
        let persian = Language::PERSIAN;
        assert_eq!(persian.code(), "fa");
        assert_eq!(persian.native_name(), "فارسی");
        assert_eq!(persian.direction(), TextDirection::Rtl);
        assert_ne!(persian, Language::canonical());
    }

    #[test]
    fn test_english_constant() {
        let english = Language::ENGLISH;
        assert_eq!(english.code(), "en");
        assert_eq!(english.direction(), TextDirection::Ltr);
        assert_eq!(english, Language::canonical());
    }

    // ==================== from_code Tests ====================

    #[test]
    fn test_from_code_valid() {
        assert_eq!(Language::from_code("fa").unwrap(), Language::PERSIAN);
        assert_eq!(Language::from_code("EN").unwrap(), Language::ENGLISH);
    }

    #[test]
    fn test_from_code_invalid() {
        let result = Language::from_code("fr");
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("Unknown"));
        assert!(Language::from_code("").is_err());
    }

    #[test]
    fn test_from_code_or_falls_back() {
        assert_eq!(
            Language::from_code_or(Some("de"), Language::PERSIAN),
            Language::PERSIAN
        );
        assert_eq!(
            Language::from_code_or(None, Language::ENGLISH),
            Language::ENGLISH
        );
        assert_eq!(
            Language::from_code_or(Some("en"), Language::PERSIAN),
            Language::ENGLISH
        );
    }

    #[test]
    fn test_canonical_returns_english() {
        assert_eq!(Language::canonical(), Language::ENGLISH);
    }

    // ==================== Trait Tests ====================

    #[test]
    fn test_display_and_serialize() {
        assert_eq!(Language::PERSIAN.to_string(), "fa");
        assert_eq!(serde_json::to_string(&Language::ENGLISH).unwrap(), "\"en\"");
    }

    #[test]
    fn test_strings_match_language() {
        assert_eq!(
            Language::ENGLISH.strings().generic_failure,
            "Something went wrong, please try again."
        );
        assert_ne!(
            Language::PERSIAN.strings().generic_failure,
            Language::ENGLISH.strings().generic_failure
        );
    }
}
