//! Translation fallback resolution.
//!
//! Order of preference, first match wins:
//! 1. the requested language
//! 2. the canonical language (English), when it was not the one requested
//! 3. the first translation in storage order
//!
//! Rule 3 picks arbitrarily between several non-English, non-requested
//! languages; it only depends on the order the source returned.

use super::model::ContentTranslation;
use crate::i18n::Language;

/// Anything carrying a language tag.
pub trait Localized {
    fn lang(&self) -> &str;
}

impl Localized for ContentTranslation {
    fn lang(&self) -> &str {
        &self.lang
    }
}

/// Which rule selected the translation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    Exact,
    EnglishFallback,
    FirstAvailable,
}

/// Pick the translation to display for `requested`.
pub fn resolve<'a, T: Localized>(translations: &'a [T], requested: &str) -> Option<&'a T> {
    resolve_with_outcome(translations, requested).map(|(t, _)| t)
}

/// Same as [`resolve`] but also reports which rule matched.
pub fn resolve_with_outcome<'a, T: Localized>(
    translations: &'a [T],
    requested: &str,
) -> Option<(&'a T, Resolution)> {
    let requested = requested.trim();

    if let Some(exact) = translations
        .iter()
        .find(|t| t.lang().eq_ignore_ascii_case(requested))
    {
        return Some((exact, Resolution::Exact));
    }

    let canonical = Language::canonical().code();
    if !requested.eq_ignore_ascii_case(canonical) {
        if let Some(english) = translations
            .iter()
            .find(|t| t.lang().eq_ignore_ascii_case(canonical))
        {
            return Some((english, Resolution::EnglishFallback));
        }
    }

    translations
        .first()
        .map(|first| (first, Resolution::FirstAvailable))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn t(lang: &str) -> ContentTranslation {
        ContentTranslation::new(lang, &format!("title-{}", lang))
    }

    // ==================== Rule Tests ====================

    #[test]
    fn test_empty_resolves_to_none() {
        let empty: Vec<ContentTranslation> = Vec::new();
        assert!(resolve(&empty, "en").is_none());
        assert!(resolve(&empty, "fa").is_none());
        assert!(resolve(&empty, "").is_none());
    }

    #[test]
    fn test_exact_match_wins() {
        let translations = vec![t("en"), t("fa")];
        let (picked, outcome) = resolve_with_outcome(&translations, "fa").unwrap();
        assert_eq!(picked.lang, "fa");
        assert_eq!(outcome, Resolution::Exact);
    }

    #[test]
    fn test_exact_match_is_case_insensitive() {
        let translations = vec![t("en"), t("fa")];
        assert_eq!(resolve(&translations, "FA").unwrap().lang, "fa");
    }

    #[test]
    fn test_falls_back_to_english() {
        let translations = vec![t("de"), t("en")];
        let (picked, outcome) = resolve_with_outcome(&translations, "fa").unwrap();
        assert_eq!(picked.lang, "en");
        assert_eq!(outcome, Resolution::EnglishFallback);
    }

    #[test]
    fn test_canonical_request_skips_second_rule() {
        assert_eq!(Language::canonical().code(), "en");

        let translations = vec![t("de"), t("fa")];
        let (picked, outcome) = resolve_with_outcome(&translations, "EN").unwrap();
        assert_eq!(picked.lang, "de");
        assert_eq!(outcome, Resolution::FirstAvailable);
    }

    #[test]
    fn test_persian_only_served_for_english_request() {
        let translations = vec![t("fa")];
        let (picked, outcome) = resolve_with_outcome(&translations, "en").unwrap();
        assert_eq!(picked.lang, "fa");
        assert_eq!(outcome, Resolution::FirstAvailable);
    }

    #[test]
    fn test_first_available_uses_input_order() {
        let translations = vec![t("de"), t("ar")];
        assert_eq!(resolve(&translations, "fa").unwrap().lang, "de");

        let reversed = vec![t("ar"), t("de")];
        assert_eq!(resolve(&reversed, "fa").unwrap().lang, "ar");
    }

    // ==================== Property Tests ====================

    fn lang_strategy() -> impl Strategy<Value = String> {
        prop::sample::select(vec!["en", "fa", "de", "ar", "fr"]).prop_map(|s| s.to_string())
    }

    proptest! {
        #[test]
        fn prop_resolution_precedence(
            langs in prop::collection::vec(lang_strategy(), 0..6),
            requested in lang_strategy(),
        ) {
            let translations: Vec<ContentTranslation> = langs.iter().map(|l| t(l)).collect();
            let picked = resolve(&translations, &requested);

            if let Some(exact) = translations.iter().find(|x| x.lang == requested) {
                prop_assert_eq!(picked, Some(exact));
            } else if requested != "en" && translations.iter().any(|x| x.lang == "en") {
                prop_assert_eq!(picked.map(|p| p.lang.as_str()), Some("en"));
            } else if let Some(first) = translations.first() {
                prop_assert_eq!(picked, Some(first));
            } else {
                prop_assert!(picked.is_none());
            }
        }

        #[test]
        fn prop_resolves_whenever_non_empty(
            langs in prop::collection::vec(lang_strategy(), 1..6),
            requested in lang_strategy(),
        ) {
            let translations: Vec<ContentTranslation> = langs.iter().map(|l| t(l)).collect();
            prop_assert!(resolve(&translations, &requested).is_some());
        }
    }
}
