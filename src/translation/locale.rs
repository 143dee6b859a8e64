//! Locale normalization: mapping user-facing language tags to vendor dialects.
//!
//! Users pick locales like `pt_BR`, `fr-CA` or `zh-TW`, but each vendor only
//! accepts its own vocabulary. Normalization is shared across vendors and
//! parameterised by the vendor's supported set, where an empty set means the
//! vendor accepts any base language code.

use crate::translation::{Result, TranslationError};
use regex::Regex;
use std::sync::OnceLock;

/// Locale codes accepted by the Watson Language Translator.
///
/// `zh-tw` is the only compound dialect; everything else is a base language.
pub const WATSON_LOCALES: &[&str] = &[
    "ar", "bg", "bn", "bs", "ca", "cs", "da", "de", "el", "en", "es", "et", "fa", "fi", "fr", "ga",
    "gu", "he", "hi", "hr", "hu", "id", "is", "it", "ja", "ko", "lt", "lv", "ml", "ms", "mt", "nb",
    "ne", "nl", "nn", "no", "pa", "pl", "pt", "ro", "ru", "sk", "sl", "sq", "sr", "sv", "ta", "te",
    "th", "tr", "uk", "ur", "vi", "zh", "zh-tw",
];

static LOCALE_PATTERN: OnceLock<Regex> = OnceLock::new();

/// Normalize a locale tag against a vendor's supported set.
///
/// # Arguments
/// * `locale` - Any user-supplied tag (e.g. "zh_TW", "en-US", "FR")
/// * `supported` - The vendor's enumerated locales, or empty for "accepts any"
///
/// # Returns
/// The full lower-cased tag when the vendor lists it explicitly, otherwise the
/// base language subtag.
///
/// # Example
/// ```ignore
/// assert_eq!(normalize("zh_TW", WATSON_LOCALES), "zh-tw");
/// assert_eq!(normalize("zh_TW", &[]), "zh");
/// ```
pub fn normalize(locale: &str, supported: &[&str]) -> String {
    let tag = canonical_tag(locale);

    if !supported.is_empty() && supported.contains(&tag.as_str()) {
        return tag;
    }

    base_subtag(&tag).trim().to_string()
}

/// Lower-case a tag and use hyphens as the subtag separator
pub fn canonical_tag(locale: &str) -> String {
    locale.trim().to_lowercase().replace('_', "-")
}

/// The primary language portion of a tag (`en` from `en-us`)
pub fn base_subtag(tag: &str) -> &str {
    tag.split('-').next().unwrap_or(tag)
}

/// Check that a locale tag is non-empty and shaped like a BCP-47 tag.
///
/// Accepts either `-` or `_` as separator since user profiles store both.
pub fn validate(locale: &str) -> Result<()> {
    let pattern = LOCALE_PATTERN.get_or_init(|| {
        Regex::new(r"^[A-Za-z]{2,8}([-_][A-Za-z0-9]{1,8})*$").expect("locale pattern is valid")
    });

    let locale = locale.trim();
    if locale.is_empty() {
        return Err(TranslationError::InvalidRequest(
            "target locale is empty".to_string(),
        ));
    }
    if !pattern.is_match(locale) {
        return Err(TranslationError::InvalidRequest(format!(
            "'{}' is not a valid locale tag",
            locale
        )));
    }

    Ok(())
}
