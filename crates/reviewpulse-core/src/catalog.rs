// SPDX-FileCopyrightText: 2026 ReviewPulse Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Fixed catalogs of supported output languages and e-commerce platforms.

use std::collections::BTreeMap;

/// Language used when the client does not ask for one.
pub const DEFAULT_LANGUAGE: &str = "en";

/// Supported output languages: (code, display name used in prompts).
pub const SUPPORTED_LANGUAGES: &[(&str, &str)] = &[
    ("en", "English"),
    ("vi", "Vietnamese"),
    ("es", "Spanish"),
    ("ja", "Japanese"),
];

/// Known platforms as (URL keyword, platform name), checked in order.
pub const SUPPORTED_PLATFORMS: &[(&str, &str)] = &[
    ("amazon", "amazon"),
    ("shopee", "shopee"),
    ("ebay", "ebay"),
    ("lazada", "lazada"),
    ("tiki", "tiki"),
];

/// Returns the display name for a supported language code.
pub fn language_name(code: &str) -> Option<&'static str> {
    SUPPORTED_LANGUAGES
        .iter()
        .find(|(c, _)| *c == code)
        .map(|(_, name)| *name)
}

/// Returns true if `code` is one of the supported output languages.
pub fn is_supported_language(code: &str) -> bool {
    language_name(code).is_some()
}

/// Maps an arbitrary language code to one the analysis backends accept.
///
/// Unknown codes fall back to English; the returned pair is (code, name).
pub fn normalize_language(code: &str) -> (&'static str, &'static str) {
    SUPPORTED_LANGUAGES
        .iter()
        .find(|(c, _)| *c == code)
        .copied()
        .unwrap_or(("en", "English"))
}

/// Supported languages as a code -> name map, for error payloads.
pub fn supported_language_map() -> BTreeMap<&'static str, &'static str> {
    SUPPORTED_LANGUAGES.iter().copied().collect()
}

/// Supported platform names, for error payloads.
pub fn supported_platform_names() -> Vec<&'static str> {
    SUPPORTED_PLATFORMS.iter().map(|(_, name)| *name).collect()
}

/// Detects the platform of a product URL by case-insensitive keyword match.
pub fn detect_platform(url: &str) -> Option<&'static str> {
    let lower = url.to_lowercase();
    SUPPORTED_PLATFORMS
        .iter()
        .find(|(keyword, _)| lower.contains(keyword))
        .map(|(_, platform)| *platform)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_platform_case_insensitively() {
        assert_eq!(detect_platform("https://www.AMAZON.com/dp/X"), Some("amazon"));
        assert_eq!(detect_platform("https://shopee.vn/item/1"), Some("shopee"));
        assert_eq!(detect_platform("https://tiki.vn/p/2"), Some("tiki"));
        assert_eq!(detect_platform("https://example.com/product"), None);
    }

    #[test]
    fn unknown_language_normalizes_to_english() {
        assert_eq!(normalize_language("fr"), ("en", "English"));
        assert_eq!(normalize_language(""), ("en", "English"));
        assert_eq!(normalize_language("ja"), ("ja", "Japanese"));
    }

    #[test]
    fn language_support() {
        assert!(is_supported_language("vi"));
        assert!(!is_supported_language("de"));
        assert_eq!(language_name("es"), Some("Spanish"));
        assert_eq!(supported_language_map().len(), 4);
        assert_eq!(supported_platform_names().len(), 5);
    }
}
