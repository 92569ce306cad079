//! Language resolution: raw language/country codes to a supported language.

use std::collections::{BTreeMap, HashMap};

use revlens_core::{default_country_map, Review};

use crate::detect::detect_text_language;
use crate::error::AnnotateError;

/// Languages with a segmentation model and stopword resources.
pub const SUPPORTED_LANGUAGES: &[&str] = &["en", "fr", "de", "sv", "it", "es", "ca", "pt"];

/// Ultimate fallback for anything unresolvable.
pub const DEFAULT_LANGUAGE: &str = "en";

/// Per-code fallback chains, tried in order after the country map.
const LANGUAGE_FALLBACKS: &[(&str, &[&str])] = &[
    ("se", &["sv", "en"]),
    ("sv", &["sv", "en"]),
    ("ca", &["en"]),
    ("pt", &["pt", "en"]),
    ("mx", &["es", "en"]),
];

#[must_use]
pub fn is_supported(code: &str) -> bool {
    SUPPORTED_LANGUAGES.contains(&code)
}

/// Result of resolving a column of raw language values.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LanguageResolution {
    /// One resolved code per input value, in input order.
    pub per_row: Vec<String>,
    /// Each distinct raw value (as given) mapped to its resolution.
    pub by_raw: BTreeMap<String, String>,
}

/// Maps raw language or country codes to a supported language code.
#[derive(Debug, Clone)]
pub struct LanguageResolver {
    country_map: HashMap<String, String>,
}

impl Default for LanguageResolver {
    fn default() -> Self {
        Self::new(default_country_map())
    }
}

impl LanguageResolver {
    #[must_use]
    pub fn new(country_map: HashMap<String, String>) -> Self {
        Self { country_map }
    }

    #[must_use]
    pub fn country_map(&self) -> &HashMap<String, String> {
        &self.country_map
    }

    /// Resolve a code. Total: every input yields a code, `"en"` at worst.
    ///
    /// First match wins: supported code, country map, fallback chain,
    /// any two-character code verbatim, then [`DEFAULT_LANGUAGE`].
    #[must_use]
    pub fn resolve(&self, code: &str) -> String {
        let code = code.trim().to_lowercase();
        if code.is_empty() {
            return DEFAULT_LANGUAGE.to_string();
        }
        if is_supported(&code) {
            return code;
        }
        if let Some(mapped) = self.country_map.get(&code) {
            return mapped.clone();
        }
        let chain = LANGUAGE_FALLBACKS
            .iter()
            .find(|(key, _)| *key == code)
            .map_or(&[][..], |(_, chain)| *chain);
        if let Some(fallback) = chain.iter().find(|fb| is_supported(fb)) {
            return (*fallback).to_string();
        }
        if code.chars().count() == 2 {
            return code;
        }
        DEFAULT_LANGUAGE.to_string()
    }

    /// Resolve a column of raw values, memoizing per distinct value.
    pub fn resolve_all<'a, I>(&self, raw: I) -> LanguageResolution
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut resolution = LanguageResolution::default();
        for value in raw {
            let resolved = resolution
                .by_raw
                .entry(value.to_string())
                .or_insert_with(|| self.resolve(value))
                .clone();
            resolution.per_row.push(resolved);
        }
        resolution
    }
}

/// Detect a language per review.
///
/// Priority: explicit `language` value, then the country map, then a text
/// heuristic over `cleaned_content` (or raw `content`). Empty text yields
/// `"en"`. Values are not resolved here; see [`LanguageResolver::resolve`].
///
/// # Errors
///
/// Returns [`AnnotateError::EmptyInput`] if `reviews` is empty.
pub fn detect_languages(
    reviews: &[Review],
    country_map: &HashMap<String, String>,
) -> Result<Vec<String>, AnnotateError> {
    if reviews.is_empty() {
        return Err(AnnotateError::EmptyInput("language detection"));
    }

    Ok(reviews
        .iter()
        .map(|review| detect_review_language(review, country_map))
        .collect())
}

fn detect_review_language(review: &Review, country_map: &HashMap<String, String>) -> String {
    if let Some(language) = review
        .language
        .as_deref()
        .map(str::trim)
        .filter(|l| !l.is_empty())
    {
        return language.to_lowercase();
    }

    if let Some(mapped) = country_map.get(&review.country.trim().to_lowercase()) {
        return mapped.clone();
    }

    let text = if review.cleaned_content.trim().is_empty() {
        review.content.as_deref().unwrap_or_default()
    } else {
        review.cleaned_content.as_str()
    };
    if text.trim().is_empty() {
        return DEFAULT_LANGUAGE.to_string();
    }
    detect_text_language(text).to_string()
}
