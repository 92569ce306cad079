//! Sentence segmentation with per-language models and a blank fallback.
//!
//! A rules model splits on Unicode sentence boundaries (UAX #29) and then
//! re-joins spans that end in a known abbreviation ("Dr.", "z.B.").
//! The blank model only knows sentence-ending punctuation.

use std::collections::{HashMap, HashSet};
use std::ops::Range;
use std::path::{Path, PathBuf};

use revlens_core::{Review, Sentence};
use unicode_segmentation::UnicodeSegmentation;

use crate::error::AnnotateError;
use crate::language::DEFAULT_LANGUAGE;

/// Built-in abbreviation tables: languages listed here have a rules model.
const ABBREVIATIONS: &[(&str, &[&str])] = &[
    (
        "en",
        &[
            "mr", "mrs", "ms", "dr", "prof", "st", "vs", "etc", "e.g", "i.e", "inc", "ltd", "jr",
            "sr", "approx",
        ],
    ),
    ("fr", &["m", "mme", "mlle", "dr", "p.ex", "etc", "cf", "env"]),
    (
        "de",
        &["z.b", "bzw", "usw", "dr", "nr", "ca", "evtl", "ggf", "d.h", "u.a"],
    ),
    ("sv", &["t.ex", "bl.a", "d.v.s", "osv", "ca", "nr", "dvs"]),
    ("it", &["sig", "dott", "ecc", "es", "pag", "ca", "prof"]),
    ("es", &["sr", "sra", "dr", "ej", "etc", "pág", "aprox", "ud", "uds"]),
    ("ca", &["sr", "sra", "dr", "etc", "p.ex"]),
    ("pt", &["sr", "sra", "dr", "ex", "etc", "pág"]),
];

/// A loaded sentence segmenter.
#[derive(Debug, Clone, PartialEq)]
pub enum SegmentationModel {
    Rules {
        language: String,
        abbreviations: HashSet<String>,
    },
    Blank,
}

impl SegmentationModel {
    /// Load the rules model for `language`.
    ///
    /// Built-in abbreviations are extended with `<model_dir>/<language>.txt`
    /// when that file exists (one entry per line, `#` starts a comment).
    ///
    /// # Errors
    ///
    /// Returns [`AnnotateError::Io`] if the abbreviation file exists but cannot
    /// be read, or [`AnnotateError::ModelUnavailable`] if the language has
    /// neither a built-in table nor a file.
    pub fn load(language: &str, model_dir: Option<&Path>) -> Result<Self, AnnotateError> {
        let builtin = ABBREVIATIONS
            .iter()
            .find(|(code, _)| *code == language)
            .map(|(_, entries)| *entries);

        let from_file = match model_dir.map(|dir| dir.join(format!("{language}.txt"))) {
            Some(path) if path.exists() => Some(read_abbreviations(&path)?),
            _ => None,
        };

        if builtin.is_none() && from_file.is_none() {
            return Err(AnnotateError::ModelUnavailable(format!(
                "no segmentation model for language '{language}'"
            )));
        }

        let mut abbreviations: HashSet<String> = builtin
            .unwrap_or_default()
            .iter()
            .map(|a| (*a).to_string())
            .collect();
        abbreviations.extend(from_file.unwrap_or_default());

        Ok(SegmentationModel::Rules {
            language: language.to_string(),
            abbreviations,
        })
    }

    /// Split `text` into trimmed, non-empty sentences in document order.
    #[must_use]
    pub fn sentences(&self, text: &str) -> Vec<String> {
        match self {
            SegmentationModel::Rules { abbreviations, .. } => rules_split(text, abbreviations),
            SegmentationModel::Blank => punctuation_split(text),
        }
    }
}

fn read_abbreviations(path: &Path) -> Result<Vec<String>, AnnotateError> {
    let content = std::fs::read_to_string(path).map_err(|e| AnnotateError::Io {
        path: path.display().to_string(),
        source: e,
    })?;
    Ok(content
        .lines()
        .map(|line| line.split('#').next().unwrap_or_default().trim())
        .filter(|line| !line.is_empty())
        .map(|line| line.trim_end_matches('.').to_lowercase())
        .collect())
}

fn rules_split(text: &str, abbreviations: &HashSet<String>) -> Vec<String> {
    let mut sentences = Vec::new();
    let mut current = String::new();

    for span in text.split_sentence_bounds() {
        current.push_str(span);
        if ends_with_abbreviation(current.trim_end(), abbreviations) {
            continue;
        }
        push_trimmed(&mut sentences, &current);
        current.clear();
    }
    push_trimmed(&mut sentences, &current);
    sentences
}

fn ends_with_abbreviation(span: &str, abbreviations: &HashSet<String>) -> bool {
    let Some(without_dot) = span.strip_suffix('.') else {
        return false;
    };
    let last_word = without_dot
        .rsplit(char::is_whitespace)
        .next()
        .unwrap_or_default()
        .trim_start_matches(|c: char| !c.is_alphanumeric())
        .to_lowercase();
    !last_word.is_empty() && abbreviations.contains(&last_word)
}

fn punctuation_split(text: &str) -> Vec<String> {
    let mut sentences = Vec::new();
    let mut current = String::new();

    for c in text.chars() {
        current.push(c);
        if is_sentence_end(c) {
            push_trimmed(&mut sentences, &current);
            current.clear();
        }
    }
    push_trimmed(&mut sentences, &current);
    sentences
}

fn is_sentence_end(c: char) -> bool {
    matches!(
        c,
        '.' | '!' | '?' | '\u{061F}' | '\u{06D4}' | '\u{3002}' | '\u{FF01}' | '\u{FF1F}'
    )
}

fn push_trimmed(sentences: &mut Vec<String>, span: &str) {
    let trimmed = span.trim();
    if !trimmed.is_empty() {
        sentences.push(trimmed.to_string());
    }
}

/// Per-run cache of segmentation models, keyed by resolved language.
///
/// Each language is loaded at most once. A failed load is cached as the
/// blank model so the failure is logged once, not per review.
#[derive(Debug)]
pub struct SegmenterRegistry {
    models: HashMap<String, SegmentationModel>,
    model_dir: Option<PathBuf>,
    blank: SegmentationModel,
}

impl SegmenterRegistry {
    #[must_use]
    pub fn new(model_dir: Option<PathBuf>) -> Self {
        Self {
            models: HashMap::new(),
            model_dir,
            blank: SegmentationModel::Blank,
        }
    }

    /// Ensure a model is loaded for `language`, degrading to blank on failure.
    pub fn load(&mut self, language: &str) -> &SegmentationModel {
        if !self.models.contains_key(language) {
            let model = match SegmentationModel::load(language, self.model_dir.as_deref()) {
                Ok(model) => {
                    tracing::info!(language, "loaded segmentation model");
                    model
                }
                Err(e) => {
                    tracing::warn!(
                        language,
                        error = %e,
                        "segmentation model unavailable, falling back to blank model"
                    );
                    SegmentationModel::Blank
                }
            };
            self.models.insert(language.to_string(), model);
        }
        &self.models[language]
    }

    /// Load every language in `languages`, in order.
    pub fn load_all<'a, I>(&mut self, languages: I)
    where
        I: IntoIterator<Item = &'a str>,
    {
        for language in languages {
            self.load(language);
        }
    }

    /// Model for `language`, else the English model, else the blank model.
    #[must_use]
    pub fn model_for(&self, language: &str) -> &SegmentationModel {
        self.models
            .get(language)
            .or_else(|| self.models.get(DEFAULT_LANGUAGE))
            .unwrap_or(&self.blank)
    }

    #[must_use]
    pub fn is_loaded(&self, language: &str) -> bool {
        self.models.contains_key(language)
    }
}

/// Split one review into sentences.
///
/// Blank text yields no sentences. Text with no recognised boundary yields
/// the whole trimmed text as a single sentence.
#[must_use]
pub fn segment(
    review: &Review,
    detected_language: &str,
    resolved_language: &str,
    registry: &SegmenterRegistry,
) -> Vec<Sentence> {
    let text = review.cleaned_content.trim();
    if text.is_empty() {
        return Vec::new();
    }

    let mut spans = registry.model_for(resolved_language).sentences(text);
    if spans.is_empty() {
        spans.push(text.to_string());
    }

    spans
        .into_iter()
        .enumerate()
        .map(|(sentence_index, sentence)| Sentence {
            review_id: review.id.clone(),
            app_name: review.app_name.clone(),
            country: review.country.clone(),
            language: detected_language.to_string(),
            resolved_language: resolved_language.to_string(),
            sentence_index,
            sentence,
            rating: review.rating,
            review_date: review.review_date,
        })
        .collect()
}

/// Sentences of a batch of reviews, flattened in review order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SegmentedReviews {
    pub sentences: Vec<Sentence>,
    /// `(review index, range into sentences)` for each review that produced
    /// sentences. Reviews with blank text have no span.
    pub spans: Vec<(usize, Range<usize>)>,
}

/// Split every review into sentences, flattened in review order.
///
/// `detected` and `resolved` are aligned with `reviews`.
#[must_use]
pub fn split_sentences(
    reviews: &[Review],
    detected: &[String],
    resolved: &[String],
    registry: &SegmenterRegistry,
) -> SegmentedReviews {
    debug_assert_eq!(reviews.len(), detected.len());
    debug_assert_eq!(reviews.len(), resolved.len());

    let mut out = SegmentedReviews::default();
    for (idx, ((review, detected), resolved)) in
        reviews.iter().zip(detected).zip(resolved).enumerate()
    {
        let split = segment(review, detected, resolved, registry);
        if split.is_empty() {
            tracing::debug!(id = %review.id, "review has no sentences, dropping");
            continue;
        }
        let start = out.sentences.len();
        out.sentences.extend(split);
        out.spans.push((idx, start..out.sentences.len()));
    }
    out
}

#[cfg(test)]
#[path = "segment_test.rs"]
mod tests;
