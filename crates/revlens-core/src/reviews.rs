use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One cleaned app-store review, as handed over by the cleaning step.
#[derive(Debug, Clone, PartialEq)]
pub struct Review {
    /// Source identifier, kept as text so store-specific formats survive.
    pub id: String,
    pub app_name: String,
    /// Lowercase storefront country code, e.g. `"it"`.
    pub country: String,
    /// Language reported upstream. Often missing or unreliable.
    pub language: Option<String>,
    pub cleaned_content: String,
    /// Raw text before cleaning, if the input carried it.
    pub content: Option<String>,
    pub rating: Option<u8>,
    pub review_date: Option<NaiveDate>,
}

/// A sentence split out of a [`Review`], carrying the parent's metadata.
#[derive(Debug, Clone, PartialEq)]
pub struct Sentence {
    pub review_id: String,
    pub app_name: String,
    pub country: String,
    /// Language as detected for the parent review, before resolution.
    pub language: String,
    pub resolved_language: String,
    /// 0-based position within the parent review.
    pub sentence_index: usize,
    pub sentence: String,
    pub rating: Option<u8>,
    pub review_date: Option<NaiveDate>,
}

#[derive(Debug, Error)]
#[error("unknown sentiment label: {0}")]
pub struct ParseLabelError(pub String);

/// Sentence-level sentiment class.
///
/// Deserializes through [`FromStr`], so labels are case- and
/// whitespace-insensitive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", try_from = "String")]
pub enum SentimentLabel {
    Positive,
    Neutral,
    Negative,
}

impl SentimentLabel {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            SentimentLabel::Positive => "positive",
            SentimentLabel::Neutral => "neutral",
            SentimentLabel::Negative => "negative",
        }
    }
}

impl fmt::Display for SentimentLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SentimentLabel {
    type Err = ParseLabelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "positive" => Ok(SentimentLabel::Positive),
            "neutral" => Ok(SentimentLabel::Neutral),
            "negative" => Ok(SentimentLabel::Negative),
            _ => Err(ParseLabelError(s.to_string())),
        }
    }
}

impl TryFrom<String> for SentimentLabel {
    type Error = ParseLabelError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

/// Review-level sentiment after aggregation. Deserializes like [`SentimentLabel`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", try_from = "String")]
pub enum ReviewLabel {
    Positive,
    Negative,
    Neutral,
    Mixed,
}

impl ReviewLabel {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            ReviewLabel::Positive => "positive",
            ReviewLabel::Negative => "negative",
            ReviewLabel::Neutral => "neutral",
            ReviewLabel::Mixed => "mixed",
        }
    }
}

impl fmt::Display for ReviewLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReviewLabel {
    type Err = ParseLabelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "positive" => Ok(ReviewLabel::Positive),
            "negative" => Ok(ReviewLabel::Negative),
            "neutral" => Ok(ReviewLabel::Neutral),
            "mixed" => Ok(ReviewLabel::Mixed),
            _ => Err(ParseLabelError(s.to_string())),
        }
    }
}

impl TryFrom<String> for ReviewLabel {
    type Error = ParseLabelError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

/// Scored sentiment for one sentence.
///
/// Probabilities sum to 1 when they come from the classifier; the lexicon
/// fallback emits fixed illustrative triples instead.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SentimentResult {
    pub label: SentimentLabel,
    pub negative: f32,
    pub neutral: f32,
    pub positive: f32,
}

/// Per-sentence trace retained on a review aggregate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SentenceDetail {
    pub sentence: String,
    pub sentiment: SentimentLabel,
    pub topics: Vec<String>,
}

/// Review-level roll-up of its sentences. Details are owned copies.
#[derive(Debug, Clone, PartialEq)]
pub struct ReviewAggregate {
    pub sentiment_label: ReviewLabel,
    /// `(positive - negative) / (positive + negative)`, in `[-1.0, 1.0]`.
    pub sentiment_score: f64,
    pub topics: Vec<String>,
    pub details: Vec<SentenceDetail>,
}

/// A review together with its language resolution and aggregate.
#[derive(Debug, Clone, PartialEq)]
pub struct AnnotatedReview {
    pub review: Review,
    pub detected_language: String,
    pub resolved_language: String,
    pub aggregate: ReviewAggregate,
}

/// Row of the notebook export: metadata plus a prose summary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotebookRow {
    pub id: String,
    pub app_name: String,
    pub country: String,
    pub language: String,
    pub rating: Option<u8>,
    pub review_date: Option<NaiveDate>,
    pub sentiment_label: ReviewLabel,
    pub summary: String,
}

/// Per app/country/topic statistics over annotated reviews.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopicSummaryRow {
    pub app_name: String,
    pub country: String,
    pub topic: String,
    pub review_count: usize,
    pub mean_sentiment_score: f64,
    pub positive: usize,
    pub negative: usize,
    pub mixed: usize,
    pub neutral: usize,
}
