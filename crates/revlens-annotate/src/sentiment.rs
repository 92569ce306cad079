//! Sentence sentiment: a learned classifier with a keyword fallback.
//!
//! The strategy is probed once per run. A run never mixes the two paths:
//! if the classifier fails on a batch, that batch's sentences go unscored.

use revlens_core::{SentimentLabel, SentimentResult};

use crate::inference::{ClassScore, InferenceClient};

/// Sentences per classifier call.
pub const DEFAULT_BATCH_SIZE: usize = 32;

pub(crate) const POSITIVE_KEYWORDS: &[&str] = &["love", "great", "amazing", "good"];
pub(crate) const NEGATIVE_KEYWORDS: &[&str] = &["hate", "bad", "terrible", "crash"];

const POSITIVE_TRIPLE: SentimentResult = SentimentResult {
    label: SentimentLabel::Positive,
    negative: 0.05,
    neutral: 0.15,
    positive: 0.8,
};
const NEGATIVE_TRIPLE: SentimentResult = SentimentResult {
    label: SentimentLabel::Negative,
    negative: 0.8,
    neutral: 0.15,
    positive: 0.05,
};
const NEUTRAL_TRIPLE: SentimentResult = SentimentResult {
    label: SentimentLabel::Neutral,
    negative: 0.2,
    neutral: 0.6,
    positive: 0.2,
};

/// Score a sentence by keyword presence.
///
/// Substring match on the lowercased text, so "crash" also hits "crashing".
/// A sentence with both positive and negative keywords is neutral.
#[must_use]
pub fn lexicon_sentiment(text: &str) -> SentimentResult {
    let lower = text.to_lowercase();
    let mut score = 0_i8;
    if POSITIVE_KEYWORDS.iter().any(|kw| lower.contains(kw)) {
        score += 1;
    }
    if NEGATIVE_KEYWORDS.iter().any(|kw| lower.contains(kw)) {
        score -= 1;
    }
    match score.signum() {
        1 => POSITIVE_TRIPLE,
        -1 => NEGATIVE_TRIPLE,
        _ => NEUTRAL_TRIPLE,
    }
}

fn class_from_label(label: &str) -> Option<SentimentLabel> {
    match label.trim().to_lowercase().as_str() {
        "positive" | "label_2" => Some(SentimentLabel::Positive),
        "neutral" | "label_1" => Some(SentimentLabel::Neutral),
        "negative" | "label_0" => Some(SentimentLabel::Negative),
        _ => None,
    }
}

/// Turn one classifier output into a result.
///
/// The label is the argmax over recognised classes; ties go to whichever
/// class the model listed first. Returns `None` if no class is recognised.
#[must_use]
pub fn result_from_scores(scores: &[ClassScore]) -> Option<SentimentResult> {
    let mut best: Option<(SentimentLabel, f32)> = None;
    let mut negative = 0.0;
    let mut neutral = 0.0;
    let mut positive = 0.0;

    for entry in scores {
        let Some(class) = class_from_label(&entry.label) else {
            continue;
        };
        match class {
            SentimentLabel::Negative => negative = entry.score,
            SentimentLabel::Neutral => neutral = entry.score,
            SentimentLabel::Positive => positive = entry.score,
        }
        if best.is_none_or(|(_, top)| entry.score > top) {
            best = Some((class, entry.score));
        }
    }

    best.map(|(label, _)| SentimentResult {
        label,
        negative,
        neutral,
        positive,
    })
}

/// Which sentiment model a run uses. Chosen once by [`SentimentStrategy::probe`].
#[derive(Debug, Clone)]
pub enum SentimentStrategy {
    Learned(InferenceClient),
    Fallback,
}

impl SentimentStrategy {
    /// Pick the learned classifier if `url` is set and healthy, else the lexicon.
    pub async fn probe(url: Option<&str>, timeout_secs: u64) -> Self {
        let Some(url) = url else {
            tracing::warn!("no sentiment classifier configured, using rule-based sentiment");
            return SentimentStrategy::Fallback;
        };

        let client = match InferenceClient::new(url, timeout_secs) {
            Ok(client) => client,
            Err(e) => {
                tracing::warn!(url, error = %e, "falling back to rule-based sentiment");
                return SentimentStrategy::Fallback;
            }
        };

        match client.health().await {
            Ok(()) => {
                tracing::info!(url, "using sentiment classifier");
                SentimentStrategy::Learned(client)
            }
            Err(e) => {
                tracing::warn!(url, error = %e, "falling back to rule-based sentiment");
                SentimentStrategy::Fallback
            }
        }
    }

    #[must_use]
    pub fn is_learned(&self) -> bool {
        matches!(self, SentimentStrategy::Learned(_))
    }

    /// Score `texts` in order, `batch_size` at a time.
    ///
    /// The output is aligned with `texts`. `None` marks a sentence the
    /// classifier failed on; the batch is not retried or re-scored.
    pub async fn score(&self, texts: &[&str], batch_size: usize) -> Vec<Option<SentimentResult>> {
        let batch_size = batch_size.max(1);
        let mut results = Vec::with_capacity(texts.len());

        for (batch_idx, batch) in texts.chunks(batch_size).enumerate() {
            match self {
                SentimentStrategy::Fallback => {
                    results.extend(batch.iter().map(|t| Some(lexicon_sentiment(t))));
                }
                SentimentStrategy::Learned(client) => match client.predict(batch).await {
                    Ok(predictions) => {
                        results.extend(predictions.iter().map(|p| result_from_scores(p)));
                    }
                    Err(e) => {
                        tracing::warn!(
                            batch = batch_idx,
                            size = batch.len(),
                            error = %e,
                            "sentiment batch failed; sentences left unscored"
                        );
                        results.extend(std::iter::repeat_n(None, batch.len()));
                    }
                },
            }
            tracing::debug!(batch = batch_idx, done = results.len(), "scored sentiment batch");
        }

        results
    }
}
