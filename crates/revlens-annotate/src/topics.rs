//! Per-sentence topic (keyphrase) extraction.
//!
//! The learned path embeds the sentence and its candidate n-grams and picks
//! phrases by Maximal Marginal Relevance. The fallback counts n-grams. The two
//! normalise differently: only the learned path runs the explicit
//! normalise-and-dedupe pass over its output.

use std::collections::{HashMap, HashSet};
use std::sync::LazyLock;

use regex::Regex;
use revlens_core::TopicSettings;

use crate::error::AnnotateError;
use crate::inference::InferenceClient;
use crate::stopwords::stopwords_for;

/// Most phrases the n-gram fallback returns for one sentence.
pub const FALLBACK_TOP_K: usize = 3;

/// Candidate tokens for the learned path: two or more word characters.
static CANDIDATE_TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b\w\w+\b").expect("valid candidate token regex"));
static WORD: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\w+").expect("valid word regex"));
static QUOTES: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"["'`]+"#).expect("valid quotes regex"));
static NON_WORD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^\w\s]").expect("valid non-word regex"));

/// Clean a raw phrase into a topic, or `None` if nothing survives.
///
/// Lowercases, drops quote characters, turns other punctuation into spaces,
/// and removes stopword tokens.
#[must_use]
pub fn normalize_topic(topic: &str, stopwords: &HashSet<&str>) -> Option<String> {
    let lower = topic.to_lowercase();
    let unquoted = QUOTES.replace_all(&lower, "");
    let spaced = NON_WORD.replace_all(&unquoted, " ");
    let tokens: Vec<&str> = spaced
        .split_whitespace()
        .filter(|tok| !stopwords.contains(tok))
        .collect();
    if tokens.is_empty() {
        None
    } else {
        Some(tokens.join(" "))
    }
}

fn ngrams(tokens: &[&str], ngram_range: (usize, usize)) -> Vec<String> {
    let (min_n, max_n) = ngram_range;
    let mut out = Vec::new();
    for n in min_n.max(1)..=max_n {
        if n > tokens.len() {
            break;
        }
        out.extend(tokens.windows(n).map(|w| w.join(" ")));
    }
    out
}

/// N-gram frequency topics for one sentence.
///
/// Up to `min(FALLBACK_TOP_K, top_n)` n-grams by descending count; equal
/// counts keep first-occurrence order.
#[must_use]
pub fn fallback_topics(
    sentence: &str,
    stopwords: &HashSet<&str>,
    ngram_range: (usize, usize),
    top_n: usize,
) -> Vec<String> {
    let lower = sentence.to_lowercase();
    let tokens: Vec<&str> = WORD
        .find_iter(&lower)
        .map(|m| m.as_str())
        .filter(|tok| !stopwords.contains(tok))
        .collect();

    let mut counts: Vec<(String, usize)> = Vec::new();
    let mut positions: HashMap<String, usize> = HashMap::new();
    for gram in ngrams(&tokens, ngram_range) {
        if let Some(&idx) = positions.get(&gram) {
            counts[idx].1 += 1;
        } else {
            positions.insert(gram.clone(), counts.len());
            counts.push((gram, 1));
        }
    }

    // Stable sort keeps first-seen order among equal counts.
    counts.sort_by(|a, b| b.1.cmp(&a.1));
    counts
        .into_iter()
        .map(|(gram, _)| gram)
        .filter(|gram| !gram.is_empty())
        .take(FALLBACK_TOP_K.min(top_n))
        .collect()
}

/// Unique candidate phrases for the learned path, in first-seen order.
#[must_use]
pub fn candidate_phrases(
    sentence: &str,
    stopwords: &HashSet<&str>,
    ngram_range: (usize, usize),
) -> Vec<String> {
    let lower = sentence.to_lowercase();
    let tokens: Vec<&str> = CANDIDATE_TOKEN
        .find_iter(&lower)
        .map(|m| m.as_str())
        .filter(|tok| !stopwords.contains(tok))
        .collect();

    let mut seen = HashSet::new();
    ngrams(&tokens, ngram_range)
        .into_iter()
        .filter(|gram| seen.insert(gram.clone()))
        .collect()
}

fn cosine(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        0.0
    } else {
        dot / (norm_a * norm_b)
    }
}

/// Maximal Marginal Relevance selection.
///
/// Starts from the candidate closest to the document, then repeatedly takes
/// the candidate maximising `(1 - diversity) * relevance - diversity *
/// redundancy`, where redundancy is the highest similarity to anything already
/// picked. Returns candidate indices ordered by relevance, highest first.
#[must_use]
pub fn mmr_select(doc: &[f32], candidates: &[Vec<f32>], top_n: usize, diversity: f32) -> Vec<usize> {
    if candidates.is_empty() || top_n == 0 {
        return Vec::new();
    }

    let relevance: Vec<f32> = candidates.iter().map(|c| cosine(c, doc)).collect();
    let argmax = |scores: &mut dyn Iterator<Item = (usize, f32)>| -> Option<usize> {
        let mut best: Option<(usize, f32)> = None;
        for (idx, score) in scores {
            if best.is_none_or(|(_, top)| score > top) {
                best = Some((idx, score));
            }
        }
        best.map(|(idx, _)| idx)
    };

    let Some(first) = argmax(&mut relevance.iter().copied().enumerate()) else {
        return Vec::new();
    };
    let mut selected = vec![first];
    let mut remaining: Vec<usize> = (0..candidates.len()).filter(|&i| i != first).collect();

    while selected.len() < top_n && !remaining.is_empty() {
        let mut scored = remaining.iter().enumerate().map(|(pos, &cand)| {
            let redundancy = selected
                .iter()
                .map(|&s| cosine(&candidates[cand], &candidates[s]))
                .fold(f32::NEG_INFINITY, f32::max);
            let mmr = (1.0 - diversity) * relevance[cand] - diversity * redundancy;
            (pos, mmr)
        });
        let Some(pos) = argmax(&mut scored) else {
            break;
        };
        selected.push(remaining.remove(pos));
    }

    selected.sort_by(|&a, &b| relevance[b].total_cmp(&relevance[a]));
    selected
}

/// Which keyphrase model a run uses. Chosen once by [`TopicStrategy::probe`].
#[derive(Debug, Clone)]
pub enum TopicStrategy {
    Learned(InferenceClient),
    Fallback,
}

impl TopicStrategy {
    /// Pick the embedding extractor if `url` is set and healthy, else n-grams.
    pub async fn probe(url: Option<&str>, timeout_secs: u64) -> Self {
        let Some(url) = url else {
            tracing::warn!("no embedding model configured, using simple topic extraction");
            return TopicStrategy::Fallback;
        };

        let client = match InferenceClient::new(url, timeout_secs) {
            Ok(client) => client,
            Err(e) => {
                tracing::warn!(url, error = %e, "falling back to simple topic extraction");
                return TopicStrategy::Fallback;
            }
        };

        match client.health().await {
            Ok(()) => {
                tracing::info!(url, "using embedding keyphrase extraction");
                TopicStrategy::Learned(client)
            }
            Err(e) => {
                tracing::warn!(url, error = %e, "falling back to simple topic extraction");
                TopicStrategy::Fallback
            }
        }
    }

    #[must_use]
    pub fn is_learned(&self) -> bool {
        matches!(self, TopicStrategy::Learned(_))
    }
}

/// Extracts topics for sentences of one language at a time.
#[derive(Debug, Clone)]
pub struct TopicExtractor {
    strategy: TopicStrategy,
    settings: TopicSettings,
}

impl TopicExtractor {
    #[must_use]
    pub fn new(strategy: TopicStrategy, settings: TopicSettings) -> Self {
        Self { strategy, settings }
    }

    #[must_use]
    pub fn strategy(&self) -> &TopicStrategy {
        &self.strategy
    }

    #[must_use]
    pub fn settings(&self) -> &TopicSettings {
        &self.settings
    }

    /// Topics for each sentence, aligned with `sentences`.
    pub async fn extract_batch(&self, sentences: &[&str], language: &str) -> Vec<Vec<String>> {
        let stopwords = stopwords_for(language);
        let mut out = Vec::with_capacity(sentences.len());
        for sentence in sentences {
            out.push(self.extract_with(sentence, &stopwords).await);
        }
        out
    }

    /// Topics for a single sentence.
    pub async fn extract(&self, sentence: &str, language: &str) -> Vec<String> {
        self.extract_with(sentence, &stopwords_for(language)).await
    }

    async fn extract_with(&self, sentence: &str, stopwords: &HashSet<&str>) -> Vec<String> {
        let text = sentence.trim();
        if text.is_empty() {
            return Vec::new();
        }

        let TopicStrategy::Learned(client) = &self.strategy else {
            return fallback_topics(
                text,
                stopwords,
                self.settings.ngram_range,
                self.settings.top_n,
            );
        };

        match self.learned_topics(client, text, stopwords).await {
            Ok(topics) => topics,
            Err(e) => {
                let preview: String = text.chars().take(50).collect();
                tracing::debug!(sentence = %preview, error = %e, "keyphrase model failed for sentence");
                fallback_topics(
                    text,
                    stopwords,
                    self.settings.ngram_range,
                    self.settings.top_n,
                )
            }
        }
    }

    async fn learned_topics(
        &self,
        client: &InferenceClient,
        text: &str,
        stopwords: &HashSet<&str>,
    ) -> Result<Vec<String>, AnnotateError> {
        let candidates = candidate_phrases(text, stopwords, self.settings.ngram_range);
        if candidates.is_empty() {
            return Err(AnnotateError::Inference(
                "sentence has no candidate phrases".to_string(),
            ));
        }

        let mut inputs: Vec<&str> = Vec::with_capacity(candidates.len() + 1);
        inputs.push(text);
        inputs.extend(candidates.iter().map(String::as_str));

        let mut embeddings = client.embed(&inputs).await?;
        let candidate_embeddings = embeddings.split_off(1);
        let doc = &embeddings[0];

        let picked = mmr_select(
            doc,
            &candidate_embeddings,
            self.settings.top_n,
            self.settings.diversity,
        );

        let mut seen = HashSet::new();
        Ok(picked
            .into_iter()
            .filter_map(|idx| normalize_topic(&candidates[idx], stopwords))
            .filter(|topic| seen.insert(topic.clone()))
            .collect())
    }
}

#[cfg(test)]
#[path = "topics_test.rs"]
mod tests;
