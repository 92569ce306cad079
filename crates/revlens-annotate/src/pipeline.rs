//! Annotation pipeline orchestration.

use std::collections::BTreeMap;
use std::path::PathBuf;

use revlens_core::{
    default_country_map, load_country_map, AnnotatedReview, AppConfig, NotebookRow, Review,
    Sentence, SentenceDetail, SentimentLabel, SentimentResult, TopicSummaryRow,
};

use crate::aggregate::{aggregate_review, build_details, DEFAULT_TOPIC_LIMIT};
use crate::error::AnnotateError;
use crate::language::{detect_languages, LanguageResolver};
use crate::segment::{split_sentences, SegmentedReviews, SegmenterRegistry};
use crate::sentiment::{SentimentStrategy, DEFAULT_BATCH_SIZE};
use crate::summary::compose;
use crate::topic_summary::summarize_topics;
use crate::topics::{TopicExtractor, TopicStrategy};

/// Everything one annotation run produces.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PipelineOutput {
    /// Structured rows, in input order. Reviews without sentences are absent.
    pub reviews: Vec<AnnotatedReview>,
    pub notebook: Vec<NotebookRow>,
    pub topic_summary: Vec<TopicSummaryRow>,
}

/// Per-run state: language resolver, loaded segmenters and model strategies.
///
/// Strategies are probed once when the context is built. Segmenters load
/// lazily as languages are seen and stay loaded for the life of the context.
#[derive(Debug)]
pub struct PipelineContext {
    resolver: LanguageResolver,
    segmenters: SegmenterRegistry,
    sentiment: SentimentStrategy,
    topics: TopicExtractor,
    batch_size: usize,
    topic_limit: usize,
}

impl PipelineContext {
    #[must_use]
    pub fn new(
        resolver: LanguageResolver,
        sentiment: SentimentStrategy,
        topics: TopicExtractor,
    ) -> Self {
        Self {
            resolver,
            segmenters: SegmenterRegistry::new(None),
            sentiment,
            topics,
            batch_size: DEFAULT_BATCH_SIZE,
            topic_limit: DEFAULT_TOPIC_LIMIT,
        }
    }

    /// Build a context from configuration, probing both inference servers.
    ///
    /// # Errors
    ///
    /// Returns [`AnnotateError::Config`] if the configured country map file
    /// cannot be loaded. Unreachable models are not an error.
    pub async fn from_config(config: &AppConfig) -> Result<Self, AnnotateError> {
        let country_map = match &config.country_map_path {
            Some(path) => load_country_map(path)?,
            None => default_country_map(),
        };
        let timeout = config.inference_timeout_secs;
        let sentiment = SentimentStrategy::probe(config.sentiment_url.as_deref(), timeout).await;
        let topic_strategy = TopicStrategy::probe(config.embed_url.as_deref(), timeout).await;

        Ok(Self::new(
            LanguageResolver::new(country_map),
            sentiment,
            TopicExtractor::new(topic_strategy, config.topics.clone()),
        )
        .with_segmenter_dir(config.segmenter_dir.clone())
        .with_batch_size(config.sentiment_batch_size)
        .with_topic_limit(config.review_topic_limit))
    }

    /// Read extra abbreviation files from `dir`. Resets loaded segmenters.
    #[must_use]
    pub fn with_segmenter_dir(mut self, dir: Option<PathBuf>) -> Self {
        self.segmenters = SegmenterRegistry::new(dir);
        self
    }

    #[must_use]
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    #[must_use]
    pub fn with_topic_limit(mut self, limit: usize) -> Self {
        self.topic_limit = limit;
        self
    }

    #[must_use]
    pub fn resolver(&self) -> &LanguageResolver {
        &self.resolver
    }

    #[must_use]
    pub fn segmenters(&self) -> &SegmenterRegistry {
        &self.segmenters
    }

    #[must_use]
    pub fn sentiment(&self) -> &SentimentStrategy {
        &self.sentiment
    }

    #[must_use]
    pub fn topics(&self) -> &TopicExtractor {
        &self.topics
    }
}

/// Annotate cleaned review rows, detecting their languages first.
///
/// # Errors
///
/// Returns [`AnnotateError::EmptyInput`] if `rows` is empty.
pub async fn annotate(
    rows: &[Review],
    ctx: &mut PipelineContext,
) -> Result<PipelineOutput, AnnotateError> {
    let detected = detect_languages(rows, ctx.resolver.country_map())?;
    annotate_detected(rows, &detected, ctx).await
}

/// Annotate rows whose languages were already detected upstream.
///
/// 1. Resolve each detected language and load one segmenter per resolved code.
/// 2. Split reviews into sentences; reviews with blank text are dropped.
/// 3. Score sentiment for every sentence, in fixed-size batches.
/// 4. Extract topics, one batch per resolved language.
/// 5. Aggregate each review in input order, skipping unscored sentences.
/// 6. Compose notebook summaries and the topic summary table.
///
/// # Errors
///
/// Returns [`AnnotateError::EmptyInput`] if `rows` is empty, or
/// [`AnnotateError::LanguageCountMismatch`] if `detected` is not aligned with
/// `rows`.
pub async fn annotate_detected(
    rows: &[Review],
    detected: &[String],
    ctx: &mut PipelineContext,
) -> Result<PipelineOutput, AnnotateError> {
    if rows.is_empty() {
        return Err(AnnotateError::EmptyInput("annotation"));
    }
    if detected.len() != rows.len() {
        return Err(AnnotateError::LanguageCountMismatch {
            rows: rows.len(),
            languages: detected.len(),
        });
    }

    // Step 1: resolve languages and warm the segmenters.
    let resolution = ctx
        .resolver
        .resolve_all(detected.iter().map(String::as_str));
    ctx.segmenters
        .load_all(resolution.by_raw.values().map(String::as_str));
    tracing::info!(
        reviews = rows.len(),
        languages = ?resolution.by_raw,
        "resolved review languages"
    );

    // Step 2: segment, remembering which sentences belong to which review.
    let SegmentedReviews { sentences, spans } =
        split_sentences(rows, detected, &resolution.per_row, &ctx.segmenters);
    tracing::info!(
        sentences = sentences.len(),
        reviews = spans.len(),
        dropped = rows.len() - spans.len(),
        "segmented reviews"
    );

    // Step 3: sentiment.
    let texts: Vec<&str> = sentences.iter().map(|s| s.sentence.as_str()).collect();
    let sentiments = ctx.sentiment.score(&texts, ctx.batch_size).await;
    let unscored = sentiments.iter().filter(|s| s.is_none()).count();
    tracing::info!(
        scored = sentiments.len() - unscored,
        unscored,
        learned = ctx.sentiment.is_learned(),
        "scored sentence sentiment"
    );

    // Step 4: topics, grouped by resolved language.
    let topics = extract_topics(&sentences, &ctx.topics).await;

    // Step 5 + 6: aggregate and summarize.
    let mut output = PipelineOutput::default();
    for (idx, range) in spans {
        let review = &rows[idx];
        let resolved = &resolution.per_row[idx];
        let aggregate = aggregate_review(
            scored_details(&sentences[range.clone()], &sentiments[range.clone()], &topics[range]),
            ctx.topic_limit,
        );

        output.notebook.push(NotebookRow {
            id: review.id.clone(),
            app_name: review.app_name.clone(),
            country: review.country.clone(),
            language: resolved.clone(),
            rating: review.rating,
            review_date: review.review_date,
            sentiment_label: aggregate.sentiment_label,
            summary: compose(review, resolved, &aggregate),
        });
        output.reviews.push(AnnotatedReview {
            review: review.clone(),
            detected_language: detected[idx].clone(),
            resolved_language: resolved.clone(),
            aggregate,
        });
    }
    output.topic_summary = summarize_topics(&output.reviews);

    tracing::info!(
        reviews = output.reviews.len(),
        topics = output.topic_summary.len(),
        "annotation complete"
    );
    Ok(output)
}

async fn extract_topics(sentences: &[Sentence], extractor: &TopicExtractor) -> Vec<Vec<String>> {
    let mut by_language: BTreeMap<&str, Vec<usize>> = BTreeMap::new();
    for (idx, sentence) in sentences.iter().enumerate() {
        by_language
            .entry(sentence.resolved_language.as_str())
            .or_default()
            .push(idx);
    }

    let mut topics = vec![Vec::new(); sentences.len()];
    for (language, indices) in by_language {
        let texts: Vec<&str> = indices
            .iter()
            .map(|&i| sentences[i].sentence.as_str())
            .collect();
        let extracted = extractor.extract_batch(&texts, language).await;
        tracing::debug!(language, sentences = texts.len(), "extracted topics");
        for (i, found) in indices.into_iter().zip(extracted) {
            topics[i] = found;
        }
    }
    topics
}

/// Sentence details for one review, leaving out sentences with no sentiment.
fn scored_details(
    sentences: &[Sentence],
    sentiments: &[Option<SentimentResult>],
    topics: &[Vec<String>],
) -> Vec<SentenceDetail> {
    let mut texts = Vec::new();
    let mut labels: Vec<SentimentLabel> = Vec::new();
    let mut kept_topics = Vec::new();
    for ((sentence, sentiment), topic_list) in sentences.iter().zip(sentiments).zip(topics) {
        if let Some(result) = sentiment {
            tracing::debug!(
                id = %sentence.review_id,
                sentence = sentence.sentence_index,
                label = %result.label,
                positive = result.positive,
                neutral = result.neutral,
                negative = result.negative,
                "sentence sentiment"
            );
            texts.push(sentence.sentence.clone());
            labels.push(result.label);
            kept_topics.push(topic_list.clone());
        }
    }
    build_details(&texts, &labels, &kept_topics)
}

#[cfg(test)]
#[path = "pipeline_test.rs"]
mod tests;
