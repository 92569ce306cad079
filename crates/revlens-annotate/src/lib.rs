//! Sentence-level review annotation for revlens.
//!
//! Splits cleaned app-store reviews into sentences, scores each sentence's
//! sentiment, extracts its topics, and rolls both back up to the review with a
//! prose summary. Learned models are reached over HTTP (TEI-compatible
//! servers); when a server is absent or unhealthy the run uses deterministic
//! fallbacks instead.

pub mod aggregate;
pub mod detect;
pub mod error;
pub mod inference;
pub mod language;
pub mod pipeline;
pub mod segment;
pub mod sentiment;
pub mod stopwords;
pub mod summary;
pub mod table;
pub mod topic_summary;
pub mod topics;

pub use aggregate::{aggregate_review, aggregate_sentiment, build_details, merge_topics};
pub use error::AnnotateError;
pub use inference::{ClassScore, InferenceClient};
pub use language::{detect_languages, LanguageResolution, LanguageResolver};
pub use pipeline::{annotate, annotate_detected, PipelineContext, PipelineOutput};
pub use segment::{
    segment, split_sentences, SegmentationModel, SegmentedReviews, SegmenterRegistry,
};
pub use sentiment::{lexicon_sentiment, SentimentStrategy};
pub use summary::{compose, compose_from_row};
pub use table::{
    read_annotated, read_annotated_rows, read_reviews, write_notebook, write_outputs,
    write_structured, write_topic_summary, AnnotatedRow, OutputPaths, ReviewTable, Stage,
};
pub use topic_summary::summarize_topics;
pub use topics::{TopicExtractor, TopicStrategy};
