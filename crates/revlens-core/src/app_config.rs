use std::path::PathBuf;

/// Keyphrase extraction knobs shared by the learned and fallback extractors.
#[derive(Debug, Clone, PartialEq)]
pub struct TopicSettings {
    pub top_n: usize,
    /// Inclusive `(min, max)` n-gram lengths in words.
    pub ngram_range: (usize, usize),
    /// Redundancy penalty in `[0.0, 1.0]` for the learned extractor.
    pub diversity: f32,
}

impl Default for TopicSettings {
    fn default() -> Self {
        Self {
            top_n: 5,
            ngram_range: (1, 2),
            diversity: 0.5,
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub output_dir: PathBuf,
    pub log_level: String,
    /// Text-classification endpoint. `None` selects the lexicon fallback.
    pub sentiment_url: Option<String>,
    /// Embeddings endpoint. `None` selects n-gram frequency topics.
    pub embed_url: Option<String>,
    pub inference_timeout_secs: u64,
    pub sentiment_batch_size: usize,
    pub topics: TopicSettings,
    pub review_topic_limit: usize,
    pub country_map_path: Option<PathBuf>,
    pub segmenter_dir: Option<PathBuf>,
}
