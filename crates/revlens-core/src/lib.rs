//! Shared domain types and configuration for revlens.

pub mod app_config;
pub mod config;
pub mod countries;
pub mod reviews;

pub use app_config::{AppConfig, TopicSettings};
pub use config::{load_app_config, load_app_config_from_env};
pub use countries::{default_country_map, load_country_map, CountryMapFile};
pub use reviews::{
    AnnotatedReview, NotebookRow, ParseLabelError, Review, ReviewAggregate, ReviewLabel, Sentence,
    SentenceDetail, SentimentLabel, SentimentResult, TopicSummaryRow,
};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },

    #[error("failed to read country map file {path}: {source}")]
    CountryMapIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse country map file: {0}")]
    CountryMapParse(#[from] serde_yaml::Error),

    #[error("country map validation failed: {0}")]
    Validation(String),
}
