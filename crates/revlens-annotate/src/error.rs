use thiserror::Error;

#[derive(Debug, Error)]
pub enum AnnotateError {
    #[error("{stage} input is missing required columns: {}", columns.join(", "))]
    MissingColumns {
        stage: &'static str,
        columns: Vec<String>,
    },

    #[error("{0} input has no rows")]
    EmptyInput(&'static str),

    #[error("CSV error")]
    Csv(#[from] csv::Error),

    #[error("I/O error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("inference error: {0}")]
    Inference(String),

    #[error("model unavailable: {0}")]
    ModelUnavailable(String),

    #[error("{rows} rows but {languages} detected languages")]
    LanguageCountMismatch { rows: usize, languages: usize },

    #[error("configuration error: {0}")]
    Config(#[from] revlens_core::ConfigError),
}
