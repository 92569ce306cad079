//! HTTP client for a TEI-style inference server.
//!
//! The same client shape serves both learned models: a text classifier
//! (`POST /predict`) for sentiment and an embedding model (`POST /embed`) for
//! keyphrases. `GET /health` is the capability probe.

use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::error::AnnotateError;

/// Maximum number of texts per /embed call.
const EMBED_BATCH_SIZE: usize = 64;

/// Inference server HTTP client.
#[derive(Debug, Clone)]
pub struct InferenceClient {
    client: Client,
    base_url: String,
}

#[derive(Serialize)]
struct InputsRequest<'a> {
    inputs: &'a [&'a str],
    truncate: bool,
}

#[derive(Serialize)]
struct PredictRequest<'a> {
    inputs: &'a [&'a str],
    raw_scores: bool,
    truncate: bool,
}

/// One class probability as returned by `/predict`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ClassScore {
    pub label: String,
    pub score: f32,
}

impl InferenceClient {
    /// Create a client with a request timeout.
    ///
    /// # Errors
    ///
    /// Returns [`AnnotateError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(base_url: &str, timeout_secs: u64) -> Result<Self, AnnotateError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(5))
            .user_agent("revlens/0.1 (review-annotation)")
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Returns `Ok(())` when the server answers `/health` with a 2xx status.
    ///
    /// # Errors
    ///
    /// Returns [`AnnotateError::Inference`] on network failure or a non-2xx status.
    pub async fn health(&self) -> Result<(), AnnotateError> {
        let url = format!("{}/health", self.base_url);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| AnnotateError::Inference(format!("health request failed: {e}")))?;

        if !response.status().is_success() {
            return Err(AnnotateError::Inference(format!(
                "health returned status {}",
                response.status()
            )));
        }
        Ok(())
    }

    /// Classify a batch of texts. Returns one score list per input, in order.
    ///
    /// # Errors
    ///
    /// Returns [`AnnotateError::Inference`] if the request fails, the response
    /// cannot be parsed, or the server returns the wrong number of results.
    pub async fn predict(&self, texts: &[&str]) -> Result<Vec<Vec<ClassScore>>, AnnotateError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let url = format!("{}/predict", self.base_url);
        let request = PredictRequest {
            inputs: texts,
            raw_scores: false,
            truncate: true,
        };
        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| AnnotateError::Inference(format!("predict request failed: {e}")))?;

        if !response.status().is_success() {
            return Err(AnnotateError::Inference(format!(
                "predict returned status {}",
                response.status()
            )));
        }

        let predictions: Vec<Vec<ClassScore>> = response
            .json()
            .await
            .map_err(|e| AnnotateError::Inference(format!("predict response parse error: {e}")))?;

        if predictions.len() != texts.len() {
            return Err(AnnotateError::Inference(format!(
                "predict returned {} results for {} inputs",
                predictions.len(),
                texts.len()
            )));
        }
        Ok(predictions)
    }

    /// Generate embeddings for a batch of texts.
    ///
    /// Texts are sent in groups of [`EMBED_BATCH_SIZE`] per request.
    /// Returns one vector per input text, in the same order.
    ///
    /// # Errors
    ///
    /// Returns [`AnnotateError::Inference`] if a request fails or the response
    /// cannot be parsed.
    pub async fn embed(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, AnnotateError> {
        let url = format!("{}/embed", self.base_url);
        let mut all_embeddings = Vec::with_capacity(texts.len());

        for chunk in texts.chunks(EMBED_BATCH_SIZE) {
            let request = InputsRequest {
                inputs: chunk,
                truncate: true,
            };
            let response = self
                .client
                .post(&url)
                .json(&request)
                .send()
                .await
                .map_err(|e| AnnotateError::Inference(format!("embed request failed: {e}")))?;

            if !response.status().is_success() {
                return Err(AnnotateError::Inference(format!(
                    "embed returned status {}",
                    response.status()
                )));
            }

            let embeddings: Vec<Vec<f32>> = response.json().await.map_err(|e| {
                AnnotateError::Inference(format!("embed response parse error: {e}"))
            })?;

            if embeddings.len() != chunk.len() {
                return Err(AnnotateError::Inference(format!(
                    "embed returned {} embeddings for {} inputs",
                    embeddings.len(),
                    chunk.len()
                )));
            }

            all_embeddings.extend(embeddings);
        }

        Ok(all_embeddings)
    }
}
