//! Backend traits the semantic classifier composes over, plus the HTTP
//! implementation for a remote model-serving endpoint.

use std::time::Duration;

use async_trait::async_trait;
use betty_core::classify::ClassifyError;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

/// Top label and confidence from a sentiment model.
#[derive(Clone, Debug, PartialEq)]
pub struct SentimentPrediction {
    pub label: String,
    pub score: f32,
}

#[async_trait]
pub trait SentimentBackend: Send + Sync {
    async fn predict(&self, text: &str) -> Result<SentimentPrediction, ClassifyError>;
}

#[async_trait]
pub trait EmbeddingBackend: Send + Sync {
    /// Embeds all inputs in one call so the vectors come from a single model
    /// context and stay comparable.
    async fn embed(&self, inputs: &[String]) -> Result<Vec<Vec<f32>>, ClassifyError>;
}

/// JSON client for a model-serving endpoint exposing `/v1/sentiment` and
/// `/v1/embeddings`. Every request is bounded by the configured timeout;
/// expiry surfaces as [`ClassifyError::Timeout`].
#[derive(Clone)]
pub struct HttpInferenceBackend {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<SecretString>,
    timeout_secs: u64,
}

impl HttpInferenceBackend {
    pub fn new(
        base_url: impl Into<String>,
        api_key: Option<SecretString>,
        timeout_secs: u64,
    ) -> Result<Self, ClassifyError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|error| ClassifyError::Backend(error.to_string()))?;

        let base_url = base_url.into().trim_end_matches('/').to_string();
        Ok(Self { client, base_url, api_key, timeout_secs })
    }

    fn request(&self, path: &str) -> reqwest::RequestBuilder {
        let mut builder = self.client.post(format!("{}{path}", self.base_url));
        if let Some(api_key) = &self.api_key {
            builder = builder.bearer_auth(api_key.expose_secret());
        }
        builder
    }

    fn map_error(&self, error: reqwest::Error) -> ClassifyError {
        if error.is_timeout() {
            ClassifyError::Timeout(self.timeout_secs)
        } else {
            ClassifyError::Backend(error.to_string())
        }
    }
}

#[derive(Debug, Serialize)]
struct SentimentRequest<'a> {
    text: &'a str,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SentimentResponse {
    pub label: String,
    pub score: f32,
}

#[derive(Debug, Serialize)]
struct EmbeddingRequest<'a> {
    inputs: &'a [String],
}

#[derive(Debug, Deserialize)]
pub(crate) struct EmbeddingResponse {
    pub embeddings: Vec<Vec<f32>>,
}

#[async_trait]
impl SentimentBackend for HttpInferenceBackend {
    async fn predict(&self, text: &str) -> Result<SentimentPrediction, ClassifyError> {
        let response = self
            .request("/v1/sentiment")
            .json(&SentimentRequest { text })
            .send()
            .await
            .map_err(|error| self.map_error(error))?
            .error_for_status()
            .map_err(|error| self.map_error(error))?;

        let body: SentimentResponse =
            response.json().await.map_err(|error| self.map_error(error))?;
        Ok(SentimentPrediction { label: body.label, score: body.score })
    }
}

#[async_trait]
impl EmbeddingBackend for HttpInferenceBackend {
    async fn embed(&self, inputs: &[String]) -> Result<Vec<Vec<f32>>, ClassifyError> {
        let response = self
            .request("/v1/embeddings")
            .json(&EmbeddingRequest { inputs })
            .send()
            .await
            .map_err(|error| self.map_error(error))?
            .error_for_status()
            .map_err(|error| self.map_error(error))?;

        let body: EmbeddingResponse =
            response.json().await.map_err(|error| self.map_error(error))?;

        if body.embeddings.len() != inputs.len() {
            return Err(ClassifyError::Backend(format!(
                "embedding backend returned {} vectors for {} inputs",
                body.embeddings.len(),
                inputs.len()
            )));
        }

        Ok(body.embeddings)
    }
}

#[cfg(test)]
mod tests {
    use super::{EmbeddingResponse, HttpInferenceBackend, SentimentResponse};

    #[test]
    fn backend_builds_and_normalizes_the_base_url() {
        let backend = HttpInferenceBackend::new("http://localhost:9090/", None, 10)
            .expect("backend builds");
        assert_eq!(backend.base_url, "http://localhost:9090");
        assert_eq!(backend.timeout_secs, 10);
    }

    #[test]
    fn sentiment_response_parses_the_wire_shape() {
        let body: SentimentResponse =
            serde_json::from_str(r#"{"label": "POSITIVE", "score": 0.97}"#)
                .expect("sentiment body parses");
        assert_eq!(body.label, "POSITIVE");
        assert!((body.score - 0.97).abs() < f32::EPSILON);
    }

    #[test]
    fn embedding_response_parses_the_wire_shape() {
        let body: EmbeddingResponse =
            serde_json::from_str(r#"{"embeddings": [[0.1, 0.2], [0.3, 0.4], [0.5, 0.6]]}"#)
                .expect("embedding body parses");
        assert_eq!(body.embeddings.len(), 3);
        assert_eq!(body.embeddings[0].len(), 2);
    }
}
