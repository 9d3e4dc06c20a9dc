//! The production classifier: sentiment from a sentiment model, yes/no and
//! done from anchor-similarity in embedding space.
//!
//! Yes/no keeps a literal fast path: a bare "yes" or "no" token decides the
//! verdict without touching the model. Everything else is compared against
//! fixed anchor phrases by cosine distance, with the anchors and the input
//! embedded in one backend call so the vectors are comparable.

use async_trait::async_trait;
use betty_core::classify::{Classify, ClassifyError};

use crate::backends::{EmbeddingBackend, SentimentBackend};

const YES_ANCHOR: &str = "yes.";
const NO_ANCHOR: &str = "no.";
const DONE_ANCHOR: &str = "I am Done.";
const NOT_DONE_ANCHOR: &str = "I am not Done";

const POSITIVE_LABEL: &str = "POSITIVE";
const POSITIVE_CONFIDENCE: f32 = 0.9;

pub struct SemanticClassifier<S, E> {
    sentiment: S,
    embedding: E,
}

impl<S, E> SemanticClassifier<S, E>
where
    S: SentimentBackend,
    E: EmbeddingBackend,
{
    pub fn new(sentiment: S, embedding: E) -> Self {
        Self { sentiment, embedding }
    }

    /// Embeds both anchors plus the input in one call and returns true iff
    /// the input is strictly closer to the first anchor. A tie is false.
    async fn closer_to_first(
        &self,
        first_anchor: &str,
        second_anchor: &str,
        normalized: &str,
    ) -> Result<bool, ClassifyError> {
        let corpus = [
            first_anchor.to_string(),
            second_anchor.to_string(),
            normalized.to_string(),
        ];
        let vectors = self.embedding.embed(&corpus).await?;
        let [first, second, input] = vectors.as_slice() else {
            return Err(ClassifyError::Backend(format!(
                "embedding backend returned {} vectors for 3 inputs",
                vectors.len()
            )));
        };

        let to_first = cosine_distance(first, input);
        let to_second = cosine_distance(second, input);
        Ok(to_first < to_second)
    }
}

#[async_trait]
impl<S, E> Classify for SemanticClassifier<S, E>
where
    S: SentimentBackend,
    E: EmbeddingBackend,
{
    async fn sentiment(&self, text: &str) -> Result<bool, ClassifyError> {
        let prediction = self.sentiment.predict(text).await?;
        Ok(prediction.label == POSITIVE_LABEL && prediction.score > POSITIVE_CONFIDENCE)
    }

    async fn yes_no(&self, text: &str) -> Result<bool, ClassifyError> {
        let normalized = normalize(text);
        let tokens = tokens_of(&normalized);
        if tokens.iter().any(|token| token == "yes") {
            return Ok(true);
        }
        if tokens.iter().any(|token| token == "no") {
            return Ok(false);
        }

        self.closer_to_first(YES_ANCHOR, NO_ANCHOR, &normalized).await
    }

    async fn done(&self, text: &str) -> Result<bool, ClassifyError> {
        let normalized = normalize(text);
        self.closer_to_first(DONE_ANCHOR, NOT_DONE_ANCHOR, &normalized).await
    }
}

/// Trims and terminates the text with a period so it matches the anchor
/// phrasing.
pub(crate) fn normalize(text: &str) -> String {
    let trimmed = text.trim();
    if trimmed.ends_with('.') {
        trimmed.to_string()
    } else {
        format!("{trimmed}.")
    }
}

/// Lowercased whitespace tokens of the period-stripped text.
pub(crate) fn tokens_of(normalized: &str) -> Vec<String> {
    normalized
        .trim_matches('.')
        .split_whitespace()
        .map(|token| token.to_ascii_lowercase())
        .collect()
}

pub(crate) fn cosine_distance(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 1.0;
    }
    1.0 - dot / (norm_a * norm_b)
}
