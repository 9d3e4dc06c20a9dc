//! The classification port consumed by the dialogue engine.
//!
//! Semantic judgment is an external capability. The engine only ever needs
//! three boolean verdicts over free text; how they are produced (embedding
//! model, sentiment model, lexical heuristic, test double) is up to the
//! implementation injected at the composition root.

use async_trait::async_trait;
use thiserror::Error;

/// A judgment backend failed or timed out. Never defaulted silently: the
/// step that requested the verdict aborts and stored state stays intact.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ClassifyError {
    #[error("classification backend unavailable: {0}")]
    Backend(String),
    #[error("classification timed out after {0}s")]
    Timeout(u64),
}

#[async_trait]
pub trait Classify: Send + Sync {
    /// True iff the text reads as strongly positive.
    async fn sentiment(&self, text: &str) -> Result<bool, ClassifyError>;

    /// True iff the text reads as an affirmative answer.
    async fn yes_no(&self, text: &str) -> Result<bool, ClassifyError>;

    /// True iff the text reads as "I am done".
    async fn done(&self, text: &str) -> Result<bool, ClassifyError>;
}
