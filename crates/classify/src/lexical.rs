//! Deterministic keyword classifier for development and smoke runs.
//!
//! Keeps the same literal yes/no fast path as the semantic classifier and
//! falls back to small keyword lists instead of a model. Never fails.

use async_trait::async_trait;
use betty_core::classify::{Classify, ClassifyError};

use crate::semantic::{normalize, tokens_of};

const POSITIVE_WORDS: [&str; 9] =
    ["good", "great", "fine", "well", "better", "fantastic", "wonderful", "okay", "ok"];
const NEGATIVE_WORDS: [&str; 9] =
    ["bad", "sick", "ill", "terrible", "awful", "worse", "unwell", "not", "tired"];

const AFFIRMATIVE_HINTS: [&str; 7] =
    ["yeah", "yep", "sure", "correct", "right", "absolutely", "definitely"];
const NEGATIVE_HINTS: [&str; 4] = ["nope", "nah", "never", "not"];

const DONE_HINTS: [&str; 3] = ["done", "finished", "completed"];

#[derive(Clone, Copy, Debug, Default)]
pub struct LexicalClassifier;

impl LexicalClassifier {
    pub fn new() -> Self {
        Self
    }
}

fn contains_any(tokens: &[String], words: &[&str]) -> bool {
    tokens.iter().any(|token| words.contains(&token.as_str()))
}

#[async_trait]
impl Classify for LexicalClassifier {
    async fn sentiment(&self, text: &str) -> Result<bool, ClassifyError> {
        let tokens = tokens_of(&normalize(text));
        Ok(contains_any(&tokens, &POSITIVE_WORDS) && !contains_any(&tokens, &NEGATIVE_WORDS))
    }

    async fn yes_no(&self, text: &str) -> Result<bool, ClassifyError> {
        let tokens = tokens_of(&normalize(text));
        if tokens.iter().any(|token| token == "yes") {
            return Ok(true);
        }
        if tokens.iter().any(|token| token == "no") {
            return Ok(false);
        }
        if contains_any(&tokens, &AFFIRMATIVE_HINTS) {
            return Ok(true);
        }
        if contains_any(&tokens, &NEGATIVE_HINTS) {
            return Ok(false);
        }
        Ok(false)
    }

    async fn done(&self, text: &str) -> Result<bool, ClassifyError> {
        let tokens = tokens_of(&normalize(text));
        Ok(contains_any(&tokens, &DONE_HINTS) && !tokens.iter().any(|token| token == "not"))
    }
}
