//! Deterministic classifiers for tests: fixed verdicts, scripted verdict
//! sequences, and a backend that is always down.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use betty_core::classify::{Classify, ClassifyError};

/// Answers every judgment with the same fixed verdicts.
#[derive(Clone, Copy, Debug)]
pub struct StaticClassifier {
    pub sentiment: bool,
    pub yes_no: bool,
    pub done: bool,
}

impl StaticClassifier {
    pub fn all(verdict: bool) -> Self {
        Self { sentiment: verdict, yes_no: verdict, done: verdict }
    }
}

#[async_trait]
impl Classify for StaticClassifier {
    async fn sentiment(&self, _text: &str) -> Result<bool, ClassifyError> {
        Ok(self.sentiment)
    }

    async fn yes_no(&self, _text: &str) -> Result<bool, ClassifyError> {
        Ok(self.yes_no)
    }

    async fn done(&self, _text: &str) -> Result<bool, ClassifyError> {
        Ok(self.done)
    }
}

/// Pops one queued verdict per judgment call, in order, regardless of which
/// judgment is asked. Errs once the script runs out.
pub struct ScriptedClassifier {
    verdicts: Mutex<VecDeque<bool>>,
}

impl ScriptedClassifier {
    pub fn new(verdicts: impl IntoIterator<Item = bool>) -> Self {
        Self { verdicts: Mutex::new(verdicts.into_iter().collect()) }
    }

    fn next_verdict(&self) -> Result<bool, ClassifyError> {
        self.verdicts
            .lock()
            .map_err(|_| ClassifyError::Backend("scripted classifier lock poisoned".to_string()))?
            .pop_front()
            .ok_or_else(|| ClassifyError::Backend("scripted classifier exhausted".to_string()))
    }
}

#[async_trait]
impl Classify for ScriptedClassifier {
    async fn sentiment(&self, _text: &str) -> Result<bool, ClassifyError> {
        self.next_verdict()
    }

    async fn yes_no(&self, _text: &str) -> Result<bool, ClassifyError> {
        self.next_verdict()
    }

    async fn done(&self, _text: &str) -> Result<bool, ClassifyError> {
        self.next_verdict()
    }
}

/// Every judgment fails, as if the inference backend were unreachable.
#[derive(Clone, Copy, Debug, Default)]
pub struct FailingClassifier;

impl FailingClassifier {
    fn offline() -> ClassifyError {
        ClassifyError::Backend("inference backend unreachable".to_string())
    }
}

#[async_trait]
impl Classify for FailingClassifier {
    async fn sentiment(&self, _text: &str) -> Result<bool, ClassifyError> {
        Err(Self::offline())
    }

    async fn yes_no(&self, _text: &str) -> Result<bool, ClassifyError> {
        Err(Self::offline())
    }

    async fn done(&self, _text: &str) -> Result<bool, ClassifyError> {
        Err(Self::offline())
    }
}
