//! Implementations of the classification port.
//!
//! The dialogue engine only consumes `betty_core::classify::Classify`; this
//! crate supplies the ways those three verdicts are actually produced:
//!
//! - `SemanticClassifier` — the production composition: a sentiment model for
//!   the greeting judgment plus an embedding model for yes/no and done
//!   similarity, both behind pluggable backend traits.
//! - `HttpInferenceBackend` — talks to a model-serving endpoint over JSON.
//! - `LexicalClassifier` — deterministic keyword heuristic for development
//!   and smoke runs; needs no model.
//! - `doubles` — scripted/failing classifiers for driving engine and
//!   transport tests.

pub mod backends;
pub mod doubles;
pub mod lexical;
pub mod semantic;

pub use backends::{EmbeddingBackend, HttpInferenceBackend, SentimentBackend, SentimentPrediction};
pub use doubles::{FailingClassifier, ScriptedClassifier, StaticClassifier};
pub use lexical::LexicalClassifier;
pub use semantic::SemanticClassifier;
