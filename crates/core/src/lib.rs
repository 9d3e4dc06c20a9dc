//! Core of the Betty triage assistant: the conversation script, the dialogue
//! engine that advances it, the session registry, the classification port the
//! engine judges answers through, and service configuration.
//!
//! Everything here is transport-agnostic. The engine is a pure transition
//! function over a static script table; classification is injected behind the
//! [`classify::Classify`] trait so deterministic doubles drive tests and real
//! inference backends plug in at the composition root.

pub mod classify;
pub mod config;
pub mod dialogue;
pub mod session;

pub use classify::{Classify, ClassifyError};
pub use config::{
    AppConfig, ConfigError, ConfigOverrides, InferenceConfig, InferenceProvider, LoadOptions,
    LogFormat, LoggingConfig, ServerConfig,
};
pub use dialogue::engine::{EngineError, TriageEngine};
pub use dialogue::script::{entry, Judgment, Outcome, ScriptEntry, SCRIPT, WELCOME};
pub use dialogue::states::{Action, Block, ConversationState, Status, Turn, UnknownBlock};
pub use session::{SessionHandle, SessionId, SessionStore};
