pub mod engine;
pub mod script;
pub mod states;

pub use engine::{EngineError, TriageEngine};
pub use script::{entry, Judgment, Outcome, ScriptEntry, SCRIPT, WELCOME};
pub use states::{Action, Block, ConversationState, Status, Turn, UnknownBlock};
