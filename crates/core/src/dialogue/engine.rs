use thiserror::Error;

use crate::classify::{Classify, ClassifyError};
use crate::dialogue::script::{self, Judgment};
use crate::dialogue::states::{Block, ConversationState, Turn};

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum EngineError {
    #[error(
        "turn answers {declared_block}/{declared_section} but the conversation is at \
         {current_block}/{current_section}"
    )]
    InvalidTransition {
        current_block: Block,
        current_section: u32,
        declared_block: Block,
        declared_section: u32,
    },
    #[error("no script entry for {block}/{section}")]
    RequiredDataMissing { block: Block, section: u32 },
    #[error(transparent)]
    Classification(#[from] ClassifyError),
}

/// Pure transition function over the static script. Holds no state of its
/// own; callers own the current state and apply the result on success.
#[derive(Clone, Copy, Debug, Default)]
pub struct TriageEngine;

impl TriageEngine {
    pub fn new() -> Self {
        Self
    }

    pub fn initial_state(&self) -> ConversationState {
        ConversationState::initial()
    }

    /// Advances one turn. The turn must echo the (block, section) the caller
    /// is answering; the entry's judgment is invoked exactly once.
    pub async fn step<C>(
        &self,
        current: &ConversationState,
        turn: &Turn,
        classifier: &C,
    ) -> Result<ConversationState, EngineError>
    where
        C: Classify + ?Sized,
    {
        if turn.block != current.block || turn.section != current.section {
            return Err(EngineError::InvalidTransition {
                current_block: current.block,
                current_section: current.section,
                declared_block: turn.block,
                declared_section: turn.section,
            });
        }

        let entry = script::entry(current.block, current.section).ok_or(
            EngineError::RequiredDataMissing { block: current.block, section: current.section },
        )?;

        let verdict = match entry.judgment {
            Judgment::Sentiment => classifier.sentiment(&turn.text).await?,
            Judgment::YesNo => classifier.yes_no(&turn.text).await?,
            Judgment::Done => classifier.done(&turn.text).await?,
        };

        let outcome = if verdict { entry.on_true } else { entry.on_false };
        Ok(outcome.into_state())
    }
}
