use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::dialogue::script::WELCOME;

/// A named stage of the triage script.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Block {
    Greeting,
    SynCovid,
    CovidProne,
    ExposeCovid,
    TravelCovid,
    DisplayCenters,
    Exit,
}

impl Block {
    /// The snake_case name exchanged with clients and used in route paths.
    pub fn wire_name(&self) -> &'static str {
        match self {
            Self::Greeting => "greeting",
            Self::SynCovid => "syn_covid",
            Self::CovidProne => "covid_prone",
            Self::ExposeCovid => "expose_covid",
            Self::TravelCovid => "travel_covid",
            Self::DisplayCenters => "display_centers",
            Self::Exit => "exit",
        }
    }

    /// Exit accepts no further turns.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Exit)
    }
}

impl fmt::Display for Block {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.wire_name())
    }
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error("unknown block `{0}`")]
pub struct UnknownBlock(pub String);

impl FromStr for Block {
    type Err = UnknownBlock;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "greeting" => Ok(Self::Greeting),
            "syn_covid" => Ok(Self::SynCovid),
            "covid_prone" => Ok(Self::CovidProne),
            "expose_covid" => Ok(Self::ExposeCovid),
            "travel_covid" => Ok(Self::TravelCovid),
            "display_centers" => Ok(Self::DisplayCenters),
            "exit" => Ok(Self::Exit),
            other => Err(UnknownBlock(other.to_string())),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    Active,
    Terminated,
}

/// What the client should do with the outbound prompt.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    Talk,
    DisplayCenters,
    #[serde(rename = "call_911")]
    Call911,
}

/// The single payload exchanged with clients: the current prompt plus the
/// position in the script it belongs to.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationState {
    pub text: String,
    pub status: Status,
    pub block: Block,
    pub section: u32,
    pub action: Action,
}

impl ConversationState {
    /// Where every conversation starts.
    pub fn initial() -> Self {
        Self {
            text: WELCOME.to_string(),
            status: Status::Active,
            block: Block::Greeting,
            section: 1,
            action: Action::Talk,
        }
    }

    pub fn is_terminated(&self) -> bool {
        self.status == Status::Terminated
    }
}

/// An inbound turn. Callers echo the (block, section) they are answering so
/// stale or out-of-order requests can be rejected.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    pub block: Block,
    pub section: u32,
    pub text: String,
}
