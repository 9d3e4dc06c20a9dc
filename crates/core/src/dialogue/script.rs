//! The static triage script: every (block, section) question, the judgment
//! that gates its branch, and the outcome of each boolean answer.
//!
//! The script is straight-line — no loops, no backtracking. Any "yes" inside
//! SynCovid routes to the assessment-centre listing; any "yes" inside
//! CovidProne terminates with the high-risk advisory.

use crate::dialogue::states::{Action, Block, ConversationState, Status};

/// Which semantic judgment gates a branch point.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Judgment {
    Sentiment,
    YesNo,
    Done,
}

/// The fully-defined result of one boolean answer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Outcome {
    pub block: Block,
    pub section: u32,
    pub action: Action,
    pub text: &'static str,
}

impl Outcome {
    /// Materializes the outcome as the next stored state. Exit outcomes are
    /// terminal, everything else stays active.
    pub fn into_state(self) -> ConversationState {
        let status = if self.block.is_terminal() { Status::Terminated } else { Status::Active };
        ConversationState {
            text: self.text.to_string(),
            status,
            block: self.block,
            section: self.section,
            action: self.action,
        }
    }
}

/// One branch point of the script, keyed by (block, section).
#[derive(Clone, Copy, Debug)]
pub struct ScriptEntry {
    pub block: Block,
    pub section: u32,
    pub judgment: Judgment,
    pub on_true: Outcome,
    pub on_false: Outcome,
}

pub const WELCOME: &str = "Hi, I am Betty. So, how are you feeling today?";

const FEELING_GOOD: &str =
    "Great, I don’t think you would need our self-assessment tool today. Am I right?";
const SEVERE_SYMPTOMS: &str = "Hmm, are you experiencing any one of these problems? Severe chest \
     pain, severe difficulty breathing, losing consciousness, feeling confused/disoriented?";
const CALL_911: &str = "You need immediate help. Let me call nine-one-one.";
const TAKE_CARE: &str = "Thanks for chatting with me. Take care and be safe.";
const CENTERS: &str = "Based on your answers you must get a COVID-19 self-assessment test done \
     at a centre closest to you, let me find one for you. Please say I am done, when you are \
     done viewing the list of centres.";
const HIGH_RISK: &str = "Based on your answer, you are in the high risk category. You must stay \
     at home and take all precautions to avoid contact with people, especially the ones who are \
     sick or might have travelled aboard in the past 14 days.";
const SELF_ISOLATE: &str = "Based on your answer you must self-isolate. Be sure to take this \
     assessment test if you experience any unpleasantness. When, you are done please say I am \
     done to proceed.";
const NO_ASSESSMENT: &str = "Great, based on your answers you don’t need an assessment for \
     COVID-19. Avoid unnecessary travel and take all necessary precautions.";
const STAY_AT_HOME: &str =
    "Stay at home and monitor your health. Here are some of the ways of doing that.";
const THANK_YOU: &str = "Thank you for chatting with me. Stay at home and be safe.";

const SYMPTOM_QUESTIONS: [&str; 8] = [
    "Are you currently experiencing fever or chills?",
    "Is your cough new or worsening or making whistling noise?",
    "Are you experiencing shortness of breath or difficulty in breathing?",
    "Is your throat sore or do you have difficulty in swallowing?",
    "Is your nose stuffy, runny, congested or have loss of sense of smell or taste?",
    "Do you have a pink eye or a headache that is long lasting or unusual?",
    "Are you having digestive issues such as nausea, vomiting, diarrhea, stomach pain?",
    "Are you having muscle ache or extreme tiredness that is unusual or do you feel like \
     falling down?",
];

const RISK_QUESTIONS: [&str; 4] = [
    "Hmm, I would like to know if you are 70 years or older.",
    "Do you have a condition that compromises immune system such as Lupus, Rheumatoid arthritis?",
    "Do you have chronic health condition such as diabetes, asthma, emphysema?",
    "Do you regularly go or have recently been to healthcare centre for services such as \
     dialysis, cancer treatment, or surgery",
];

const CLOSE_CONTACT: &str = "In the past 14 days, have you been in close physical contact with \
     people who tested positive for COVID-19 or have been unusually sick, for more than 15 \
     minutes?";
const TRAVEL: &str = "In the past 14 days, have you or any person living with you, travelled \
     abroad or to the nearby province?";

const fn ask(block: Block, section: u32, text: &'static str) -> Outcome {
    Outcome { block, section, action: Action::Talk, text }
}

const fn display_centers() -> Outcome {
    Outcome { block: Block::DisplayCenters, section: 1, action: Action::DisplayCenters, text: CENTERS }
}

const fn exit_with(action: Action, text: &'static str) -> Outcome {
    Outcome { block: Block::Exit, section: 0, action, text }
}

const fn entry_at(
    block: Block,
    section: u32,
    judgment: Judgment,
    on_true: Outcome,
    on_false: Outcome,
) -> ScriptEntry {
    ScriptEntry { block, section, judgment, on_true, on_false }
}

/// The whole script, in conversation order.
pub static SCRIPT: &[ScriptEntry] = &[
    entry_at(
        Block::Greeting,
        1,
        Judgment::Sentiment,
        ask(Block::Greeting, 2, FEELING_GOOD),
        ask(Block::Greeting, 3, SEVERE_SYMPTOMS),
    ),
    entry_at(
        Block::Greeting,
        2,
        Judgment::YesNo,
        exit_with(Action::Talk, TAKE_CARE),
        ask(Block::Greeting, 3, SEVERE_SYMPTOMS),
    ),
    entry_at(
        Block::Greeting,
        3,
        Judgment::YesNo,
        exit_with(Action::Call911, CALL_911),
        ask(Block::SynCovid, 1, SYMPTOM_QUESTIONS[0]),
    ),
    // Eight sequential symptom questions; any "yes" short-circuits to the
    // centre listing.
    entry_at(
        Block::SynCovid,
        1,
        Judgment::YesNo,
        display_centers(),
        ask(Block::SynCovid, 2, SYMPTOM_QUESTIONS[1]),
    ),
    entry_at(
        Block::SynCovid,
        2,
        Judgment::YesNo,
        display_centers(),
        ask(Block::SynCovid, 3, SYMPTOM_QUESTIONS[2]),
    ),
    entry_at(
        Block::SynCovid,
        3,
        Judgment::YesNo,
        display_centers(),
        ask(Block::SynCovid, 4, SYMPTOM_QUESTIONS[3]),
    ),
    entry_at(
        Block::SynCovid,
        4,
        Judgment::YesNo,
        display_centers(),
        ask(Block::SynCovid, 5, SYMPTOM_QUESTIONS[4]),
    ),
    entry_at(
        Block::SynCovid,
        5,
        Judgment::YesNo,
        display_centers(),
        ask(Block::SynCovid, 6, SYMPTOM_QUESTIONS[5]),
    ),
    entry_at(
        Block::SynCovid,
        6,
        Judgment::YesNo,
        display_centers(),
        ask(Block::SynCovid, 7, SYMPTOM_QUESTIONS[6]),
    ),
    entry_at(
        Block::SynCovid,
        7,
        Judgment::YesNo,
        display_centers(),
        ask(Block::SynCovid, 8, SYMPTOM_QUESTIONS[7]),
    ),
    entry_at(
        Block::SynCovid,
        8,
        Judgment::YesNo,
        display_centers(),
        ask(Block::CovidProne, 1, RISK_QUESTIONS[0]),
    ),
    // Four risk-category questions; any "yes" terminates with the high-risk
    // advisory.
    entry_at(
        Block::CovidProne,
        1,
        Judgment::YesNo,
        exit_with(Action::Talk, HIGH_RISK),
        ask(Block::CovidProne, 2, RISK_QUESTIONS[1]),
    ),
    entry_at(
        Block::CovidProne,
        2,
        Judgment::YesNo,
        exit_with(Action::Talk, HIGH_RISK),
        ask(Block::CovidProne, 3, RISK_QUESTIONS[2]),
    ),
    entry_at(
        Block::CovidProne,
        3,
        Judgment::YesNo,
        exit_with(Action::Talk, HIGH_RISK),
        ask(Block::CovidProne, 4, RISK_QUESTIONS[3]),
    ),
    entry_at(
        Block::CovidProne,
        4,
        Judgment::YesNo,
        exit_with(Action::Talk, HIGH_RISK),
        ask(Block::ExposeCovid, 1, CLOSE_CONTACT),
    ),
    entry_at(
        Block::ExposeCovid,
        1,
        Judgment::YesNo,
        display_centers(),
        ask(Block::TravelCovid, 1, TRAVEL),
    ),
    entry_at(
        Block::TravelCovid,
        1,
        Judgment::YesNo,
        exit_with(Action::Talk, SELF_ISOLATE),
        exit_with(Action::Talk, NO_ASSESSMENT),
    ),
    entry_at(
        Block::DisplayCenters,
        1,
        Judgment::Done,
        exit_with(Action::Talk, STAY_AT_HOME),
        exit_with(Action::Talk, THANK_YOU),
    ),
];

/// Looks up the branch point for a (block, section) pair. Exit has no entry.
pub fn entry(block: Block, section: u32) -> Option<&'static ScriptEntry> {
    SCRIPT.iter().find(|candidate| candidate.block == block && candidate.section == section)
}
