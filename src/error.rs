use thiserror::Error;

/// Errors raised by the simulator, the graph loader and the battle.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CharmError {
    #[error("option '{option}' is not available at node '{node}'")]
    InvalidOption { node: String, option: String },

    #[error("unknown scenario: {0}")]
    UnknownScenario(String),

    #[error("the conversation is already over")]
    SessionComplete,

    #[error("response is empty")]
    EmptyInput,

    #[error("start node '{0}' is not in the graph")]
    MissingStart(String),

    #[error("fallback node '{0}' is not in the graph")]
    MissingFallback(String),

    #[error("option '{option}' at '{node}' points to missing node '{target}'")]
    DanglingEdge {
        node: String,
        option: String,
        target: String,
    },

    #[error("option '{option}' at '{node}' has score {score}, expected 1..=10")]
    ScoreOutOfRange {
        node: String,
        option: String,
        score: u32,
    },

    #[error("node '{node}' lists option '{option}' more than once")]
    DuplicateOption { node: String, option: String },

    #[error("dialogue graph has a cycle through '{0}'")]
    Cycle(String),

    #[error("saved session at '{node}' says complete={is_complete}, but the node disagrees")]
    RecordMismatch { node: String, is_complete: bool },

    #[error("scenario {0} was already answered")]
    AlreadyAnswered(usize),

    #[error("scenario {0} has not been answered yet")]
    NotAnswered(usize),

    #[error("the battle is already complete")]
    BattleComplete,
}

pub type Result<T> = std::result::Result<T, CharmError>;
