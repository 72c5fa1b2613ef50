use serde::{Deserialize, Serialize};

/// A single step of a scripted conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DialogueNode {
    /// Unique identifier for this node (e.g. "intro", "recovery").
    pub id: String,
    /// The line the counterpart says when the conversation reaches this node.
    pub message: String,
    /// Replies the player can pick from. Empty on terminal nodes.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<DialogueOption>,
}

impl DialogueNode {
    pub fn terminal(id: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            message: message.into(),
            options: Vec::new(),
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.options.is_empty()
    }

    pub fn option(&self, option_id: &str) -> Option<&DialogueOption> {
        self.options.iter().find(|o| o.id == option_id)
    }
}

/// A canned reply leading to another node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DialogueOption {
    pub id: String,
    pub text: String,
    /// Id of an existing node.
    pub next_node_id: String,
    /// How good this reply is, 1..=10.
    pub quality_score: u32,
}
