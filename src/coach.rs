#[cfg(feature = "local-model")]
pub mod model;

use std::fmt;
use std::sync::LazyLock;

use anyhow::Result;
use log::{debug, info, warn};
use regex::Regex;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Chat message helpers
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::System => "system",
            Self::User => "user",
            Self::Assistant => "assistant",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    #[cfg_attr(not(feature = "local-model"), allow(dead_code))]
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

impl fmt::Display for ChatMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}]: {}", self.role.as_str(), self.content)
    }
}

// ---------------------------------------------------------------------------
// Fixed coach text
// ---------------------------------------------------------------------------

#[cfg_attr(not(feature = "local-model"), allow(dead_code))]
pub const SYSTEM_PROMPT: &str = "\
You are a helpful, empathetic dating coach. Your goal is to help the user improve their dating skills, \
confidence, and ability to create meaningful romantic connections. Provide practical advice, but keep responses concise \
(max 3 paragraphs). Be supportive and encouraging, not judgmental.";

pub const GREETING: &str = "Hello! I'm your dating coach. I'm here to help you improve your dating \
skills and confidence. What would you like to work on today?";

/// Shown in place of a reply when the responder fails.
pub const APOLOGY: &str =
    "I'm sorry, I'm having trouble responding right now. Please try again in a moment.";

/// Starter questions offered before the first message.
pub const SUGGESTED_TOPICS: [&str; 6] = [
    "How can I approach someone at a bar?",
    "What are good conversation starters?",
    "How do I maintain confidence when dating?",
    "Tips for creating an attractive dating profile?",
    "How to handle rejection gracefully?",
    "What are signs someone is interested in me?",
];

// ---------------------------------------------------------------------------
// Responder
// ---------------------------------------------------------------------------

/// Produces the coach's next reply from the conversation so far.
///
/// `premium` lets a backend spend more on the answer (e.g. a larger token
/// budget). Errors are the caller's to recover from.
pub trait Responder {
    fn respond(&mut self, history: &[ChatMessage], premium: bool) -> Result<String>;
}

impl<R: Responder + ?Sized> Responder for Box<R> {
    fn respond(&mut self, history: &[ChatMessage], premium: bool) -> Result<String> {
        (**self).respond(history, premium)
    }
}

/// Canned replies picked by keywords in the last user message.
#[derive(Debug, Default)]
pub struct ScriptedResponder;

/// Keyword groups checked in order. The first group with a hit wins.
const SCRIPT: [(&[&str], &str); 5] = [
    (
        &["approach", "talk to"],
        "Approaching someone new can be intimidating, but remember to focus on being genuinely curious about them rather than trying to impress. A simple observation about the environment or a genuine question often works better than rehearsed pickup lines. What specific situation are you struggling with?",
    ),
    (
        &["confidence", "nervous"],
        "Building confidence comes from small successes over time. Try setting small, achievable goals like making eye contact and smiling at three new people tomorrow. Each positive interaction will reinforce your confidence. Would you like some specific confidence-building exercises?",
    ),
    (
        &["text", "message"],
        "When texting, keep your messages positive, engaging, and concise. Ask open-ended questions that invite conversation. Remember that timing is important - don't overwhelm with too many messages too quickly. Would you like to role-play a specific texting scenario?",
    ),
    (
        &["date", "dating"],
        "Great dates are about creating shared experiences and genuine connection. Choose activities that allow for conversation but also give you something to talk about. Active dates like mini-golf or cooking classes often work better than just dinner and a movie. What kind of date are you planning?",
    ),
    (
        &["rejected", "rejection"],
        "Rejection is part of dating and doesn't reflect your worth. Try to see each rejection as data, not failure. Ask yourself: Is there something I could improve, or was this simply not the right match? Remember that even the most attractive people face rejection regularly. How specifically did the rejection happen?",
    ),
];

const GENERIC_REPLY: &str = "That's an interesting point about attraction and connection. Remember that authentic interaction is key to building chemistry. Focus on being present, showing genuine interest, and maintaining a positive, confident energy. Is there a specific aspect of this you'd like to explore further?";

impl Responder for ScriptedResponder {
    fn respond(&mut self, history: &[ChatMessage], _premium: bool) -> Result<String> {
        let last = history
            .iter()
            .rev()
            .find(|m| m.role == Role::User)
            .map(|m| m.content.to_lowercase())
            .unwrap_or_default();

        let reply = SCRIPT
            .iter()
            .find(|(keywords, _)| keywords.iter().any(|k| last.contains(k)))
            .map_or(GENERIC_REPLY, |(_, reply)| *reply);

        debug!("Scripted reply chosen for: {last:?}");
        Ok(reply.to_string())
    }
}

// ---------------------------------------------------------------------------
// Model configuration
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(not(feature = "local-model"), allow(dead_code))]
pub struct ModelConfig {
    /// How many layers to offload to GPU (0 = CPU only).
    pub n_gpu_layers: u32,
    /// Context window size in tokens.
    pub n_ctx: u32,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            n_gpu_layers: 0,
            n_ctx: 8192,
        }
    }
}

/// Token budget per reply.
#[cfg_attr(not(feature = "local-model"), allow(dead_code))]
pub fn max_tokens(premium: bool) -> usize {
    if premium {
        500
    } else {
        250
    }
}

/// Drop `<think>...</think>` blocks some models emit before answering.
#[cfg_attr(not(feature = "local-model"), allow(dead_code))]
pub fn strip_reasoning(raw: &str) -> String {
    static THINK: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"(?s)<think>(.*?)</think>").unwrap());

    for cap in THINK.captures_iter(raw) {
        let thought = cap.get(1).map_or("", |m| m.as_str()).trim();
        if !thought.is_empty() {
            debug!("Model thinking:\n{thought}");
        }
    }
    THINK.replace_all(raw, "").trim().to_string()
}

// ---------------------------------------------------------------------------
// Coach
// ---------------------------------------------------------------------------

/// A chat with the coach. Holds the transcript and the responder behind it.
pub struct Coach<R> {
    responder: R,
    history: Vec<ChatMessage>,
    premium: bool,
}

impl<R: Responder> Coach<R> {
    pub fn new(responder: R, premium: bool) -> Self {
        Self {
            responder,
            history: vec![ChatMessage::assistant(GREETING)],
            premium,
        }
    }

    pub fn history(&self) -> &[ChatMessage] {
        &self.history
    }

    pub fn is_premium(&self) -> bool {
        self.premium
    }

    /// Send a message and return the coach's reply. A failing responder
    /// yields [`APOLOGY`] instead of an error.
    pub fn ask(&mut self, text: &str) -> &str {
        self.history.push(ChatMessage::user(text.trim()));
        info!("Coach asked ({} messages so far)", self.history.len());

        let reply = match self.responder.respond(&self.history, self.premium) {
            Ok(reply) => reply,
            Err(e) => {
                warn!("Coach responder failed: {e:#}");
                APOLOGY.to_string()
            }
        };

        self.history.push(ChatMessage::assistant(reply));
        self.history
            .last()
            .map_or(APOLOGY, |m| m.content.as_str())
    }
}
