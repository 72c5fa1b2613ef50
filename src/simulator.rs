pub mod graph;
pub mod node;
pub mod scenarios;

use anyhow::Context;
use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::error::{CharmError, Result};
use crate::scoring;
use graph::{Graph, FALLBACK_NODE_IDS};

// ---------------------------------------------------------------------------
// Session state
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Speaker {
    /// The simulated match.
    Counterpart,
    User,
}

/// One line of the conversation transcript.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    pub speaker: Speaker,
    pub text: String,
}

impl Turn {
    fn user(text: impl Into<String>) -> Self {
        Self {
            speaker: Speaker::User,
            text: text.into(),
        }
    }

    fn counterpart(text: impl Into<String>) -> Self {
        Self {
            speaker: Speaker::Counterpart,
            text: text.into(),
        }
    }
}

/// One player's pass through a conversation graph.
///
/// The session only changes through [`Session::select_option`] and
/// [`Session::submit_free_text`]. A failed call leaves it untouched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    history: Vec<Turn>,
    current_node_id: String,
    cumulative_score: u32,
    is_complete: bool,
}

/// What a successful turn did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Step {
    /// Points this reply earned.
    pub score: u32,
    /// Node the conversation moved to.
    pub node_id: String,
}

/// Overall rating of a finished conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Exceptional,
    Good,
    NeedsWork,
}

impl Verdict {
    pub fn from_score(score: u32) -> Self {
        match score {
            25.. => Self::Exceptional,
            15.. => Self::Good,
            _ => Self::NeedsWork,
        }
    }

    pub fn message(self) -> &'static str {
        match self {
            Self::Exceptional => "Exceptional! You created a genuine connection and secured a date. \
                Your conversation was engaging, thoughtful, and showed authentic interest.",
            Self::Good => "Good job! You maintained a positive conversation and kept things flowing. \
                With a bit more engagement and personalization, you could secure more dates.",
            Self::NeedsWork => "You completed the conversation, but there's room for improvement. \
                Try asking more questions and showing genuine interest in the other person.",
        }
    }
}

/// Denominator shown next to a conversation score.
pub const SCORE_SCALE: u32 = 30;

/// XP granted for finishing a conversation.
pub const SIMULATION_XP_REWARD: u32 = 100;

/// Node a free-text reply with this score is routed to.
pub fn fallback_node_id(score: u32) -> &'static str {
    let [excellent, good, recovery, dead_end] = FALLBACK_NODE_IDS;
    match score {
        8.. => excellent,
        5.. => good,
        3.. => recovery,
        _ => dead_end,
    }
}

impl Session {
    /// Begin a conversation at the graph's start node, with its message as
    /// the first line of history.
    pub fn start(graph: &Graph) -> Result<Self> {
        let root = graph.node(graph.start_node_id())?;
        info!("Conversation started at node: {}", root.id);
        Ok(Self {
            history: vec![Turn::counterpart(&root.message)],
            current_node_id: root.id.clone(),
            cumulative_score: 0,
            is_complete: root.is_terminal(),
        })
    }

    pub fn history(&self) -> &[Turn] {
        &self.history
    }

    pub fn current_node_id(&self) -> &str {
        &self.current_node_id
    }

    pub fn cumulative_score(&self) -> u32 {
        self.cumulative_score
    }

    pub fn is_complete(&self) -> bool {
        self.is_complete
    }

    pub fn verdict(&self) -> Verdict {
        Verdict::from_score(self.cumulative_score)
    }

    /// Answer with one of the current node's canned replies.
    pub fn select_option(&mut self, graph: &Graph, option_id: &str) -> Result<Step> {
        if self.is_complete {
            return Err(CharmError::SessionComplete);
        }
        let node = graph.node(&self.current_node_id)?;
        let option = node
            .option(option_id)
            .ok_or_else(|| CharmError::InvalidOption {
                node: node.id.clone(),
                option: option_id.to_string(),
            })?;

        self.advance(graph, &option.text, option.quality_score, &option.next_node_id)
    }

    /// Answer in the player's own words. The reply is scored and routed to
    /// one of the fallback nodes.
    pub fn submit_free_text(
        &mut self,
        graph: &Graph,
        interests: &[String],
        text: &str,
    ) -> Result<Step> {
        if self.is_complete {
            return Err(CharmError::SessionComplete);
        }
        let text = text.trim();
        if text.is_empty() {
            return Err(CharmError::EmptyInput);
        }
        graph.node(&self.current_node_id)?;

        let score = scoring::score_reply(text, interests);
        let next = fallback_node_id(score);
        debug!("Free-text reply scored {score}, routing to {next}");

        self.advance(graph, text, score, next)
    }

    fn advance(&mut self, graph: &Graph, reply: &str, score: u32, next_id: &str) -> Result<Step> {
        // Resolve before mutating so a bad edge leaves the session intact.
        let next = graph.node(next_id)?;

        info!(
            "Transition: {} -> {} (+{score}, total {})",
            self.current_node_id,
            next.id,
            self.cumulative_score + score
        );

        self.history.push(Turn::user(reply));
        self.cumulative_score += score;
        self.current_node_id = next.id.clone();
        self.history.push(Turn::counterpart(&next.message));

        if next.is_terminal() {
            info!("Conversation over at node: {}", next.id);
            self.is_complete = true;
        }

        Ok(Step {
            score,
            node_id: next.id.clone(),
        })
    }

    /// Flatten into a plain JSON record.
    pub fn to_record(&self) -> serde_json::Value {
        serde_json::json!({
            "history": self.history,
            "current_node_id": self.current_node_id,
            "cumulative_score": self.cumulative_score,
            "is_complete": self.is_complete,
        })
    }

    /// Rebuild a session from [`Session::to_record`] output. The cursor must
    /// name a node of `graph`, and `is_complete` must match whether that node
    /// is terminal.
    pub fn from_record(graph: &Graph, record: serde_json::Value) -> anyhow::Result<Self> {
        let session: Self =
            serde_json::from_value(record).context("malformed session record")?;
        let node = graph.node(&session.current_node_id)?;
        if node.is_terminal() != session.is_complete {
            return Err(CharmError::RecordMismatch {
                node: node.id.clone(),
                is_complete: session.is_complete,
            }
            .into());
        }
        Ok(session)
    }
}

#[cfg(test)]
mod tests {
    use super::scenarios::{conversation_scenario, Profile, ScenarioKind};
    use super::*;

    fn setup() -> (Graph, Vec<String>) {
        let graph = conversation_scenario(ScenarioKind::Tinder).unwrap();
        let interests = Profile::for_scenario(ScenarioKind::Tinder).interests;
        (graph, interests)
    }

    #[test]
    fn test_start_emits_root_message() {
        let (graph, _) = setup();
        let session = Session::start(&graph).unwrap();
        assert_eq!(session.current_node_id(), "intro");
        assert_eq!(session.history().len(), 1);
        assert_eq!(session.history()[0].speaker, Speaker::Counterpart);
        assert_eq!(session.history()[0].text, graph.node("intro").unwrap().message);
        assert_eq!(session.cumulative_score(), 0);
        assert!(!session.is_complete());
    }

    #[test]
    fn test_option_path_accumulates_scores() {
        let (graph, _) = setup();
        let mut session = Session::start(&graph).unwrap();

        let step = session.select_option(&graph, "option3").unwrap();
        assert_eq!(step.score, 10);
        assert_eq!(step.node_id, "response3");
        assert!(!session.is_complete());

        let step = session.select_option(&graph, "option3-2").unwrap();
        assert_eq!(step.node_id, "good");
        assert_eq!(session.cumulative_score(), 17);
        assert!(session.is_complete());
        assert_eq!(session.verdict(), Verdict::Good);

        let speakers: Vec<Speaker> = session.history().iter().map(|t| t.speaker).collect();
        assert_eq!(
            speakers,
            [
                Speaker::Counterpart,
                Speaker::User,
                Speaker::Counterpart,
                Speaker::User,
                Speaker::Counterpart
            ]
        );
    }

    #[test]
    fn test_mixed_turns_sum_exactly() {
        let (graph, interests) = setup();
        let mut session = Session::start(&graph).unwrap();
        let a = session.select_option(&graph, "option2").unwrap();
        // "response2" still has options, free text ends on a fallback node
        let b = session
            .submit_free_text(&graph, &interests, "Honestly hiking. Where do you like to shoot?")
            .unwrap();
        assert_eq!(session.cumulative_score(), a.score + b.score);
        assert_eq!(b.score, 10);
        assert_eq!(session.current_node_id(), "excellent");
        assert!(session.is_complete());
    }

    #[test]
    fn test_short_free_text_routes_to_recovery() {
        let (graph, interests) = setup();
        let mut session = Session::start(&graph).unwrap();
        let step = session.submit_free_text(&graph, &interests, "ok").unwrap();
        assert_eq!(step.score, 3);
        assert_eq!(step.node_id, "recovery");
        assert_eq!(session.history()[1].text, "ok");
        assert!(session.is_complete());
    }

    #[test]
    fn test_great_free_text_routes_to_excellent() {
        let (graph, interests) = setup();
        let mut session = Session::start(&graph).unwrap();
        let step = session
            .submit_free_text(
                &graph,
                &interests,
                "What do you love about hiking and photography?",
            )
            .unwrap();
        assert_eq!(step.score, 10);
        assert_eq!(step.node_id, "excellent");
    }

    #[test]
    fn test_fallback_thresholds() {
        assert_eq!(fallback_node_id(10), "excellent");
        assert_eq!(fallback_node_id(8), "excellent");
        assert_eq!(fallback_node_id(7), "good");
        assert_eq!(fallback_node_id(5), "good");
        assert_eq!(fallback_node_id(4), "recovery");
        assert_eq!(fallback_node_id(3), "recovery");
        assert_eq!(fallback_node_id(2), "dead-end");
    }

    #[test]
    fn test_invalid_option_leaves_session_unchanged() {
        let (graph, _) = setup();
        let mut session = Session::start(&graph).unwrap();
        let before = session.clone();

        // option1-1 exists, but not at "intro"
        let err = session.select_option(&graph, "option1-1").unwrap_err();
        assert_eq!(
            err,
            CharmError::InvalidOption {
                node: "intro".into(),
                option: "option1-1".into(),
            }
        );
        assert_eq!(session, before);
    }

    #[test]
    fn test_complete_session_rejects_turns() {
        let (graph, interests) = setup();
        let mut session = Session::start(&graph).unwrap();
        session.select_option(&graph, "option2").unwrap();
        session.select_option(&graph, "option2-2").unwrap();
        assert!(session.is_complete());
        assert_eq!(session.current_node_id(), "dead-end");
        assert_eq!(session.verdict(), Verdict::NeedsWork);

        let before = session.clone();
        assert_eq!(
            session.select_option(&graph, "option1").unwrap_err(),
            CharmError::SessionComplete
        );
        assert_eq!(
            session.submit_free_text(&graph, &interests, "wait!").unwrap_err(),
            CharmError::SessionComplete
        );
        assert_eq!(session, before);
    }

    #[test]
    fn test_blank_free_text_rejected() {
        let (graph, interests) = setup();
        let mut session = Session::start(&graph).unwrap();
        assert_eq!(
            session.submit_free_text(&graph, &interests, "   ").unwrap_err(),
            CharmError::EmptyInput
        );
        assert_eq!(session.history().len(), 1);
    }

    #[test]
    fn test_record_round_trip() {
        let (graph, interests) = setup();
        let mut session = Session::start(&graph).unwrap();
        session.select_option(&graph, "option1").unwrap();
        session
            .submit_free_text(&graph, &interests, "Japan, easily. Ever been?")
            .unwrap();

        let record = session.to_record();
        assert_eq!(record["current_node_id"], session.current_node_id());
        assert_eq!(record["history"][1]["speaker"], "user");

        let restored = Session::from_record(&graph, record).unwrap();
        assert_eq!(restored.history(), session.history());
        assert_eq!(restored.current_node_id(), session.current_node_id());
        assert_eq!(restored.cumulative_score(), session.cumulative_score());
        assert_eq!(restored.is_complete(), session.is_complete());
    }

    fn record_at(node: &str, is_complete: bool) -> serde_json::Value {
        serde_json::json!({
            "history": [{"speaker": "counterpart", "text": "hi"}],
            "current_node_id": node,
            "cumulative_score": 4,
            "is_complete": is_complete,
        })
    }

    #[test]
    fn test_record_rejects_unknown_or_inconsistent_cursor() {
        let (graph, _) = setup();

        let err = Session::from_record(&graph, record_at("nowhere", false)).unwrap_err();
        assert_eq!(
            err.downcast_ref::<CharmError>(),
            Some(&CharmError::UnknownScenario("nowhere".into()))
        );

        let err = Session::from_record(&graph, record_at("good", false)).unwrap_err();
        assert_eq!(
            err.downcast_ref::<CharmError>(),
            Some(&CharmError::RecordMismatch {
                node: "good".into(),
                is_complete: false,
            })
        );

        assert!(Session::from_record(&graph, record_at("intro", true)).is_err());
        assert!(Session::from_record(&graph, serde_json::json!({"history": 3})).is_err());

        let session = Session::from_record(&graph, record_at("response1", false)).unwrap();
        assert_eq!(session.current_node_id(), "response1");
        assert_eq!(session.cumulative_score(), 4);
    }

    #[test]
    fn test_cursor_missing_from_graph_is_unknown_scenario() {
        let (graph, interests) = setup();
        let mut session = Session::start(&graph).unwrap();
        session.select_option(&graph, "option1").unwrap();
        assert_eq!(session.current_node_id(), "response1");

        // same fallbacks, but no "response1"
        let other = Graph::from_json(include_str!("../demos/coffee-line.json")).unwrap();
        let before = session.clone();
        assert_eq!(
            session.select_option(&other, "option1-1").unwrap_err(),
            CharmError::UnknownScenario("response1".into())
        );
        assert_eq!(
            session
                .submit_free_text(&other, &interests, "Where was that photo taken?")
                .unwrap_err(),
            CharmError::UnknownScenario("response1".into())
        );
        assert_eq!(session, before);
    }

    #[test]
    fn test_verdict_bands() {
        assert_eq!(Verdict::from_score(25), Verdict::Exceptional);
        assert_eq!(Verdict::from_score(24), Verdict::Good);
        assert_eq!(Verdict::from_score(15), Verdict::Good);
        assert_eq!(Verdict::from_score(14), Verdict::NeedsWork);
    }
}
