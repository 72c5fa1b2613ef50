//! Rule-based scoring of typed replies.
//!
//! Neither scorer understands language. They look at length, a question
//! mark and a few word lists, which keeps them deterministic for a given
//! input.

use std::sync::LazyLock;

use log::debug;
use regex::Regex;

/// Lowest and highest score either scorer hands out.
pub const MIN_SCORE: u32 = 1;
pub const MAX_SCORE: u32 = 10;

// ---------------------------------------------------------------------------
// Free-text reply scorer (conversation simulator)
// ---------------------------------------------------------------------------

/// Score a free-text reply in the conversation simulator.
///
/// Medium-length replies score best, asking a question and mentioning one
/// of the counterpart's interests each add two points.
pub fn score_reply(text: &str, interests: &[String]) -> u32 {
    let len = text.chars().count();
    let mut score: u32 = match len {
        0..=19 => 3,
        20..=99 => 7,
        _ => 5,
    };

    let asks_question = text.contains('?');
    if asks_question {
        score += 2;
    }

    let lowered = text.to_lowercase();
    let mentions_interest = interests
        .iter()
        .any(|interest| lowered.contains(&interest.to_lowercase()));
    if mentions_interest {
        score += 2;
    }

    let score = score.clamp(MIN_SCORE, MAX_SCORE);
    debug!("Scored reply: len={len} question={asks_question} interest={mentions_interest} -> {score}");
    score
}

// ---------------------------------------------------------------------------
// Comeback evaluator (battle)
// ---------------------------------------------------------------------------

static CONFIDENT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)confident|self-assured|relaxed|calm|cool|collected").unwrap()
});
static PLAYFUL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)joke|haha|funny|laugh|smile|grin|playful").unwrap());
static DEFENSIVE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)whatever|fine|sorry|apologize|my bad").unwrap());

const BRIEF: &str =
    "Your response is quite brief. Adding a bit more detail might make it more engaging. ";
const GOOD_LENGTH: &str = "Good length for a comeback - not too short, not too long. ";
const LENGTHY: &str = "Your response is quite lengthy for a comeback. \
    Sometimes brevity can make witty responses more impactful. ";
const CONFIDENT_NOTE: &str =
    "I like your confident tone - that's attractive and shows emotional resilience. ";
const PLAYFUL_NOTE: &str = "Great use of playfulness and humor to diffuse the tension. ";
const DEFENSIVE_NOTE: &str =
    "Be careful of coming across as defensive or apologetic when it's not necessary. ";

/// Closing sentence per battle scenario: (strong answer, weaker answer).
const CLOSINGS: [(&str, &str); 3] = [
    (
        "You handled this classic 'test' excellently. Your response maintained frame and turned potential skepticism into an engaging exchange.",
        "This was a classic 'test' to see how you handle subtle challenges. Remember to respond with confidence rather than justifying yourself.",
    ),
    (
        "Perfect way to handle a comment about awkwardness. You didn't get flustered and maintained your composure while creating attraction.",
        "When someone points out awkwardness, it's often a playful tease rather than a serious criticism. Responding with confidence or humor works best.",
    ),
    (
        "Excellent response to a potentially difficult situation. You showed emotional maturity while maintaining your value and boundaries.",
        "This scenario tests your abundance mindset and emotional resilience. The key is to respond authentically without seeming desperate or dismissive.",
    ),
];

/// Score above which the strong closing sentence is used.
const STRONG_THRESHOLD: u32 = 7;

/// Score and coaching text for one comeback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Evaluation {
    pub score: u32,
    pub feedback: String,
}

/// Evaluate a comeback typed for the battle scenario at `scenario_index`.
///
/// Indices without a closing sentence get the heuristic feedback only.
pub fn evaluate_comeback(text: &str, scenario_index: usize) -> Evaluation {
    let len = text.chars().count();
    let mut feedback = String::new();

    let (mut score, note): (i32, &str) = match len {
        0..=19 => (1, BRIEF),
        20..=99 => (3, GOOD_LENGTH),
        _ => (2, LENGTHY),
    };
    feedback.push_str(note);

    if CONFIDENT.is_match(text) {
        score += 3;
        feedback.push_str(CONFIDENT_NOTE);
    }
    if PLAYFUL.is_match(text) {
        score += 3;
        feedback.push_str(PLAYFUL_NOTE);
    }
    if DEFENSIVE.is_match(text) {
        score -= 2;
        feedback.push_str(DEFENSIVE_NOTE);
    }

    let score = score.clamp(MIN_SCORE as i32, MAX_SCORE as i32) as u32;

    if let Some((strong, weak)) = CLOSINGS.get(scenario_index) {
        feedback.push_str(if score > STRONG_THRESHOLD { strong } else { weak });
    }

    debug!("Evaluated comeback for scenario {scenario_index}: len={len} -> {score}");
    Evaluation { score, feedback }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn interests() -> Vec<String> {
        ["Photography", "Hiking", "Travel", "Coffee", "Reading"]
            .into_iter()
            .map(String::from)
            .collect()
    }

    #[test]
    fn test_short_reply_scores_three() {
        assert_eq!(score_reply("ok", &interests()), 3);
    }

    #[test]
    fn test_question_with_interests_is_capped() {
        let text = "What do you love about hiking and photography?";
        assert_eq!(score_reply(text, &interests()), 10);
    }

    #[test]
    fn test_length_buckets() {
        let medium = "a".repeat(20);
        let long = "a".repeat(100);
        assert_eq!(score_reply(&"a".repeat(19), &[]), 3);
        assert_eq!(score_reply(&medium, &[]), 7);
        assert_eq!(score_reply(&"a".repeat(99), &[]), 7);
        assert_eq!(score_reply(&long, &[]), 5);
    }

    #[test]
    fn test_interest_match_is_case_insensitive() {
        assert_eq!(score_reply("COFFEE", &interests()), 5);
        assert_eq!(score_reply("Do you travel?", &interests()), 7);
    }

    #[test]
    fn test_length_counts_chars_not_bytes() {
        // 10 two-byte chars: still the short bucket
        assert_eq!(score_reply(&"é".repeat(10), &[]), 3);
    }

    #[test]
    fn test_brief_comeback() {
        let eval = evaluate_comeback("no", 0);
        assert_eq!(eval.score, 1);
        assert!(eval.feedback.starts_with(BRIEF));
        assert!(eval.feedback.ends_with(CLOSINGS[0].1));
    }

    #[test]
    fn test_confident_playful_comeback() {
        let text = "Only on people who make me smile. I stay calm about it, haha";
        let eval = evaluate_comeback(text, 1);
        assert_eq!(eval.score, 9);
        assert!(eval.feedback.contains(CONFIDENT_NOTE));
        assert!(eval.feedback.contains(PLAYFUL_NOTE));
        assert!(eval.feedback.ends_with(CLOSINGS[1].0));
    }

    #[test]
    fn test_defensive_comeback_is_floored() {
        let eval = evaluate_comeback("sorry", 2);
        assert_eq!(eval.score, 1);
        assert!(eval.feedback.contains(DEFENSIVE_NOTE));
        assert!(eval.feedback.ends_with(CLOSINGS[2].1));
    }

    #[test]
    fn test_mixed_signals_get_weak_closing() {
        // long bucket (2) + confident (3) + playful (3) - defensive (2) = 6
        let text = format!("{} calm smile fine", "x".repeat(100));
        let eval = evaluate_comeback(&text, 0);
        assert_eq!(eval.score, 6);
        assert!(eval.feedback.starts_with(LENGTHY));
        assert!(eval.feedback.ends_with(CLOSINGS[0].1));
    }

    #[test]
    fn test_unknown_scenario_has_no_closing() {
        let eval = evaluate_comeback("That's a good one, you really made me laugh", 7);
        assert_eq!(eval.feedback, format!("{GOOD_LENGTH}{PLAYFUL_NOTE}"));
    }
}
