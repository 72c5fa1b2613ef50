use log::info;

use crate::error::{CharmError, Result};
use crate::scoring::{self, Evaluation};

/// XP granted for finishing all battle scenarios.
pub const BATTLE_XP_REWARD: u32 = 150;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    pub fn label(self) -> &'static str {
        match self {
            Self::Easy => "easy",
            Self::Medium => "medium",
            Self::Hard => "hard",
        }
    }
}

/// A line thrown at the player, who has to answer with a comeback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BattleScenario {
    pub id: &'static str,
    pub prompt: &'static str,
    pub context: &'static str,
    pub difficulty: Difficulty,
    pub tips: &'static str,
}

pub const SCENARIOS: [BattleScenario; 3] = [
    BattleScenario {
        id: "scenario-1",
        prompt: "I bet you use that line on everyone you meet.",
        context: "You're at a bar and someone attractive seems skeptical of your introduction.",
        difficulty: Difficulty::Easy,
        tips: "A witty response that turns the skepticism into playfulness could work well here.",
    },
    BattleScenario {
        id: "scenario-2",
        prompt: "Are you always this awkward or are you just trying to impress me?",
        context: "You're on a date and the conversation has hit a momentary lull.",
        difficulty: Difficulty::Medium,
        tips: "Self-deprecating humor can diffuse tension, or confidently own the moment - either approach can work well.",
    },
    BattleScenario {
        id: "scenario-3",
        prompt: "I'm not really looking for anything serious right now.",
        context: "A few dates in, the person you're seeing brings this up unexpectedly.",
        difficulty: Difficulty::Hard,
        tips: "This requires emotional intelligence - neither seeming desperate nor dismissive. Think about what you actually want and respond authentically.",
    },
];

/// Progress through the battle scenarios, one comeback each.
#[derive(Debug, Clone, Default)]
pub struct Battle {
    index: usize,
    total_score: u32,
    answer: Option<Evaluation>,
    complete: bool,
}

impl Battle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn current(&self) -> Option<&BattleScenario> {
        if self.complete {
            return None;
        }
        SCENARIOS.get(self.index)
    }

    pub fn total_score(&self) -> u32 {
        self.total_score
    }

    /// Best possible total across all scenarios.
    pub fn max_score(&self) -> u32 {
        SCENARIOS.len() as u32 * scoring::MAX_SCORE
    }

    pub fn is_complete(&self) -> bool {
        self.complete
    }

    pub fn is_last(&self) -> bool {
        self.index + 1 == SCENARIOS.len()
    }

    /// Evaluate a comeback for the current scenario.
    pub fn submit(&mut self, text: &str) -> Result<&Evaluation> {
        if self.complete {
            return Err(CharmError::BattleComplete);
        }
        if self.answer.is_some() {
            return Err(CharmError::AlreadyAnswered(self.index));
        }
        let text = text.trim();
        if text.is_empty() {
            return Err(CharmError::EmptyInput);
        }

        let evaluation = scoring::evaluate_comeback(text, self.index);
        self.total_score += evaluation.score;
        info!(
            "Comeback for scenario {} scored {} (total {})",
            self.index, evaluation.score, self.total_score
        );
        Ok(self.answer.insert(evaluation))
    }

    /// Move on to the next scenario, or finish after the last one.
    pub fn advance(&mut self) -> Result<()> {
        if self.complete {
            return Err(CharmError::BattleComplete);
        }
        if self.answer.take().is_none() {
            return Err(CharmError::NotAnswered(self.index));
        }
        if self.is_last() {
            info!("Battle complete with {} / {}", self.total_score, self.max_score());
            self.complete = true;
        } else {
            self.index += 1;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_battle() {
        let mut battle = Battle::new();
        assert_eq!(battle.current().unwrap().id, "scenario-1");

        let first = battle.submit("no").unwrap().score;
        battle.advance().unwrap();
        assert_eq!(battle.current().unwrap().difficulty, Difficulty::Medium);

        let second = battle
            .submit("Only on people who make me smile. I stay calm about it, haha")
            .unwrap()
            .score;
        battle.advance().unwrap();
        assert!(battle.is_last());

        let third = battle.submit("sorry").unwrap().score;
        battle.advance().unwrap();

        assert!(battle.is_complete());
        assert!(battle.current().is_none());
        assert_eq!(battle.total_score(), first + second + third);
        assert_eq!(battle.total_score(), 11);
        assert_eq!(battle.max_score(), 30);
    }

    #[test]
    fn test_answer_order_is_enforced() {
        let mut battle = Battle::new();
        assert_eq!(battle.advance().unwrap_err(), CharmError::NotAnswered(0));
        assert_eq!(battle.submit("  ").unwrap_err(), CharmError::EmptyInput);

        battle.submit("haha, only on you").unwrap();
        assert_eq!(
            battle.submit("again").unwrap_err(),
            CharmError::AlreadyAnswered(0)
        );
        assert_eq!(battle.total_score(), 4);
    }

    #[test]
    fn test_finished_battle_rejects_input() {
        let mut battle = Battle::new();
        for _ in 0..SCENARIOS.len() {
            battle.submit("I'm calm").unwrap();
            battle.advance().unwrap();
        }
        assert_eq!(battle.submit("more").unwrap_err(), CharmError::BattleComplete);
        assert_eq!(battle.advance().unwrap_err(), CharmError::BattleComplete);
    }
}
