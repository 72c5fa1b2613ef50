use std::io::{BufRead, Write};

use anyhow::Result;
use log::{debug, info};

use crate::battle::{Battle, BATTLE_XP_REWARD};
use crate::coach::{Coach, Responder, SUGGESTED_TOPICS};
use crate::error::CharmError;
use crate::pacing::{Delay, Pacer};
use crate::progress::Progress;
use crate::simulator::graph::Graph;
use crate::simulator::scenarios::{Profile, ScenarioKind};
use crate::simulator::{Session, Speaker, Verdict, SCORE_SCALE, SIMULATION_XP_REWARD};

// ---------------------------------------------------------------------------
// Terminal I/O
// ---------------------------------------------------------------------------

/// Line-oriented console. Generic so tests can script the player.
pub struct Terminal<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> Terminal<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    #[cfg(test)]
    pub fn into_output(self) -> W {
        self.output
    }

    fn say(&mut self, text: impl AsRef<str>) -> Result<()> {
        writeln!(self.output, "{}", text.as_ref())?;
        Ok(())
    }

    /// Show `prompt` and read one trimmed line. `None` at end of input.
    fn ask(&mut self, prompt: &str) -> Result<Option<String>> {
        write!(self.output, "{prompt}")?;
        self.output.flush()?;
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim().to_string()))
    }
}

fn is_quit(input: &str) -> bool {
    input.eq_ignore_ascii_case("quit") || input.eq_ignore_ascii_case("exit")
}

fn banner<R: BufRead, W: Write>(term: &mut Terminal<R, W>, title: &str) -> Result<()> {
    term.say("\n========================================")?;
    term.say(format!("   {title}"))?;
    term.say("========================================")
}

// ---------------------------------------------------------------------------
// Conversation simulator
// ---------------------------------------------------------------------------

/// How a simulator run ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SimulationOutcome {
    Finished {
        score: u32,
        verdict: Verdict,
        terminal_node_id: String,
    },
    /// Player typed quit mid-conversation.
    Quit,
}

pub fn run_simulation<R: BufRead, W: Write>(
    term: &mut Terminal<R, W>,
    pacer: &mut dyn Pacer,
    graph: &Graph,
    kind: ScenarioKind,
    progress: &mut Progress,
) -> Result<SimulationOutcome> {
    let profile = Profile::for_scenario(kind);
    let mut session = Session::start(graph)?;

    banner(term, kind.title())?;
    term.say(profile.scene(kind))?;
    term.say(format!(
        "Up to {} replies, best scripted score {}.",
        graph.max_steps(),
        graph.max_score()
    ))?;
    term.say("Pick a reply by number or type your own. Type quit to leave.")?;
    term.say(format!("\n[{}]: {}", profile.name, session.history()[0].text))?;

    while !session.is_complete() {
        let node = graph.node(session.current_node_id())?;
        term.say("")?;
        for (i, option) in node.options.iter().enumerate() {
            term.say(format!("  [{}] {}", i + 1, option.text))?;
        }

        let Some(input) = term.ask("\n[You]: ")? else {
            return Ok(SimulationOutcome::Quit);
        };
        if is_quit(&input) {
            return Ok(SimulationOutcome::Quit);
        }

        let picked = input
            .parse::<usize>()
            .ok()
            .and_then(|n| n.checked_sub(1))
            .and_then(|i| node.options.get(i));

        let result = match picked {
            Some(option) => {
                let option_id = option.id.clone();
                term.say(format!("[You]: {}", option.text))?;
                pacer.pause(Delay::TYPING);
                session.select_option(graph, &option_id)
            }
            None => {
                pacer.pause(Delay::READING);
                session.submit_free_text(graph, &profile.interests, &input)
            }
        };

        match result {
            Ok(step) => info!("Reply scored {} -> {}", step.score, step.node_id),
            Err(CharmError::EmptyInput) => {
                term.say("(Please say something.)")?;
                continue;
            }
            Err(e) => return Err(e.into()),
        }

        if let Some(turn) = session.history().last() {
            if turn.speaker == Speaker::Counterpart {
                term.say(format!("\n[{}]: {}", profile.name, turn.text))?;
            }
        }
    }

    debug!("Final session: {}", session.to_record());
    let score = session.cumulative_score();
    let verdict = session.verdict();
    progress.add_xp(SIMULATION_XP_REWARD);

    banner(term, "CONVERSATION COMPLETE")?;
    term.say(format!("  {}", verdict.message()))?;
    term.say(format!("  Score: {score}/{SCORE_SCALE}"))?;
    term.say(format!(
        "  +{SIMULATION_XP_REWARD} XP (level {})",
        progress.level()
    ))?;

    Ok(SimulationOutcome::Finished {
        score,
        verdict,
        terminal_node_id: session.current_node_id().to_string(),
    })
}

// ---------------------------------------------------------------------------
// Comeback battle
// ---------------------------------------------------------------------------

/// Returns the battle total, or `None` if the player left early.
pub fn run_battle<R: BufRead, W: Write>(
    term: &mut Terminal<R, W>,
    pacer: &mut dyn Pacer,
    progress: &mut Progress,
) -> Result<Option<u32>> {
    let mut battle = Battle::new();
    banner(term, "COMEBACK BATTLE")?;

    while let Some(scenario) = battle.current().cloned() {
        info!("Battle scenario: {}", scenario.id);
        term.say(format!(
            "\nScenario {} ({})",
            battle.index() + 1,
            scenario.difficulty.label()
        ))?;
        term.say(format!("Context: {}", scenario.context))?;
        term.say(format!("They say: \"{}\"", scenario.prompt))?;
        term.say(format!("Tip: {}", scenario.tips))?;

        let Some(input) = term.ask("\nYour comeback: ")? else {
            return Ok(None);
        };
        if is_quit(&input) {
            return Ok(None);
        }

        pacer.pause(Delay::ANALYZING);
        let evaluation = match battle.submit(&input) {
            Ok(evaluation) => evaluation.clone(),
            Err(CharmError::EmptyInput) => {
                term.say("(Please type a comeback.)")?;
                continue;
            }
            Err(e) => return Err(e.into()),
        };
        term.say(format!("\nFeedback: {}", evaluation.feedback))?;
        term.say(format!("Score: {}/10", evaluation.score))?;

        battle.advance()?;
    }

    progress.add_xp(BATTLE_XP_REWARD);
    banner(term, "BATTLE COMPLETE")?;
    term.say(format!(
        "  Your score: {} / {}",
        battle.total_score(),
        battle.max_score()
    ))?;
    term.say(format!("  +{BATTLE_XP_REWARD} XP (level {})", progress.level()))?;

    Ok(Some(battle.total_score()))
}

// ---------------------------------------------------------------------------
// Coach chat
// ---------------------------------------------------------------------------

/// Chat until the player quits. Returns the number of questions asked.
pub fn run_coach<R: BufRead, W: Write, C: Responder>(
    term: &mut Terminal<R, W>,
    pacer: &mut dyn Pacer,
    coach: &mut Coach<C>,
) -> Result<usize> {
    let title = if coach.is_premium() {
        "DATING COACH (premium)"
    } else {
        "DATING COACH"
    };
    banner(term, title)?;
    if let Some(greeting) = coach.history().first() {
        term.say(format!("\n[Coach]: {}", greeting.content))?;
    }
    term.say("\nNot sure where to start? Try one of these:")?;
    for topic in SUGGESTED_TOPICS {
        term.say(format!("  - {topic}"))?;
    }

    let mut asked = 0;
    loop {
        let Some(input) = term.ask("\n[You]: ")? else {
            break;
        };
        if is_quit(&input) {
            break;
        }
        if input.is_empty() {
            continue;
        }

        term.say("(Thinking...)")?;
        pacer.pause(Delay::THINKING);
        let reply = coach.ask(&input).to_string();
        term.say(format!("\n[Coach]: {reply}"))?;
        asked += 1;
    }
    Ok(asked)
}

// ---------------------------------------------------------------------------
// Restart prompt
// ---------------------------------------------------------------------------

/// Read the player's post-game choice. Returns `true` to restart, `false` to quit.
pub fn prompt_restart<R: BufRead, W: Write>(term: &mut Terminal<R, W>) -> Result<bool> {
    term.say("\n  [r] Restart    [q] Quit\n")?;
    loop {
        let Some(input) = term.ask("> ")? else {
            return Ok(false);
        };
        match input.to_lowercase().as_str() {
            "r" => return Ok(true),
            "q" => return Ok(false),
            _ => term.say("  Press [r] to restart or [q] to quit.")?,
        }
    }
}
