mod battle;
mod coach;
mod config;
mod error;
mod pacing;
mod play;
mod progress;
mod scoring;
mod simulator;

use std::io;

use anyhow::{Context, Result};
use log::info;

use coach::{Coach, Responder, ScriptedResponder};
use config::{Command, Config};
use play::Terminal;
use progress::Progress;
use simulator::graph::Graph;
use simulator::scenarios::conversation_scenario;

fn main() -> Result<()> {
    // Initialize logging. Control verbosity with RUST_LOG env var:
    //   RUST_LOG=info   charm simulate   # turns + transitions
    //   RUST_LOG=debug  charm simulate   # + scoring detail
    //   RUST_LOG=trace  charm coach m.gguf  # + rendered model prompt
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();

    let config = Config::from_env()?;
    let mut progress = Progress::new(config.xp);
    let mut pacer = pacing::pacer(config.fast);
    let mut term = Terminal::new(io::stdin().lock(), io::stdout());

    info!(
        "Starting with {} XP (level {}), fast={}",
        progress.xp(),
        progress.level(),
        config.fast
    );

    match &config.command {
        Command::Simulate { kind, graph_path } => {
            let graph = match graph_path {
                Some(path) => {
                    let json = std::fs::read_to_string(path)
                        .with_context(|| format!("failed to read {}", path.display()))?;
                    Graph::from_json(&json)?
                }
                None => conversation_scenario(*kind)?,
            };
            info!("Loaded conversation graph with {} nodes", graph.node_count());
            loop {
                let outcome =
                    play::run_simulation(&mut term, pacer.as_mut(), &graph, *kind, &mut progress)?;
                info!("Simulation ended: {outcome:?}");
                if !play::prompt_restart(&mut term)? {
                    break;
                }
                info!("Player chose to restart");
            }
        }
        Command::Battle => loop {
            let total = play::run_battle(&mut term, pacer.as_mut(), &mut progress)?;
            info!("Battle ended with total {total:?}");
            if !play::prompt_restart(&mut term)? {
                break;
            }
            info!("Player chose to restart");
        },
        Command::Coach { model_path, model } => {
            let responder = build_responder(model_path.as_deref(), model)?;
            let mut coach = Coach::new(responder, progress.is_premium());
            let asked = play::run_coach(&mut term, pacer.as_mut(), &mut coach)?;
            info!("Coach session ended after {asked} questions");
        }
        Command::Help => {
            println!("{}", config::USAGE);
            return Ok(());
        }
    }

    println!("Thanks for practicing!");
    Ok(())
}

fn build_responder(
    model_path: Option<&str>,
    model: &coach::ModelConfig,
) -> Result<Box<dyn Responder>> {
    match model_path {
        Some(path) => load_model(path, model),
        None => Ok(Box::new(ScriptedResponder)),
    }
}

#[cfg(feature = "local-model")]
fn load_model(path: &str, model: &coach::ModelConfig) -> Result<Box<dyn Responder>> {
    println!("Loading model: {path}");
    println!("  GPU layers : {}", model.n_gpu_layers);
    println!("  Context    : {}", model.n_ctx);
    let responder =
        coach::model::ModelResponder::load(path, model).context("failed to load model")?;
    Ok(Box::new(responder))
}

#[cfg(not(feature = "local-model"))]
fn load_model(path: &str, _model: &coach::ModelConfig) -> Result<Box<dyn Responder>> {
    anyhow::bail!("cannot load '{path}': charm was built without the `local-model` feature")
}
