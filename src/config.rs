use std::path::PathBuf;

use anyhow::{bail, Context, Result};

use crate::coach::ModelConfig;
use crate::simulator::scenarios::ScenarioKind;

pub const USAGE: &str = "\
Usage: charm [--fast] <command>

Commands:
  simulate [tinder|whatsapp|irl] [--graph <file.json>]   practice a conversation
  battle                                                 comeback battle
  coach [<model.gguf> [gpu_layers] [context_size]]       chat with the coach

Environment:
  CHARM_FAST=1   skip typing pauses (same as --fast)
  CHARM_XP=<n>   starting XP; above level 10 the coach runs in premium mode
  RUST_LOG       log verbosity (info, debug, trace)";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Simulate {
        kind: ScenarioKind,
        /// Custom conversation graph instead of the built-in script.
        graph_path: Option<PathBuf>,
    },
    Battle,
    Coach {
        /// Local model to answer with. Scripted replies when absent.
        model_path: Option<String>,
        model: ModelConfig,
    },
    /// Print [`USAGE`] and exit.
    Help,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Skip artificial pauses.
    pub fast: bool,
    /// XP the player starts the run with.
    pub xp: u32,
    pub command: Command,
}

impl Config {
    /// Read the process arguments and `CHARM_*` environment variables.
    pub fn from_env() -> Result<Self> {
        Self::parse(
            std::env::args().skip(1),
            std::env::var("CHARM_FAST").ok().as_deref(),
            std::env::var("CHARM_XP").ok().as_deref(),
        )
    }

    pub fn parse(
        args: impl IntoIterator<Item = String>,
        fast_env: Option<&str>,
        xp_env: Option<&str>,
    ) -> Result<Self> {
        let mut fast = fast_env.is_some_and(is_truthy);
        let xp = match xp_env {
            Some(v) => v
                .trim()
                .parse()
                .with_context(|| format!("CHARM_XP must be a whole number, got '{v}'"))?,
            None => 0,
        };

        let mut positional = Vec::new();
        let mut graph_path = None;
        let mut args = args.into_iter();
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--fast" => fast = true,
                "--graph" => {
                    let path = args.next().context("--graph needs a file path")?;
                    graph_path = Some(PathBuf::from(path));
                }
                "-h" | "--help" => {
                    return Ok(Self {
                        fast,
                        xp,
                        command: Command::Help,
                    })
                }
                _ => positional.push(arg),
            }
        }

        let mut positional = positional.into_iter();
        let name = positional.next().context(USAGE)?;
        let rest: Vec<String> = positional.collect();

        if graph_path.is_some() && name != "simulate" {
            bail!("--graph only applies to simulate");
        }

        let command = match name.as_str() {
            "simulate" => {
                expect_at_most(&name, &rest, 1)?;
                let kind = match rest.first() {
                    Some(kind) => kind.parse()?,
                    None => ScenarioKind::Tinder,
                };
                Command::Simulate { kind, graph_path }
            }
            "battle" => {
                expect_at_most(&name, &rest, 0)?;
                Command::Battle
            }
            "coach" => {
                expect_at_most(&name, &rest, 3)?;
                let defaults = ModelConfig::default();
                let model = ModelConfig {
                    n_gpu_layers: parse_or(rest.get(1), "gpu_layers", defaults.n_gpu_layers)?,
                    n_ctx: parse_or(rest.get(2), "context_size", defaults.n_ctx)?,
                };
                Command::Coach {
                    model_path: rest.first().cloned(),
                    model,
                }
            }
            other => bail!("unknown command '{other}'\n\n{USAGE}"),
        };

        Ok(Self { fast, xp, command })
    }
}

fn is_truthy(v: &str) -> bool {
    matches!(v.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on")
}

fn expect_at_most(command: &str, rest: &[String], max: usize) -> Result<()> {
    if rest.len() > max {
        bail!("too many arguments for '{command}': {}", rest[max..].join(" "));
    }
    Ok(())
}

fn parse_or(value: Option<&String>, name: &str, default: u32) -> Result<u32> {
    match value {
        Some(v) => v
            .parse()
            .with_context(|| format!("{name} must be a whole number, got '{v}'")),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<Config> {
        Config::parse(args.iter().map(|s| s.to_string()), None, None)
    }

    #[test]
    fn test_simulate_defaults_to_tinder() {
        let config = parse(&["simulate"]).unwrap();
        assert_eq!(
            config.command,
            Command::Simulate {
                kind: ScenarioKind::Tinder,
                graph_path: None,
            }
        );
        assert!(!config.fast);
        assert_eq!(config.xp, 0);
    }

    #[test]
    fn test_simulate_with_kind_and_graph() {
        let config = parse(&["--fast", "simulate", "irl", "--graph", "talk.json"]).unwrap();
        assert!(config.fast);
        assert_eq!(
            config.command,
            Command::Simulate {
                kind: ScenarioKind::Irl,
                graph_path: Some(PathBuf::from("talk.json")),
            }
        );
    }

    #[test]
    fn test_coach_with_model() {
        let config = parse(&["coach", "model.gguf", "99"]).unwrap();
        assert_eq!(
            config.command,
            Command::Coach {
                model_path: Some("model.gguf".into()),
                model: ModelConfig {
                    n_gpu_layers: 99,
                    n_ctx: 8192,
                },
            }
        );
    }

    #[test]
    fn test_env_overrides() {
        let config = Config::parse(["battle".to_string()], Some("yes"), Some("12000")).unwrap();
        assert!(config.fast);
        assert_eq!(config.xp, 12_000);
        assert_eq!(config.command, Command::Battle);
    }

    #[test]
    fn test_help_is_a_command_not_an_error() {
        assert_eq!(parse(&["--help"]).unwrap().command, Command::Help);
        assert_eq!(parse(&["battle", "-h"]).unwrap().command, Command::Help);
        assert_eq!(parse(&["dance", "--help"]).unwrap().command, Command::Help);
    }

    #[test]
    fn test_rejects_bad_input() {
        assert!(parse(&[]).is_err());
        assert!(parse(&["dance"]).is_err());
        assert!(parse(&["battle", "extra"]).is_err());
        assert!(parse(&["simulate", "bumble"]).is_err());
        assert!(parse(&["battle", "--graph", "x.json"]).is_err());
        assert!(parse(&["simulate", "--graph"]).is_err());
        assert!(parse(&["coach", "m.gguf", "lots"]).is_err());
        assert!(Config::parse(["battle".to_string()], None, Some("many")).is_err());
    }
}
