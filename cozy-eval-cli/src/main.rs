use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use cozy_eval::{Engine, EngineConfig, Evaluation, SearchBudget};
use log::{info, warn};
use serde::{Deserialize, Serialize};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader, Lines};

#[derive(Debug, Default, Serialize, Deserialize)]
struct CozyEvalConfig {
    #[serde(default)]
    engines: BTreeMap<String, EngineConfig>,
}

impl CozyEvalConfig {
    fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            info!("no config at {:?}, using defaults", path);
            return Ok(Self::default());
        }
        let config = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {:?}", path))?;
        serde_json::from_str(&config).with_context(|| format!("failed to parse {:?}", path))
    }

    /// A configured engine name, else an executable path, else Stockfish.
    fn engine(&self, engine: Option<&str>) -> EngineConfig {
        match engine {
            Some(name) => self
                .engines
                .get(name)
                .cloned()
                .unwrap_or_else(|| EngineConfig::new(name)),
            None => EngineConfig::stockfish(),
        }
    }
}

fn clap_parse_budget(s: &str) -> Result<SearchBudget, String> {
    s.parse().map_err(|e| format!("{}", e))
}

#[derive(Debug, Parser)]
#[clap(about = "Evaluate chess positions with a UCI engine")]
struct CozyEvalArgs {
    #[clap(long, default_value = "cozy-eval-config.json")]
    config: PathBuf,
    #[clap(subcommand)]
    subcommand: Commands,
}

#[derive(Debug, Args)]
struct SearchArgs {
    /// Engine name from the config file, or a path to an engine executable.
    #[clap(short, long)]
    engine: Option<String>,
    #[clap(short, long, default_value = "3s", value_parser = clap_parse_budget)]
    movetime: SearchBudget,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Evaluate the position reached by the given moves.
    Eval {
        #[clap(flatten)]
        search: SearchArgs,
        moves: Vec<String>,
    },
    /// Evaluate one space-separated move list per line of stdin.
    Batch {
        #[clap(flatten)]
        search: SearchArgs,
    },
}

#[derive(Debug, Serialize)]
struct Report<'a> {
    moves: &'a [String],
    #[serde(flatten)]
    evaluation: Evaluation,
}

async fn evaluate(engine: &mut Engine, moves: &[String], budget: SearchBudget) -> Result<()> {
    let cancel = async {
        if tokio::signal::ctrl_c().await.is_err() {
            std::future::pending::<()>().await;
        }
        warn!("interrupted, stopping search");
    };
    let evaluation = engine
        .set_position(moves)
        .await?
        .evaluate_until(budget, cancel)
        .await
        .context("evaluation failed")?;
    let report = Report { moves, evaluation };
    println!("{}", serde_json::to_string(&report)?);
    Ok(())
}

/// Next non-blank line of space-separated moves, or `None` at end of input.
async fn next_moves<R: AsyncBufRead + Unpin>(lines: &mut Lines<R>) -> Result<Option<Vec<String>>> {
    while let Some(line) = lines.next_line().await.context("failed to read stdin")? {
        let moves: Vec<String> = line.split_whitespace().map(str::to_owned).collect();
        if !moves.is_empty() {
            return Ok(Some(moves));
        }
    }
    Ok(None)
}

#[tokio::main]
async fn main() -> Result<()> {
    pretty_env_logger::init();
    let args = CozyEvalArgs::parse();
    let config = CozyEvalConfig::load(&args.config)?;

    match args.subcommand {
        Commands::Eval { search, moves } => {
            let engine_config = config.engine(search.engine.as_deref());
            let mut engine = Engine::new(engine_config).await.context("failed to start engine")?;
            evaluate(&mut engine, &moves, search.movetime).await?;
            engine.quit().await?;
        }
        Commands::Batch { search } => {
            let engine_config = config.engine(search.engine.as_deref());
            let mut engine = Engine::new(engine_config).await.context("failed to start engine")?;
            let mut lines = BufReader::new(tokio::io::stdin()).lines();
            loop {
                let moves = tokio::select! {
                    moves = next_moves(&mut lines) => moves?,
                    _ = tokio::signal::ctrl_c() => {
                        warn!("interrupted, ending batch");
                        None
                    }
                };
                let Some(moves) = moves else { break };
                evaluate(&mut engine, &moves, search.movetime).await?;
            }
            engine.quit().await?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn batch_input_skips_blank_lines() {
        let input: &[u8] = b"e2e4 e7e5\n\n   \nd2d4\r\n";
        let mut lines = BufReader::new(input).lines();
        assert_eq!(next_moves(&mut lines).await.unwrap(), Some(vec!["e2e4".to_owned(), "e7e5".to_owned()]));
        assert_eq!(next_moves(&mut lines).await.unwrap(), Some(vec!["d2d4".to_owned()]));
        assert_eq!(next_moves(&mut lines).await.unwrap(), None);
    }
}
