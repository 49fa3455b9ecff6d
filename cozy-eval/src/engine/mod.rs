mod collector;
mod command;
mod config;
mod error;
mod parse;
mod raw_engine;

use std::future::Future;

use futures_util::TryStreamExt;
use log::{debug, warn};

use crate::budget::SearchBudget;

pub use command::EngineCommand;
pub use config::{EngineConfig, EngineTiming, STOCKFISH_PATH};
pub use error::EngineError;
pub use parse::{best_move, centipawn_score, is_ready_ok, parse_evaluation, BestMove, Evaluation};
use raw_engine::RawEngine;

/// Where a session is in the protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineState {
    /// Process started, `readyok` not seen yet.
    Spawned,
    /// Handshake done, no position sent.
    Ready,
    Idle,
    /// A `go` was sent and its `bestmove` has not been read.
    Searching,
}

/// A UCI engine process driven one search at a time.
///
/// The process is killed when the session is dropped; [`Engine::quit`] asks
/// it to exit first.
#[derive(Debug)]
pub struct Engine {
    engine: RawEngine,
    timing: EngineTiming,
    state: EngineState,
}

impl Engine {
    /// Spawns the engine and waits for it to answer `isready`.
    pub async fn new(config: EngineConfig) -> Result<Self, EngineError> {
        let mut this = Self {
            engine: RawEngine::new(&config.path, &config.args)?,
            timing: config.timing,
            state: EngineState::Spawned,
        };
        this.engine.send(&EngineCommand::IsReady).await?;
        this.wait_ready().await?;
        this.state = EngineState::Ready;
        Ok(this)
    }

    pub async fn stockfish() -> Result<Self, EngineError> {
        Self::new(EngineConfig::stockfish()).await
    }

    pub fn state(&self) -> EngineState {
        self.state
    }

    pub fn timing(&self) -> &EngineTiming {
        &self.timing
    }

    /// Places the engine at the position reached by playing `moves` from the
    /// start position. Moves are passed through unchecked.
    pub async fn set_position<S: AsRef<str>>(&mut self, moves: &[S]) -> Result<&mut Self, EngineError> {
        self.resync_if_searching().await?;
        self.engine.send(&EngineCommand::position(moves)).await?;
        self.state = EngineState::Idle;
        Ok(self)
    }

    pub async fn start_search(&mut self, budget: SearchBudget) -> Result<(), EngineError> {
        self.resync_if_searching().await?;
        if self.state == EngineState::Ready {
            warn!("searching before any position was set");
        }
        self.engine.send(&EngineCommand::Go { movetime: budget }).await?;
        self.state = EngineState::Searching;
        Ok(())
    }

    /// Searches the current position for `budget` and reports the result.
    ///
    /// Always takes at least `budget`. An engine that prints nothing usable
    /// yields [`Evaluation::default`] rather than an error.
    pub async fn evaluate(&mut self, budget: SearchBudget) -> Result<Evaluation, EngineError> {
        self.evaluate_until(budget, std::future::pending::<()>()).await
    }

    /// Like [`Engine::evaluate`], but stops the search early once `cancel`
    /// resolves.
    pub async fn evaluate_until<F>(&mut self, budget: SearchBudget, cancel: F) -> Result<Evaluation, EngineError>
    where
        F: Future<Output = ()>,
    {
        self.start_search(budget).await?;
        let lines: Vec<String> = self.collect(budget, cancel).try_collect().await?;
        debug!("collected {} lines", lines.len());
        Ok(parse_evaluation(lines))
    }

    pub async fn quit(self) -> Result<(), EngineError> {
        self.engine.shutdown(self.timing.quit_timeout).await
    }

    async fn resync_if_searching(&mut self) -> Result<(), EngineError> {
        if self.state != EngineState::Searching {
            return Ok(());
        }
        warn!("previous search was left unfinished, resynchronising");
        self.engine.send(&EngineCommand::Stop).await?;
        self.engine.send(&EngineCommand::IsReady).await?;
        self.wait_ready().await?;
        self.state = EngineState::Idle;
        Ok(())
    }

    async fn wait_ready(&mut self) -> Result<(), EngineError> {
        let timeout = self.timing.ready_timeout;
        tokio::time::timeout(timeout, read_until_ready(&mut self.engine))
            .await
            .map_err(|_| EngineError::NotReady(timeout))?
    }
}

async fn read_until_ready(engine: &mut RawEngine) -> Result<(), EngineError> {
    loop {
        let line = engine.recv().await?.ok_or(EngineError::UnexpectedTermination)?;
        if is_ready_ok(&line) {
            return Ok(());
        }
        debug!("discarding {:?} while waiting for readyok", line);
    }
}
