use std::future::Future;

use futures_core::stream::Stream;
use log::{debug, warn};

use crate::budget::SearchBudget;

use super::command::EngineCommand;
use super::error::EngineError;
use super::parse::best_move;
use super::{Engine, EngineState};

impl Engine {
    /// Streams what the engine prints for the search started by
    /// [`Engine::start_search`].
    ///
    /// Nothing is read until `budget` plus the grace period has passed, or
    /// until `cancel` resolves, in which case the engine is told to `stop`.
    /// The stream then yields lines until none arrives within the poll
    /// timeout or the engine closes its output.
    ///
    /// The session only returns to [`EngineState::Idle`] once a `bestmove`
    /// line has gone through the stream.
    pub fn collect<'a, F>(
        &'a mut self,
        budget: SearchBudget,
        cancel: F,
    ) -> impl Stream<Item = Result<String, EngineError>> + 'a
    where
        F: Future<Output = ()> + 'a,
    {
        let timing = self.timing;
        async_stream::try_stream! {
            let wait = tokio::time::sleep(budget.duration().saturating_add(timing.grace));
            tokio::pin!(wait);
            tokio::pin!(cancel);
            let cancelled = tokio::select! {
                _ = &mut wait => false,
                _ = &mut cancel => true,
            };
            if cancelled {
                debug!("search cancelled, stopping engine");
                self.engine.send(&EngineCommand::Stop).await?;
            }

            let mut finished = false;
            loop {
                let line = match tokio::time::timeout(timing.poll_timeout, self.engine.recv()).await {
                    Ok(line) => line?,
                    Err(_) => break,
                };
                let line = match line {
                    Some(line) => line,
                    None => {
                        warn!("engine closed its output mid-search");
                        break;
                    }
                };
                finished |= best_move(&line).is_some();
                yield line;
            }

            if finished {
                self.state = EngineState::Idle;
            } else {
                warn!("search output ended without a bestmove line");
            }
        }
    }
}
