use std::fmt;

use crate::budget::SearchBudget;

/// A single line the client writes to the engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineCommand {
    IsReady,
    Position { moves: Vec<String> },
    Go { movetime: SearchBudget },
    Stop,
    Quit,
}

impl EngineCommand {
    pub fn position<S: AsRef<str>>(moves: &[S]) -> Self {
        let moves = moves.iter().map(|mv| mv.as_ref().to_owned()).collect();
        Self::Position { moves }
    }
}

impl fmt::Display for EngineCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::IsReady => f.write_str("isready"),
            Self::Position { moves } => {
                f.write_str("position startpos")?;
                if !moves.is_empty() {
                    write!(f, " moves {}", moves.join(" "))?;
                }
                Ok(())
            }
            Self::Go { movetime } => write!(f, "go movetime {}", movetime.as_millis()),
            Self::Stop => f.write_str("stop"),
            Self::Quit => f.write_str("quit"),
        }
    }
}
