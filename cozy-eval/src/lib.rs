//! Drive a UCI chess engine: set a position, search it for a fixed time and
//! read back the best move and centipawn score.

pub mod budget;
pub mod engine;

pub use budget::SearchBudget;
pub use engine::{Engine, EngineConfig, EngineError, Evaluation};
