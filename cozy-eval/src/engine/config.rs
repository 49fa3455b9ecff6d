use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Where the Stockfish build is expected to live, relative to the working
/// directory.
pub const STOCKFISH_PATH: &str = "Stockfish/stockfish";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    pub path: PathBuf,
    #[serde(default)]
    pub args: Vec<String>,
    #[serde(default)]
    pub timing: EngineTiming,
}

impl EngineConfig {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            args: Vec::new(),
            timing: EngineTiming::default(),
        }
    }

    pub fn stockfish() -> Self {
        Self::new(STOCKFISH_PATH)
    }

    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args = args.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_timing(mut self, timing: EngineTiming) -> Self {
        self.timing = timing;
        self
    }
}

/// Waits used while talking to the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineTiming {
    /// Longest wait for `readyok` after `isready`.
    #[serde(rename = "ready_timeout_ms", with = "millis")]
    pub ready_timeout: Duration,
    /// Extra wait on top of the search budget before reading output.
    #[serde(rename = "grace_ms", with = "millis")]
    pub grace: Duration,
    /// Output is considered finished after this long without a new line.
    #[serde(rename = "poll_timeout_ms", with = "millis")]
    pub poll_timeout: Duration,
    #[serde(rename = "quit_timeout_ms", with = "millis")]
    pub quit_timeout: Duration,
}

impl Default for EngineTiming {
    fn default() -> Self {
        Self {
            ready_timeout: Duration::from_millis(5000),
            grace: Duration::from_millis(100),
            poll_timeout: Duration::from_millis(300),
            quit_timeout: Duration::from_millis(1000),
        }
    }
}

mod millis {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(d: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(d.as_millis().try_into().unwrap_or(u64::MAX))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}
