use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("failed to spawn engine {path:?}")]
    Spawn {
        path: PathBuf,
        #[source]
        source: tokio::io::Error,
    },
    #[error("engine has no {0} pipe")]
    MissingPipe(&'static str),
    #[error("io error")]
    IoError(#[from] tokio::io::Error),
    #[error("engine did not report readyok within {0:?}")]
    NotReady(Duration),
    #[error("engine unexpectedly exited")]
    UnexpectedTermination,
}
