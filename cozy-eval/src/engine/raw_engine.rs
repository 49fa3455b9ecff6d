use std::path::Path;
use std::process::Stdio;
use std::time::Duration;

use log::{debug, info, trace, warn};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Lines};
use tokio::process::{Child, ChildStdin, ChildStdout, Command};

use super::command::EngineCommand;
use super::error::EngineError;

/// The engine process and its pipes, with no knowledge of protocol state.
#[derive(Debug)]
pub struct RawEngine {
    child: Child,
    stdin: ChildStdin,
    stdout: Lines<BufReader<ChildStdout>>,
}

impl RawEngine {
    pub fn new(path: &Path, args: &[String]) -> Result<Self, EngineError> {
        let mut child = Command::new(path)
            .kill_on_drop(true)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .args(args)
            .spawn()
            .map_err(|source| EngineError::Spawn { path: path.to_owned(), source })?;
        info!("spawned engine {:?} (pid {:?})", path, child.id());

        let stdin = child.stdin.take().ok_or(EngineError::MissingPipe("stdin"))?;
        let stdout = child.stdout.take().ok_or(EngineError::MissingPipe("stdout"))?;
        let stdout = BufReader::new(stdout).lines();

        // Keep stderr flowing so the engine never blocks on a full pipe.
        if let Some(stderr) = child.stderr.take() {
            tokio::spawn(async move {
                let mut lines = BufReader::new(stderr).lines();
                while let Ok(Some(line)) = lines.next_line().await {
                    debug!("[engine stderr] {}", line);
                }
            });
        }

        Ok(Self {
            child,
            stdin,
            stdout,
        })
    }

    pub async fn send(&mut self, cmd: &EngineCommand) -> Result<(), EngineError> {
        let line = format!("{}\n", cmd);
        debug!("[engine stdin] {}", cmd);
        self.stdin.write_all(line.as_bytes()).await?;
        self.stdin.flush().await?;
        Ok(())
    }

    /// Reads one line with the terminator and trailing whitespace removed.
    ///
    /// Cancel safe: a line is never lost if the future is dropped early.
    pub async fn recv(&mut self) -> Result<Option<String>, EngineError> {
        let line = self.stdout.next_line().await?.map(|mut line| {
            line.truncate(line.trim_end().len());
            line
        });
        if let Some(line) = &line {
            trace!("[engine stdout] {}", line);
        }
        Ok(line)
    }

    /// Asks the engine to quit and reaps it, killing it if it lingers.
    pub async fn shutdown(mut self, timeout: Duration) -> Result<(), EngineError> {
        // A closed pipe just means the engine is already gone.
        if let Err(e) = self.send(&EngineCommand::Quit).await {
            debug!("could not send quit: {}", e);
        }
        match tokio::time::timeout(timeout, self.child.wait()).await {
            Ok(status) => {
                let status = status?;
                info!("engine exited with {}", status);
            }
            Err(_) => {
                warn!("engine ignored quit for {:?}, killing it", timeout);
                self.child.kill().await?;
            }
        }
        Ok(())
    }
}
