//! A scriptable stand-in for a UCI engine, used by the integration tests.
//!
//! The first argument picks the behaviour:
//!
//! - `scored`: after the movetime (or on `stop`) prints two scored info lines
//!   and `bestmove e2e4 ponder e7e5`.
//! - `none`: prints only `bestmove (none)`.
//! - `silent`: prints nothing.
//! - `counting`: scores the position with the number of moves it was given
//!   and plays back the last of them, or `(none)` for the start position.
//! - `deaf`: never answers `isready`.
//! - `crash`: exits as soon as it sees `isready`.
//! - `stubborn`: like `scored`, but ignores `quit`.

use std::io::{self, BufRead, Write};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::thread;
use std::time::Duration;

#[derive(Clone, Copy, PartialEq, Eq)]
enum Mode {
    Scored,
    NoMove,
    Silent,
    Counting,
    Deaf,
    Crash,
    Stubborn,
}

impl Mode {
    fn from_arg(arg: Option<&str>) -> Self {
        match arg {
            Some("none") => Self::NoMove,
            Some("silent") => Self::Silent,
            Some("counting") => Self::Counting,
            Some("deaf") => Self::Deaf,
            Some("crash") => Self::Crash,
            Some("stubborn") => Self::Stubborn,
            _ => Self::Scored,
        }
    }
}

fn emit(out: &mut impl Write, line: &str) {
    // The client may already be gone; nothing to do about it here.
    let _ = writeln!(out, "{}", line).and_then(|_| out.flush());
}

fn search_output(mode: Mode, moves: &[String]) -> Vec<String> {
    match mode {
        Mode::Scored | Mode::Stubborn => vec![
            "info depth 1 seldepth 1 score cp 17 nodes 20 pv d2d4".to_owned(),
            "info depth 12 seldepth 18 score cp 42 nodes 81234 nps 900000 pv e2e4 e7e5".to_owned(),
            "info string search finished".to_owned(),
            "bestmove e2e4 ponder e7e5".to_owned(),
        ],
        Mode::NoMove => vec!["bestmove (none)".to_owned()],
        Mode::Counting => vec![
            format!("info depth 1 score cp {} pv {}", moves.len(), moves.join(" ")),
            format!("bestmove {}", moves.last().map_or("(none)", String::as_str)),
        ],
        Mode::Silent | Mode::Deaf | Mode::Crash => Vec::new(),
    }
}

fn parse_position(line: &str) -> Vec<String> {
    line.split_once(" moves ")
        .map(|(_, moves)| moves.split_whitespace().map(str::to_owned).collect())
        .unwrap_or_default()
}

fn parse_movetime(line: &str) -> Duration {
    let millis = line
        .split_whitespace()
        .skip_while(|&token| token != "movetime")
        .nth(1)
        .and_then(|ms| ms.parse().ok())
        .unwrap_or(0);
    Duration::from_millis(millis)
}

fn run(mode: Mode, commands: Receiver<String>) {
    let mut out = io::stdout();
    let mut moves = Vec::new();
    let mut pending = None;

    emit(&mut out, "Stub engine for cozy-eval tests");
    loop {
        let line = match pending.take() {
            Some(line) => line,
            None => match commands.recv() {
                Ok(line) => line,
                Err(_) => return,
            },
        };
        let line = line.trim();
        let command = line.split_whitespace().next().unwrap_or_default();
        match command {
            "isready" if mode == Mode::Crash => return,
            "isready" if mode != Mode::Deaf => emit(&mut out, "readyok"),
            "position" => moves = parse_position(line),
            "go" => {
                // Think until the movetime runs out or another command arrives.
                match commands.recv_timeout(parse_movetime(line)) {
                    Ok(next) if next.trim() == "stop" => {}
                    Ok(next) => pending = Some(next),
                    Err(RecvTimeoutError::Timeout) => {}
                    Err(RecvTimeoutError::Disconnected) => return,
                }
                for line in search_output(mode, &moves) {
                    emit(&mut out, &line);
                }
            }
            "quit" if mode != Mode::Stubborn => return,
            _ => {}
        }
    }
}

fn main() {
    let mode = Mode::from_arg(std::env::args().nth(1).as_deref());
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        for line in io::stdin().lock().lines() {
            let Ok(line) = line else { break };
            if tx.send(line).is_err() {
                break;
            }
        }
    });
    run(mode, rx);
}
