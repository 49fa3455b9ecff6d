use serde::{Deserialize, Serialize};

/// What a search reduced to: the engine's chosen move and its last reported
/// centipawn score.
///
/// Both fields fall back to their defaults when the engine said nothing
/// useful, so an empty move and a zero score can also mean the engine was
/// too slow or printed something unrecognisable.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Evaluation {
    pub best_move: String,
    pub score: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BestMove<'a> {
    pub mv: &'a str,
    pub ponder: Option<&'a str>,
}

/// Matches `bestmove <move> [ponder <move>]` at the start of a line.
pub fn best_move(line: &str) -> Option<BestMove<'_>> {
    let rest = line.strip_prefix("bestmove")?;
    if !rest.starts_with(char::is_whitespace) {
        return None;
    }
    let mut tokens = rest.split_whitespace();
    let mv = tokens.next()?;
    let ponder = match tokens.next() {
        Some("ponder") => tokens.next(),
        _ => None,
    };
    Some(BestMove { mv, ponder })
}

/// Finds `score cp <n>` anywhere in a line.
pub fn centipawn_score(line: &str) -> Option<i32> {
    const MARKER: &str = "score cp ";

    let start = line.find(MARKER)? + MARKER.len();
    let rest = &line[start..];
    let sign_len = usize::from(rest.starts_with('-'));
    let digits_len = rest[sign_len..]
        .bytes()
        .take_while(u8::is_ascii_digit)
        .count();
    if digits_len == 0 {
        return None;
    }
    rest[..sign_len + digits_len].parse().ok()
}

pub fn is_ready_ok(line: &str) -> bool {
    line == "readyok"
}

/// Reduces the lines collected after a `go` to an [`Evaluation`].
///
/// The newest line is always consumed as the best-move candidate, whether or
/// not it is one. The remaining lines are searched newest first for a score.
pub fn parse_evaluation<I, S>(lines: I) -> Evaluation
where
    I: IntoIterator<Item = S>,
    I::IntoIter: DoubleEndedIterator,
    S: AsRef<str>,
{
    let mut lines = lines.into_iter().rev();
    let best_move = lines
        .next()
        .and_then(|line| best_move(line.as_ref()).map(|bm| bm.mv.to_owned()))
        .unwrap_or_default();
    let score = lines
        .find_map(|line| centipawn_score(line.as_ref()))
        .unwrap_or(0);
    Evaluation { best_move, score }
}
