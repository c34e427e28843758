//! Best-move reply parsing
//!
//! The `go movetime T` request completes on a `bestmove <move> [ponder
//! <move>]` line; the interesting evaluation detail travels separately
//! in the `info …` stream that precedes it. [`BestMove`] bundles the
//! chosen move, the optional ponder move, and at most one score.

/// Engine evaluation attached to a best-move result.
///
/// Centipawns and mate distance are mutually exclusive; whichever the
/// engine reported last wins.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Score {
    /// Evaluation in hundredths of a pawn, from the engine's side.
    Centipawns(i32),
    /// Forced mate in this many plies (negative: being mated).
    MatePlies(i32),
}

/// The engine's answer to a `go` request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BestMove {
    /// Chosen move in long-algebraic form, e.g. `e2e4` or `e7e8q`.
    pub uci: String,
    /// Move the engine would ponder on, when reported.
    pub ponder: Option<String>,
    /// Last score seen in the preceding `info` lines, if any.
    pub score: Option<Score>,
}

/// Parse a `bestmove <move> [ponder <move>]` line.
///
/// Returns the move and the optional ponder move; `None` when the line
/// carries no move at all.
pub fn parse_bestmove(line: &str) -> Option<(String, Option<String>)> {
    let mut tokens = line.split_whitespace();
    if !tokens.next()?.eq_ignore_ascii_case("bestmove") {
        return None;
    }
    let uci = tokens.next()?.to_string();

    let mut ponder = None;
    while let Some(token) = tokens.next() {
        if token.eq_ignore_ascii_case("ponder") {
            ponder = tokens.next().map(str::to_string);
        }
    }

    Some((uci, ponder))
}

/// Extract the score from an `info …` line, if it carries one.
///
/// Scans for `score cp <n>` or `score mate <n>`; if a line somehow
/// carries both, the later pair wins.
pub fn parse_info_score(line: &str) -> Option<Score> {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    if tokens.first().map(|t| t.eq_ignore_ascii_case("info")) != Some(true) {
        return None;
    }

    let mut score = None;
    let mut i = 0;
    while i + 2 < tokens.len() {
        if tokens[i] == "score" {
            match (tokens[i + 1], tokens[i + 2].parse::<i32>()) {
                ("cp", Ok(value)) => score = Some(Score::Centipawns(value)),
                ("mate", Ok(value)) => score = Some(Score::MatePlies(value)),
                _ => {}
            }
            i += 3;
        } else {
            i += 1;
        }
    }
    score
}
