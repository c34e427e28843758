//! Command REPL
//!
//! The interactive loop in front of the board and the engine driver:
//! read a command, apply the human move locally, ask the engine for its
//! reply, apply that too, render, repeat. The loop orchestrates the two
//! subsystems strictly sequentially; neither is touched concurrently.
//!
//! Invalid input of any kind reports and keeps the loop running, and a
//! missing or failing engine degrades the session to human-vs-human
//! instead of ending it.

use std::io::{self, Write};

use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};
use tracing::{info, warn};

use chess_core::{Board, GamePhase, Piece, PieceColor, PieceKind, Square};
use uci_client::{Score, UciEngine};

use crate::config::Settings;
use crate::render;

/// One parsed line of user input.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    /// A move given as two squares.
    Move { from: String, to: String },
    Undo,
    Fen,
    Reset,
    Help,
    Quit,
    Empty,
    Unknown(String),
}

/// Parse a REPL line.
///
/// Moves accept two squares separated by space, `-` or `,`, or a
/// single 4-character token (`e2e4`). Keywords have single-letter
/// shorthands (`u`, `r`, `?`, `q`).
pub fn parse_command(input: &str) -> Command {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Command::Empty;
    }

    let lowered = trimmed.to_ascii_lowercase();
    match lowered.as_str() {
        "undo" | "u" => return Command::Undo,
        "fen" => return Command::Fen,
        "reset" | "r" => return Command::Reset,
        "help" | "?" => return Command::Help,
        "quit" | "q" => return Command::Quit,
        _ => {}
    }

    let normalized = lowered.replace(['-', ','], " ");
    let tokens: Vec<&str> = normalized.split_whitespace().collect();
    match tokens.as_slice() {
        [mv] if mv.len() == 4 && mv.is_ascii() => Command::Move {
            from: mv[0..2].to_string(),
            to: mv[2..4].to_string(),
        },
        [from, to] => Command::Move {
            from: (*from).to_string(),
            to: (*to).to_string(),
        },
        _ => Command::Unknown(trimmed.to_string()),
    }
}

/// Run the interactive session until `quit` or end of input.
pub async fn run(board: &mut Board, engine: &UciEngine, settings: &Settings) -> io::Result<()> {
    let mut input = BufReader::new(tokio::io::stdin()).lines();
    print_help();

    loop {
        println!();
        print!("{}", render::render_board(board, &settings.board));
        println!("{}", render::status_line(board));
        print!("> ");
        io::stdout().flush()?;

        let line = match input.next_line().await? {
            Some(line) => line,
            None => break,
        };

        match parse_command(&line) {
            Command::Empty => {}
            Command::Help => print_help(),
            Command::Quit => break,
            Command::Fen => println!("{}", board.to_fen()),
            Command::Undo => match board.undo() {
                Some(record) => println!("Took back {}", record.to_uci()),
                None => println!("Nothing to take back"),
            },
            Command::Reset => {
                board.reset();
                if let Err(err) = engine.new_game().await {
                    warn!(%err, "engine new_game failed");
                }
                println!("New game");
            }
            Command::Unknown(text) => {
                println!("Unrecognized command '{text}', try 'help'");
            }
            Command::Move { from, to } => {
                if promotion_candidate(board, &from, &to) {
                    let choice = prompt_promotion(&mut input, board.side_to_move()).await?;
                    board.set_promotion_chooser(move |_, _| choice);
                }

                if !board.apply_move(&from, &to) {
                    println!("Illegal move: {from} {to}");
                    continue;
                }
                info!(%from, %to, "player move applied");

                if matches!(board.phase(), GamePhase::Checkmate | GamePhase::Stalemate) {
                    continue;
                }
                engine_reply(board, engine).await;
            }
        }
    }

    Ok(())
}

/// Push the move list to the engine and apply its best move.
///
/// Every failure leaves the board as-is and hands the move back to the
/// human.
async fn engine_reply(board: &mut Board, engine: &UciEngine) {
    if let Err(err) = engine.position_from_moves(&board.uci_move_list()).await {
        warn!(%err, "engine position update failed");
        println!("(engine unavailable, play the reply yourself)");
        return;
    }

    match engine.best_move().await {
        Ok(reply) => {
            if board.apply_uci_move(&reply.uci) {
                println!("Engine plays {}{}", reply.uci, describe_score(reply.score));
            } else {
                warn!(uci = %reply.uci, "engine move rejected by the board");
                println!("(engine suggested illegal move {})", reply.uci);
            }
        }
        Err(err) => {
            warn!(%err, "no engine reply");
            println!("(no engine reply, play it yourself)");
        }
    }
}

fn describe_score(score: Option<Score>) -> String {
    match score {
        Some(Score::Centipawns(cp)) => format!("  [score {:+.2}]", f64::from(cp) / 100.0),
        Some(Score::MatePlies(plies)) => format!("  [mate in {plies}]"),
        None => String::new(),
    }
}

/// A move is a promotion candidate when the mover's pawn is headed to
/// its last rank; the choice is asked for before the move is applied.
fn promotion_candidate(board: &Board, from: &str, to: &str) -> bool {
    let (from, to) = match (Square::from_algebraic(from), Square::from_algebraic(to)) {
        (Some(from), Some(to)) => (from, to),
        _ => return false,
    };
    let piece = board.position().piece_at(from);
    let last_row = match board.side_to_move() {
        PieceColor::White => 0,
        PieceColor::Black => 7,
    };
    piece.kind() == Some(PieceKind::Pawn)
        && piece.belongs_to(board.side_to_move())
        && to.row() == last_row
}

async fn prompt_promotion(
    input: &mut Lines<BufReader<Stdin>>,
    color: PieceColor,
) -> io::Result<Piece> {
    print!("Promote to [q/r/b/n] (default q): ");
    io::stdout().flush()?;

    let choice = input.next_line().await?.unwrap_or_default();
    let kind = match choice.trim().chars().next() {
        Some('r') | Some('R') => PieceKind::Rook,
        Some('b') | Some('B') => PieceKind::Bishop,
        Some('n') | Some('N') => PieceKind::Knight,
        _ => PieceKind::Queen,
    };
    Ok(Piece::new(color, kind))
}

fn print_help() {
    println!("Commands:");
    println!("  <from> <to>   make a move (e2 e4, e2-e4, e2,e4 or e2e4)");
    println!("  undo, u       take back the last half-move");
    println!("  fen           print the current position as FEN");
    println!("  reset, r      start a new game");
    println!("  help, ?       show this help");
    println!("  quit, q       leave");
}
