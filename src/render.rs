//! Terminal board renderer
//!
//! Draws the board as ANSI-colored cells read square by square from
//! [`Board::read_square`], with rank and file legends and a one-line
//! game status underneath. Colors come from [`BoardSettings`]; with
//! `unicode_pieces` off the renderer falls back to plain FEN letters,
//! which also keeps dumb terminals usable.

use chess_core::{Board, GamePhase, PieceColor};

use crate::config::BoardSettings;

const RESET: &str = "\x1b[0m";

/// Render the full board with legends into one string.
pub fn render_board(board: &Board, settings: &BoardSettings) -> String {
    let mut out = String::new();

    for row in 0..8 {
        // Rank legend: row 0 is rank 8.
        out.push_str(&format!(" {} ", 8 - row));
        for col in 0..8 {
            let light = (row + col) % 2 == 0;
            let background = if light {
                settings.light_square
            } else {
                settings.dark_square
            };
            let letter = board.read_square(row, col);
            let foreground = if letter.is_ascii_uppercase() { 15 } else { 0 };
            let glyph = if settings.unicode_pieces {
                unicode_glyph(letter)
            } else {
                letter
            };
            out.push_str(&format!(
                "\x1b[48;5;{background}m\x1b[38;5;{foreground}m {glyph} {RESET}"
            ));
        }
        out.push('\n');
    }

    out.push_str("    a  b  c  d  e  f  g  h\n");
    out
}

/// One-line summary of whose move it is and how the game stands.
pub fn status_line(board: &Board) -> String {
    let mover = match board.side_to_move() {
        PieceColor::White => "White",
        PieceColor::Black => "Black",
    };
    let move_number = board.position().fullmove_number;

    match board.phase() {
        GamePhase::Playing => format!("Move {move_number}: {mover} to play"),
        GamePhase::Check => format!("Move {move_number}: {mover} to play, check!"),
        GamePhase::Checkmate => {
            let winner = match board.side_to_move() {
                PieceColor::White => "Black",
                PieceColor::Black => "White",
            };
            format!("Checkmate, {winner} wins")
        }
        GamePhase::Stalemate => "Stalemate, draw".to_string(),
    }
}

/// Map a FEN letter onto the matching Unicode chess glyph.
fn unicode_glyph(letter: char) -> char {
    match letter {
        'P' => '♙',
        'N' => '♘',
        'B' => '♗',
        'R' => '♖',
        'Q' => '♕',
        'K' => '♔',
        'p' => '♟',
        'n' => '♞',
        'b' => '♝',
        'r' => '♜',
        'q' => '♛',
        'k' => '♚',
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chess_core::Board;

    fn ascii_settings() -> BoardSettings {
        BoardSettings {
            unicode_pieces: false,
            ..BoardSettings::default()
        }
    }

    #[test]
    fn test_render_contains_legends_and_pieces() {
        //! All rank digits, the file row and both kings appear
        let board = Board::new();
        let rendered = render_board(&board, &ascii_settings());

        for rank in 1..=8 {
            assert!(rendered.contains(&format!(" {rank} ")));
        }
        assert!(rendered.contains("a  b  c  d  e  f  g  h"));
        assert!(rendered.contains('K'));
        assert!(rendered.contains('k'));
    }

    #[test]
    fn test_unicode_glyphs_used_when_enabled() {
        let board = Board::new();
        let rendered = render_board(&board, &BoardSettings::default());
        assert!(rendered.contains('♔'));
        assert!(rendered.contains('♚'));
        assert!(!rendered.contains(" K "));
    }

    #[test]
    fn test_status_line_tracks_phase() {
        //! Status reflects turn, check and mate
        let mut board = Board::new();
        assert_eq!(status_line(&board), "Move 1: White to play");

        assert!(board.apply_move("e2", "e4"));
        assert_eq!(status_line(&board), "Move 1: Black to play");

        // Fool's mate.
        let mut board = Board::new();
        for (from, to) in [("f2", "f3"), ("e7", "e5"), ("g2", "g4")] {
            assert!(board.apply_move(from, to));
        }
        assert!(board.apply_move("d8", "h4"));
        assert_eq!(status_line(&board), "Checkmate, Black wins");
    }
}
