//! FEN parsing and serialization
//!
//! Forsyth–Edwards Notation is the crate's only persistence format: six
//! space-separated fields covering piece placement, active color,
//! castling rights, the en-passant target and the two clocks.
//!
//! # Error Handling
//!
//! Parsing builds a complete candidate [`Position`] before anything is
//! handed to the board, so a failing parse can never leave a
//! half-loaded position behind. Each concrete failure is one
//! [`FenError`] variant carrying the offending fragment.

use thiserror::Error;

use crate::square::Square;
use crate::types::{CastlingRights, Piece, PieceColor, Position};

/// The standard starting position.
pub const START_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

/// Errors that can occur while parsing a FEN string.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FenError {
    /// The string does not have exactly six space-separated fields.
    #[error("expected 6 space-separated fields, found {found}")]
    FieldCount { found: usize },

    /// The placement field does not have exactly eight `/`-separated ranks.
    #[error("expected 8 ranks in the placement field, found {found}")]
    RankCount { found: usize },

    /// A rank's piece letters and empty-run digits do not total 8 files.
    #[error("rank {rank} does not describe exactly 8 files")]
    RankWidth { rank: u8 },

    /// A placement character is neither a piece letter nor a digit.
    #[error("unrecognized piece letter '{letter}'")]
    UnknownPiece { letter: char },

    /// The active-color field is neither `w` nor `b`.
    #[error("active color must be 'w' or 'b', found '{field}'")]
    ActiveColor { field: String },

    /// The en-passant field is neither `-` nor a valid square.
    #[error("invalid en-passant field '{field}'")]
    EnPassant { field: String },

    /// The halfmove clock is not a non-negative integer.
    #[error("invalid halfmove clock '{field}'")]
    HalfmoveClock { field: String },

    /// The fullmove number is not a positive integer.
    #[error("invalid fullmove number '{field}'")]
    FullmoveNumber { field: String },
}

/// Result type alias for FEN operations.
pub type FenResult<T> = Result<T, FenError>;

/// Parse a six-field FEN string into a [`Position`].
pub fn parse_fen(fen: &str) -> FenResult<Position> {
    let fields: Vec<&str> = fen.split_whitespace().collect();
    if fields.len() != 6 {
        return Err(FenError::FieldCount {
            found: fields.len(),
        });
    }

    let mut position = Position::empty();
    parse_placement(fields[0], &mut position)?;

    position.side_to_move = match fields[1] {
        "w" => PieceColor::White,
        "b" => PieceColor::Black,
        other => {
            return Err(FenError::ActiveColor {
                field: other.to_string(),
            })
        }
    };

    position.castling = parse_castling(fields[2]);

    position.en_passant = match fields[3] {
        "-" => None,
        other => match Square::from_algebraic(other) {
            Some(sq) => Some(sq),
            None => {
                return Err(FenError::EnPassant {
                    field: other.to_string(),
                })
            }
        },
    };

    position.halfmove_clock = fields[4].parse().map_err(|_| FenError::HalfmoveClock {
        field: fields[4].to_string(),
    })?;

    position.fullmove_number = fields[5].parse().map_err(|_| FenError::FullmoveNumber {
        field: fields[5].to_string(),
    })?;

    Ok(position)
}

fn parse_placement(placement: &str, position: &mut Position) -> FenResult<()> {
    let ranks: Vec<&str> = placement.split('/').collect();
    if ranks.len() != 8 {
        return Err(FenError::RankCount { found: ranks.len() });
    }

    for (row, rank_str) in ranks.iter().enumerate() {
        // Ranks run 8 down to 1 as rows run 0..8.
        let rank_number = 8 - row as u8;
        let mut col = 0i8;

        for c in rank_str.chars() {
            if let Some(run) = c.to_digit(10) {
                col += run as i8;
            } else if let Some(piece) = Piece::from_char(c) {
                if col >= 8 {
                    return Err(FenError::RankWidth { rank: rank_number });
                }
                position.grid[row][col as usize] = piece;
                col += 1;
            } else {
                return Err(FenError::UnknownPiece { letter: c });
            }
        }

        if col != 8 {
            return Err(FenError::RankWidth { rank: rank_number });
        }
    }

    Ok(())
}

/// The castling field is a subset of `KQkq` or `-`. Letters outside the
/// set are ignored rather than fatal; the field never fails to parse.
fn parse_castling(field: &str) -> CastlingRights {
    let mut rights = CastlingRights::none();
    for c in field.chars() {
        match c {
            'K' => rights.white_king_side = true,
            'Q' => rights.white_queen_side = true,
            'k' => rights.black_king_side = true,
            'q' => rights.black_queen_side = true,
            _ => {}
        }
    }
    rights
}

/// Serialize a [`Position`] into its six-field FEN form.
///
/// Empty-square runs are merged into digits; an empty castling set
/// renders as `-`.
pub fn position_to_fen(position: &Position) -> String {
    let mut placement = String::new();
    for row in 0..8 {
        if row > 0 {
            placement.push('/');
        }
        let mut empty_run = 0;
        for col in 0..8 {
            let piece = position.grid[row][col];
            if piece.is_empty() {
                empty_run += 1;
                continue;
            }
            if empty_run > 0 {
                placement.push((b'0' + empty_run) as char);
                empty_run = 0;
            }
            placement.push(piece.to_char());
        }
        if empty_run > 0 {
            placement.push((b'0' + empty_run) as char);
        }
    }

    let en_passant = match position.en_passant {
        Some(sq) => sq.to_algebraic(),
        None => "-".to_string(),
    };

    format!(
        "{} {} {} {} {} {}",
        placement,
        position.side_to_move.fen_char(),
        position.castling.to_fen(),
        en_passant,
        position.halfmove_clock,
        position.fullmove_number
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_start_position_round_trip() {
        //! Parsing the start FEN and serializing it back is the identity
        let position = parse_fen(START_FEN).unwrap();
        assert_eq!(position_to_fen(&position), START_FEN);
        assert_eq!(position.side_to_move, PieceColor::White);
        assert_eq!(position.castling, CastlingRights::all());
        assert_eq!(position.en_passant, None);
        assert_eq!(position.fullmove_number, 1);
    }

    #[test]
    fn test_placement_orientation() {
        //! The first FEN rank lands on row 0 (rank 8)
        let position = parse_fen(START_FEN).unwrap();
        let a8 = Square::from_algebraic("a8").unwrap();
        let e1 = Square::from_algebraic("e1").unwrap();
        assert_eq!(position.piece_at(a8), Piece::BlackRook);
        assert_eq!(position.piece_at(e1), Piece::WhiteKing);
    }

    #[test]
    fn test_field_count_errors() {
        //! Both too few and too many fields are rejected
        assert_eq!(
            parse_fen("8/8/8/8/8/8/8/8 w - -"),
            Err(FenError::FieldCount { found: 4 })
        );
        assert_eq!(
            parse_fen("8/8/8/8/8/8/8/8 w - - 0 1 extra"),
            Err(FenError::FieldCount { found: 7 })
        );
    }

    #[test]
    fn test_rank_count_error() {
        //! Seven ranks is not a board
        assert_eq!(
            parse_fen("8/8/8/8/8/8/8 w - - 0 1"),
            Err(FenError::RankCount { found: 7 })
        );
    }

    #[test]
    fn test_rank_width_errors() {
        //! Under- and over-full ranks are rejected with the rank number
        assert_eq!(
            parse_fen("7/8/8/8/8/8/8/8 w - - 0 1"),
            Err(FenError::RankWidth { rank: 8 })
        );
        assert_eq!(
            parse_fen("8/8/8/8/8/8/8/ppppppppp w - - 0 1"),
            Err(FenError::RankWidth { rank: 1 })
        );
    }

    #[test]
    fn test_unknown_piece_error() {
        //! An unrecognized placement letter names itself in the error
        assert_eq!(
            parse_fen("8/8/8/3x4/8/8/8/8 w - - 0 1"),
            Err(FenError::UnknownPiece { letter: 'x' })
        );
    }

    #[test]
    fn test_active_color_error() {
        assert_eq!(
            parse_fen("8/8/8/8/8/8/8/8 white - - 0 1"),
            Err(FenError::ActiveColor {
                field: "white".to_string()
            })
        );
    }

    #[test]
    fn test_en_passant_field() {
        //! `-` clears the target; squares parse; anything else fails
        let position = parse_fen("8/8/8/8/8/8/8/8 w - e3 0 1").unwrap();
        assert_eq!(position.en_passant, Square::from_algebraic("e3"));

        assert_eq!(
            parse_fen("8/8/8/8/8/8/8/8 w - e9 0 1"),
            Err(FenError::EnPassant {
                field: "e9".to_string()
            })
        );
    }

    #[test]
    fn test_clock_errors() {
        //! Non-integer clocks are rejected field by field
        assert_eq!(
            parse_fen("8/8/8/8/8/8/8/8 w - - x 1"),
            Err(FenError::HalfmoveClock {
                field: "x".to_string()
            })
        );
        assert_eq!(
            parse_fen("8/8/8/8/8/8/8/8 w - - 0 x"),
            Err(FenError::FullmoveNumber {
                field: "x".to_string()
            })
        );
    }

    #[test]
    fn test_empty_run_merging() {
        //! Serialization merges adjacent empty squares into one digit
        let fen = "r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1";
        let position = parse_fen(fen).unwrap();
        assert_eq!(position_to_fen(&position), fen);
    }
}
