//! Pseudo-legal movement predicates
//!
//! A move is pseudo-legal when it respects the moving piece's geometry
//! and the blockers on the board, ignoring whether it leaves the
//! mover's king in check. King safety is the board's job; these
//! functions answer the geometric question only.
//!
//! Castling is deliberately absent here: the king's two-file step has
//! its own predicates (rights, empty path, no attacked transit square)
//! and is validated by [`crate::Board`] where attack detection and the
//! rights set are in reach.

use crate::square::Square;
use crate::types::{Grid, PieceColor, PieceKind, Position};

/// Check whether moving the piece on `from` to `to` is pseudo-legal.
///
/// Requires a piece on `from`; rejects `from == to` and destinations
/// occupied by a piece of the mover's own color, then dispatches on the
/// piece kind. The en-passant diagonal is accepted for pawns when `to`
/// equals the position's en-passant target.
pub fn is_pseudo_legal(position: &Position, from: Square, to: Square) -> bool {
    if from == to {
        return false;
    }
    let piece = position.piece_at(from);
    let color = match piece.color() {
        Some(color) => color,
        None => return false,
    };
    if position.piece_at(to).belongs_to(color) {
        return false;
    }

    match piece.kind() {
        Some(PieceKind::Pawn) => is_pseudo_legal_pawn(position, from, to, color),
        Some(PieceKind::Knight) => is_knight_pattern(from, to),
        Some(PieceKind::Bishop) => is_bishop_pattern(from, to) && path_clear(&position.grid, from, to),
        Some(PieceKind::Rook) => is_rook_pattern(from, to) && path_clear(&position.grid, from, to),
        Some(PieceKind::Queen) => {
            (is_bishop_pattern(from, to) || is_rook_pattern(from, to))
                && path_clear(&position.grid, from, to)
        }
        Some(PieceKind::King) => is_king_pattern(from, to),
        None => false,
    }
}

fn is_pseudo_legal_pawn(position: &Position, from: Square, to: Square, color: PieceColor) -> bool {
    let dir = color.pawn_direction();
    let row_diff = to.row() - from.row();
    let col_diff = to.col() - from.col();

    // Single forward step onto an empty square.
    if col_diff == 0 && row_diff == dir {
        return position.piece_at(to).is_empty();
    }

    // Double step from the starting rank; intermediate and destination
    // must both be empty. White pawns start on row 6 (rank 2).
    let start_row = match color {
        PieceColor::White => 6,
        PieceColor::Black => 1,
    };
    if col_diff == 0 && row_diff == 2 * dir && from.row() == start_row {
        let intermediate = match Square::from_row_col(from.row() + dir, from.col()) {
            Some(sq) => sq,
            None => return false,
        };
        return position.piece_at(intermediate).is_empty() && position.piece_at(to).is_empty();
    }

    // Diagonal capture, onto an enemy piece or the en-passant target.
    if col_diff.abs() == 1 && row_diff == dir {
        if position.en_passant == Some(to) {
            return true;
        }
        return position.piece_at(to).belongs_to(color.opponent());
    }

    false
}

/// (|Δrow|, |Δcol|) ∈ {(1,2), (2,1)}.
pub fn is_knight_pattern(from: Square, to: Square) -> bool {
    let dr = (to.row() - from.row()).abs();
    let dc = (to.col() - from.col()).abs();
    (dr == 1 && dc == 2) || (dr == 2 && dc == 1)
}

/// Same-length row and column deltas, excluding the null move.
pub fn is_bishop_pattern(from: Square, to: Square) -> bool {
    let dr = (to.row() - from.row()).abs();
    let dc = (to.col() - from.col()).abs();
    dr == dc && dr != 0
}

/// Exactly one of the row/column deltas is zero.
pub fn is_rook_pattern(from: Square, to: Square) -> bool {
    (from.row() == to.row()) != (from.col() == to.col())
}

/// One square in any direction.
pub fn is_king_pattern(from: Square, to: Square) -> bool {
    let dr = (to.row() - from.row()).abs();
    let dc = (to.col() - from.col()).abs();
    dr <= 1 && dc <= 1 && (dr, dc) != (0, 0)
}

/// Walk the squares strictly between `from` and `to`, returning false
/// on the first occupied one. Callers guarantee the two squares share a
/// rank, file or diagonal.
pub fn path_clear(grid: &Grid, from: Square, to: Square) -> bool {
    let dr = (to.row() - from.row()).signum();
    let dc = (to.col() - from.col()).signum();

    let mut row = from.row() + dr;
    let mut col = from.col() + dc;
    while (row, col) != (to.row(), to.col()) {
        if !grid[row as usize][col as usize].is_empty() {
            return false;
        }
        row += dr;
        col += dc;
    }
    true
}
