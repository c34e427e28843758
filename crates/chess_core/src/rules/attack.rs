//! Attack detection
//!
//! A square is attacked by a color when any piece of that color could,
//! in one move, land on it ignoring check. Implemented as a scan over
//! all 64 squares with a per-kind predicate, the same shape the
//! legality layer uses: for the one-shot questions this crate answers
//! (is the king safe after this move, may the king castle through this
//! square) the scan is cheap and needs no precomputed tables.
//!
//! Castling and en passant are not attacks and are never considered
//! here: a king cannot be "attacked" by a castle, and the en-passant
//! diagonal threatens a pawn, not the target square.

use crate::rules::moves::{is_bishop_pattern, is_king_pattern, is_knight_pattern, is_rook_pattern, path_clear};
use crate::square::Square;
use crate::types::{Grid, PieceColor, PieceKind};

/// Check whether `target` is attacked by any piece of `by_color`.
pub fn is_square_attacked(grid: &Grid, target: Square, by_color: PieceColor) -> bool {
    for idx in 0..64u8 {
        let from = match Square::from_index(idx) {
            Some(sq) => sq,
            None => continue,
        };
        let piece = grid[from.row() as usize][from.col() as usize];
        if !piece.belongs_to(by_color) {
            continue;
        }

        let attacks = match piece.kind() {
            Some(PieceKind::Pawn) => pawn_attacks(from, target, by_color),
            Some(PieceKind::Knight) => is_knight_pattern(from, target),
            Some(PieceKind::Bishop) => is_bishop_pattern(from, target) && path_clear(grid, from, target),
            Some(PieceKind::Rook) => is_rook_pattern(from, target) && path_clear(grid, from, target),
            Some(PieceKind::Queen) => {
                (is_bishop_pattern(from, target) || is_rook_pattern(from, target))
                    && path_clear(grid, from, target)
            }
            Some(PieceKind::King) => is_king_pattern(from, target),
            None => false,
        };

        if attacks {
            return true;
        }
    }
    false
}

/// A pawn attacks the two squares one diagonal step ahead of it.
fn pawn_attacks(from: Square, target: Square, color: PieceColor) -> bool {
    let dir = color.pawn_direction();
    target.row() - from.row() == dir && (target.col() - from.col()).abs() == 1
}
