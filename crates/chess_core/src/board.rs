//! The authoritative board
//!
//! [`Board`] is the single source of truth for the current position. It
//! accepts tentative moves, validates them under full chess rules,
//! updates state and records reversible history.
//!
//! # Legality by rollback
//!
//! A move is executed in phases: sanity checks, a full snapshot of the
//! [`Position`], pseudo-legal validation, tentative application
//! (including the en-passant removal, the castling rook handoff and
//! promotion), castling-rights maintenance, and finally a king-safety
//! check. If any phase fails the snapshot is restored wholesale, so a
//! rejected move can never leave a half-applied position behind, the
//! same holds for internal inconsistencies such as a missing king.
//!
//! # History
//!
//! Two parallel stacks, one of [`MoveRecord`]s and one of full
//! [`Position`] snapshots. After every successful move both stacks grow
//! by one; [`Board::undo`] pops both. Storing a full snapshot per move
//! trades memory for correctness in the presence of castling,
//! en-passant, promotion and rights updates.

use crate::fen::{parse_fen, position_to_fen, FenResult, START_FEN};
use crate::rules::attack::is_square_attacked;
use crate::rules::moves::is_pseudo_legal;
use crate::square::Square;
use crate::types::{MoveRecord, Piece, PieceColor, PieceKind, Position};

/// Injected promotion decision: `(from, to) -> Piece`.
///
/// Invoked exactly when a pawn reaches its last rank. A chooser that
/// returns anything other than a queen, rook, bishop or knight of the
/// moving color is overridden to a queen.
pub type PromotionChooser = Box<dyn FnMut(Square, Square) -> Piece>;

/// Summary of the side to move's situation, for the status line.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum GamePhase {
    /// Normal play, the side to move is not in check.
    #[default]
    Playing,
    /// The side to move is in check but has a legal reply.
    Check,
    /// The side to move is in check with no legal reply.
    Checkmate,
    /// The side to move is not in check and has no legal reply.
    Stalemate,
}

/// What a tentative application actually did, for record building.
struct MoveDetails {
    captured: Option<Piece>,
    is_en_passant: bool,
    is_king_side_castle: bool,
    is_queen_side_castle: bool,
    promotion: Option<Piece>,
}

/// Authoritative position plus reversible history.
pub struct Board {
    position: Position,
    moves: Vec<MoveRecord>,
    snapshots: Vec<Position>,
    promotion_chooser: Option<PromotionChooser>,
}

impl Default for Board {
    fn default() -> Self {
        Board::new()
    }
}

impl Board {
    /// A board set up with the standard starting position.
    pub fn new() -> Board {
        let position = parse_fen(START_FEN).expect("standard starting FEN is valid");
        Board {
            position,
            moves: Vec::new(),
            snapshots: Vec::new(),
            promotion_chooser: None,
        }
    }

    /// Build a board from an arbitrary FEN.
    pub fn from_fen(fen: &str) -> FenResult<Board> {
        let mut board = Board::new();
        board.load_fen(fen)?;
        Ok(board)
    }

    /// Replace the position with one parsed from `fen`.
    ///
    /// On success both history stacks are cleared. On failure the board
    /// is left exactly as it was.
    pub fn load_fen(&mut self, fen: &str) -> FenResult<()> {
        let position = parse_fen(fen)?;
        self.position = position;
        self.moves.clear();
        self.snapshots.clear();
        Ok(())
    }

    /// Reset to the standard starting position, clearing history.
    pub fn reset(&mut self) {
        self.position = parse_fen(START_FEN).expect("standard starting FEN is valid");
        self.moves.clear();
        self.snapshots.clear();
    }

    /// Serialize the current position; always six fields.
    pub fn to_fen(&self) -> String {
        position_to_fen(&self.position)
    }

    pub fn side_to_move(&self) -> PieceColor {
        self.position.side_to_move
    }

    /// Read-only view of the underlying position.
    pub fn position(&self) -> &Position {
        &self.position
    }

    /// Moves played so far, oldest first.
    pub fn move_history(&self) -> &[MoveRecord] {
        &self.moves
    }

    /// FEN letter of the piece on (row, col), a space when empty or out
    /// of range. Row 0 is rank 8. Rendering accessor only.
    pub fn read_square(&self, row: usize, col: usize) -> char {
        self.position
            .grid
            .get(row)
            .and_then(|rank| rank.get(col))
            .map(|piece| piece.to_char())
            .unwrap_or(' ')
    }

    /// The move history in long algebraic form, ready for the
    /// `position startpos moves …` UCI command.
    pub fn uci_move_list(&self) -> Vec<String> {
        self.moves.iter().map(MoveRecord::to_uci).collect()
    }

    /// Register the promotion decision callback.
    pub fn set_promotion_chooser<F>(&mut self, chooser: F)
    where
        F: FnMut(Square, Square) -> Piece + 'static,
    {
        self.promotion_chooser = Some(Box::new(chooser));
    }

    /// Attempt the move identified by two algebraic squares.
    ///
    /// Returns true iff the move is fully legal; on false the position
    /// is byte-identical to the pre-call state.
    pub fn apply_move(&mut self, from: &str, to: &str) -> bool {
        let (from, to) = match (Square::from_algebraic(from), Square::from_algebraic(to)) {
            (Some(from), Some(to)) => (from, to),
            _ => return false,
        };
        self.apply_move_squares(from, to)
    }

    /// Attempt a move between two already-parsed squares.
    pub fn apply_move_squares(&mut self, from: Square, to: Square) -> bool {
        // Phase 1: sanity. Distinct squares, mover's piece on `from`.
        if from == to {
            return false;
        }
        let piece = self.position.piece_at(from);
        let mover = self.position.side_to_move;
        if !piece.belongs_to(mover) {
            return false;
        }

        // Phase 2: full backup before any mutation.
        let snapshot = self.position.clone();

        // Phases 3-8: pseudo-legality, tentative application, rook
        // handoff, promotion, rights update, king safety.
        let details = execute_move(
            &mut self.position,
            from,
            to,
            self.promotion_chooser.as_deref_mut(),
        );

        let details = match details {
            Some(details) => details,
            None => {
                self.position = snapshot;
                return false;
            }
        };

        // Phase 9: en-passant target. Set only by a pawn double-step.
        self.position.en_passant = if piece.kind() == Some(PieceKind::Pawn)
            && (to.row() - from.row()).abs() == 2
        {
            Square::from_row_col(from.row() + mover.pawn_direction(), from.col())
        } else {
            None
        };

        // Phase 10: clocks. Halfmove resets on pawn moves and captures;
        // fullmove increments after Black's move.
        if piece.kind() == Some(PieceKind::Pawn) || details.captured.is_some() {
            self.position.halfmove_clock = 0;
        } else {
            self.position.halfmove_clock += 1;
        }
        if mover == PieceColor::Black {
            self.position.fullmove_number += 1;
        }

        // Phase 11: flip side to move.
        self.position.side_to_move = mover.opponent();

        // Phase 12: history, with check/checkmate determination against
        // the opponent who is now to move.
        let is_check = in_check(&self.position, mover.opponent());
        let is_checkmate = is_check && !has_legal_reply(&self.position);

        self.snapshots.push(snapshot);
        self.moves.push(MoveRecord {
            piece,
            from,
            to,
            captured: details.captured,
            promotion: details.promotion,
            is_capture: details.captured.is_some(),
            is_en_passant: details.is_en_passant,
            is_king_side_castle: details.is_king_side_castle,
            is_queen_side_castle: details.is_queen_side_castle,
            is_check,
            is_checkmate,
        });

        true
    }

    /// Apply an engine move in long algebraic form (`e2e4`, `e7e8q`).
    ///
    /// A promotion suffix temporarily installs a fixed-piece chooser so
    /// the engine's choice wins over the registered callback.
    pub fn apply_uci_move(&mut self, uci: &str) -> bool {
        if !uci.is_ascii() || (uci.len() != 4 && uci.len() != 5) {
            return false;
        }
        let (from, to) = match (
            Square::from_algebraic(&uci[0..2]),
            Square::from_algebraic(&uci[2..4]),
        ) {
            (Some(from), Some(to)) => (from, to),
            _ => return false,
        };

        let promotion_kind = match uci.chars().nth(4) {
            None => None,
            Some('q') => Some(PieceKind::Queen),
            Some('r') => Some(PieceKind::Rook),
            Some('b') => Some(PieceKind::Bishop),
            Some('n') => Some(PieceKind::Knight),
            Some(_) => return false,
        };

        match promotion_kind {
            None => self.apply_move_squares(from, to),
            Some(kind) => {
                let mover = self.position.side_to_move;
                let previous = self.promotion_chooser.take();
                self.promotion_chooser =
                    Some(Box::new(move |_, _| Piece::new(mover, kind)));
                let applied = self.apply_move_squares(from, to);
                self.promotion_chooser = previous;
                applied
            }
        }
    }

    /// Roll back the most recent successful move.
    ///
    /// Returns the undone record, or `None` when the history is empty.
    pub fn undo(&mut self) -> Option<MoveRecord> {
        let snapshot = self.snapshots.pop()?;
        let record = self.moves.pop();
        self.position = snapshot;
        record
    }

    /// Whether `color`'s king is currently attacked.
    pub fn in_check(&self, color: PieceColor) -> bool {
        in_check(&self.position, color)
    }

    /// Whether the side to move is checkmated.
    pub fn is_checkmate(&self) -> bool {
        in_check(&self.position, self.position.side_to_move) && !has_legal_reply(&self.position)
    }

    /// Whether the side to move is stalemated: not in check, but with
    /// no legal reply.
    pub fn is_stalemate(&self) -> bool {
        !in_check(&self.position, self.position.side_to_move) && !has_legal_reply(&self.position)
    }

    /// Classify the side to move's situation.
    pub fn phase(&self) -> GamePhase {
        let checked = in_check(&self.position, self.position.side_to_move);
        let has_reply = has_legal_reply(&self.position);
        match (checked, has_reply) {
            (true, true) => GamePhase::Check,
            (true, false) => GamePhase::Checkmate,
            (false, false) => GamePhase::Stalemate,
            (false, true) => GamePhase::Playing,
        }
    }
}

/// Whether `color`'s king is attacked. A missing king counts as unsafe
/// so that king-capture positions are rejected upstream.
fn in_check(position: &Position, color: PieceColor) -> bool {
    match position.king_square(color) {
        Some(king) => is_square_attacked(&position.grid, king, color.opponent()),
        None => true,
    }
}

/// Phases 3-8 of move application, mutating `position` in place.
///
/// Returns `None` when the move is not legal; the caller owns the
/// snapshot and restores it. `chooser` is the promotion callback;
/// `None` promotes to a queen.
fn execute_move(
    position: &mut Position,
    from: Square,
    to: Square,
    chooser: Option<&mut (dyn FnMut(Square, Square) -> Piece + 'static)>,
) -> Option<MoveDetails> {
    let piece = position.piece_at(from);
    let color = piece.color()?;

    let mut details = MoveDetails {
        captured: None,
        is_en_passant: false,
        is_king_side_castle: false,
        is_queen_side_castle: false,
        promotion: None,
    };

    let castle_step = piece.kind() == Some(PieceKind::King)
        && from.row() == to.row()
        && (to.col() - from.col()).abs() == 2;

    if castle_step {
        // Phase 5 folded in: the rook handoff shares legality with the
        // king's two-file step.
        let king_side = to.col() > from.col();
        if !castle_allowed(position, color, king_side) {
            return None;
        }
        let home_row = from.row();
        let rook_from = Square::from_row_col(home_row, if king_side { 7 } else { 0 })?;
        let rook_to = Square::from_row_col(home_row, if king_side { 5 } else { 3 })?;

        let rook = position.piece_at(rook_from);
        position.set_piece(to, piece);
        position.set_piece(from, Piece::Empty);
        position.set_piece(rook_to, rook);
        position.set_piece(rook_from, Piece::Empty);

        if king_side {
            details.is_king_side_castle = true;
        } else {
            details.is_queen_side_castle = true;
        }
    } else {
        // Phase 3: geometry and blockers.
        if !is_pseudo_legal(position, from, to) {
            return None;
        }

        // Phase 4: tentative application. En-passant removes the pawn
        // behind the destination; a plain capture removes the occupant.
        let en_passant_capture =
            piece.kind() == Some(PieceKind::Pawn) && position.en_passant == Some(to) && from.col() != to.col();
        if en_passant_capture {
            let victim_sq = Square::from_row_col(from.row(), to.col())?;
            let victim = position.piece_at(victim_sq);
            if victim.kind() != Some(PieceKind::Pawn) {
                return None;
            }
            position.set_piece(victim_sq, Piece::Empty);
            details.captured = Some(victim);
            details.is_en_passant = true;
        } else {
            let occupant = position.piece_at(to);
            if !occupant.is_empty() {
                details.captured = Some(occupant);
            }
        }

        position.set_piece(to, piece);
        position.set_piece(from, Piece::Empty);

        // Phase 6: promotion on the last rank.
        let last_row = match color {
            PieceColor::White => 0,
            PieceColor::Black => 7,
        };
        if piece.kind() == Some(PieceKind::Pawn) && to.row() == last_row {
            let chosen = match chooser {
                Some(choose) => choose(from, to),
                None => Piece::new(color, PieceKind::Queen),
            };
            let promoted = if chosen.belongs_to(color) && chosen.promotion_suffix().is_some() {
                chosen
            } else {
                Piece::new(color, PieceKind::Queen)
            };
            position.set_piece(to, promoted);
            details.promotion = Some(promoted);
        }
    }

    // Phase 7: castling rights. A king move clears both of its rights;
    // a rook leaving home, or anything landing on a rook home square,
    // clears the matching one.
    update_castling_rights(position, piece, from, to);

    // Phase 8: king safety and the one-king invariant. Abort (the
    // caller rolls back) if either king is gone or the mover's king is
    // attacked.
    if position.king_square(color.opponent()).is_none() {
        return None;
    }
    match position.king_square(color) {
        Some(king) if !is_square_attacked(&position.grid, king, color.opponent()) => Some(details),
        _ => None,
    }
}

/// The extra castling predicates: the right is still set, the rook is
/// home, all squares strictly between king and rook are empty, and the
/// king's start, transit and destination squares are unattacked.
fn castle_allowed(position: &Position, color: PieceColor, king_side: bool) -> bool {
    let rights = position.castling;
    let allowed = match (color, king_side) {
        (PieceColor::White, true) => rights.white_king_side,
        (PieceColor::White, false) => rights.white_queen_side,
        (PieceColor::Black, true) => rights.black_king_side,
        (PieceColor::Black, false) => rights.black_queen_side,
    };
    if !allowed {
        return false;
    }

    let home_row = match color {
        PieceColor::White => 7,
        PieceColor::Black => 0,
    };
    let king_home = match Square::from_row_col(home_row, 4) {
        Some(sq) => sq,
        None => return false,
    };
    if position.piece_at(king_home) != Piece::new(color, PieceKind::King) {
        return false;
    }

    let rook_col = if king_side { 7 } else { 0 };
    let rook_home = match Square::from_row_col(home_row, rook_col) {
        Some(sq) => sq,
        None => return false,
    };
    if position.piece_at(rook_home) != Piece::new(color, PieceKind::Rook) {
        return false;
    }

    // Empty path between king and rook.
    let between: &[i8] = if king_side { &[5, 6] } else { &[1, 2, 3] };
    for &col in between {
        let sq = match Square::from_row_col(home_row, col) {
            Some(sq) => sq,
            None => return false,
        };
        if !position.piece_at(sq).is_empty() {
            return false;
        }
    }

    // The king may not castle out of, through, or into check.
    let transit: &[i8] = if king_side { &[4, 5, 6] } else { &[4, 3, 2] };
    let enemy = color.opponent();
    for &col in transit {
        let sq = match Square::from_row_col(home_row, col) {
            Some(sq) => sq,
            None => return false,
        };
        if is_square_attacked(&position.grid, sq, enemy) {
            return false;
        }
    }

    true
}

fn update_castling_rights(position: &mut Position, piece: Piece, from: Square, to: Square) {
    let rights = &mut position.castling;

    match piece {
        Piece::WhiteKing => {
            rights.white_king_side = false;
            rights.white_queen_side = false;
        }
        Piece::BlackKing => {
            rights.black_king_side = false;
            rights.black_queen_side = false;
        }
        _ => {}
    }

    // A rook leaving its home square, or any move landing on a rook
    // home square (capturing the rook), clears the matching right.
    for sq in [from, to] {
        match (sq.row(), sq.col()) {
            (7, 0) => rights.white_queen_side = false,
            (7, 7) => rights.white_king_side = false,
            (0, 0) => rights.black_queen_side = false,
            (0, 7) => rights.black_king_side = false,
            _ => {}
        }
    }
}

/// Whether the side to move has any legal reply.
///
/// Iterates every piece of the side to move against all 64 target
/// squares, tentatively applying each candidate on a scratch copy
/// (including en-passant capture and the castling rook handoff) and
/// rejecting those that leave the mover's king attacked. Promotion
/// during the scan always promotes to a queen; the choice cannot change
/// the legality answer.
fn has_legal_reply(position: &Position) -> bool {
    let mover = position.side_to_move;
    for from_idx in 0..64u8 {
        let from = match Square::from_index(from_idx) {
            Some(sq) => sq,
            None => continue,
        };
        if !position.piece_at(from).belongs_to(mover) {
            continue;
        }
        for to_idx in 0..64u8 {
            let to = match Square::from_index(to_idx) {
                Some(sq) => sq,
                None => continue,
            };
            if from == to {
                continue;
            }
            let mut scratch = position.clone();
            if execute_move(&mut scratch, from, to, None).is_some() {
                return true;
            }
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fen::START_FEN;

    #[test]
    fn test_rejected_move_leaves_fen_unchanged() {
        //! An illegal move must roll back to the byte-identical FEN
        let mut board = Board::new();
        let before = board.to_fen();

        assert!(!board.apply_move("e2", "e5")); // pawn cannot triple-step
        assert!(!board.apply_move("e7", "e5")); // not White's piece
        assert!(!board.apply_move("e2", "e2")); // null move
        assert!(!board.apply_move("zz", "e4")); // malformed square

        assert_eq!(board.to_fen(), before);
        assert!(board.move_history().is_empty());
    }

    #[test]
    fn test_apply_and_undo_round_trip() {
        //! undo restores the exact pre-move FEN
        let mut board = Board::new();
        let before = board.to_fen();

        assert!(board.apply_move("e2", "e4"));
        assert_ne!(board.to_fen(), before);

        let record = board.undo().unwrap();
        assert_eq!(record.to_uci(), "e2e4");
        assert_eq!(board.to_fen(), before);
        assert!(board.undo().is_none());
    }

    #[test]
    fn test_double_step_sets_en_passant_field() {
        //! 1. e4 yields an e3 en-passant target and Black to move
        let mut board = Board::new();
        assert!(board.apply_move("e2", "e4"));

        let fen = board.to_fen();
        assert_eq!(
            fen,
            "rnbqkbnr/pppppppp/8/8/4P3/8/PPPPPPPP/RNBQKBNR b KQkq e3 0 1"
        );
    }

    #[test]
    fn test_en_passant_capture_sequence() {
        //! e4, a6, e5, d5, exd6 e.p. removes the d5 pawn
        let mut board = Board::new();
        for (from, to) in [("e2", "e4"), ("a7", "a6"), ("e4", "e5"), ("d7", "d5")] {
            assert!(board.apply_move(from, to), "{from}-{to} should be legal");
        }

        assert!(board.apply_move("e5", "d6"));
        let record = *board.move_history().last().unwrap();
        assert!(record.is_en_passant);
        assert_eq!(record.captured, Some(Piece::BlackPawn));

        let fen = board.to_fen();
        let d5 = Square::from_algebraic("d5").unwrap();
        let d6 = Square::from_algebraic("d6").unwrap();
        assert!(board.position().piece_at(d5).is_empty());
        assert_eq!(board.position().piece_at(d6), Piece::WhitePawn);
        assert!(fen.starts_with("rnbqkbnr/1pp1pppp/p2P4/8/8/8/PPPP1PPP/RNBQKBNR"));
    }

    #[test]
    fn test_en_passant_window_closes() {
        //! The capture is legal only immediately after the double step
        let mut board = Board::new();
        for (from, to) in [
            ("e2", "e4"),
            ("a7", "a6"),
            ("e4", "e5"),
            ("d7", "d5"),
            ("h2", "h3"), // White declines the capture
            ("a6", "a5"),
        ] {
            assert!(board.apply_move(from, to));
        }
        assert!(!board.apply_move("e5", "d6"));
    }

    #[test]
    fn test_king_side_castle() {
        //! e1-g1 moves the h1 rook to f1 and clears White's rights
        let mut board = Board::from_fen("r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1").unwrap();
        assert!(board.apply_move("e1", "g1"));

        assert_eq!(board.to_fen(), "r3k2r/8/8/8/8/8/8/R4RK1 b kq - 1 1");
        let record = *board.move_history().last().unwrap();
        assert!(record.is_king_side_castle);
        assert!(!record.is_queen_side_castle);
    }

    #[test]
    fn test_castle_through_check_rejected() {
        //! A rook covering f1 forbids White's king-side castle
        let mut board = Board::from_fen("4k3/8/8/8/8/8/5r2/R3K2R w KQ - 0 1").unwrap();
        let before = board.to_fen();
        assert!(!board.apply_move("e1", "g1"));
        assert_eq!(board.to_fen(), before);
    }

    #[test]
    fn test_castle_out_of_check_rejected() {
        //! A checked king may not castle
        let mut board = Board::from_fen("4k3/8/8/8/8/8/4r3/R3K2R w KQ - 0 1").unwrap();
        assert!(!board.apply_move("e1", "g1"));
        assert!(!board.apply_move("e1", "c1"));
    }

    #[test]
    fn test_castle_after_rook_moved_rejected() {
        //! Rights stay cleared even after the rook returns home
        let mut board = Board::from_fen("r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1").unwrap();
        assert!(board.apply_move("a1", "a2"));
        assert!(board.apply_move("h8", "h7"));
        assert!(board.apply_move("a2", "a1")); // rook returns
        assert!(board.apply_move("h7", "h8"));

        assert!(!board.apply_move("e1", "c1"));
        assert!(board.apply_move("e1", "g1")); // king side was untouched
    }

    #[test]
    fn test_capturing_home_rook_clears_right() {
        //! Taking the h8 rook removes Black's king-side right
        let mut board = Board::from_fen("r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1").unwrap();
        assert!(board.apply_move("h1", "h8"));
        let fen = board.to_fen();
        let rights = fen.split_whitespace().nth(2).unwrap();
        assert_eq!(rights, "Qq");
    }

    #[test]
    fn test_promotion_defaults_to_queen() {
        //! A pawn reaching the last rank without a chooser becomes a queen
        let mut board = Board::from_fen("8/4P2k/8/8/8/8/8/4K3 w - - 0 1").unwrap();
        assert!(board.apply_move("e7", "e8"));

        let e8 = Square::from_algebraic("e8").unwrap();
        assert_eq!(board.position().piece_at(e8), Piece::WhiteQueen);
        assert_eq!(board.position().halfmove_clock, 0);
    }

    #[test]
    fn test_promotion_chooser_invalid_piece_overridden() {
        //! A chooser returning a wrong-color or non-promotion piece yields a queen
        let mut board = Board::from_fen("8/4P2k/8/8/8/8/8/4K3 w - - 0 1").unwrap();
        board.set_promotion_chooser(|_, _| Piece::BlackKing);
        assert!(board.apply_move("e7", "e8"));

        let e8 = Square::from_algebraic("e8").unwrap();
        assert_eq!(board.position().piece_at(e8), Piece::WhiteQueen);
    }

    #[test]
    fn test_promotion_chooser_honored() {
        //! A valid chooser result is installed verbatim
        let mut board = Board::from_fen("8/4P2k/8/8/8/8/8/4K3 w - - 0 1").unwrap();
        board.set_promotion_chooser(|_, _| Piece::WhiteKnight);
        assert!(board.apply_move("e7", "e8"));

        let e8 = Square::from_algebraic("e8").unwrap();
        assert_eq!(board.position().piece_at(e8), Piece::WhiteKnight);
        let record = *board.move_history().last().unwrap();
        assert_eq!(record.promotion, Some(Piece::WhiteKnight));
        assert_eq!(record.to_uci(), "e7e8n");
    }

    #[test]
    fn test_pinned_knight_cannot_move() {
        //! A knight shielding its king from a rook may not leave the file
        let mut board = Board::from_fen("4r3/8/8/8/8/8/4N3/4K3 w - - 0 1").unwrap();
        let before = board.to_fen();
        assert!(!board.apply_move("e2", "d4"));
        assert_eq!(board.to_fen(), before);
    }

    #[test]
    fn test_rook_move_clears_queen_side_right() {
        //! a1-a2, h8-h7, then e1-c1 is rejected
        let mut board = Board::from_fen("r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1").unwrap();
        assert!(board.apply_move("a1", "a2"));
        assert!(board.apply_move("h8", "h7"));
        let before = board.to_fen();
        assert!(!board.apply_move("e1", "c1"));
        assert_eq!(board.to_fen(), before);
    }

    #[test]
    fn test_checkmate_flag_on_scholars_mate() {
        //! Qxf7# is recorded as both check and checkmate
        let mut board = Board::new();
        for (from, to) in [
            ("e2", "e4"),
            ("e7", "e5"),
            ("f1", "c4"),
            ("b8", "c6"),
            ("d1", "h5"),
            ("g8", "f6"),
        ] {
            assert!(board.apply_move(from, to));
        }
        assert!(board.apply_move("h5", "f7"));

        let record = *board.move_history().last().unwrap();
        assert!(record.is_check);
        assert!(record.is_checkmate);
        assert!(board.is_checkmate());
        assert_eq!(board.phase(), GamePhase::Checkmate);
    }

    #[test]
    fn test_stalemate_detection() {
        //! Black to move, not in check, no legal reply
        let board = Board::from_fen("7k/5Q2/6K1/8/8/8/8/8 b - - 0 1").unwrap();
        assert!(!board.in_check(PieceColor::Black));
        assert!(board.is_stalemate());
        assert_eq!(board.phase(), GamePhase::Stalemate);
    }

    #[test]
    fn test_uci_move_list_replay() {
        //! Replaying uci_move_list() on a fresh board reproduces the FEN
        let mut board = Board::new();
        for (from, to) in [("e2", "e4"), ("e7", "e5"), ("g1", "f3"), ("b8", "c6")] {
            assert!(board.apply_move(from, to));
        }

        let mut replay = Board::new();
        for mv in board.uci_move_list() {
            assert!(replay.apply_uci_move(&mv), "{mv} should replay");
        }
        assert_eq!(replay.to_fen(), board.to_fen());
    }

    #[test]
    fn test_apply_uci_move_with_promotion_suffix() {
        //! The suffix overrides the registered chooser for one move
        let mut board = Board::from_fen("8/4P2k/8/8/8/8/8/4K3 w - - 0 1").unwrap();
        board.set_promotion_chooser(|_, _| Piece::WhiteQueen);
        assert!(board.apply_uci_move("e7e8r"));

        let e8 = Square::from_algebraic("e8").unwrap();
        assert_eq!(board.position().piece_at(e8), Piece::WhiteRook);
    }

    #[test]
    fn test_load_fen_failure_leaves_board_unchanged() {
        //! A bad FEN neither corrupts the position nor clears history
        let mut board = Board::new();
        assert!(board.apply_move("e2", "e4"));
        let before = board.to_fen();

        assert!(board.load_fen("not a fen").is_err());
        assert_eq!(board.to_fen(), before);
        assert_eq!(board.move_history().len(), 1);

        assert!(board.load_fen(START_FEN).is_ok());
        assert!(board.move_history().is_empty());
    }

    #[test]
    fn test_clock_bookkeeping() {
        //! Quiet piece moves advance the halfmove clock; pawn moves reset it
        let mut board = Board::new();
        assert!(board.apply_move("g1", "f3"));
        assert_eq!(board.position().halfmove_clock, 1);
        assert_eq!(board.position().fullmove_number, 1);

        assert!(board.apply_move("g8", "f6"));
        assert_eq!(board.position().halfmove_clock, 2);
        assert_eq!(board.position().fullmove_number, 2);

        assert!(board.apply_move("e2", "e4"));
        assert_eq!(board.position().halfmove_clock, 0);
    }

    #[test]
    fn test_history_stacks_stay_parallel() {
        //! |moves| == |snapshots| after every apply and undo
        let mut board = Board::new();
        assert!(board.apply_move("e2", "e4"));
        assert!(board.apply_move("e7", "e5"));
        assert_eq!(board.move_history().len(), 2);

        board.undo();
        assert_eq!(board.move_history().len(), 1);
        assert_eq!(board.uci_move_list(), vec!["e2e4".to_string()]);
    }
}
