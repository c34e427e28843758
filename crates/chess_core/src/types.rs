//! Core value types for the rules engine
//!
//! This module defines the vocabulary the rest of the crate speaks:
//! pieces, colors, castling rights, move records and the [`Position`]
//! value that a [`crate::Board`] owns and snapshots.
//!
//! # Piece representation
//!
//! [`Piece`] is a flat enum of the twelve occupied variants plus an
//! `Empty` sentinel. Color and kind are pure functions of the variant,
//! so a square read never needs a second lookup. The FEN letters
//! (`PNBRQK` / `pnbrqk`) are the canonical character form.
//!
//! # Snapshots
//!
//! [`Position`] carries everything the FEN standard carries: the grid,
//! the side to move, castling rights, the en-passant target and both
//! clocks. It is `Clone`, and one full copy is sufficient to reverse
//! exactly one move, which is how [`crate::Board`] implements undo.

use crate::square::Square;

/// The two sides of a chess game.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PieceColor {
    White,
    Black,
}

impl PieceColor {
    /// The opposing side.
    pub fn opponent(self) -> PieceColor {
        match self {
            PieceColor::White => PieceColor::Black,
            PieceColor::Black => PieceColor::White,
        }
    }

    /// Row delta of a forward pawn step for this color.
    ///
    /// Row 0 is rank 8, so White pawns move toward smaller rows.
    pub fn pawn_direction(self) -> i8 {
        match self {
            PieceColor::White => -1,
            PieceColor::Black => 1,
        }
    }

    /// FEN active-color letter (`w` / `b`).
    pub fn fen_char(self) -> char {
        match self {
            PieceColor::White => 'w',
            PieceColor::Black => 'b',
        }
    }
}

/// The six piece kinds, independent of color.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PieceKind {
    Pawn,
    Knight,
    Bishop,
    Rook,
    Queen,
    King,
}

/// A board square's content: one of the twelve pieces, or nothing.
///
/// The `Empty` sentinel keeps the grid a dense 8×8 array of plain
/// values with no indirection.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Piece {
    #[default]
    Empty,
    WhitePawn,
    WhiteKnight,
    WhiteBishop,
    WhiteRook,
    WhiteQueen,
    WhiteKing,
    BlackPawn,
    BlackKnight,
    BlackBishop,
    BlackRook,
    BlackQueen,
    BlackKing,
}

impl Piece {
    /// Build a piece from its color and kind.
    pub fn new(color: PieceColor, kind: PieceKind) -> Piece {
        use PieceColor::*;
        use PieceKind::*;
        match (color, kind) {
            (White, Pawn) => Piece::WhitePawn,
            (White, Knight) => Piece::WhiteKnight,
            (White, Bishop) => Piece::WhiteBishop,
            (White, Rook) => Piece::WhiteRook,
            (White, Queen) => Piece::WhiteQueen,
            (White, King) => Piece::WhiteKing,
            (Black, Pawn) => Piece::BlackPawn,
            (Black, Knight) => Piece::BlackKnight,
            (Black, Bishop) => Piece::BlackBishop,
            (Black, Rook) => Piece::BlackRook,
            (Black, Queen) => Piece::BlackQueen,
            (Black, King) => Piece::BlackKing,
        }
    }

    pub fn is_empty(self) -> bool {
        self == Piece::Empty
    }

    /// Color of the piece, `None` for the empty sentinel.
    pub fn color(self) -> Option<PieceColor> {
        use Piece::*;
        match self {
            Empty => None,
            WhitePawn | WhiteKnight | WhiteBishop | WhiteRook | WhiteQueen | WhiteKing => {
                Some(PieceColor::White)
            }
            BlackPawn | BlackKnight | BlackBishop | BlackRook | BlackQueen | BlackKing => {
                Some(PieceColor::Black)
            }
        }
    }

    /// Kind of the piece, `None` for the empty sentinel.
    pub fn kind(self) -> Option<PieceKind> {
        use Piece::*;
        match self {
            Empty => None,
            WhitePawn | BlackPawn => Some(PieceKind::Pawn),
            WhiteKnight | BlackKnight => Some(PieceKind::Knight),
            WhiteBishop | BlackBishop => Some(PieceKind::Bishop),
            WhiteRook | BlackRook => Some(PieceKind::Rook),
            WhiteQueen | BlackQueen => Some(PieceKind::Queen),
            WhiteKing | BlackKing => Some(PieceKind::King),
        }
    }

    /// True when the piece is present and belongs to `color`.
    pub fn belongs_to(self, color: PieceColor) -> bool {
        self.color() == Some(color)
    }

    /// FEN letter for the piece; a space for the empty sentinel.
    ///
    /// White pieces are uppercase, black lowercase, per the FEN
    /// placement field.
    pub fn to_char(self) -> char {
        use Piece::*;
        match self {
            Empty => ' ',
            WhitePawn => 'P',
            WhiteKnight => 'N',
            WhiteBishop => 'B',
            WhiteRook => 'R',
            WhiteQueen => 'Q',
            WhiteKing => 'K',
            BlackPawn => 'p',
            BlackKnight => 'n',
            BlackBishop => 'b',
            BlackRook => 'r',
            BlackQueen => 'q',
            BlackKing => 'k',
        }
    }

    /// Parse a FEN placement letter. Unrecognized letters yield `None`.
    pub fn from_char(c: char) -> Option<Piece> {
        use Piece::*;
        match c {
            'P' => Some(WhitePawn),
            'N' => Some(WhiteKnight),
            'B' => Some(WhiteBishop),
            'R' => Some(WhiteRook),
            'Q' => Some(WhiteQueen),
            'K' => Some(WhiteKing),
            'p' => Some(BlackPawn),
            'n' => Some(BlackKnight),
            'b' => Some(BlackBishop),
            'r' => Some(BlackRook),
            'q' => Some(BlackQueen),
            'k' => Some(BlackKing),
            _ => None,
        }
    }

    /// Long-algebraic promotion suffix (`q`/`r`/`b`/`n`) for the piece,
    /// if it is a legal promotion target.
    pub fn promotion_suffix(self) -> Option<char> {
        match self.kind() {
            Some(PieceKind::Queen) => Some('q'),
            Some(PieceKind::Rook) => Some('r'),
            Some(PieceKind::Bishop) => Some('b'),
            Some(PieceKind::Knight) => Some('n'),
            _ => None,
        }
    }
}

/// The dense 8×8 board grid. Row 0 is rank 8, column 0 is file a.
pub type Grid = [[Piece; 8]; 8];

/// The four castling permissions.
///
/// A right is cleared when its king moves, its rook leaves its home
/// square, or the home-square rook is captured. Rights never come back.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CastlingRights {
    pub white_king_side: bool,
    pub white_queen_side: bool,
    pub black_king_side: bool,
    pub black_queen_side: bool,
}

impl CastlingRights {
    /// All four rights set, the standard starting state.
    pub fn all() -> CastlingRights {
        CastlingRights {
            white_king_side: true,
            white_queen_side: true,
            black_king_side: true,
            black_queen_side: true,
        }
    }

    /// No rights set.
    pub fn none() -> CastlingRights {
        CastlingRights {
            white_king_side: false,
            white_queen_side: false,
            black_king_side: false,
            black_queen_side: false,
        }
    }

    pub fn any(self) -> bool {
        self.white_king_side || self.white_queen_side || self.black_king_side || self.black_queen_side
    }

    /// FEN castling field: subset of `KQkq` in that order, `-` if empty.
    pub fn to_fen(self) -> String {
        if !self.any() {
            return "-".to_string();
        }
        let mut out = String::new();
        if self.white_king_side {
            out.push('K');
        }
        if self.white_queen_side {
            out.push('Q');
        }
        if self.black_king_side {
            out.push('k');
        }
        if self.black_queen_side {
            out.push('q');
        }
        out
    }
}

/// A frozen copy of the full game state.
///
/// Everything the six FEN fields carry. `Board` clones one of these
/// before every tentative move; restoring the clone rolls the move
/// back, including castling rights, the en-passant window and both
/// clocks.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Position {
    pub grid: Grid,
    pub side_to_move: PieceColor,
    pub castling: CastlingRights,
    pub en_passant: Option<Square>,
    pub halfmove_clock: u32,
    pub fullmove_number: u32,
}

impl Position {
    /// An empty grid with White to move and no rights. Mostly useful
    /// as a base for tests; real positions come from FEN parsing.
    pub fn empty() -> Position {
        Position {
            grid: [[Piece::Empty; 8]; 8],
            side_to_move: PieceColor::White,
            castling: CastlingRights::none(),
            en_passant: None,
            halfmove_clock: 0,
            fullmove_number: 1,
        }
    }

    pub fn piece_at(&self, sq: Square) -> Piece {
        self.grid[sq.row() as usize][sq.col() as usize]
    }

    pub fn set_piece(&mut self, sq: Square, piece: Piece) {
        self.grid[sq.row() as usize][sq.col() as usize] = piece;
    }

    /// Locate the king of `color`, if present.
    pub fn king_square(&self, color: PieceColor) -> Option<Square> {
        let king = Piece::new(color, PieceKind::King);
        for idx in 0..64u8 {
            let sq = Square::from_index(idx)?;
            if self.piece_at(sq) == king {
                return Some(sq);
            }
        }
        None
    }
}

/// Complete record of a single executed move.
///
/// Stores everything needed to render the move, rebuild the UCI move
/// list, and report check/checkmate status to the front-end.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MoveRecord {
    /// The piece that moved (as it stood on the from-square).
    pub piece: Piece,

    /// Starting square.
    pub from: Square,

    /// Destination square.
    pub to: Square,

    /// Piece removed from the board by this move, if any. For an
    /// en-passant capture this is the pawn behind the destination.
    pub captured: Option<Piece>,

    /// Piece installed on the destination when a pawn promoted.
    pub promotion: Option<Piece>,

    /// Whether any piece was captured.
    pub is_capture: bool,

    /// Whether the capture was en passant.
    pub is_en_passant: bool,

    /// King-side castle (king moved two files toward the h-rook).
    pub is_king_side_castle: bool,

    /// Queen-side castle (king moved two files toward the a-rook).
    pub is_queen_side_castle: bool,

    /// Move left the opponent's king attacked.
    pub is_check: bool,

    /// Move left the opponent checkmated.
    pub is_checkmate: bool,
}

impl MoveRecord {
    /// Long-algebraic form for the `position startpos moves …` command,
    /// e.g. `e2e4` or `e7e8q`.
    pub fn to_uci(&self) -> String {
        let mut out = format!("{}{}", self.from.to_algebraic(), self.to.to_algebraic());
        if let Some(suffix) = self.promotion.and_then(Piece::promotion_suffix) {
            out.push(suffix);
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_piece_color_is_pure_function_of_variant() {
        //! Verifies color() matches the variant naming for all twelve pieces
        assert_eq!(Piece::WhitePawn.color(), Some(PieceColor::White));
        assert_eq!(Piece::WhiteKing.color(), Some(PieceColor::White));
        assert_eq!(Piece::BlackQueen.color(), Some(PieceColor::Black));
        assert_eq!(Piece::BlackPawn.color(), Some(PieceColor::Black));
        assert_eq!(Piece::Empty.color(), None);
    }

    #[test]
    fn test_piece_char_round_trip() {
        //! FEN letter → piece → FEN letter is the identity for all twelve letters
        for c in "PNBRQKpnbrqk".chars() {
            let piece = Piece::from_char(c).unwrap();
            assert_eq!(piece.to_char(), c);
        }
        assert!(Piece::from_char('x').is_none());
        assert!(Piece::from_char('1').is_none());
    }

    #[test]
    fn test_piece_new_matches_accessors() {
        //! new(color, kind) must invert color()/kind()
        for color in [PieceColor::White, PieceColor::Black] {
            for kind in [
                PieceKind::Pawn,
                PieceKind::Knight,
                PieceKind::Bishop,
                PieceKind::Rook,
                PieceKind::Queen,
                PieceKind::King,
            ] {
                let piece = Piece::new(color, kind);
                assert_eq!(piece.color(), Some(color));
                assert_eq!(piece.kind(), Some(kind));
            }
        }
    }

    #[test]
    fn test_castling_rights_fen_order() {
        //! FEN renders rights in KQkq order and `-` when empty
        assert_eq!(CastlingRights::all().to_fen(), "KQkq");
        assert_eq!(CastlingRights::none().to_fen(), "-");

        let mut rights = CastlingRights::none();
        rights.black_queen_side = true;
        rights.white_king_side = true;
        assert_eq!(rights.to_fen(), "Kq");
    }

    #[test]
    fn test_pawn_direction() {
        //! White pawns move toward row 0 (rank 8)
        assert_eq!(PieceColor::White.pawn_direction(), -1);
        assert_eq!(PieceColor::Black.pawn_direction(), 1);
    }

    #[test]
    fn test_move_record_uci_with_promotion() {
        //! Promotion suffix appended in long algebraic form
        let record = MoveRecord {
            piece: Piece::WhitePawn,
            from: Square::from_algebraic("e7").unwrap(),
            to: Square::from_algebraic("e8").unwrap(),
            captured: None,
            promotion: Some(Piece::WhiteQueen),
            is_capture: false,
            is_en_passant: false,
            is_king_side_castle: false,
            is_queen_side_castle: false,
            is_check: false,
            is_checkmate: false,
        };
        assert_eq!(record.to_uci(), "e7e8q");
    }
}
