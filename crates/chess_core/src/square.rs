//! Square indexing and algebraic notation
//!
//! A [`Square`] is a zero-based index 0..63 over the board with index 0
//! at a8 and index 63 at h1, rank 8 occupies row 0. Conversions from
//! algebraic notation ("a1".."h8") are partial: malformed strings yield
//! `None`, never a panic.

use std::fmt;

/// A board square as a 0..63 index. Row 0 = rank 8, column 0 = file a.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Square(u8);

impl Square {
    /// Build from a raw 0..63 index. Out-of-range indices yield `None`.
    pub fn from_index(index: u8) -> Option<Square> {
        if index < 64 {
            Some(Square(index))
        } else {
            None
        }
    }

    /// Build from row (0 = rank 8) and column (0 = file a).
    pub fn from_row_col(row: i8, col: i8) -> Option<Square> {
        if (0..8).contains(&row) && (0..8).contains(&col) {
            Some(Square((row * 8 + col) as u8))
        } else {
            None
        }
    }

    /// Parse algebraic notation ("e4"). Rejects strings of length ≠ 2,
    /// out-of-range files or ranks, and inverted order ("4e").
    pub fn from_algebraic(s: &str) -> Option<Square> {
        let mut chars = s.chars();
        let file = chars.next()?;
        let rank = chars.next()?;
        if chars.next().is_some() {
            return None;
        }
        if !('a'..='h').contains(&file) || !('1'..='8').contains(&rank) {
            return None;
        }
        let col = file as i8 - 'a' as i8;
        let row = 8 - (rank as i8 - '0' as i8);
        Square::from_row_col(row, col)
    }

    pub fn index(self) -> u8 {
        self.0
    }

    /// Row 0..7, counting from rank 8 down to rank 1.
    pub fn row(self) -> i8 {
        (self.0 / 8) as i8
    }

    /// Column 0..7, counting from file a.
    pub fn col(self) -> i8 {
        (self.0 % 8) as i8
    }

    /// The rank digit as printed in FEN and algebraic notation (1..8).
    pub fn rank(self) -> u8 {
        8 - self.0 / 8
    }

    /// Algebraic form ("a8".."h1").
    pub fn to_algebraic(self) -> String {
        let file = (b'a' + self.0 % 8) as char;
        let rank = (b'0' + self.rank()) as char;
        format!("{file}{rank}")
    }
}

impl fmt::Display for Square {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_algebraic())
    }
}
