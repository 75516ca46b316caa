//! Board coordinates
//!
//! A [`Square`] is always a valid coordinate: the only ways to build one are
//! [`Square::new`] (bounds checked) and parsing algebraic text. That keeps the
//! "both squares must be valid board coordinates" rule in the type system
//! instead of in every caller.

use crate::error::RulesError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A square on the 8x8 board, stored as zero-based file and rank
///
/// File 0 is the a-file, rank 0 is the first rank (White's back rank).
/// Serializes as algebraic text (`"e4"`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Square {
    file: u8,
    rank: u8,
}

impl Square {
    /// Build a square from zero-based file and rank, `None` if off the board
    pub fn new(file: u8, rank: u8) -> Option<Self> {
        (file < 8 && rank < 8).then_some(Self { file, rank })
    }

    /// Build a square from a 0..64 index (a1 = 0, b1 = 1, ..., h8 = 63)
    pub fn from_index(index: u8) -> Option<Self> {
        (index < 64).then_some(Self {
            file: index % 8,
            rank: index / 8,
        })
    }

    pub fn file(self) -> u8 {
        self.file
    }

    pub fn rank(self) -> u8 {
        self.rank
    }

    /// Index in a1 = 0 .. h8 = 63 order
    pub fn index(self) -> u8 {
        self.rank * 8 + self.file
    }

    /// Iterate all 64 squares in index order
    pub fn all() -> impl Iterator<Item = Square> {
        (0..64u8).filter_map(Square::from_index)
    }
}

impl fmt::Display for Square {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", (b'a' + self.file) as char, self.rank + 1)
    }
}

impl FromStr for Square {
    type Err = RulesError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        let invalid = || RulesError::InvalidSquare {
            text: text.to_string(),
        };

        let bytes = text.trim().as_bytes();
        if bytes.len() != 2 {
            return Err(invalid());
        }

        let file = bytes[0].to_ascii_lowercase();
        let rank = bytes[1];
        if !(b'a'..=b'h').contains(&file) || !(b'1'..=b'8').contains(&rank) {
            return Err(invalid());
        }

        Square::new(file - b'a', rank - b'1').ok_or_else(invalid)
    }
}

impl TryFrom<String> for Square {
    type Error = RulesError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Square> for String {
    fn from(square: Square) -> Self {
        square.to_string()
    }
}
