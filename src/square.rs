use std::fmt;

use crate::{
    constants::{NUM_FILES, NUM_RANKS},
    error::{EngineError, EngineResult},
    types::{Offset, Square},
};

impl Square {
    pub const fn new(row: u8, col: u8) -> Self {
        Square { row, col }
    }

    pub fn iter() -> impl Iterator<Item = Square> {
        (0..NUM_RANKS as u8).flat_map(|row| (0..NUM_FILES as u8).map(move |col| Square { row, col }))
    }

    /// The square `steps` steps away along `offset`, if it is still on the board.
    pub fn offset(self, offset: Offset, steps: i8) -> Option<Square> {
        let row = self.row as i8 + offset.row * steps;
        let col = self.col as i8 + offset.col * steps;

        if (0..NUM_RANKS as i8).contains(&row) && (0..NUM_FILES as i8).contains(&col) {
            Some(Square::new(row as u8, col as u8))
        } else {
            None
        }
    }

    /// Parses a two character coordinate such as `e4`.
    pub fn parse(text: &str) -> EngineResult<Square> {
        let bytes = text.as_bytes();

        if bytes.len() != 2
            || !(b'a'..=b'h').contains(&bytes[0])
            || !(b'1'..=b'8').contains(&bytes[1])
        {
            return Err(EngineError::InvalidNotation(text.to_string()));
        }

        let col = bytes[0] - b'a';
        let rank = bytes[1] - b'0';

        Ok(Square::new(NUM_RANKS as u8 - rank, col))
    }
}

impl fmt::Display for Square {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{}",
            (b'a' + self.col) as char,
            NUM_RANKS as u8 - self.row
        )
    }
}

impl Offset {
    pub const fn new(row: i8, col: i8) -> Self {
        Offset { row, col }
    }

    pub const fn reversed(self) -> Self {
        Offset::new(-self.row, -self.col)
    }
}
