use crate::{
    constants::{BLACK_OFFSET, EMPTY},
    types::{Piece, Side},
};

impl Piece {
    /// Material value used by the evaluator and for capture ordering.
    pub const fn value(self) -> i32 {
        match self {
            Piece::Pawn => 10,
            Piece::Knight => 30,
            Piece::Bishop => 30,
            Piece::Rook => 50,
            Piece::Queen => 90,
            Piece::King => 0,
        }
    }

    /// Grid code for this piece when owned by `side`.
    pub const fn code(self, side: Side) -> u8 {
        match side {
            Side::White => self as u8,
            Side::Black => self as u8 + BLACK_OFFSET,
        }
    }

    /// Splits a grid code into owner and kind. `None` for an empty or unknown code.
    pub fn from_code(code: u8) -> Option<(Side, Piece)> {
        match code {
            EMPTY => None,
            1..=6 => Piece::try_from(code).ok().map(|piece| (Side::White, piece)),
            11..=16 => Piece::try_from(code - BLACK_OFFSET)
                .ok()
                .map(|piece| (Side::Black, piece)),
            _ => None,
        }
    }

    /// Value of whatever occupies a grid cell, zero when empty.
    pub fn value_of_code(code: u8) -> i32 {
        Piece::from_code(code).map_or(0, |(_, piece)| piece.value())
    }

    pub fn to_char(self, side: Side) -> char {
        let c = match self {
            Piece::Pawn => 'p',
            Piece::Knight => 'n',
            Piece::Bishop => 'b',
            Piece::Rook => 'r',
            Piece::Queen => 'q',
            Piece::King => 'k',
        };

        match side {
            Side::White => c.to_ascii_uppercase(),
            Side::Black => c,
        }
    }

    pub fn from_char(c: char) -> Option<(Side, Piece)> {
        let side = if c.is_ascii_uppercase() {
            Side::White
        } else {
            Side::Black
        };

        let piece = match c.to_ascii_lowercase() {
            'p' => Piece::Pawn,
            'n' => Piece::Knight,
            'b' => Piece::Bishop,
            'r' => Piece::Rook,
            'q' => Piece::Queen,
            'k' => Piece::King,
            _ => return None,
        };

        Some((side, piece))
    }
}

impl TryFrom<u8> for Piece {
    type Error = &'static str;

    /// Converts from the colourless piece number (1-6)
    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Piece::Pawn),
            2 => Ok(Piece::Knight),
            3 => Ok(Piece::Bishop),
            4 => Ok(Piece::Rook),
            5 => Ok(Piece::Queen),
            6 => Ok(Piece::King),
            _ => Err("Piece index out of range (must be 1-6)"),
        }
    }
}

impl Side {
    pub const fn opponent(self) -> Side {
        match self {
            Side::White => Side::Black,
            Side::Black => Side::White,
        }
    }

    /// Direction a pawn of this side advances in grid rows.
    pub const fn pawn_direction(self) -> i8 {
        match self {
            Side::White => -1,
            Side::Black => 1,
        }
    }

    pub const fn home_row(self) -> u8 {
        match self {
            Side::White => 7,
            Side::Black => 0,
        }
    }

    pub const fn pawn_start_row(self) -> u8 {
        match self {
            Side::White => 6,
            Side::Black => 1,
        }
    }

    pub const fn promotion_row(self) -> u8 {
        match self {
            Side::White => 0,
            Side::Black => 7,
        }
    }

    /// Whether a grid code belongs to this side.
    pub fn owns(self, code: u8) -> bool {
        matches!(Piece::from_code(code), Some((side, _)) if side == self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::*;

    #[test]
    fn codes_round_trip_for_both_sides() {
        assert_eq!(Piece::Queen.code(Side::White), WHITE_QUEEN);
        assert_eq!(Piece::Queen.code(Side::Black), BLACK_QUEEN);
        assert_eq!(Piece::from_code(BLACK_KING), Some((Side::Black, Piece::King)));
        assert_eq!(Piece::from_code(EMPTY), None);
        assert_eq!(Piece::from_code(7), None);
    }

    #[test]
    fn every_code_maps_back_to_itself() {
        for code in [
            WHITE_PAWN, WHITE_KNIGHT, WHITE_BISHOP, WHITE_ROOK, WHITE_QUEEN, WHITE_KING,
            BLACK_PAWN, BLACK_KNIGHT, BLACK_BISHOP, BLACK_ROOK, BLACK_QUEEN, BLACK_KING,
        ] {
            let (side, piece) = Piece::from_code(code).expect("valid code");
            assert_eq!(piece.code(side), code);
            assert!(side.owns(code));
            assert!(!side.opponent().owns(code));
        }
    }

    #[test]
    fn king_has_no_material_value() {
        assert_eq!(Piece::King.value(), 0);
        assert_eq!(Piece::value_of_code(BLACK_QUEEN), 90);
    }
}
