use std::fmt;

use crate::{
    error::{EngineError, EngineResult},
    types::{Board, Move, NotationMove, Piece, Square},
};

impl Move {
    /// Builds a plain move from the current grid contents. Promotion is derived from the
    /// destination row; en passant and castling are added by the generator.
    pub fn new(board: &Board, from: Square, to: Square) -> Self {
        let piece = board.get(from);

        let is_promotion = matches!(
            Piece::from_code(piece),
            Some((side, Piece::Pawn)) if to.row == side.promotion_row()
        );

        Move {
            piece,
            captured: board.get(to),
            from,
            to,
            is_en_passant: false,
            is_castle: false,
            is_promotion,
            broke_king_side_castle: false,
            broke_queen_side_castle: false,
            prior_en_passant: None,
        }
    }

    pub fn en_passant(board: &Board, from: Square, to: Square) -> Self {
        Move {
            is_en_passant: true,
            ..Move::new(board, from, to)
        }
    }

    pub fn castle(board: &Board, from: Square, to: Square) -> Self {
        Move {
            is_castle: true,
            ..Move::new(board, from, to)
        }
    }

    /// Four character coordinate notation, e.g. `e2e4`.
    pub fn notation(&self) -> String {
        format!("{}{}", self.from, self.to)
    }

    pub fn is_capture(&self) -> bool {
        self.captured != 0 || self.is_en_passant
    }

    pub fn is_pawn_move(&self) -> bool {
        matches!(Piece::from_code(self.piece), Some((_, Piece::Pawn)))
    }

    /// Material value of the captured piece, used for move ordering.
    pub fn capture_value(&self) -> i32 {
        Piece::value_of_code(self.captured)
    }
}

impl PartialEq for Move {
    fn eq(&self, other: &Self) -> bool {
        self.from == other.from && self.to == other.to && self.piece == other.piece
    }
}

impl Eq for Move {}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.from, self.to)
    }
}

impl NotationMove {
    /// Synthesizes a move from notation, reading the moving piece from `board`.
    pub fn parse(board: &Board, notation: &str) -> EngineResult<Self> {
        let (from, to) = parse_coordinates(notation)?;

        Ok(NotationMove {
            piece: board.get(from),
            from,
            to,
        })
    }

    pub fn matches(&self, legal: &Move) -> bool {
        self.from == legal.from && self.to == legal.to && self.piece == legal.piece
    }

    /// The fully flagged legal move this notation stands for, if there is one.
    pub fn reconcile(&self, legal_moves: &[Move]) -> Option<Move> {
        legal_moves.iter().copied().find(|legal| self.matches(legal))
    }

    /// Like `reconcile`, but reports a mismatch as an error.
    pub fn reconcile_or_err(&self, legal_moves: &[Move]) -> EngineResult<Move> {
        self.reconcile(legal_moves)
            .ok_or_else(|| EngineError::IllegalMove {
                notation: self.notation(),
            })
    }

    pub fn notation(&self) -> String {
        format!("{}{}", self.from, self.to)
    }
}

impl fmt::Display for NotationMove {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.from, self.to)
    }
}

/// Splits `e2e4` into its two squares.
pub fn parse_coordinates(notation: &str) -> EngineResult<(Square, Square)> {
    let invalid = || EngineError::InvalidNotation(notation.to_string());

    if notation.len() != 4 {
        return Err(invalid());
    }

    let from = Square::parse(notation.get(0..2).ok_or_else(invalid)?)?;
    let to = Square::parse(notation.get(2..4).ok_or_else(invalid)?)?;

    Ok((from, to))
}

/// Converts a game record, starting from the initial position, into under-flagged moves by
/// replaying it on a scratch grid. No legality checks are made.
pub fn notation_list_to_moves<S: AsRef<str>>(notations: &[S]) -> EngineResult<Vec<NotationMove>> {
    let mut board = Board::new();

    notations
        .iter()
        .map(|notation| {
            let (from, to) = parse_coordinates(notation.as_ref())?;
            let piece = board.replay_notation(from, to);
            Ok(NotationMove { piece, from, to })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::WHITE_KNIGHT;

    #[test]
    fn equality_ignores_flags() {
        let board = Board::new();
        let from = Square::parse("e2").unwrap();
        let to = Square::parse("e4").unwrap();

        let mut flagged = Move::new(&board, from, to);
        flagged.broke_king_side_castle = true;
        flagged.is_en_passant = true;

        assert_eq!(flagged, Move::new(&board, from, to));
    }

    #[test]
    fn notation_list_tracks_moved_pieces() {
        let moves = notation_list_to_moves(&["e2e4", "e7e5", "g1f3", "b8c6", "f3e5"]).unwrap();

        assert_eq!(moves.len(), 5);
        assert_eq!(moves[4].piece, WHITE_KNIGHT, "Knight should be read from f3, got {:?}", moves[4]);
    }

    #[test]
    fn bad_notation_is_an_error() {
        assert!(parse_coordinates("e2e").is_err());
        assert!(parse_coordinates("e2e9").is_err());
        assert!(parse_coordinates("é2e4").is_err());
    }
}
