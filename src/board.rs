use std::fmt;

use crate::{
    constants::{EMPTY, INIT_GRID, NUM_FILES, NUM_RANKS},
    types::{Board, Piece, Side, Square},
};

impl Default for Board {
    fn default() -> Self {
        Board::new()
    }
}

impl Board {
    pub fn new() -> Self {
        Self { grid: INIT_GRID }
    }

    pub fn empty() -> Self {
        Self {
            grid: [[EMPTY; NUM_FILES]; NUM_RANKS],
        }
    }

    #[inline]
    pub fn get(&self, square: Square) -> u8 {
        self.grid[square.row as usize][square.col as usize]
    }

    #[inline]
    pub fn set(&mut self, square: Square, code: u8) {
        self.grid[square.row as usize][square.col as usize] = code;
    }

    pub fn piece_at(&self, square: Square) -> Option<(Side, Piece)> {
        Piece::from_code(self.get(square))
    }

    pub fn is_empty(&self, square: Square) -> bool {
        self.get(square) == EMPTY
    }

    pub fn add_piece(&mut self, side: Side, piece: Piece, square: Square) {
        self.set(square, piece.code(side));
    }

    pub fn find_king(&self, side: Side) -> Option<Square> {
        let king = Piece::King.code(side);
        Square::iter().find(|&square| self.get(square) == king)
    }

    /// Moves a piece the way a game record implies, without any legality checks. Handles the rook
    /// of a castling king, the pawn taken en passant and promotion to a queen. Returns the code of
    /// the piece that moved.
    pub fn replay_notation(&mut self, from: Square, to: Square) -> u8 {
        let code = self.get(from);
        let captured = self.get(to);

        self.set(from, EMPTY);
        self.set(to, code);

        match Piece::from_code(code) {
            Some((side, Piece::King)) if from.col.abs_diff(to.col) == 2 => {
                if let Some((rook_from, rook_to)) = castle_rook_squares(to) {
                    self.set(rook_from, EMPTY);
                    self.set(rook_to, Piece::Rook.code(side));
                }
            }
            Some((side, Piece::Pawn)) => {
                if from.col != to.col && captured == EMPTY {
                    self.set(Square::new(from.row, to.col), EMPTY);
                }
                if to.row == side.promotion_row() {
                    self.set(to, Piece::Queen.code(side));
                }
            }
            _ => {}
        }

        code
    }
}

/// Rook relocation for a castling king landing on `king_to`: (rook from, rook to).
pub fn castle_rook_squares(king_to: Square) -> Option<(Square, Square)> {
    match (king_to.row, king_to.col) {
        (row @ (0 | 7), 2) => Some((Square::new(row, 0), Square::new(row, 3))),
        (row @ (0 | 7), 6) => Some((Square::new(row, 7), Square::new(row, 5))),
        _ => None,
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f)?;

        for row in 0..NUM_RANKS as u8 {
            write!(f, "{}  ", NUM_RANKS as u8 - row)?;

            for col in 0..NUM_FILES as u8 {
                let c = match self.piece_at(Square::new(row, col)) {
                    Some((side, piece)) => piece.to_char(side),
                    None => '.',
                };
                write!(f, " {}", c)?;
            }

            writeln!(f)?;
        }

        write!(f, "\n    a b c d e f g h")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::{WHITE_KING, WHITE_ROOK};

    #[test]
    fn replaying_a_castle_moves_the_rook() {
        let mut board = Board::new();
        for (from, to) in [("e2", "e4"), ("g1", "f3"), ("f1", "c4")] {
            board.replay_notation(Square::parse(from).unwrap(), Square::parse(to).unwrap());
        }

        let king = board.replay_notation(Square::parse("e1").unwrap(), Square::parse("g1").unwrap());

        assert_eq!(king, WHITE_KING);
        assert_eq!(board.get(Square::parse("f1").unwrap()), WHITE_ROOK);
        assert_eq!(board.get(Square::parse("h1").unwrap()), EMPTY);
    }

    #[test]
    fn initial_kings_are_on_the_e_file() {
        let board = Board::new();
        assert_eq!(board.find_king(Side::White), Some(Square::new(7, 4)));
        assert_eq!(board.find_king(Side::Black), Some(Square::new(0, 4)));
    }
}
