use crate::{
    constants::{CASTLE_SCORE, INFINITY_SCORE, PAWN_KNIGHT_SQUARE_SCORE},
    position::Position,
    types::{Piece, Side, Square, TerminalState},
};

impl Position {
    /// Static score from white's point of view. Positive favours white.
    ///
    /// Reads `terminal_state` as left by the last move generation, so call `legal_moves` first
    /// when mate or stalemate matters.
    pub fn evaluate(&self) -> i32 {
        match self.terminal_state {
            TerminalState::Checkmate => {
                return match self.side {
                    Side::White => -INFINITY_SCORE,
                    Side::Black => INFINITY_SCORE,
                };
            }
            TerminalState::Stalemate => return 0,
            TerminalState::Ongoing => {}
        }

        let mut score = 0;

        for square in Square::iter() {
            let Some((side, piece)) = self.board.piece_at(square) else {
                continue;
            };

            let mut piece_score = piece.value();

            if matches!(piece, Piece::Pawn | Piece::Knight) {
                piece_score += PAWN_KNIGHT_SQUARE_SCORE[square.row as usize][square.col as usize];
            }

            match side {
                Side::White => score += piece_score,
                Side::Black => score -= piece_score,
            }
        }

        for move_ in self.move_history.iter().filter(|move_| move_.is_castle) {
            match Piece::from_code(move_.piece) {
                Some((Side::White, _)) => score += CASTLE_SCORE,
                Some((Side::Black, _)) => score -= CASTLE_SCORE,
                None => {}
            }
        }

        score
    }
}
