use crate::{
    constants::{DIRECTIONS, EMPTY, KNIGHT_OFFSETS},
    position::Position,
    types::{CheckState, Move, Offset, Piece, Side, Square, TerminalState},
};

const ROOK_DIRECTIONS: std::ops::Range<usize> = 0..4;
const BISHOP_DIRECTIONS: std::ops::Range<usize> = 4..8;

impl Position {
    /// Every legal move for the side to move, in row-major board order.
    ///
    /// Rebuilds `check_state` and marks checkmate or stalemate when nothing is playable.
    pub fn legal_moves(&mut self) -> Vec<Move> {
        let side = self.side;
        let king = self.king_pos[side as usize];
        let state = self.check_square(king);

        let mut moves = Vec::with_capacity(48);

        for square in Square::iter() {
            let Some((owner, piece)) = self.board.piece_at(square) else {
                continue;
            };
            if owner != side {
                continue;
            }

            let pin = state
                .pins
                .iter()
                .find(|(pinned, _)| *pinned == square)
                .map(|&(_, direction)| direction);

            match piece {
                Piece::Pawn => self.generate_pawn_moves(square, pin, &mut moves),
                Piece::Knight => {
                    // A pinned knight can never stay on its pin line
                    if pin.is_none() {
                        self.generate_knight_moves(square, &mut moves);
                    }
                }
                Piece::Bishop => {
                    self.generate_slider_moves(square, &DIRECTIONS[BISHOP_DIRECTIONS], pin, &mut moves)
                }
                Piece::Rook => {
                    self.generate_slider_moves(square, &DIRECTIONS[ROOK_DIRECTIONS], pin, &mut moves)
                }
                Piece::Queen => self.generate_slider_moves(square, &DIRECTIONS, pin, &mut moves),
                Piece::King => {
                    self.generate_king_moves(square, &mut moves);
                    if !state.in_check {
                        self.generate_castle_moves(square, &mut moves);
                    }
                }
            }
        }

        match state.checks.len() {
            0 => {}
            1 => {
                let (checker, _) = state.checks[0];
                let blocking = Self::check_ray(king, state.checks[0]);

                moves.retain(|move_| {
                    move_.from == king
                        || blocking.contains(&move_.to)
                        || (move_.is_en_passant
                            && Square::new(move_.from.row, move_.to.col) == checker)
                });
            }
            _ => moves.retain(|move_| move_.from == king),
        }

        // The pin scan cannot see two pawns leaving the same rank at once
        moves.retain(|&move_| !move_.is_en_passant || self.keeps_king_safe(move_));

        if moves.is_empty() {
            self.terminal_state = if state.in_check {
                TerminalState::Checkmate
            } else {
                TerminalState::Stalemate
            };
        }

        self.check_state = state;
        moves
    }

    /// Checks, pins and attack status of `square` from the side to move's point of view.
    pub fn check_square(&self, square: Square) -> CheckState {
        self.scan_square(square, self.side, false)
    }

    /// Whether the side not to move attacks `square`. The mover's king does not block rays.
    pub fn is_square_attacked(&self, square: Square) -> bool {
        self.scan_square(square, self.side, true).in_check
    }

    pub fn is_in_check(&self) -> bool {
        self.is_square_attacked(self.king_pos[self.side as usize])
    }

    fn scan_square(&self, square: Square, defender: Side, stop_at_first: bool) -> CheckState {
        let attacker = defender.opponent();
        let own_king = Piece::King.code(defender);
        let mut state = CheckState::default();

        for (index, &direction) in DIRECTIONS.iter().enumerate() {
            let mut possible_pin = None;

            for distance in 1..8 {
                let Some(target) = square.offset(direction, distance) else {
                    break;
                };

                let code = self.board.get(target);
                if code == EMPTY || code == own_king {
                    continue;
                }

                let Some((owner, piece)) = Piece::from_code(code) else {
                    break;
                };

                if owner == defender {
                    if possible_pin.is_some() {
                        break;
                    }
                    possible_pin = Some(target);
                    continue;
                }

                if attacks_along(piece, attacker, index, distance) {
                    match possible_pin {
                        Some(pinned) => state.pins.push((pinned, direction)),
                        None => {
                            state.in_check = true;
                            state.checks.push((target, direction));
                            if stop_at_first {
                                return state;
                            }
                        }
                    }
                }

                break;
            }
        }

        let enemy_knight = Piece::Knight.code(attacker);

        for offset in KNIGHT_OFFSETS {
            if let Some(target) = square.offset(offset, 1) {
                if self.board.get(target) == enemy_knight {
                    state.in_check = true;
                    state.checks.push((target, offset));
                    if stop_at_first {
                        return state;
                    }
                }
            }
        }

        state
    }

    /// Squares that resolve a single check: the path from the king up to and including the
    /// checking piece. For a knight this is only the knight itself.
    fn check_ray(king: Square, (checker, direction): (Square, Offset)) -> Vec<Square> {
        let mut squares = Vec::with_capacity(7);

        for distance in 1..8 {
            let Some(square) = king.offset(direction, distance) else {
                break;
            };
            squares.push(square);
            if square == checker {
                break;
            }
        }

        squares
    }

    fn keeps_king_safe(&mut self, move_: Move) -> bool {
        let mover = self.side;

        self.make_move(move_);
        let king = self.king_pos[mover as usize];
        let attacked = self.scan_square(king, mover, true).in_check;
        self.undo_move();

        !attacked
    }

    fn owned_by_side(&self, square: Square) -> bool {
        self.side.owns(self.board.get(square))
    }

    fn generate_pawn_moves(&self, square: Square, pin: Option<Offset>, moves: &mut Vec<Move>) {
        let side = self.side;
        let forward = Offset::new(side.pawn_direction(), 0);

        if along_pin(pin, forward) {
            if let Some(one) = square.offset(forward, 1) {
                if self.board.is_empty(one) {
                    moves.push(Move::new(&self.board, square, one));

                    if square.row == side.pawn_start_row() {
                        if let Some(two) = square.offset(forward, 2) {
                            if self.board.is_empty(two) {
                                moves.push(Move::new(&self.board, square, two));
                            }
                        }
                    }
                }
            }
        }

        for col in [-1, 1] {
            let diagonal = Offset::new(side.pawn_direction(), col);
            if !along_pin(pin, diagonal) {
                continue;
            }

            let Some(target) = square.offset(diagonal, 1) else {
                continue;
            };

            if side.opponent().owns(self.board.get(target)) {
                moves.push(Move::new(&self.board, square, target));
            } else if self.en_passant == Some(target)
                && self.board.is_empty(target)
                && self.board.get(Square::new(square.row, target.col))
                    == Piece::Pawn.code(side.opponent())
            {
                moves.push(Move::en_passant(&self.board, square, target));
            }
        }
    }

    fn generate_knight_moves(&self, square: Square, moves: &mut Vec<Move>) {
        for offset in KNIGHT_OFFSETS {
            if let Some(target) = square.offset(offset, 1) {
                if !self.owned_by_side(target) {
                    moves.push(Move::new(&self.board, square, target));
                }
            }
        }
    }

    fn generate_slider_moves(
        &self,
        square: Square,
        directions: &[Offset],
        pin: Option<Offset>,
        moves: &mut Vec<Move>,
    ) {
        for &direction in directions {
            if !along_pin(pin, direction) {
                continue;
            }

            for distance in 1..8 {
                let Some(target) = square.offset(direction, distance) else {
                    break;
                };

                if self.board.is_empty(target) {
                    moves.push(Move::new(&self.board, square, target));
                    continue;
                }

                if !self.owned_by_side(target) {
                    moves.push(Move::new(&self.board, square, target));
                }
                break;
            }
        }
    }

    fn generate_king_moves(&self, square: Square, moves: &mut Vec<Move>) {
        for direction in DIRECTIONS {
            if let Some(target) = square.offset(direction, 1) {
                if !self.owned_by_side(target) && !self.is_square_attacked(target) {
                    moves.push(Move::new(&self.board, square, target));
                }
            }
        }
    }

    fn generate_castle_moves(&self, square: Square, moves: &mut Vec<Move>) {
        let side = self.side;
        let row = side.home_row();
        let rook = Piece::Rook.code(side);

        if square != Square::new(row, 4) {
            return;
        }

        let empty = |cols: &[u8]| cols.iter().all(|&col| self.board.is_empty(Square::new(row, col)));
        let safe = |cols: &[u8]| {
            cols.iter()
                .all(|&col| !self.is_square_attacked(Square::new(row, col)))
        };

        if self.castle_rights.queen_side[side as usize]
            && self.board.get(Square::new(row, 0)) == rook
            && empty(&[1, 2, 3])
            && safe(&[2, 3])
        {
            moves.push(Move::castle(&self.board, square, Square::new(row, 2)));
        }

        if self.castle_rights.king_side[side as usize]
            && self.board.get(Square::new(row, 7)) == rook
            && empty(&[5, 6])
            && safe(&[5, 6])
        {
            moves.push(Move::castle(&self.board, square, Square::new(row, 6)));
        }
    }
}

/// Whether a piece of `attacker` found `distance` squares away along direction `index` hits the
/// scanned square.
fn attacks_along(piece: Piece, attacker: Side, index: usize, distance: i8) -> bool {
    match piece {
        Piece::Rook => ROOK_DIRECTIONS.contains(&index),
        Piece::Bishop => BISHOP_DIRECTIONS.contains(&index),
        Piece::Queen => true,
        Piece::Pawn => {
            distance == 1
                && match attacker {
                    Side::White => index == 6 || index == 7,
                    Side::Black => index == 4 || index == 5,
                }
        }
        Piece::King => distance == 1,
        Piece::Knight => false,
    }
}

/// A pinned piece may only travel along the line through its king.
fn along_pin(pin: Option<Offset>, direction: Offset) -> bool {
    pin.is_none_or(|pin| direction == pin || direction == pin.reversed())
}
