use crate::{
    board::castle_rook_squares,
    constants::{EMPTY, FIFTY_MOVE_PLIES, INIT_FEN, NUM_FILES, NUM_RANKS, NUM_SIDES},
    error::{EngineError, EngineResult},
    types::{
        Board, CastleRights, CheckState, GameOutcome, Move, Piece, Side, Square, TerminalState,
    },
};

#[derive(Clone, Debug)]
pub struct Position {
    pub board: Board,
    pub side: Side,
    pub king_pos: [Square; NUM_SIDES], // Always in sync with the grid
    pub castle_rights: CastleRights,
    pub en_passant: Option<Square>, // Square a pawn may capture onto this ply
    pub move_history: Vec<Move>,
    // Recomputed by move generation
    pub check_state: CheckState,
    pub terminal_state: TerminalState,
}

impl Default for Position {
    fn default() -> Self {
        Position::new()
    }
}

impl CastleRights {
    pub const fn all() -> Self {
        CastleRights {
            king_side: [true; NUM_SIDES],
            queen_side: [true; NUM_SIDES],
        }
    }

    pub const fn none() -> Self {
        CastleRights {
            king_side: [false; NUM_SIDES],
            queen_side: [false; NUM_SIDES],
        }
    }
}

impl Position {
    pub fn new() -> Self {
        Position {
            board: Board::new(),
            side: Side::White,
            king_pos: [Square::new(7, 4), Square::new(0, 4)],
            castle_rights: CastleRights::all(),
            en_passant: None,
            move_history: Vec::new(),
            check_state: CheckState::default(),
            terminal_state: TerminalState::Ongoing,
        }
    }

    /// Restores the initial position in place.
    pub fn reset(&mut self) {
        *self = Position::new();
    }

    /// Applies a move produced by the legality engine. The move's annotations are filled in and it
    /// is appended to the history so `undo_move` can reverse it exactly. Check state is not
    /// recomputed here.
    pub fn make_move(&mut self, mut move_: Move) {
        let side = self.side;
        let s = side as usize;

        move_.prior_en_passant = self.en_passant;
        move_.broke_king_side_castle = false;
        move_.broke_queen_side_castle = false;

        let placed = if move_.is_promotion {
            Piece::Queen.code(side)
        } else {
            move_.piece
        };

        self.board.set(move_.from, EMPTY);
        self.board.set(move_.to, placed);

        if move_.is_en_passant {
            self.board.set(Square::new(move_.from.row, move_.to.col), EMPTY);
        }

        if move_.is_castle {
            if let Some((rook_from, rook_to)) = castle_rook_squares(move_.to) {
                self.board.set(rook_from, EMPTY);
                self.board.set(rook_to, Piece::Rook.code(side));
            }
        }

        match Piece::from_code(move_.piece) {
            Some((_, Piece::King)) => {
                self.king_pos[s] = move_.to;

                if self.castle_rights.king_side[s] {
                    self.castle_rights.king_side[s] = false;
                    move_.broke_king_side_castle = true;
                }
                if self.castle_rights.queen_side[s] {
                    self.castle_rights.queen_side[s] = false;
                    move_.broke_queen_side_castle = true;
                }
            }
            Some((_, Piece::Rook)) if move_.from.row == side.home_row() => {
                if move_.from.col == 7 && self.castle_rights.king_side[s] {
                    self.castle_rights.king_side[s] = false;
                    move_.broke_king_side_castle = true;
                }
                if move_.from.col == 0 && self.castle_rights.queen_side[s] {
                    self.castle_rights.queen_side[s] = false;
                    move_.broke_queen_side_castle = true;
                }
            }
            _ => {}
        }

        self.en_passant = self.en_passant_target_after(&move_, side);

        self.move_history.push(move_);
        self.side = side.opponent();
        self.refresh_terminal_state();
    }

    /// Reverses the most recently applied move and returns it. `None` when the history is empty.
    pub fn undo_move(&mut self) -> Option<Move> {
        let move_ = self.move_history.pop()?;

        let side = self.side.opponent(); // Side that made the move
        let s = side as usize;
        self.side = side;

        self.board.set(move_.from, move_.piece);
        self.board.set(move_.to, move_.captured);

        if move_.is_en_passant {
            self.board.set(
                Square::new(move_.from.row, move_.to.col),
                Piece::Pawn.code(side.opponent()),
            );
        }

        if move_.is_castle {
            if let Some((rook_from, rook_to)) = castle_rook_squares(move_.to) {
                self.board.set(rook_to, EMPTY);
                self.board.set(rook_from, Piece::Rook.code(side));
            }
        }

        if matches!(Piece::from_code(move_.piece), Some((_, Piece::King))) {
            self.king_pos[s] = move_.from;
        }

        if move_.broke_king_side_castle {
            self.castle_rights.king_side[s] = true;
        }
        if move_.broke_queen_side_castle {
            self.castle_rights.queen_side[s] = true;
        }

        self.en_passant = move_.prior_en_passant;
        self.refresh_terminal_state();

        Some(move_)
    }

    /// Square skipped by a double pawn push, recorded only when an enemy pawn could take it.
    fn en_passant_target_after(&self, move_: &Move, side: Side) -> Option<Square> {
        if !move_.is_pawn_move() || move_.from.row.abs_diff(move_.to.row) != 2 {
            return None;
        }

        let enemy_pawn = Piece::Pawn.code(side.opponent());
        let capturable = [-1, 1].into_iter().any(|dc: i8| {
            let col = move_.to.col as i8 + dc;
            (0..NUM_FILES as i8).contains(&col)
                && self.board.get(Square::new(move_.to.row, col as u8)) == enemy_pawn
        });

        capturable.then(|| Square::new((move_.from.row + move_.to.row) / 2, move_.to.col))
    }

    fn refresh_terminal_state(&mut self) {
        self.terminal_state = if self.is_fifty_move_draw() {
            TerminalState::Stalemate
        } else {
            TerminalState::Ongoing
        };
    }

    /// The last fifty plies contain no capture and no pawn move.
    pub fn is_fifty_move_draw(&self) -> bool {
        self.move_history.len() >= FIFTY_MOVE_PLIES
            && self.move_history[self.move_history.len() - FIFTY_MOVE_PLIES..]
                .iter()
                .all(|move_| !move_.is_capture() && !move_.is_pawn_move())
    }

    pub fn is_terminal(&self) -> bool {
        self.terminal_state != TerminalState::Ongoing
    }

    /// Result of a finished game, `None` while it is still being played.
    pub fn outcome(&self) -> Option<GameOutcome> {
        match self.terminal_state {
            TerminalState::Ongoing => None,
            TerminalState::Stalemate => Some(GameOutcome::Draw),
            TerminalState::Checkmate => Some(match self.side {
                Side::White => GameOutcome::BlackWin,
                Side::Black => GameOutcome::WhiteWin,
            }),
        }
    }

    pub fn last_move(&self) -> Option<&Move> {
        self.move_history.last()
    }

    /// Loads placement, side to move, castling rights and en passant square. Clocks are ignored.
    pub fn from_fen(fen: &str) -> EngineResult<Self> {
        let invalid = |reason: &str| EngineError::InvalidFen(format!("{reason}: {fen}"));
        let mut parts = fen.split_whitespace();

        let placement = parts.next().ok_or_else(|| invalid("missing placement"))?;
        let rows: Vec<&str> = placement.split('/').collect();
        if rows.len() != NUM_RANKS {
            return Err(invalid("expected 8 ranks"));
        }

        let mut board = Board::empty();

        for (row, text) in rows.iter().enumerate() {
            let mut col = 0usize;

            for c in text.chars() {
                if let Some(skip) = c.to_digit(10) {
                    col += skip as usize;
                } else {
                    let (side, piece) =
                        Piece::from_char(c).ok_or_else(|| invalid("unknown piece"))?;
                    if col >= NUM_FILES {
                        return Err(invalid("rank too long"));
                    }
                    board.add_piece(side, piece, Square::new(row as u8, col as u8));
                    col += 1;
                }
            }

            if col != NUM_FILES {
                return Err(invalid("rank has wrong length"));
            }
        }

        let side = match parts.next().unwrap_or("w") {
            "w" => Side::White,
            "b" => Side::Black,
            _ => return Err(invalid("bad side to move")),
        };

        let mut castle_rights = CastleRights::none();
        for c in parts.next().unwrap_or("-").chars() {
            match c {
                'K' => castle_rights.king_side[Side::White as usize] = true,
                'Q' => castle_rights.queen_side[Side::White as usize] = true,
                'k' => castle_rights.king_side[Side::Black as usize] = true,
                'q' => castle_rights.queen_side[Side::Black as usize] = true,
                '-' => {}
                _ => return Err(invalid("bad castling field")),
            }
        }

        let en_passant = match parts.next().unwrap_or("-") {
            "-" => None,
            square => Some(Square::parse(square).map_err(|_| invalid("bad en passant square"))?),
        };

        let white_king = board
            .find_king(Side::White)
            .ok_or_else(|| invalid("white king missing"))?;
        let black_king = board
            .find_king(Side::Black)
            .ok_or_else(|| invalid("black king missing"))?;

        Ok(Position {
            board,
            side,
            king_pos: [white_king, black_king],
            castle_rights,
            en_passant,
            move_history: Vec::new(),
            check_state: CheckState::default(),
            terminal_state: TerminalState::Ongoing,
        })
    }

    pub fn to_fen(&self) -> String {
        let mut placement = String::new();

        for row in 0..NUM_RANKS as u8 {
            let mut empty = 0;

            for col in 0..NUM_FILES as u8 {
                match self.board.piece_at(Square::new(row, col)) {
                    Some((side, piece)) => {
                        if empty > 0 {
                            placement.push_str(&empty.to_string());
                            empty = 0;
                        }
                        placement.push(piece.to_char(side));
                    }
                    None => empty += 1,
                }
            }

            if empty > 0 {
                placement.push_str(&empty.to_string());
            }
            if row < NUM_RANKS as u8 - 1 {
                placement.push('/');
            }
        }

        let side = match self.side {
            Side::White => "w",
            Side::Black => "b",
        };

        let mut castling = String::new();
        let rights = &self.castle_rights;
        for (flag, c) in [
            (rights.king_side[Side::White as usize], 'K'),
            (rights.queen_side[Side::White as usize], 'Q'),
            (rights.king_side[Side::Black as usize], 'k'),
            (rights.queen_side[Side::Black as usize], 'q'),
        ] {
            if flag {
                castling.push(c);
            }
        }
        if castling.is_empty() {
            castling.push('-');
        }

        let en_passant = self
            .en_passant
            .map_or_else(|| "-".to_string(), |square| square.to_string());

        let halfmove = self
            .move_history
            .iter()
            .rev()
            .take_while(|move_| !move_.is_capture() && !move_.is_pawn_move())
            .count();
        let fullmove = 1 + self.move_history.len() / 2;

        format!("{placement} {side} {castling} {en_passant} {halfmove} {fullmove}")
    }

    pub fn is_initial(&self) -> bool {
        self.to_fen() == INIT_FEN
    }
}
