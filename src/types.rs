use crate::constants::{NUM_FILES, NUM_RANKS};

/// A cell of the 8x8 grid. Row 0 is rank 8, column 0 is the a-file.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Square {
    pub row: u8,
    pub col: u8,
}

/// A single step on the grid, used for ray directions and knight jumps.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Offset {
    pub row: i8,
    pub col: i8,
}

#[repr(u8)]
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Piece {
    Pawn = 1,
    Knight,
    Bishop,
    Rook,
    Queen,
    King,
}

#[repr(u8)]
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Side {
    White = 0,
    Black = 1,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
pub struct CastleRights {
    pub king_side: [bool; 2],  // [side]
    pub queen_side: [bool; 2], // [side]
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
pub enum TerminalState {
    #[default]
    Ongoing,
    Checkmate,
    Stalemate,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum GameOutcome {
    WhiteWin,
    BlackWin,
    Draw,
}

/// Attack information about the king of the side to move, rebuilt on every move generation.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct CheckState {
    pub in_check: bool,
    pub checks: Vec<(Square, Offset)>, // Checking piece, direction from the king towards it
    pub pins: Vec<(Square, Offset)>,   // Pinned piece, direction from the king towards it
}

/// The 8x8 grid of piece codes (0 empty, 1-6 white, 11-16 black).
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Board {
    pub grid: [[u8; NUM_FILES]; NUM_RANKS],
}

/// A fully flagged move as produced by the legality engine.
///
/// Equality only compares `from`, `to` and `piece`. The trailing annotations are filled in when
/// the move is applied and are only read to reverse it.
#[derive(Copy, Clone, Debug)]
pub struct Move {
    pub piece: u8,
    pub captured: u8,
    pub from: Square,
    pub to: Square,
    pub is_en_passant: bool,
    pub is_castle: bool,
    pub is_promotion: bool,
    // Set on application
    pub broke_king_side_castle: bool,
    pub broke_queen_side_castle: bool,
    pub prior_en_passant: Option<Square>,
}

/// A move rebuilt from four character notation. It carries no special-move flags and must be
/// reconciled against the legal moves before it can be applied.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct NotationMove {
    pub piece: u8,
    pub from: Square,
    pub to: Square,
}
