/// NOTE: 1 ply = one move by a single player
/// NOTE: grid row 0 is black's back rank (rank 8), row 7 is white's home rank (rank 1)
use crate::types::Offset;

pub const NUM_SIDES: usize = 2;
pub const NUM_RANKS: usize = 8;
pub const NUM_FILES: usize = 8;

// Piece codes stored in the grid. Black codes are the white code plus `BLACK_OFFSET`.
pub const EMPTY: u8 = 0;
pub const BLACK_OFFSET: u8 = 10;

pub const WHITE_PAWN: u8 = 1;
pub const WHITE_KNIGHT: u8 = 2;
pub const WHITE_BISHOP: u8 = 3;
pub const WHITE_ROOK: u8 = 4;
pub const WHITE_QUEEN: u8 = 5;
pub const WHITE_KING: u8 = 6;

pub const BLACK_PAWN: u8 = 11;
pub const BLACK_KNIGHT: u8 = 12;
pub const BLACK_BISHOP: u8 = 13;
pub const BLACK_ROOK: u8 = 14;
pub const BLACK_QUEEN: u8 = 15;
pub const BLACK_KING: u8 = 16;

#[rustfmt::skip]
pub const INIT_GRID: [[u8; NUM_FILES]; NUM_RANKS] = [
    [14, 12, 13, 15, 16, 13, 12, 14],
    [11, 11, 11, 11, 11, 11, 11, 11],
    [ 0,  0,  0,  0,  0,  0,  0,  0],
    [ 0,  0,  0,  0,  0,  0,  0,  0],
    [ 0,  0,  0,  0,  0,  0,  0,  0],
    [ 0,  0,  0,  0,  0,  0,  0,  0],
    [ 1,  1,  1,  1,  1,  1,  1,  1],
    [ 4,  2,  3,  5,  6,  3,  2,  4],
];

pub const INIT_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

/// Centre bonus shared by pawns and knights. Added for white pieces, subtracted for black ones.
#[rustfmt::skip]
pub const PAWN_KNIGHT_SQUARE_SCORE: [[i32; NUM_FILES]; NUM_RANKS] = [
    [0, 0, 0, 0, 0, 0, 0, 0],
    [0, 0, 0, 0, 0, 0, 0, 0],
    [0, 0, 2, 1, 1, 2, 0, 0],
    [0, 0, 2, 4, 4, 2, 0, 0],
    [0, 0, 2, 4, 4, 2, 0, 0],
    [0, 0, 2, 1, 1, 2, 0, 0],
    [0, 0, 0, 0, 0, 0, 0, 0],
    [0, 0, 0, 0, 0, 0, 0, 0],
];

/// Awarded once per castling move found in the move history.
pub const CASTLE_SCORE: i32 = 25;

/// Returned for checkmate. Sign depends on the side that was mated.
pub const INFINITY_SCORE: i32 = 1_000_000;

/// Ray directions scanned from a square. Indices 0-3 are rook axes, 4-7 are diagonals.
#[rustfmt::skip]
pub const DIRECTIONS: [Offset; 8] = [
    Offset::new(-1,  0), Offset::new( 0,  1), Offset::new( 0, -1), Offset::new( 1,  0),
    Offset::new(-1, -1), Offset::new(-1,  1), Offset::new( 1, -1), Offset::new( 1,  1),
];

#[rustfmt::skip]
pub const KNIGHT_OFFSETS: [Offset; 8] = [
    Offset::new(-1, -2), Offset::new(-2, -1), Offset::new(-2,  1), Offset::new(-1,  2),
    Offset::new( 1, -2), Offset::new( 2, -1), Offset::new( 2,  1), Offset::new( 1,  2),
];

/// Plies without a capture or pawn move after which the game is drawn.
pub const FIFTY_MOVE_PLIES: usize = 50;

// Search
pub const DEFAULT_SEARCH_DEPTH: u8 = 5;

/// Cosmetic pause before an opening-book reply is returned.
pub const DEFAULT_OPENING_DELAY_MS: u64 = 400;

// Opening book
pub const DEFAULT_OPENINGS_DIR: &str = "openings";
pub const OPENING_BOOK_FILES: [&str; 5] = ["a.tsv", "b.tsv", "c.tsv", "d.tsv", "e.tsv"];

/// Column of a book row holding the space separated move list.
pub const OPENING_MOVES_COLUMN: usize = 3;
pub const OPENING_HEADER_MOVES: &str = "moves";

/// The book is consulted afresh on these history lengths. Later plies only filter the candidates.
pub const OPENING_SCAN_PLIES: std::ops::RangeInclusive<usize> = 1..=2;

// Monte Carlo tree search
pub const DEFAULT_TREE_FILE: &str = "mcts.json";
pub const DEFAULT_TRAINING_ITERATIONS: usize = 100;
pub const DEFAULT_SAVE_INTERVAL: usize = 50;

pub const EXPLORATION_CONSTANT: f64 = 1.4;
pub const VISITS_EPSILON: f64 = 1e-6;
pub const EXPLORATION_EPSILON: f64 = 1e-10;

/// Credited to every node on the path when a playout is drawn.
pub const DRAW_CREDIT: f64 = 0.5;

/// Indent used when writing the tree file.
pub const TREE_FILE_INDENT: &[u8] = b"        ";
