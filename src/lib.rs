pub mod board;
pub mod constants;
pub mod engine;
pub mod error;
pub mod evaluation;
pub mod mcts;
pub mod movegen;
pub mod moves;
pub mod opening_book;
pub mod piece;
pub mod position;
pub mod search;
pub mod square;
pub mod tree;
pub mod types;
