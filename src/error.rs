use std::path::PathBuf;

use thiserror::Error;

/// Failures surfaced by the engine. Checks, pins and draws are ordinary game states, not errors.
#[derive(Debug, Error)]
pub enum EngineError {
    /// A move rebuilt from notation has no counterpart among the legal moves.
    #[error("no legal move matches {notation}")]
    IllegalMove { notation: String },

    /// A move was requested from a position without legal moves.
    #[error("no legal moves available in the current position")]
    NoLegalMoves,

    /// Every legal move of a tree node already has a child.
    #[error("tree node [{move_history}] has no untried move to expand")]
    NoUntriedMove { move_history: String },

    /// Backpropagation could not find a child on the way to the target node.
    #[error("no tree path leads to [{move_history}]")]
    PathNotFound { move_history: String },

    #[error("invalid move notation: {0}")]
    InvalidNotation(String),

    #[error("invalid FEN: {0}")]
    InvalidFen(String),

    #[error("invalid settings: {0}")]
    InvalidSettings(String),

    #[error("failed to access {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed tree file {}: {source}", path.display())]
    TreeFormat {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

pub type EngineResult<T> = Result<T, EngineError>;
