use std::{fs, path::Path};

use rand::Rng;
use tracing::{debug, warn};

use crate::{
    constants::{OPENING_BOOK_FILES, OPENING_HEADER_MOVES, OPENING_MOVES_COLUMN, OPENING_SCAN_PLIES},
    error::{EngineError, EngineResult},
    moves::notation_list_to_moves,
    types::{Move, NotationMove},
};

#[derive(Debug, Clone, PartialEq)]
pub struct Opening {
    pub eco: String,
    pub name: String,
    pub moves: Vec<NotationMove>, // From the initial position
}

impl Opening {
    /// `history` is a strict prefix of this line with at least one move left to play.
    pub fn continues(&self, history: &[Move]) -> bool {
        self.moves.len() > history.len()
            && history
                .iter()
                .zip(&self.moves)
                .all(|(played, book)| book.matches(played))
    }
}

/// The library of known lines, read from tab separated files.
#[derive(Debug, Clone, Default)]
pub struct OpeningBook {
    openings: Vec<Opening>,
}

impl OpeningBook {
    /// Reads every book file from `dir`. A missing file is an error.
    pub fn load_dir(dir: impl AsRef<Path>) -> EngineResult<Self> {
        let mut book = OpeningBook::default();

        for file in OPENING_BOOK_FILES {
            let path = dir.as_ref().join(file);
            let text = fs::read_to_string(&path).map_err(|source| EngineError::Io {
                path: path.clone(),
                source,
            })?;

            book.add_rows(&text);
        }

        debug!("Loaded {} openings", book.len());
        Ok(book)
    }

    pub fn parse(text: &str) -> Self {
        let mut book = OpeningBook::default();
        book.add_rows(text);
        book
    }

    /// Adds one opening per row. Malformed rows are skipped.
    pub fn add_rows(&mut self, text: &str) {
        for (line_number, line) in text.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }

            let columns: Vec<&str> = line.split('\t').collect();

            let Some(&moves) = columns.get(OPENING_MOVES_COLUMN) else {
                warn!("Skipping book row {}: too few columns", line_number + 1);
                continue;
            };

            if moves == OPENING_HEADER_MOVES {
                continue;
            }

            let notations: Vec<&str> = moves.split_whitespace().collect();
            if notations.is_empty() {
                continue;
            }

            match notation_list_to_moves(&notations) {
                Ok(moves) => self.openings.push(Opening {
                    eco: columns[0].to_string(),
                    name: columns[1].to_string(),
                    moves,
                }),
                Err(e) => warn!("Skipping book row {}: {}", line_number + 1, e),
            }
        }
    }

    pub fn openings(&self) -> &[Opening] {
        &self.openings
    }

    pub fn len(&self) -> usize {
        self.openings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.openings.is_empty()
    }
}

/// Per-game view of the book: the lines still consistent with the moves played so far.
#[derive(Debug, Clone, Default)]
pub struct OpeningMatcher {
    book: OpeningBook,
    candidates: Vec<usize>, // Indices into `book`
}

impl OpeningMatcher {
    pub fn new(book: OpeningBook) -> Self {
        OpeningMatcher {
            book,
            candidates: Vec::new(),
        }
    }

    pub fn book(&self) -> &OpeningBook {
        &self.book
    }

    /// Forgets the candidates of the previous game.
    pub fn reset(&mut self) {
        self.candidates.clear();
    }

    pub fn has_candidates(&self) -> bool {
        !self.candidates.is_empty()
    }

    pub fn candidates(&self) -> impl Iterator<Item = &Opening> {
        self.candidates.iter().map(|&index| &self.book.openings[index])
    }

    /// Scans the whole book early in the game, afterwards only narrows the existing candidates.
    /// Returns the number of candidates left.
    pub fn match_history(&mut self, history: &[Move]) -> usize {
        let openings = &self.book.openings;

        if OPENING_SCAN_PLIES.contains(&history.len()) {
            self.candidates = (0..openings.len())
                .filter(|&index| openings[index].continues(history))
                .collect();
        } else {
            self.candidates
                .retain(|&index| openings[index].continues(history));
        }

        self.candidates.len()
    }

    /// Picks a random candidate and returns its next move as the matching legal move, together
    /// with the opening's name. Candidates whose next move is not legal here are dropped.
    pub fn pick<R: Rng + ?Sized>(
        &mut self,
        history: &[Move],
        legal_moves: &[Move],
        rng: &mut R,
    ) -> Option<(Move, String)> {
        let ply = history.len();

        while !self.candidates.is_empty() {
            let slot = rng.gen_range(0..self.candidates.len());
            let opening = &self.book.openings[self.candidates[slot]];

            if let Some(move_) = opening
                .moves
                .get(ply)
                .and_then(|book_move| book_move.reconcile(legal_moves))
            {
                return Some((move_, opening.name.clone()));
            }

            debug!("Dropping {}: next book move is not legal", opening.name);
            self.candidates.swap_remove(slot);
        }

        None
    }
}
