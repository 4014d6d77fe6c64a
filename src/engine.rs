use std::{thread, time::Duration};

use rand::{SeedableRng, rngs::StdRng, seq::SliceRandom};
use tracing::{debug, info};

use crate::{
    constants::{DEFAULT_OPENING_DELAY_MS, DEFAULT_SEARCH_DEPTH, OPENING_SCAN_PLIES},
    error::{EngineError, EngineResult},
    opening_book::{OpeningBook, OpeningMatcher},
    position::Position,
    search::{SearchContext, SearchResult, find_random_move, search},
    types::{Move, NotationMove, Side},
};

pub struct Engine {
    pub position: Position,
    pub search_settings: SearchSettings,
    pub computer_side: Option<Side>,
    pub openings: OpeningMatcher,
    pub last_search: Option<SearchResult>,
    from_initial: bool, // Book lines only apply to games begun at the standard start
    rng: StdRng,
}

#[derive(Debug, Clone)]
pub struct SearchSettings {
    pub depth: u8,
    pub use_opening_book: bool,
    pub move_ordering: bool,
    pub opening_delay: Duration, // Pause before a book reply, cosmetic only
}

impl Default for SearchSettings {
    fn default() -> Self {
        SearchSettings {
            depth: DEFAULT_SEARCH_DEPTH,
            use_opening_book: true,
            move_ordering: true,
            opening_delay: Duration::from_millis(DEFAULT_OPENING_DELAY_MS),
        }
    }
}

impl Default for Engine {
    fn default() -> Self {
        Engine::new(SearchSettings::default(), OpeningBook::default(), None)
    }
}

impl Engine {
    pub fn new(search_settings: SearchSettings, book: OpeningBook, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        Engine {
            position: Position::new(),
            search_settings,
            computer_side: None,
            openings: OpeningMatcher::new(book),
            last_search: None,
            from_initial: true,
            rng,
        }
    }

    pub fn new_game(&mut self) {
        self.position.reset();
        self.openings.reset();
        self.last_search = None;
        self.from_initial = true;
    }

    /// Starts a new game from `fen`. The book stays off unless it is the standard start.
    pub fn load_position(&mut self, fen: &str) -> EngineResult<()> {
        let position = Position::from_fen(fen)?;

        self.new_game();
        self.from_initial = position.is_initial();
        self.position = position;

        if !self.from_initial {
            debug!("Opening book disabled for {}", fen);
        }
        Ok(())
    }

    pub fn rng(&mut self) -> &mut StdRng {
        &mut self.rng
    }

    /// Chooses a reply for the side to move: a book move while the game is still in a known
    /// line, otherwise the alpha-beta result over a shuffled root list.
    pub fn find_best_move(&mut self, mut legal_moves: Vec<Move>) -> EngineResult<Move> {
        if legal_moves.is_empty() {
            return Err(EngineError::NoLegalMoves);
        }

        if let Some(move_) = self.find_book_move(&legal_moves) {
            return Ok(move_);
        }

        legal_moves.shuffle(&mut self.rng);

        let mut context = SearchContext::new(self.search_settings.move_ordering);
        let result = search(
            &mut self.position,
            legal_moves,
            self.search_settings.depth,
            &mut context,
        )?;

        info!(
            "Evaluation in {} plies: {} ({} nodes), playing {}",
            result.depth, result.evaluation, result.nodes, result.best_move
        );

        let best_move = result.best_move;
        self.last_search = Some(result);

        Ok(best_move)
    }

    fn find_book_move(&mut self, legal_moves: &[Move]) -> Option<Move> {
        if !self.search_settings.use_opening_book || !self.from_initial {
            return None;
        }

        let history = &self.position.move_history;
        if !OPENING_SCAN_PLIES.contains(&history.len()) && !self.openings.has_candidates() {
            return None;
        }

        self.openings.match_history(history);

        match self.openings.pick(history, legal_moves, &mut self.rng) {
            Some((move_, name)) => {
                thread::sleep(self.search_settings.opening_delay);
                info!("Playing the {}", name);
                Some(move_)
            }
            None => {
                debug!("No openings found");
                None
            }
        }
    }

    /// A uniformly random legal move for the side to move.
    pub fn find_random_move(&mut self) -> Option<Move> {
        find_random_move(&mut self.position, &mut self.rng)
    }

    /// Applies the legal move written as `e2e4`, if there is one.
    pub fn play_notation(&mut self, notation: &str) -> EngineResult<Move> {
        let legal_moves = self.position.legal_moves();
        let requested = NotationMove::parse(&self.position.board, notation)?;
        let move_ = requested.reconcile_or_err(&legal_moves)?;

        self.position.make_move(move_);
        Ok(move_)
    }

    /// Searches and plays a move for the side to move.
    pub fn play_best_move(&mut self) -> EngineResult<Move> {
        let legal_moves = self.position.legal_moves();
        let move_ = self.find_best_move(legal_moves)?;

        self.position.make_move(move_);
        Ok(move_)
    }

    /// Candidates only ever narrow, so taking a move back also drops them.
    pub fn take_back_move(&mut self) -> Option<Move> {
        self.openings.reset();
        self.position.undo_move()
    }

    pub fn display_legal_moves(&mut self) {
        let moves: Vec<String> = self
            .position
            .legal_moves()
            .iter()
            .map(Move::notation)
            .collect();

        for chunk in moves.chunks(8) {
            println!("{}", chunk.join("  "));
        }
        println!("\n{} moves", moves.len());
    }
}
