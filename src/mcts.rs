//! Monte Carlo tree training.
//!
//! Every iteration replays a path from the initial position, grows the tree by one node, plays a
//! random game from it and credits the result back along the path. The tree lives on disk and
//! is reloaded and rewritten once per batch.

use std::path::PathBuf;

use rand::{SeedableRng, rngs::StdRng, seq::SliceRandom};
use tracing::{debug, info};

use crate::{
    constants::{DEFAULT_SAVE_INTERVAL, DEFAULT_TRAINING_ITERATIONS, DEFAULT_TREE_FILE, DRAW_CREDIT},
    error::{EngineError, EngineResult},
    position::Position,
    search::find_random_move,
    tree::{MctsNode, MctsTree},
    types::{GameOutcome, NotationMove},
};

/// Training parameters.
#[derive(Clone, Debug)]
pub struct TrainingSettings {
    /// File holding the persisted tree.
    pub tree_path: PathBuf,

    /// Total iterations for one `run` call.
    pub iterations: usize,

    /// Iterations between two writes of the tree file.
    pub save_interval: usize,

    /// Seed for reproducible training; entropy when absent.
    pub seed: Option<u64>,
}

impl Default for TrainingSettings {
    fn default() -> Self {
        Self {
            tree_path: PathBuf::from(DEFAULT_TREE_FILE),
            iterations: DEFAULT_TRAINING_ITERATIONS,
            save_interval: DEFAULT_SAVE_INTERVAL,
            seed: None,
        }
    }
}

impl TrainingSettings {
    pub fn with_tree_path(tree_path: impl Into<PathBuf>) -> Self {
        Self {
            tree_path: tree_path.into(),
            ..Default::default()
        }
    }
}

/// Hooks for watching training, e.g. to draw the board. All default to doing nothing.
pub trait TrainingObserver {
    fn on_position_changed(&mut self, _position: &Position) {}

    fn on_iteration_complete(&mut self, _completed: usize, _total: usize) {}

    /// Called after each write of the tree file.
    fn on_tree_saved(&mut self, _completed: usize, _tree_size: usize) {}
}

impl TrainingObserver for () {}

/// Statistics of one child of the root.
#[derive(Clone, Debug, PartialEq)]
pub struct ChildSummary {
    pub notation: String,
    pub visits: u64,
    pub win_rate: Option<f64>,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct TrainingReport {
    pub iterations: usize,
    pub tree_size: usize,
    pub children: Vec<ChildSummary>,
    pub most_visited: Option<ChildSummary>,
    pub best_win_rate: Option<ChildSummary>,
}

impl TrainingReport {
    pub fn from_tree(tree: &MctsTree, iterations: usize) -> Self {
        let children: Vec<ChildSummary> = tree
            .root
            .children
            .iter()
            .map(|child| ChildSummary {
                notation: child.last_move().unwrap_or_default().to_string(),
                visits: child.visits,
                win_rate: child.win_rate(),
            })
            .collect();

        let mut most_visited: Option<&ChildSummary> = None;
        let mut best_win_rate: Option<&ChildSummary> = None;

        for child in &children {
            if most_visited.is_none_or(|best| child.visits > best.visits) {
                most_visited = Some(child);
            }

            if let Some(rate) = child.win_rate {
                if best_win_rate.is_none_or(|best| best.win_rate.is_none_or(|best| rate > best)) {
                    best_win_rate = Some(child);
                }
            }
        }

        TrainingReport {
            iterations,
            tree_size: tree.root.size(),
            most_visited: most_visited.cloned(),
            best_win_rate: best_win_rate.cloned(),
            children,
        }
    }
}

/// Where selection stopped.
#[derive(Clone, Debug, PartialEq)]
pub struct Selection {
    pub path: Vec<usize>, // Child indices from the root
    pub terminal: bool,   // The game is over at the selected node
}

pub struct Trainer {
    pub settings: TrainingSettings,
    rng: StdRng,
}

impl Trainer {
    pub fn new(settings: TrainingSettings) -> Self {
        let rng = match settings.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        Trainer { settings, rng }
    }

    /// Trains with the iteration count and save interval held in `settings`.
    pub fn run(&mut self, position: &mut Position) -> EngineResult<TrainingReport> {
        self.run_with_observer(position, &mut ())
    }

    pub fn run_with_observer<O: TrainingObserver + ?Sized>(
        &mut self,
        position: &mut Position,
        observer: &mut O,
    ) -> EngineResult<TrainingReport> {
        let (iterations, save_interval) = (self.settings.iterations, self.settings.save_interval);
        self.train_with_observer(position, iterations, save_interval, observer)
    }

    /// Runs `iterations` iterations in batches of `save_interval`, reloading the tree before and
    /// writing it after every batch. An error aborts the current batch without saving it.
    pub fn train(
        &mut self,
        position: &mut Position,
        iterations: usize,
        save_interval: usize,
    ) -> EngineResult<TrainingReport> {
        self.train_with_observer(position, iterations, save_interval, &mut ())
    }

    pub fn train_with_observer<O: TrainingObserver + ?Sized>(
        &mut self,
        position: &mut Position,
        iterations: usize,
        save_interval: usize,
        observer: &mut O,
    ) -> EngineResult<TrainingReport> {
        if save_interval == 0 {
            return Err(EngineError::InvalidSettings(
                "save interval must be at least 1".to_string(),
            ));
        }

        let path = self.settings.tree_path.clone();
        let mut completed = 0;
        let mut tree = MctsTree::load(&path)?;

        while completed < iterations {
            if completed > 0 {
                tree = MctsTree::load(&path)?;
            }

            let batch = save_interval.min(iterations - completed);

            for _ in 0..batch {
                position.reset();
                let result = self.run_iteration(&mut tree.root, position, observer);
                position.reset();
                result?;

                completed += 1;
                observer.on_iteration_complete(completed, iterations);
            }

            tree.save(&path)?;
            observer.on_tree_saved(completed, tree.root.size());
            info!(
                "Saved {} nodes to {} after {} of {} iterations",
                tree.root.size(),
                path.display(),
                completed,
                iterations
            );
        }

        let report = TrainingReport::from_tree(&tree, completed);

        if let Some(child) = &report.most_visited {
            info!("Most visited: {} ({} visits)", child.notation, child.visits);
        }
        if let Some(child) = &report.best_win_rate {
            info!(
                "Best win rate: {} ({:.3})",
                child.notation,
                child.win_rate.unwrap_or_default()
            );
        }

        Ok(report)
    }

    /// One selection, expansion, simulation and backpropagation pass. `position` must hold the
    /// initial position and is left wherever the playout ended.
    pub fn run_iteration<O: TrainingObserver + ?Sized>(
        &mut self,
        root: &mut MctsNode,
        position: &mut Position,
        observer: &mut O,
    ) -> EngineResult<GameOutcome> {
        let selection = select(root, position, observer)?;
        debug!("Selection completed at depth {}", selection.path.len());

        let node = node_at_mut(root, &selection.path);

        let target = if selection.terminal {
            node.move_history.clone()
        } else {
            let child = self.expand(node, position)?;
            observer.on_position_changed(position);
            node.children[child].move_history.clone()
        };

        let outcome = self.simulate(position, observer);
        backpropagate(root, &target, outcome)?;

        Ok(outcome)
    }

    /// Adds a child for a random untried legal move and plays that move on `position`. Returns
    /// the new child's index.
    pub fn expand(&mut self, node: &mut MctsNode, position: &mut Position) -> EngineResult<usize> {
        let legal_moves = position.legal_moves();

        let mut tried = Vec::with_capacity(node.children.len());
        for child in &node.children {
            if let Some(notation) = child.last_move() {
                tried.push(NotationMove::parse(&position.board, notation)?);
            }
        }

        let untried: Vec<_> = legal_moves
            .iter()
            .filter(|move_| !tried.iter().any(|done| done.matches(move_)))
            .collect();

        let Some(&&move_) = untried.choose(&mut self.rng) else {
            return Err(EngineError::NoUntriedMove {
                move_history: node.move_history.join(" "),
            });
        };

        debug!("Expanding with {}", move_);

        node.children.push(node.new_child(move_.notation()));
        position.make_move(move_);

        Ok(node.children.len() - 1)
    }

    /// Plays random moves until the game ends.
    pub fn simulate<O: TrainingObserver + ?Sized>(
        &mut self,
        position: &mut Position,
        observer: &mut O,
    ) -> GameOutcome {
        loop {
            if let Some(outcome) = position.outcome() {
                return outcome;
            }

            // Move generation marks mate or stalemate when there is no move to play
            match find_random_move(position, &mut self.rng) {
                Some(move_) => {
                    position.make_move(move_);
                    observer.on_position_changed(position);
                }
                None => continue,
            }
        }
    }
}

/// Walks down from the root, replaying each chosen node's move on `position`, until reaching a
/// node with an untried legal move or a finished game.
pub fn select<O: TrainingObserver + ?Sized>(
    root: &MctsNode,
    position: &mut Position,
    observer: &mut O,
) -> EngineResult<Selection> {
    let mut node = root;
    let mut path = Vec::new();
    let mut legal_moves = position.legal_moves();

    loop {
        if position.is_terminal() {
            return Ok(Selection {
                path,
                terminal: true,
            });
        }

        if node.children.len() < legal_moves.len() {
            return Ok(Selection {
                path,
                terminal: false,
            });
        }

        let Some(index) = node.best_child_index() else {
            return Err(EngineError::NoUntriedMove {
                move_history: node.move_history.join(" "),
            });
        };

        node = &node.children[index];
        path.push(index);

        let notation = node.last_move().unwrap_or_default();
        let move_ = NotationMove::parse(&position.board, notation)?.reconcile_or_err(&legal_moves)?;

        position.make_move(move_);
        observer.on_position_changed(position);

        legal_moves = position.legal_moves();
    }
}

/// Credits `outcome` to every node from the root to the node whose history is `target`.
///
/// Nodes at even depth are credited for white wins, odd depths for black wins; draws give every
/// node half a point. Children of every node above the target also count one more parent visit.
pub fn backpropagate(
    root: &mut MctsNode,
    target: &[String],
    outcome: GameOutcome,
) -> EngineResult<()> {
    let mut node = root;
    let mut white = true;

    loop {
        node.visits += 1;
        node.win += credit(outcome, white);

        if node.depth() >= target.len() {
            return Ok(());
        }

        for child in node.children.iter_mut() {
            child.parent_visits += 1;
        }

        let Some(index) = node.children.iter().position(|child| child.leads_to(target)) else {
            return Err(EngineError::PathNotFound {
                move_history: target.join(" "),
            });
        };

        node = &mut node.children[index];
        white = !white;
    }
}

fn credit(outcome: GameOutcome, white: bool) -> f64 {
    match outcome {
        GameOutcome::Draw => DRAW_CREDIT,
        GameOutcome::WhiteWin if white => 1.0,
        GameOutcome::BlackWin if !white => 1.0,
        _ => 0.0,
    }
}

fn node_at_mut<'a>(root: &'a mut MctsNode, path: &[usize]) -> &'a mut MctsNode {
    path.iter()
        .fold(root, |node, &index| &mut node.children[index])
}
