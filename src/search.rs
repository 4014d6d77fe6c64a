use std::cmp::Reverse;

use rand::{Rng, seq::SliceRandom};

use crate::{
    error::{EngineError, EngineResult},
    position::Position,
    types::{Move, Side},
};

/// Mutable state threaded through one search.
#[derive(Debug, Clone)]
pub struct SearchContext {
    pub nodes: usize,
    pub move_ordering: bool, // Try the most valuable captures first
    pub pruning: bool,       // Disable to get a plain minimax for comparison
}

impl Default for SearchContext {
    fn default() -> Self {
        SearchContext {
            nodes: 0,
            move_ordering: true,
            pruning: true,
        }
    }
}

impl SearchContext {
    pub fn new(move_ordering: bool) -> Self {
        SearchContext {
            move_ordering,
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone)]
pub struct SearchResult {
    pub best_move: Move,
    pub evaluation: i32,
    pub depth: u8,
    pub nodes: usize,
}

/// Sorts by captured material, most valuable first. Stable, so equal moves keep their order.
pub fn order_moves(moves: &mut [Move]) {
    moves.sort_by_key(|move_| Reverse(move_.capture_value()));
}

/// Fixed-depth alpha-beta from the root. White maximizes, black minimizes.
///
/// The best move is the first one reaching the best score in the (possibly reordered) root list.
pub fn search(
    position: &mut Position,
    mut moves: Vec<Move>,
    depth: u8,
    context: &mut SearchContext,
) -> EngineResult<SearchResult> {
    if moves.is_empty() {
        return Err(EngineError::NoLegalMoves);
    }

    let depth = depth.max(1);
    let maximizing = position.side == Side::White;

    if context.move_ordering {
        order_moves(&mut moves);
    }

    context.nodes += 1;

    let mut best_move = moves[0];
    let mut best = if maximizing { i32::MIN } else { i32::MAX };
    let mut alpha = i32::MIN;
    let mut beta = i32::MAX;

    for move_ in moves {
        let evaluation = evaluate_move(position, move_, depth, alpha, beta, context);

        if maximizing {
            if evaluation > best {
                best = evaluation;
                best_move = move_;
            }
            alpha = alpha.max(evaluation);
        } else {
            if evaluation < best {
                best = evaluation;
                best_move = move_;
            }
            beta = beta.min(evaluation);
        }

        if context.pruning && beta <= alpha {
            break;
        }
    }

    Ok(SearchResult {
        best_move,
        evaluation: best,
        depth,
        nodes: context.nodes,
    })
}

/// Applies `move_`, searches the reply tree one ply shallower and takes the move back.
fn evaluate_move(
    position: &mut Position,
    move_: Move,
    depth: u8,
    alpha: i32,
    beta: i32,
    context: &mut SearchContext,
) -> i32 {
    position.make_move(move_);
    let replies = position.legal_moves();
    let evaluation = alpha_beta(position, replies, depth - 1, alpha, beta, context);
    position.undo_move();

    evaluation
}

fn alpha_beta(
    position: &mut Position,
    mut moves: Vec<Move>,
    depth: u8,
    mut alpha: i32,
    mut beta: i32,
    context: &mut SearchContext,
) -> i32 {
    context.nodes += 1;

    if depth == 0 || position.is_terminal() {
        return position.evaluate();
    }

    if context.move_ordering {
        order_moves(&mut moves);
    }

    if position.side == Side::White {
        let mut max_eval = i32::MIN;

        for move_ in moves {
            let evaluation = evaluate_move(position, move_, depth, alpha, beta, context);
            max_eval = max_eval.max(evaluation);
            alpha = alpha.max(evaluation);

            if context.pruning && beta <= alpha {
                break;
            }
        }

        max_eval
    } else {
        let mut min_eval = i32::MAX;

        for move_ in moves {
            let evaluation = evaluate_move(position, move_, depth, alpha, beta, context);
            min_eval = min_eval.min(evaluation);
            beta = beta.min(evaluation);

            if context.pruning && beta <= alpha {
                break;
            }
        }

        min_eval
    }
}

/// A uniformly random legal move, `None` when the game is over.
pub fn find_random_move<R: Rng + ?Sized>(position: &mut Position, rng: &mut R) -> Option<Move> {
    position.legal_moves().choose(rng).copied()
}
