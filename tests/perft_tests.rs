
use chess_engine::{constants::INIT_FEN, position::Position};
use test_utils::*;

/// Perform a perft (performance test) from a position to a given depth.
/// Returns the number of leaf nodes (positions) at the target depth.
fn perft(position: &mut Position, depth: usize) -> u64 {
    if depth == 0 {
        return 1;
    }

    let moves = position.legal_moves();

    if depth == 1 {
        return moves.len() as u64;
    }

    let mut nodes = 0u64;

    for move_ in moves {
        position.make_move(move_);
        nodes += perft(position, depth - 1);
        position.undo_move();
    }

    nodes
}

/// Divide perft: node count per root move, for comparing against a reference engine
fn perft_divide(position: &mut Position, depth: usize) -> u64 {
    let mut total_nodes = 0u64;

    for move_ in position.legal_moves() {
        position.make_move(move_);
        let nodes = perft(position, depth - 1);
        position.undo_move();

        println!("{}: {}", move_.notation(), nodes);
        total_nodes += nodes;
    }

    println!("\nTotal nodes: {}", total_nodes);
    total_nodes
}

// ============================================================================
// Starting Position Tests
// ============================================================================

#[test]
fn perft_starting_position_depth_1() {
    let mut position = position_from_fen(INIT_FEN);
    let nodes = perft(&mut position, 1);
    assert_eq!(nodes, 20, "Starting position at depth 1 should have 20 moves");
}

#[test]
fn perft_starting_position_depth_2() {
    let mut position = position_from_fen(INIT_FEN);
    let nodes = perft(&mut position, 2);
    assert_eq!(nodes, 400, "Starting position at depth 2 should have 400 nodes");
}

#[test]
fn perft_starting_position_depth_3() {
    let mut position = position_from_fen(INIT_FEN);
    let nodes = perft(&mut position, 3);
    assert_eq!(
        nodes, 8_902,
        "Starting position at depth 3 should have 8,902 nodes"
    );
}

#[test]
fn perft_starting_position_depth_4() {
    let mut position = position_from_fen(INIT_FEN);
    let nodes = perft(&mut position, 4);
    assert_eq!(
        nodes, 197_281,
        "Starting position at depth 4 should have 197,281 nodes"
    );
}

// ============================================================================
// Kiwipete: castling, pins and en passant in one position
// ============================================================================

#[test]
fn perft_kiwipete_depth_1() {
    let mut position = position_from_fen(KIWIPETE_FEN);
    assert_eq!(perft(&mut position, 1), 48);
}

#[test]
fn perft_kiwipete_depth_2() {
    let mut position = position_from_fen(KIWIPETE_FEN);
    assert_eq!(perft_divide(&mut position, 2), 2_039);
}

#[test]
fn perft_kiwipete_depth_3() {
    let mut position = position_from_fen(KIWIPETE_FEN);
    assert_eq!(
        perft(&mut position, 3),
        97_862,
        "Kiwipete at depth 3 should have 97,862 nodes"
    );
}

// ============================================================================
// Rook endgame with en passant discovered checks
// ============================================================================

#[test]
fn perft_en_passant_pin_depth_1() {
    let mut position = position_from_fen(EN_PASSANT_PIN_FEN);
    assert_eq!(perft(&mut position, 1), 14);
}

#[test]
fn perft_en_passant_pin_depth_2() {
    let mut position = position_from_fen(EN_PASSANT_PIN_FEN);
    assert_eq!(perft(&mut position, 2), 191);
}

#[test]
fn perft_en_passant_pin_depth_3() {
    let mut position = position_from_fen(EN_PASSANT_PIN_FEN);
    assert_eq!(perft(&mut position, 3), 2_812);
}

#[test]
fn perft_en_passant_pin_depth_4() {
    let mut position = position_from_fen(EN_PASSANT_PIN_FEN);
    assert_eq!(
        perft(&mut position, 4),
        43_238,
        "Position 3 at depth 4 should have 43,238 nodes"
    );
}

#[test]
fn perft_leaves_position_unchanged() {
    let mut position = position_from_fen(KIWIPETE_FEN);
    let before = snapshot(&position);

    perft(&mut position, 2);

    assert_eq!(snapshot(&position), before);
}
