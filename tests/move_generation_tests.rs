
use chess_engine::{
    position::Position,
    types::{GameOutcome, Piece, Side, TerminalState},
};
use test_utils::*;

mod initial_position {
    use super::*;

    #[test]
    fn test_initial_position_generates_20_white_moves() {
        let mut position = Position::new();

        let moves = move_pairs(&mut position);
        assert_eq!(moves.len(), 20);
        assert!(moves.contains(&(sq("e2"), sq("e4"))));
        assert!(moves.contains(&(sq("g1"), sq("f3"))));
    }

    #[test]
    fn test_initial_position_generates_20_black_moves() {
        let mut position = position_after(&["e2e4"]);

        let moves = move_pairs(&mut position);
        assert_eq!(moves.len(), 20, "got {:?}", moves);
        assert!(moves.contains(&(sq("e7"), sq("e5"))));
        assert!(moves.contains(&(sq("b8"), sq("c6"))));
    }

    #[test]
    fn test_moves_come_in_board_order() {
        let mut position = Position::new();
        let moves = notations(&position.legal_moves());

        // Row-major from a8: the first white piece reached is the a2 pawn
        assert_eq!(&moves[..2], &["a2a3".to_string(), "a2a4".to_string()]);
        assert_eq!(moves.last().map(String::as_str), Some("g1h3"));
    }

    #[test]
    fn test_legal_moves_resets_check_state() {
        let mut position = Position::new();
        position.legal_moves();

        assert!(!position.check_state.in_check);
        assert!(position.check_state.checks.is_empty());
        assert!(position.check_state.pins.is_empty());
        assert_eq!(position.terminal_state, TerminalState::Ongoing);
    }
}

mod castling {
    use super::*;

    const BOTH_SIDES_FEN: &str = "r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1";

    #[test]
    fn test_castling_both_sides() {
        let mut position = position_from_fen(BOTH_SIDES_FEN);
        let moves = position.legal_moves();

        let castles: Vec<String> = moves
            .iter()
            .filter(|move_| move_.is_castle)
            .map(|move_| move_.notation())
            .collect();

        assert_eq!(castles.len(), 2, "got {:?}", castles);
        assert!(castles.contains(&"e1g1".to_string()));
        assert!(castles.contains(&"e1c1".to_string()));
    }

    #[test]
    fn test_black_castling_both_sides() {
        let mut position = position_from_fen("r3k2r/8/8/8/8/8/8/R3K2R b KQkq - 0 1");
        let castles: Vec<String> = position
            .legal_moves()
            .iter()
            .filter(|move_| move_.is_castle)
            .map(|move_| move_.notation())
            .collect();

        assert!(castles.contains(&"e8g8".to_string()), "got {:?}", castles);
        assert!(castles.contains(&"e8c8".to_string()), "got {:?}", castles);
    }

    #[test]
    fn test_occupied_square_blocks_queen_side() {
        let mut position = position_from_fen("r3k2r/8/8/8/8/8/8/RN2K2R w KQkq - 0 1");
        let moves = move_pairs(&mut position);

        assert!(!moves.contains(&(sq("e1"), sq("c1"))));
        assert!(moves.contains(&(sq("e1"), sq("g1"))));
    }

    #[test]
    fn test_attacked_transit_square_blocks_king_side() {
        let mut position = position_from_fen("r3kr2/8/8/8/8/8/8/R3K2R w KQq - 0 1");
        let moves = move_pairs(&mut position);

        assert!(!moves.contains(&(sq("e1"), sq("g1"))));
        assert!(moves.contains(&(sq("e1"), sq("c1"))));
    }

    #[test]
    fn test_attacked_b_file_does_not_block_queen_side() {
        let mut position = position_from_fen("1r2k3/8/8/8/8/8/8/R3K2R w KQ - 0 1");
        let moves = move_pairs(&mut position);

        assert!(moves.contains(&(sq("e1"), sq("c1"))));
    }

    #[test]
    fn test_attacked_d_file_blocks_queen_side() {
        let mut position = position_from_fen("3rk3/8/8/8/8/8/8/R3K2R w KQ - 0 1");
        let moves = move_pairs(&mut position);

        assert!(!moves.contains(&(sq("e1"), sq("c1"))));
        assert!(moves.contains(&(sq("e1"), sq("g1"))));
    }

    #[test]
    fn test_no_castling_without_rights() {
        let mut position = position_from_fen("r3k2r/8/8/8/8/8/8/R3K2R w kq - 0 1");

        assert!(position.legal_moves().iter().all(|move_| !move_.is_castle));
    }

    #[test]
    fn test_no_castling_out_of_check() {
        let mut position = position_from_fen("4k3/4r3/8/8/8/8/8/R3K2R w KQ - 0 1");

        assert!(position.legal_moves().iter().all(|move_| !move_.is_castle));
    }
}

mod check {
    use super::*;

    #[test]
    fn test_single_check_by_rook() {
        let mut position = position_from_fen("4k3/4r3/8/8/8/8/8/R3K2R w KQ - 0 1");
        let moves = position.legal_moves();

        assert!(position.check_state.in_check);
        assert_eq!(position.check_state.checks.len(), 1);

        let mut names = notations(&moves);
        names.sort();
        assert_eq!(names, vec!["e1d1", "e1d2", "e1f1", "e1f2"]);
    }

    #[test]
    fn test_check_can_be_blocked_or_captured() {
        // Rook e7 checks and only the a7 rook can take it
        let mut position = position_from_fen("4k3/R3r3/8/8/8/8/8/3RK3 w - - 0 1");
        let moves = notations(&position.legal_moves());

        assert!(moves.contains(&"a7e7".to_string()), "got {:?}", moves);
        assert!(!moves.contains(&"a7a8".to_string()), "got {:?}", moves);
        assert!(!moves.contains(&"d1d8".to_string()), "got {:?}", moves);
    }

    #[test]
    fn test_double_check_allows_only_king_moves() {
        let mut position = position_from_fen("4r1k1/8/8/8/8/3n4/8/R3K3 w Q - 0 1");
        let moves = position.legal_moves();

        assert_eq!(position.check_state.checks.len(), 2);
        assert!(moves.iter().all(|move_| move_.from == sq("e1")));

        let mut names = notations(&moves);
        names.sort();
        assert_eq!(names, vec!["e1d1", "e1d2", "e1f1"]);
    }

    #[test]
    fn test_king_cannot_retreat_along_checking_ray() {
        let mut position = position_from_fen("4k3/8/8/8/8/8/4K3/4r3 w - - 0 1");
        let moves = move_pairs(&mut position);

        assert!(!moves.contains(&(sq("e2"), sq("e3"))));
        assert!(moves.contains(&(sq("e2"), sq("e1"))));
    }

    #[test]
    fn test_is_in_check_after_move() {
        let position = position_after(&["e2e4", "f7f6", "d1h5"]);

        assert!(position.is_in_check());
        assert!(position.is_square_attacked(sq("e8")));
    }
}

mod pins {
    use super::*;

    #[test]
    fn test_pinned_rook_moves_along_pin() {
        let mut position = position_from_fen("4k3/4r3/8/8/8/8/4R3/4K3 w - - 0 1");
        let moves = move_pairs(&mut position);

        assert_eq!(moves.len(), 9, "got {:?}", moves);
        assert!(moves.contains(&(sq("e2"), sq("e7"))));
        assert!(!moves.contains(&(sq("e2"), sq("d2"))));
        assert_eq!(position.check_state.pins.len(), 1);
    }

    #[test]
    fn test_pinned_knight_cannot_move() {
        let mut position = position_from_fen("4k3/4r3/8/8/8/8/4N3/4K3 w - - 0 1");
        let moves = move_pairs(&mut position);

        assert_eq!(moves.len(), 4, "got {:?}", moves);
        assert!(moves.iter().all(|(from, _)| *from == sq("e1")));
    }

    #[test]
    fn test_pinned_bishop_keeps_diagonal() {
        let mut position = position_from_fen("4k3/8/8/8/7q/8/5B2/4K3 w - - 0 1");
        let moves = move_pairs(&mut position);

        assert!(moves.contains(&(sq("f2"), sq("g3"))));
        assert!(moves.contains(&(sq("f2"), sq("h4"))));
        assert!(!moves.contains(&(sq("f2"), sq("e3"))));
    }
}

mod en_passant {
    use super::*;

    #[test]
    fn test_en_passant_capture_is_flagged() {
        let mut position = position_after(&["e2e4", "a7a6", "e4e5", "d7d5"]);
        assert_eq!(position.en_passant, Some(sq("d6")));

        let capture = legal_move(&mut position, "e5d6");
        assert!(capture.is_en_passant);
        assert!(capture.is_capture());

        position.make_move(capture);
        assert_eq!(position.board.get(sq("d5")), 0, "captured pawn should be removed");
        assert_eq!(
            position.board.piece_at(sq("d6")),
            Some((Side::White, Piece::Pawn))
        );
    }

    #[test]
    fn test_en_passant_expires_after_one_ply() {
        let mut position = position_after(&["e2e4", "a7a6", "e4e5", "d7d5", "h2h3", "h7h6"]);

        assert_eq!(position.en_passant, None);
        assert!(!move_pairs(&mut position).contains(&(sq("e5"), sq("d6"))));
    }

    #[test]
    fn test_horizontal_pin_forbids_en_passant() {
        let mut position = position_from_fen("8/8/8/KPp4r/8/8/8/7k w - c6 0 1");
        let moves = move_pairs(&mut position);

        assert!(!moves.contains(&(sq("b5"), sq("c6"))), "got {:?}", moves);
        assert!(moves.contains(&(sq("b5"), sq("b6"))));
    }

    #[test]
    fn test_safe_en_passant_captures_survive_filtering() {
        let mut position = position_from_fen("8/8/8/1PpP4/8/8/8/K6k w - c6 0 1");
        let before = snapshot(&position);

        let moves = position.legal_moves();
        let captures: Vec<String> = moves
            .iter()
            .filter(|move_| move_.is_en_passant)
            .map(|move_| move_.notation())
            .collect();

        assert_eq!(captures, vec!["b5c6", "d5c6"], "got {:?}", notations(&moves));
        assert_eq!(snapshot(&position), before, "filtering must not disturb the position");
    }

    #[test]
    fn test_en_passant_captures_checking_pawn() {
        let mut position = position_from_fen("8/8/8/2k5/3Pp3/8/8/4K3 b - d3 0 1");
        let moves = position.legal_moves();

        assert!(position.check_state.in_check);
        assert!(
            moves
                .iter()
                .any(|move_| move_.is_en_passant && move_.notation() == "e4d3"),
            "got {:?}",
            notations(&moves)
        );
    }
}

mod promotion {
    use super::*;

    #[test]
    fn test_pawn_reaching_last_rank_promotes() {
        let mut position = position_from_fen("8/P6k/8/8/8/8/8/K7 w - - 0 1");
        let promotion = legal_move(&mut position, "a7a8");

        assert!(promotion.is_promotion);

        position.make_move(promotion);
        assert_eq!(
            position.board.piece_at(sq("a8")),
            Some((Side::White, Piece::Queen))
        );
    }
}

mod game_end {
    use super::*;

    #[test]
    fn test_stalemate() {
        let mut position = position_from_fen("7k/5Q2/6K1/8/8/8/8/8 b - - 0 1");

        assert!(position.legal_moves().is_empty());
        assert_eq!(position.terminal_state, TerminalState::Stalemate);
        assert_eq!(position.outcome(), Some(GameOutcome::Draw));
    }

    #[test]
    fn test_fools_mate() {
        let mut position = position_after(&["f2f3", "e7e5", "g2g4", "d8h4"]);

        assert!(position.legal_moves().is_empty());
        assert_eq!(position.terminal_state, TerminalState::Checkmate);
        assert_eq!(position.outcome(), Some(GameOutcome::BlackWin));
    }

    #[test]
    fn test_scholars_mate() {
        let mut position =
            position_after(&["e2e4", "e7e5", "f1c4", "b8c6", "d1h5", "g8f6", "h5f7"]);

        assert!(position.legal_moves().is_empty());
        assert_eq!(position.outcome(), Some(GameOutcome::WhiteWin));
    }
}
