//! Legality suite: node counts from the start position plus whole-board
//! properties of the move engine.
//!
//! Castling and en passant do not exist here, and neither can occur within
//! three plies of the start, so the usual reference counts still apply.

use chess_duel::engine::attacks::king_in_check;
use chess_duel::engine::board::Board;
use chess_duel::engine::game::{has_any_legal_move, legal_moves, try_move};
use chess_duel::engine::rules::{can_bishop_move, can_queen_move, can_rook_move};
use chess_duel::engine::types::{Color, Coord, Move, PieceType};
use chess_duel::engine::{classify_outcome, Game, Layout, Outcome};

/// Recursive perft: count leaf nodes at `depth`.
fn perft(board: &Board, side: Color, depth: u32) -> u64 {
    if depth == 0 {
        return 1;
    }
    let moves = legal_moves(board, side);
    if depth == 1 {
        return moves.len() as u64;
    }
    let mut nodes = 0u64;
    for mv in moves {
        let mut child = board.clone();
        try_move(&mut child, mv, side).unwrap();
        nodes += perft(&child, !side, depth - 1);
    }
    nodes
}

/// A handful of reachable positions with open lines and mixed material.
fn sample_boards() -> Vec<(Board, Color)> {
    let mut boards = vec![
        (Board::standard(), Color::White),
        (Board::endgame(), Color::Black),
    ];

    let mut game = Game::new(Layout::Standard).unwrap();
    for raw in [[3, 1, 3, 3], [4, 6, 4, 4], [2, 0, 5, 3], [1, 7, 2, 5]] {
        game.play(Move::from_wire(raw)).unwrap();
        boards.push((game.board().clone(), game.side_to_move()));
    }

    let mut open = Board::empty();
    open.put(Coord::new(3, 0), PieceType::King, Color::White);
    open.put(Coord::new(4, 3), PieceType::Queen, Color::White);
    open.put(Coord::new(1, 5), PieceType::Rook, Color::White);
    open.put(Coord::new(6, 6), PieceType::Pawn, Color::Black);
    open.put(Coord::new(2, 2), PieceType::Knight, Color::Black);
    open.put(Coord::new(3, 7), PieceType::King, Color::Black);
    boards.push((open.clone(), Color::White));
    boards.push((open, Color::Black));

    boards
}

// =====================================================================
// Node counts
// =====================================================================

#[test]
fn perft_start_depth_1() {
    assert_eq!(perft(&Board::standard(), Color::White, 1), 20);
}

#[test]
fn perft_start_depth_2() {
    assert_eq!(perft(&Board::standard(), Color::White, 2), 400);
}

#[test]
fn perft_start_depth_3() {
    assert_eq!(perft(&Board::standard(), Color::White, 3), 8_902);
}

// =====================================================================
// Properties
// =====================================================================

#[test]
fn accepted_moves_never_leave_own_king_in_check() {
    for (board, side) in sample_boards() {
        for mv in legal_moves(&board, side) {
            let mut after = board.clone();
            try_move(&mut after, mv, side).unwrap();
            assert!(
                !king_in_check(&after, side).unwrap(),
                "{mv} leaves {side} in check"
            );
        }
    }
}

#[test]
fn queen_moves_are_rook_or_bishop_moves() {
    for (board, _) in sample_boards() {
        for from in Coord::all() {
            for to in Coord::all() {
                let mv = Move::new(from, to);
                assert_eq!(
                    can_queen_move(&board, mv),
                    can_rook_move(&board, mv) || can_bishop_move(&board, mv),
                    "queen pattern mismatch for {mv}"
                );
            }
        }
    }
}

#[test]
fn moving_opponent_pieces_is_always_rejected() {
    for (board, side) in sample_boards() {
        for (from, _) in board.pieces_of(!side) {
            for to in Coord::all() {
                let mut copy = board.clone();
                assert!(try_move(&mut copy, Move::new(from, to), side).is_err());
                assert_eq!(copy, board);
            }
        }
    }
}

#[test]
fn probing_for_moves_leaves_board_untouched() {
    for (board, side) in sample_boards() {
        let before = board.clone();
        has_any_legal_move(&board, side);
        legal_moves(&board, side);
        classify_outcome(&board, side).unwrap();
        assert_eq!(board, before);
    }
}

#[test]
fn rejected_moves_leave_board_untouched() {
    for (board, side) in sample_boards() {
        for (from, _) in board.pieces_of(side) {
            for to in Coord::all() {
                let mut copy = board.clone();
                if try_move(&mut copy, Move::new(from, to), side).is_err() {
                    assert_eq!(copy, board);
                }
            }
        }
    }
}

// =====================================================================
// Scenarios
// =====================================================================

#[test]
fn opening_pawn_steps() {
    let mut board = Board::standard();
    assert!(try_move(&mut board, Move::from_parts(0, 1, 0, 3), Color::White).is_ok());
    assert!(try_move(&mut board, Move::from_parts(0, 3, 0, 5), Color::White).is_err());
    assert!(try_move(&mut board, Move::from_parts(0, 6, 0, 4), Color::Black).is_ok());
    // Blocked head-on.
    assert!(try_move(&mut board, Move::from_parts(0, 3, 0, 4), Color::White).is_err());
}

#[test]
fn knight_jumps_over_pawns() {
    let mut board = Board::standard();
    assert!(try_move(&mut board, Move::from_parts(1, 0, 2, 2), Color::White).is_ok());
    assert_eq!(
        board.piece_at(Coord::new(2, 2)).map(|p| p.kind),
        Some(PieceType::Knight)
    );
    assert!(board.is_empty_at(Coord::new(1, 0)));
}

#[test]
fn endgame_layout_is_checkmate_for_white_only() {
    let board = Board::endgame();
    assert_eq!(classify_outcome(&board, Color::White).unwrap(), Outcome::Checkmate);
    assert!(!king_in_check(&board, Color::Black).unwrap());
}

#[test]
fn promoted_queen_moves_like_a_queen() {
    let mut board = Board::empty();
    board.put(Coord::new(3, 0), PieceType::King, Color::White);
    board.put(Coord::new(7, 7), PieceType::King, Color::Black);
    board.put(Coord::new(0, 6), PieceType::Pawn, Color::White);

    let effect = try_move(&mut board, Move::from_parts(0, 6, 0, 7), Color::White).unwrap();
    assert!(effect.promoted);
    assert_eq!(
        board.piece_at(Coord::new(0, 7)).map(|p| p.kind),
        Some(PieceType::Queen)
    );

    // Diagonal and straight lines are both open to the new queen.
    let mut diag = board.clone();
    assert!(try_move(&mut diag, Move::from_parts(0, 7, 5, 2), Color::White).is_ok());
    let mut file = board.clone();
    assert!(try_move(&mut file, Move::from_parts(0, 7, 0, 1), Color::White).is_ok());
}

#[test]
fn mirrored_fools_mate() {
    let mut game = Game::new(Layout::Standard).unwrap();
    for raw in [[2, 1, 2, 2], [3, 6, 3, 4], [1, 1, 1, 3]] {
        game.play(Move::from_wire(raw)).unwrap();
    }
    let report = game.play(Move::from_parts(4, 7, 0, 3)).unwrap();
    assert_eq!(report.outcome, Outcome::Checkmate);
    assert_eq!(report.mover, Color::Black);
    assert!(game.is_game_over());
    assert!(game.play(Move::from_parts(0, 1, 0, 2)).is_err());
}

#[test]
fn cornered_king_is_stalemated() {
    let mut board = Board::empty();
    board.put(Coord::new(0, 7), PieceType::King, Color::Black);
    board.put(Coord::new(2, 6), PieceType::Queen, Color::White);
    board.put(Coord::new(1, 5), PieceType::King, Color::White);
    assert_eq!(classify_outcome(&board, Color::Black).unwrap(), Outcome::Stalemate);
}
