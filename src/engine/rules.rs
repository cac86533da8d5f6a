//! Per-piece movement predicates.
//!
//! Each predicate answers whether one move is geometrically legal for the
//! piece kind it is named after, given the current occupancy. None of them
//! look at whose turn it is or whether the mover's king ends up in check;
//! that is layered on in [`crate::engine::game`]. All of them fail closed:
//! off-board coordinates, an empty start square or any geometry outside the
//! piece's pattern yield `false`. They never mutate the board.

use crate::engine::board::Board;
use crate::engine::types::{Coord, Move, Piece, PieceType};

// =========================================================================
// Public API
// =========================================================================

/// Dispatch to the predicate for whatever stands on the start square.
pub fn can_piece_move(board: &Board, mv: Move) -> bool {
    match board.piece_at(mv.from).map(|p| p.kind) {
        Some(PieceType::Pawn) => can_pawn_move(board, mv),
        Some(PieceType::Knight) => can_knight_move(board, mv),
        Some(PieceType::Bishop) => can_bishop_move(board, mv),
        Some(PieceType::Rook) => can_rook_move(board, mv),
        Some(PieceType::Queen) => can_queen_move(board, mv),
        Some(PieceType::King) => can_king_move(board, mv),
        None => false,
    }
}

/// Single push to an empty square, double push from the start row through
/// two empty squares, or a one-step diagonal capture of an enemy piece.
pub fn can_pawn_move(board: &Board, mv: Move) -> bool {
    let Some(mover) = mover(board, mv) else {
        return false;
    };
    let dir = mover.color.forward();
    let (dc, dr) = (mv.dc(), mv.dr());

    if dc == 0 {
        if dr == dir {
            return board.is_empty_at(mv.to);
        }
        if dr == 2 * dir && mv.from.row == mover.color.pawn_row() {
            let between = Coord::new(mv.from.col, mv.from.row + dir);
            return board.is_empty_at(between) && board.is_empty_at(mv.to);
        }
        return false;
    }

    if dc.abs() == 1 && dr == dir {
        return matches!(board.piece_at(mv.to), Some(p) if p.color != mover.color);
    }

    false
}

/// L-shaped jump onto an empty or enemy-held square.
pub fn can_knight_move(board: &Board, mv: Move) -> bool {
    let Some(mover) = mover(board, mv) else {
        return false;
    };
    let (dc, dr) = (mv.dc().abs(), mv.dr().abs());
    matches!((dc, dr), (1, 2) | (2, 1)) && !holds_friend(board, mv.to, mover)
}

/// Strict diagonal slide with nothing in between.
pub fn can_bishop_move(board: &Board, mv: Move) -> bool {
    let Some(mover) = mover(board, mv) else {
        return false;
    };
    let (dc, dr) = (mv.dc(), mv.dr());
    dc != 0 && dc.abs() == dr.abs() && path_clear(board, mv) && !holds_friend(board, mv.to, mover)
}

/// Straight slide along a row or column with nothing in between.
pub fn can_rook_move(board: &Board, mv: Move) -> bool {
    let Some(mover) = mover(board, mv) else {
        return false;
    };
    let (dc, dr) = (mv.dc(), mv.dr());
    (dc == 0) != (dr == 0) && path_clear(board, mv) && !holds_friend(board, mv.to, mover)
}

/// Rook move or bishop move.
pub fn can_queen_move(board: &Board, mv: Move) -> bool {
    can_rook_move(board, mv) || can_bishop_move(board, mv)
}

/// One step in any direction.
pub fn can_king_move(board: &Board, mv: Move) -> bool {
    let Some(mover) = mover(board, mv) else {
        return false;
    };
    let reach = mv.dc().abs().max(mv.dr().abs());
    reach == 1 && !holds_friend(board, mv.to, mover)
}

// =========================================================================
// Helpers (internal)
// =========================================================================

/// The piece on the start square, provided both endpoints are on the board.
#[inline]
fn mover(board: &Board, mv: Move) -> Option<Piece> {
    if !mv.in_bounds() {
        return None;
    }
    board.piece_at(mv.from)
}

#[inline]
fn holds_friend(board: &Board, at: Coord, mover: Piece) -> bool {
    matches!(board.piece_at(at), Some(p) if p.color == mover.color)
}

/// Every square strictly between the endpoints of a straight or diagonal
/// line is empty. Callers guarantee the line shape.
fn path_clear(board: &Board, mv: Move) -> bool {
    let step = Coord::new(mv.dc().signum(), mv.dr().signum());
    let mut at = Coord::new(mv.from.col + step.col, mv.from.row + step.row);
    while at != mv.to {
        if board.piece_at(at).is_some() {
            return false;
        }
        at = Coord::new(at.col + step.col, at.row + step.row);
    }
    true
}

// =========================================================================
// Tests
// =========================================================================
