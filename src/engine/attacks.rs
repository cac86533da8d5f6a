//! King safety: locating a king and testing whether it is attacked.
//!
//! An attack on the king's square is checked with the very same movement
//! predicates used for ordinary moves, so "attacked" and "could legally move
//! there, ignoring its own king" mean the same thing.

use crate::engine::board::Board;
use crate::engine::rules;
use crate::engine::types::{ChessError, Color, Coord, Move, PieceType};

/// Find the king of `side`.
///
/// Boards are expected to carry exactly one king per side; anything else is
/// reported as an error rather than resolved by scan order.
pub fn locate_king(board: &Board, side: Color) -> Result<Coord, ChessError> {
    let mut kings = board
        .pieces_of(side)
        .filter(|(_, p)| p.kind == PieceType::King)
        .map(|(at, _)| at);

    let first = kings.next().ok_or(ChessError::KingNotFound(side))?;
    let extra = kings.count();
    if extra > 0 {
        return Err(ChessError::MultipleKings {
            color: side,
            count: extra + 1,
        });
    }
    Ok(first)
}

/// Is the king of `side`, standing on `king`, attacked by any enemy piece?
pub fn is_in_check(board: &Board, side: Color, king: Coord) -> bool {
    board
        .pieces()
        .filter(|(_, p)| p.color != side)
        .any(|(from, _)| rules::can_piece_move(board, Move::new(from, king)))
}

/// Every enemy square currently attacking `king`, row-major.
pub fn attackers(board: &Board, side: Color, king: Coord) -> Vec<Coord> {
    board
        .pieces()
        .filter(|(_, p)| p.color != side)
        .filter(|&(from, _)| rules::can_piece_move(board, Move::new(from, king)))
        .map(|(from, _)| from)
        .collect()
}

/// Locate the king of `side` and report whether it is in check.
pub fn king_in_check(board: &Board, side: Color) -> Result<bool, ChessError> {
    let king = locate_king(board, side)?;
    Ok(is_in_check(board, side, king))
}
