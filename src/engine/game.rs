//! Move application, terminal-state detection and the stateful `Game`.
//!
//! `try_move` is the single entry point that turns a raw move request into a
//! board change. It applies the checks in a fixed order and leaves the board
//! untouched on every failure path:
//!
//!   1. both endpoints on the board
//!   2. the start square holds a piece of the moving side
//!   3. the piece's movement predicate accepts the move
//!   4. after a speculative apply, the mover's king is not in check
//!
//! Step 4 restores the exact previous contents of both squares (including a
//! captured piece) when the move is refused.

use std::fmt;

use crate::engine::attacks;
use crate::engine::board::{Board, Layout};
use crate::engine::rules;
use crate::engine::types::{
    ChessError, Color, Coord, GameStatus, Move, Outcome, Piece, PieceType,
};

// =========================================================================
// Rejection / MoveEffect
// =========================================================================

/// Why a move request was refused.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Rejection {
    OutOfBounds,
    NotYourPiece,
    IllegalPattern,
    LeavesKingInCheck,
}

impl Rejection {
    pub fn as_str(self) -> &'static str {
        match self {
            Rejection::OutOfBounds => "coordinates outside the board",
            Rejection::NotYourPiece => "start square does not hold one of your pieces",
            Rejection::IllegalPattern => "piece cannot move that way",
            Rejection::LeavesKingInCheck => "move leaves own king in check",
        }
    }
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What an accepted move did to the board.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MoveEffect {
    pub captured: Option<Piece>,
    pub promoted: bool,
}

// =========================================================================
// Move application
// =========================================================================

/// Validate and apply `mv` for `side`. The board changes only on `Ok`.
pub fn try_move(board: &mut Board, mv: Move, side: Color) -> Result<MoveEffect, Rejection> {
    if !mv.in_bounds() {
        return Err(Rejection::OutOfBounds);
    }

    let piece = match board.piece_at(mv.from) {
        Some(p) if p.color == side => p,
        _ => return Err(Rejection::NotYourPiece),
    };

    if !rules::can_piece_move(board, mv) {
        return Err(Rejection::IllegalPattern);
    }

    // Speculative apply.
    let captured = board.set(mv.to, Some(piece));
    board.clear(mv.from);

    let safe = match attacks::locate_king(board, side) {
        Ok(king) => !attacks::is_in_check(board, side, king),
        Err(_) => false,
    };
    if !safe {
        board.set(mv.from, Some(piece));
        board.set(mv.to, captured);
        return Err(Rejection::LeavesKingInCheck);
    }

    let promoted = piece.kind == PieceType::Pawn && mv.to.row == side.promotion_row();
    if promoted {
        board.put(mv.to, PieceType::Queen, side);
    }

    Ok(MoveEffect { captured, promoted })
}

/// Boolean form of [`try_move`].
pub fn attempt_move(board: &mut Board, mv: Move, side: Color) -> bool {
    try_move(board, mv, side).is_ok()
}

// =========================================================================
// Probing
// =========================================================================

/// Every legal move for `side`, in row-major order of start then target.
pub fn legal_moves(board: &Board, side: Color) -> Vec<Move> {
    let mut scratch = board.clone();
    let mut moves = Vec::new();
    for (from, _) in board.pieces_of(side) {
        for to in Coord::all() {
            let mv = Move::new(from, to);
            if attempt_move(&mut scratch, mv, side) {
                moves.push(mv);
                scratch.clone_from(board);
            }
        }
    }
    moves
}

/// Legal moves starting on one square.
pub fn legal_moves_from(board: &Board, side: Color, from: Coord) -> Vec<Move> {
    legal_moves(board, side)
        .into_iter()
        .filter(|m| m.from == from)
        .collect()
}

/// Does `side` have at least one legal move? Probes a scratch copy.
pub fn has_any_legal_move(board: &Board, side: Color) -> bool {
    let mut scratch = board.clone();
    board.pieces_of(side).any(|(from, _)| {
        Coord::all().any(|to| attempt_move(&mut scratch, Move::new(from, to), side))
    })
}

// =========================================================================
// Terminal states
// =========================================================================

/// In check with no legal move.
pub fn is_checkmate(board: &Board, side: Color) -> Result<bool, ChessError> {
    Ok(attacks::king_in_check(board, side)? && !has_any_legal_move(board, side))
}

/// Not in check, yet no legal move.
pub fn is_stalemate(board: &Board, side: Color) -> Result<bool, ChessError> {
    Ok(!attacks::king_in_check(board, side)? && !has_any_legal_move(board, side))
}

/// Classify the position for the side about to move.
pub fn classify_outcome(board: &Board, side: Color) -> Result<Outcome, ChessError> {
    let in_check = attacks::king_in_check(board, side)?;
    if has_any_legal_move(board, side) {
        return Ok(Outcome::Ongoing);
    }
    Ok(if in_check {
        Outcome::Checkmate
    } else {
        Outcome::Stalemate
    })
}

// =========================================================================
// Game
// =========================================================================

/// Result of a move played through [`Game::play`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MoveReport {
    pub mv: Move,
    pub mover: Color,
    pub effect: MoveEffect,
    /// Classification for the side that moves next.
    pub outcome: Outcome,
}

/// A board plus whose turn it is and how the game stands.
#[derive(Clone, Debug)]
pub struct Game {
    board: Board,
    side_to_move: Color,
    moves_played: u32,
    status: GameStatus,
}

impl Game {
    // -----------------------------------------------------------------
    // Constructors
    // -----------------------------------------------------------------

    /// New game from a layout; white moves first.
    pub fn new(layout: Layout) -> Result<Self, ChessError> {
        Self::from_board(Board::from_layout(layout), Color::White)
    }

    /// New game from an arbitrary board.
    ///
    /// Fails if either side does not have exactly one king.
    pub fn from_board(board: Board, side_to_move: Color) -> Result<Self, ChessError> {
        attacks::locate_king(&board, !side_to_move)?;
        let mut game = Self {
            board,
            side_to_move,
            moves_played: 0,
            status: GameStatus::Active,
        };
        game.status = game.compute_status()?;
        Ok(game)
    }

    // -----------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn side_to_move(&self) -> Color {
        self.side_to_move
    }

    pub fn moves_played(&self) -> u32 {
        self.moves_played
    }

    pub fn status(&self) -> GameStatus {
        self.status
    }

    pub fn is_game_over(&self) -> bool {
        self.status.is_game_over()
    }

    /// Terminal classification of the current position.
    pub fn outcome(&self) -> Outcome {
        match self.status {
            GameStatus::Checkmate => Outcome::Checkmate,
            GameStatus::Stalemate => Outcome::Stalemate,
            GameStatus::Active | GameStatus::Check => Outcome::Ongoing,
        }
    }

    pub fn legal_moves(&self) -> Vec<Move> {
        legal_moves(&self.board, self.side_to_move)
    }

    // -----------------------------------------------------------------
    // Play
    // -----------------------------------------------------------------

    /// Play a move for the side to move.
    ///
    /// Returns `ChessError::GameOver` if the game has finished and
    /// `ChessError::InvalidMove` if the move is refused, in which case nothing
    /// changes. A malformed king configuration discovered after the move is
    /// also reported as an error; the move itself stays applied.
    pub fn play(&mut self, mv: Move) -> Result<MoveReport, ChessError> {
        if self.status.is_game_over() {
            return Err(ChessError::GameOver(self.status.to_string()));
        }

        let mover = self.side_to_move;
        let effect = try_move(&mut self.board, mv, mover).map_err(|r| ChessError::InvalidMove {
            from: mv.from.to_string(),
            to: mv.to.to_string(),
            reason: r.to_string(),
        })?;

        self.moves_played += 1;
        self.side_to_move = !mover;
        self.status = self.compute_status()?;

        Ok(MoveReport {
            mv,
            mover,
            effect,
            outcome: self.outcome(),
        })
    }

    // -----------------------------------------------------------------
    // Status detection
    // -----------------------------------------------------------------

    fn compute_status(&self) -> Result<GameStatus, ChessError> {
        let side = self.side_to_move;
        let in_check = attacks::king_in_check(&self.board, side)?;
        let status = match classify_outcome(&self.board, side)? {
            Outcome::Checkmate => GameStatus::Checkmate,
            Outcome::Stalemate => GameStatus::Stalemate,
            Outcome::Ongoing if in_check => GameStatus::Check,
            Outcome::Ongoing => GameStatus::Active,
        };
        Ok(status)
    }
}

// =========================================================================
// Tests
// =========================================================================
