pub mod attacks;
pub mod board;
pub mod game;
pub mod rules;
pub mod types;

pub use board::{Board, Layout, Snapshot};
pub use game::{attempt_move, classify_outcome, legal_moves, Game, MoveReport, Rejection};
pub use types::*;
