//! Logic Magnets: a sliding-magnet puzzle on a rectangular grid.
//!
//! Pullers drag the pieces on their row and column one step closer when
//! they land, pushers shove them one step away. The puzzle is solved once
//! every piece stands on a target.

use wasm_bindgen::prelude::*;

pub mod board;
pub mod error;
pub mod game;
pub mod puzzle;
pub mod types;
pub mod wasm;

pub use board::Board;
pub use error::{MoveError, PuzzleError};
pub use game::{Game, GameState};
pub use puzzle::{Puzzle, PuzzleConfig};
pub use types::{BoardSnapshot, CellMark, Piece, PieceKind, PieceView, Position};

#[wasm_bindgen]
pub fn wasm_ready() -> bool {
    true
}
