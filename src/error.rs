use thiserror::Error;

use crate::types::Position;

/// Why a player move was turned down. The board is never modified when one
/// of these is returned.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MoveError {
    #[error("destination {to} is outside the board")]
    OutOfBounds { to: Position },
    #[error("destination {to} is occupied")]
    Occupied { to: Position },
    #[error("no piece at {at}")]
    NoPieceAt { at: Position },
    #[error("piece at {at} is neutral and cannot be moved directly")]
    NeutralPiece { at: Position },
}

/// Problems found while building a puzzle definition.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PuzzleError {
    #[error("board must have at least one row and one column")]
    EmptyBoard,
    #[error("board is {rows}x{cols}, at most 255x255 is supported")]
    TooLarge { rows: usize, cols: usize },
    #[error("{what} at {at} lies outside the {rows}x{cols} board")]
    OutOfBounds {
        what: &'static str,
        at: Position,
        rows: u8,
        cols: u8,
    },
    #[error("more than one piece placed at {at}")]
    DuplicatePiece { at: Position },
    #[error("unknown cell {ch:?} at row {row}, column {col}")]
    UnknownCell { row: usize, col: usize, ch: char },
    #[error("row {row} has {found} cells, expected {expected}")]
    RaggedRow {
        row: usize,
        expected: usize,
        found: usize,
    },
    #[error("invalid puzzle config: {0}")]
    InvalidConfig(String),
}
