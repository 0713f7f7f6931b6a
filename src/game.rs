use log::debug;

use crate::board::Board;
use crate::error::MoveError;
use crate::puzzle::Puzzle;
use crate::types::{BoardSnapshot, Piece, Position};

/// Immutable game position. Every move produces a new state from a copy of
/// the board, so older states stay valid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameState {
    board: Board,
}

impl GameState {
    pub fn new(puzzle: &Puzzle) -> Self {
        Self::from_board(Board::new(puzzle))
    }

    pub fn from_board(board: Board) -> Self {
        Self { board }
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Text dump of the grid.
    pub fn display(&self) -> String {
        self.board.to_string()
    }

    pub fn is_final_state(&self) -> bool {
        self.board.is_final_state()
    }

    /// Returns the state reached by moving `piece` to `to`.
    ///
    /// `piece` is matched by position and kind against this state's board; a
    /// piece taken from another state that no longer lines up is rejected.
    pub fn make_move(&self, piece: &Piece, to: Position) -> Result<GameState, MoveError> {
        let at = piece.position;
        match self.board.piece_at(at) {
            Some(found) if found.kind == piece.kind => {}
            _ => return Err(MoveError::NoPieceAt { at }),
        }

        let mut board = self.board.clone();
        board.apply_move(at, to)?;
        Ok(GameState::from_board(board))
    }

    /// The same puzzle back at its starting layout.
    pub fn reset(&self) -> GameState {
        let mut board = self.board.clone();
        board.initialize();
        GameState::from_board(board)
    }
}

/// A play session: the starting state kept next to the live one.
#[derive(Debug, Clone)]
pub struct Game {
    initial: GameState,
    current: GameState,
    move_count: u32,
}

impl Game {
    pub fn new(puzzle: &Puzzle) -> Self {
        let initial = GameState::new(puzzle);
        Self {
            current: initial.clone(),
            initial,
            move_count: 0,
        }
    }

    pub fn state(&self) -> &GameState {
        &self.current
    }

    pub fn initial(&self) -> &GameState {
        &self.initial
    }

    pub fn move_count(&self) -> u32 {
        self.move_count
    }

    pub fn is_solved(&self) -> bool {
        self.current.is_final_state()
    }

    /// Moves the magnet on `from`. A rejected move keeps the current state
    /// and is not counted.
    pub fn make_move(&mut self, from: Position, to: Position) -> Result<(), MoveError> {
        let piece = *self
            .current
            .board()
            .piece_at(from)
            .ok_or(MoveError::NoPieceAt { at: from })?;

        self.current = self.current.make_move(&piece, to)?;
        self.move_count += 1;
        Ok(())
    }

    pub fn reset(&mut self) {
        debug!("reset after {} moves", self.move_count);
        self.current = self.initial.clone();
        self.move_count = 0;
    }

    pub fn snapshot(&self) -> BoardSnapshot {
        self.current.board().snapshot(self.move_count)
    }
}

impl Default for Game {
    fn default() -> Self {
        Self::new(&Puzzle::default_level())
    }
}
