use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

use log::{debug, info, trace, warn};

use crate::error::MoveError;
use crate::puzzle::Puzzle;
use crate::types::{BoardSnapshot, CellMark, Piece, PieceKind, PieceView, Position, in_bounds};

/// Direction of a magnet's effect on the pieces sharing its lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Force {
    Pull,
    Push,
}

impl Force {
    /// Step applied to a piece lying on the negative side (left/up) of the
    /// magnet; the positive side gets the opposite step.
    fn step(self) -> i32 {
        match self {
            Force::Pull => 1,
            Force::Push => -1,
        }
    }

    /// Pulls sweep from the magnet outward, pushes from the edge inward so
    /// the outer piece clears the way for the inner one.
    fn offsets(self, len: u8) -> Vec<i32> {
        let span = 1..len as i32;
        match self {
            Force::Pull => span.collect(),
            Force::Push => span.rev().collect(),
        }
    }
}

/// Magnet puzzle board.
///
/// Cells hold a handle into `pieces`, so a piece's position and the cell that
/// points at it always change together.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    rows: u8,
    cols: u8,
    grid: Vec<Option<usize>>,
    pieces: Vec<Piece>,
    targets: Arc<BTreeSet<Position>>,
    initial: Arc<[Piece]>,
}

impl Board {
    pub fn new(puzzle: &Puzzle) -> Self {
        let mut board = Self {
            rows: puzzle.rows(),
            cols: puzzle.cols(),
            grid: Vec::new(),
            pieces: Vec::new(),
            targets: Arc::new(puzzle.targets().clone()),
            initial: puzzle.pieces().into(),
        };
        board.initialize();
        board
    }

    /// Rebuilds the grid from the initial pieces, discarding every move.
    pub fn initialize(&mut self) {
        self.grid = vec![None; self.rows as usize * self.cols as usize];
        self.pieces = self.initial.to_vec();
        for (handle, piece) in self.pieces.iter().enumerate() {
            let idx = self.index(piece.position);
            self.grid[idx] = Some(handle);
        }
    }

    pub fn rows(&self) -> u8 {
        self.rows
    }

    pub fn cols(&self) -> u8 {
        self.cols
    }

    pub fn targets(&self) -> &BTreeSet<Position> {
        &self.targets
    }

    pub fn is_target(&self, pos: Position) -> bool {
        self.targets.contains(&pos)
    }

    /// Pieces in row-major order.
    pub fn pieces(&self) -> impl Iterator<Item = &Piece> + '_ {
        self.grid
            .iter()
            .filter_map(|slot| slot.map(|handle| &self.pieces[handle]))
    }

    pub fn piece_at(&self, pos: Position) -> Option<&Piece> {
        if !self.contains(pos) {
            return None;
        }
        self.grid[self.index(pos)].map(|handle| &self.pieces[handle])
    }

    /// Marker for `(row, col)`, or `None` off the board.
    pub fn cell(&self, row: u8, col: u8) -> Option<CellMark> {
        let pos = Position::new(row, col);
        self.contains(pos).then(|| self.mark(pos))
    }

    /// Row-major markers for every cell.
    pub fn cells(&self) -> Vec<CellMark> {
        (0..self.rows)
            .flat_map(|row| (0..self.cols).map(move |col| Position::new(row, col)))
            .map(|pos| self.mark(pos))
            .collect()
    }

    /// True when `(row, col)` is on the board and holds no piece.
    pub fn can_move_to(&self, row: i32, col: i32) -> bool {
        in_bounds(row, col, self.rows, self.cols)
            && self.grid[row as usize * self.cols as usize + col as usize].is_none()
    }

    /// Moves the magnet standing on `from` to `to`, then lets it act on its
    /// row and column.
    pub fn apply_move(&mut self, from: Position, to: Position) -> Result<(), MoveError> {
        if let Err(err) = self.check_move(from, to) {
            warn!("rejected move {from} -> {to}: {err}");
            return Err(err);
        }

        let handle = self.grid[self.index(from)].ok_or(MoveError::NoPieceAt { at: from })?;
        let kind = self.pieces[handle].kind;
        self.relocate(handle, from, to);
        debug!("{kind:?} moved {from} -> {to}");

        match kind {
            PieceKind::Puller => self.sweep(to, Force::Pull),
            PieceKind::Pusher => self.sweep(to, Force::Push),
            PieceKind::Neutral => {}
        }

        if self.is_final_state() {
            info!("puzzle solved");
        }
        Ok(())
    }

    /// True when every piece stands on a target.
    pub fn is_final_state(&self) -> bool {
        self.pieces.iter().all(|piece| self.is_target(piece.position))
    }

    pub fn snapshot(&self, move_count: u32) -> BoardSnapshot {
        BoardSnapshot {
            rows: self.rows,
            cols: self.cols,
            cells: self
                .cells()
                .into_iter()
                .map(|mark| mark.to_char().to_string())
                .collect(),
            pieces: self
                .pieces()
                .map(|piece| PieceView {
                    row: piece.position.row,
                    col: piece.position.col,
                    kind: piece.kind,
                    color: piece.kind.color(),
                    on_target: self.is_target(piece.position),
                })
                .collect(),
            targets: self.targets.iter().copied().collect(),
            is_solved: self.is_final_state(),
            move_count,
        }
    }

    fn check_move(&self, from: Position, to: Position) -> Result<(), MoveError> {
        let piece = self.piece_at(from).ok_or(MoveError::NoPieceAt { at: from })?;
        if !piece.kind.is_magnet() {
            return Err(MoveError::NeutralPiece { at: from });
        }
        if !self.contains(to) {
            return Err(MoveError::OutOfBounds { to });
        }
        if !self.can_move_to(to.row as i32, to.col as i32) {
            return Err(MoveError::Occupied { to });
        }
        Ok(())
    }

    /// Scans both lines through `origin` once, moving each piece found at
    /// most one step. Pieces are not revisited after they move.
    fn sweep(&mut self, origin: Position, force: Force) {
        for (len, (dr, dc)) in [(self.cols, (0, 1)), (self.rows, (1, 0))] {
            for i in force.offsets(len) {
                for side in [-1, 1] {
                    let Some(at) = origin.offset(dr * side * i, dc * side * i, self.rows, self.cols)
                    else {
                        continue;
                    };
                    if self.grid[self.index(at)].is_some() {
                        let step = -side * force.step();
                        self.shift(at, dr * step, dc * step);
                    }
                }
            }
        }
    }

    /// Moves the piece on `at` by one step if the destination is free.
    fn shift(&mut self, at: Position, dr: i32, dc: i32) -> bool {
        let Some(handle) = self.grid[self.index(at)] else {
            return false;
        };
        let row = at.row as i32 + dr;
        let col = at.col as i32 + dc;
        if !self.can_move_to(row, col) {
            trace!("piece at {at} blocked");
            return false;
        }

        let to = Position::new(row as u8, col as u8);
        self.relocate(handle, at, to);
        debug!("piece shifted {at} -> {to}");
        true
    }

    fn relocate(&mut self, handle: usize, from: Position, to: Position) {
        let (src, dst) = (self.index(from), self.index(to));
        debug_assert_eq!(self.grid[src], Some(handle));
        debug_assert!(self.grid[dst].is_none());

        self.grid[src] = None;
        self.grid[dst] = Some(handle);
        self.pieces[handle].position = to;
    }

    fn mark(&self, pos: Position) -> CellMark {
        match self.grid[self.index(pos)] {
            Some(handle) => CellMark::Occupied(self.pieces[handle].kind),
            None if self.is_target(pos) => CellMark::Target,
            None => CellMark::Empty,
        }
    }

    fn contains(&self, pos: Position) -> bool {
        pos.row < self.rows && pos.col < self.cols
    }

    fn index(&self, pos: Position) -> usize {
        pos.row as usize * self.cols as usize + pos.col as usize
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rule = "-".repeat(self.cols as usize * 4 - 1);
        for row in self.cells().chunks(self.cols as usize) {
            let line: Vec<String> = row.iter().map(|mark| mark.to_char().to_string()).collect();
            writeln!(f, "{}", line.join(" | "))?;
            writeln!(f, "{rule}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pos(row: u8, col: u8) -> Position {
        Position::new(row, col)
    }

    fn board(rows: usize, cols: usize, pieces: Vec<Piece>, targets: &[(u8, u8)]) -> Board {
        let puzzle = Puzzle::new(
            rows,
            cols,
            pieces,
            targets.iter().copied().map(Position::from),
        )
        .expect("test puzzle must be valid");
        Board::new(&puzzle)
    }

    fn positions(board: &Board) -> Vec<Position> {
        board.pieces().map(|piece| piece.position).collect()
    }

    fn assert_consistent(board: &Board) {
        for piece in board.pieces() {
            assert_eq!(
                board.cell(piece.position.row, piece.position.col),
                Some(CellMark::Occupied(piece.kind))
            );
        }
        let occupied = board
            .cells()
            .iter()
            .filter(|mark| !mark.is_free())
            .count();
        assert_eq!(occupied, board.pieces().count());
    }

    #[test]
    fn can_move_to_checks_bounds_and_occupancy() {
        let board = Board::new(&Puzzle::default_level());

        assert!(!board.can_move_to(-1, 0));
        assert!(!board.can_move_to(0, -1));
        assert!(!board.can_move_to(3, 0));
        assert!(!board.can_move_to(0, 4));
        assert!(board.can_move_to(0, 0));
        assert!(board.can_move_to(0, 2)); // free target
        assert!(!board.can_move_to(1, 1)); // neutral on a target
        assert!(!board.can_move_to(2, 3));
    }

    #[test]
    fn initial_cells_mark_pieces_and_free_targets() {
        let board = Board::new(&Puzzle::default_level());

        assert_eq!(board.cell(0, 2), Some(CellMark::Target));
        assert_eq!(board.cell(1, 1), Some(CellMark::Occupied(PieceKind::Neutral)));
        assert_eq!(board.cell(2, 0), Some(CellMark::Occupied(PieceKind::Pusher)));
        assert_eq!(board.cell(2, 3), Some(CellMark::Occupied(PieceKind::Puller)));
        assert_eq!(board.cell(0, 0), Some(CellMark::Empty));
        assert_eq!(board.cell(3, 0), None);
        assert_consistent(&board);
    }

    #[test]
    fn rejected_moves_leave_board_unchanged() {
        let mut board = Board::new(&Puzzle::default_level());
        let before = board.clone();

        assert_eq!(
            board.apply_move(pos(2, 3), pos(1, 1)),
            Err(MoveError::Occupied { to: pos(1, 1) })
        );
        assert_eq!(
            board.apply_move(pos(2, 3), pos(3, 3)),
            Err(MoveError::OutOfBounds { to: pos(3, 3) })
        );
        assert_eq!(
            board.apply_move(pos(0, 1), pos(0, 0)),
            Err(MoveError::NeutralPiece { at: pos(0, 1) })
        );
        assert_eq!(
            board.apply_move(pos(0, 0), pos(0, 3)),
            Err(MoveError::NoPieceAt { at: pos(0, 0) })
        );
        assert_eq!(board, before);
        assert_eq!(board.cells(), before.cells());
    }

    #[test]
    fn pull_moves_a_piece_one_step_only() {
        let mut board = board(3, 4, vec![Piece::puller(0, 0), Piece::neutral(1, 3)], &[]);

        board.apply_move(pos(0, 0), pos(1, 1)).expect("legal move");

        assert_eq!(board.piece_at(pos(1, 2)).map(|p| p.kind), Some(PieceKind::Neutral));
        assert!(board.piece_at(pos(1, 3)).is_none());
        assert_consistent(&board);
    }

    #[test]
    fn pull_collapses_a_chain_by_one_step_per_piece() {
        let mut board = board(
            2,
            5,
            vec![
                Piece::puller(1, 4),
                Piece::neutral(0, 2),
                Piece::neutral(0, 3),
            ],
            &[],
        );

        board.apply_move(pos(1, 4), pos(0, 0)).expect("legal move");

        assert_eq!(positions(&board), vec![pos(0, 0), pos(0, 1), pos(0, 2)]);
    }

    #[test]
    fn pull_acts_on_the_column_and_respects_blockers() {
        let mut board = board(
            4,
            3,
            vec![
                Piece::puller(0, 0),
                Piece::neutral(3, 1),
                Piece::neutral(1, 2),
            ],
            &[],
        );

        // Lands at (1,1): (1,2) is adjacent and stays, (3,1) comes up to (2,1).
        board.apply_move(pos(0, 0), pos(1, 1)).expect("legal move");

        assert_eq!(positions(&board), vec![pos(1, 1), pos(1, 2), pos(2, 1)]);
        assert_consistent(&board);
    }

    #[test]
    fn push_evaluates_the_far_piece_first() {
        let mut board = board(
            2,
            5,
            vec![
                Piece::pusher(1, 0),
                Piece::neutral(0, 2),
                Piece::neutral(0, 3),
            ],
            &[],
        );

        board.apply_move(pos(1, 0), pos(0, 1)).expect("legal move");

        assert_eq!(positions(&board), vec![pos(0, 1), pos(0, 3), pos(0, 4)]);
    }

    #[test]
    fn push_leaves_pieces_against_the_edge() {
        let mut board = board(
            3,
            3,
            vec![
                Piece::pusher(2, 2),
                Piece::neutral(0, 0),
                Piece::neutral(2, 1),
            ],
            &[],
        );

        board.apply_move(pos(2, 2), pos(1, 0)).expect("legal move");

        // (0,0) is against the top edge; (2,1) is off both lines.
        assert_eq!(positions(&board), vec![pos(0, 0), pos(1, 0), pos(2, 1)]);
    }

    #[test]
    fn magnets_move_other_magnets() {
        let mut board = board(1, 5, vec![Piece::pusher(0, 0), Piece::puller(0, 2)], &[]);

        board.apply_move(pos(0, 0), pos(0, 1)).expect("legal move");

        assert_eq!(board.piece_at(pos(0, 3)).map(|p| p.kind), Some(PieceKind::Puller));
    }

    #[test]
    fn vacated_target_shows_target_again() {
        let mut board = Board::new(&Puzzle::default_level());

        board.apply_move(pos(2, 0), pos(0, 2)).expect("legal move");

        assert_eq!(board.cell(2, 0), Some(CellMark::Target));
        assert!(board.can_move_to(2, 0));
    }

    #[test]
    fn default_level_is_solved_in_two_moves() {
        let mut board = Board::new(&Puzzle::default_level());
        assert!(!board.is_final_state());

        board.apply_move(pos(2, 0), pos(0, 2)).expect("pusher move");
        assert_eq!(
            positions(&board),
            vec![pos(0, 0), pos(0, 2), pos(1, 1), pos(2, 2), pos(2, 3)]
        );
        assert!(!board.is_final_state());

        board.apply_move(pos(2, 3), pos(2, 0)).expect("puller move");
        assert_eq!(
            positions(&board),
            vec![pos(0, 2), pos(1, 0), pos(1, 1), pos(2, 0), pos(2, 1)]
        );
        assert!(board.is_final_state());
        assert!(positions(&board).iter().all(|p| board.targets().contains(p)));
    }

    #[test]
    fn board_without_pieces_is_solved() {
        let board = board(2, 2, vec![], &[(0, 0)]);
        assert!(board.is_final_state());
    }

    #[test]
    fn initialize_restores_the_starting_layout() {
        let fresh = Board::new(&Puzzle::default_level());
        let mut board = fresh.clone();

        board.apply_move(pos(2, 0), pos(0, 2)).expect("legal move");
        board.apply_move(pos(2, 3), pos(2, 0)).expect("legal move");
        assert_ne!(board, fresh);

        board.initialize();
        assert_eq!(board, fresh);
        assert_eq!(board.cells(), fresh.cells());
    }

    #[test]
    fn moving_a_clone_leaves_the_source_alone() {
        let source = Board::new(&Puzzle::default_level());
        let before = source.clone();
        let mut copy = source.clone();

        copy.apply_move(pos(2, 3), pos(0, 3)).expect("legal move");

        assert_eq!(source, before);
        assert_ne!(copy, source);
    }

    #[test]
    fn display_renders_rows_with_rules() {
        let board = Board::new(&Puzzle::default_level());
        let text = board.to_string();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(
            lines,
            vec![
                "  | G | T |  ",
                "---------------",
                "T | G | G |  ",
                "---------------",
                "P | T |   | R",
                "---------------",
            ]
        );
    }

    #[test]
    fn snapshot_reports_pieces_and_solved_flag() {
        let board = Board::new(&Puzzle::default_level());
        let snapshot = board.snapshot(0);

        assert_eq!(snapshot.cells.len(), 12);
        assert_eq!(snapshot.cells[2], "T");
        assert_eq!(snapshot.pieces.len(), 5);
        assert_eq!(snapshot.targets.len(), 5);
        assert!(!snapshot.is_solved);
        let pusher = snapshot
            .pieces
            .iter()
            .find(|view| view.kind == PieceKind::Pusher)
            .expect("pusher present");
        assert_eq!((pusher.row, pusher.col, pusher.color), (2, 0, "purple"));
        assert!(pusher.on_target);
    }
}
