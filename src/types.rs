use std::fmt;

use serde::{Deserialize, Serialize};

/// A board coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Position {
    pub row: u8,
    pub col: u8,
}

impl Position {
    pub const fn new(row: u8, col: u8) -> Self {
        Self { row, col }
    }

    /// Returns the coordinate `(row + dr, col + dc)` when it stays within
    /// `rows x cols`.
    pub fn offset(self, dr: i32, dc: i32, rows: u8, cols: u8) -> Option<Self> {
        let row = self.row as i32 + dr;
        let col = self.col as i32 + dc;
        if in_bounds(row, col, rows, cols) {
            Some(Self::new(row as u8, col as u8))
        } else {
            None
        }
    }
}

impl From<(u8, u8)> for Position {
    fn from((row, col): (u8, u8)) -> Self {
        Self::new(row, col)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

pub(crate) fn in_bounds(row: i32, col: i32, rows: u8, cols: u8) -> bool {
    (0..rows as i32).contains(&row) && (0..cols as i32).contains(&col)
}

/// The three kinds of piece on a magnet board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PieceKind {
    /// Static piece, only ever moved by a magnet.
    Neutral,
    /// Drags pieces on its row and column one step toward itself.
    Puller,
    /// Shoves pieces on its row and column one step away from itself.
    Pusher,
}

impl PieceKind {
    /// Grid marker: the initial of the piece colour.
    pub fn marker(self) -> char {
        match self {
            PieceKind::Neutral => 'G',
            PieceKind::Puller => 'R',
            PieceKind::Pusher => 'P',
        }
    }

    pub fn from_marker(ch: char) -> Option<Self> {
        match ch {
            'G' => Some(PieceKind::Neutral),
            'R' => Some(PieceKind::Puller),
            'P' => Some(PieceKind::Pusher),
            _ => None,
        }
    }

    pub fn color(self) -> &'static str {
        match self {
            PieceKind::Neutral => "gray",
            PieceKind::Puller => "red",
            PieceKind::Pusher => "purple",
        }
    }

    /// Whether the player may pick this piece up.
    pub fn is_magnet(self) -> bool {
        !matches!(self, PieceKind::Neutral)
    }
}

/// A piece and where it currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Piece {
    pub kind: PieceKind,
    pub position: Position,
}

impl Piece {
    pub const fn new(kind: PieceKind, position: Position) -> Self {
        Self { kind, position }
    }

    pub const fn neutral(row: u8, col: u8) -> Self {
        Self::new(PieceKind::Neutral, Position::new(row, col))
    }

    pub const fn puller(row: u8, col: u8) -> Self {
        Self::new(PieceKind::Puller, Position::new(row, col))
    }

    pub const fn pusher(row: u8, col: u8) -> Self {
        Self::new(PieceKind::Pusher, Position::new(row, col))
    }
}

/// What a single cell shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellMark {
    Empty,
    /// Unoccupied target.
    Target,
    Occupied(PieceKind),
}

impl CellMark {
    pub fn to_char(self) -> char {
        match self {
            CellMark::Empty => ' ',
            CellMark::Target => 'T',
            CellMark::Occupied(kind) => kind.marker(),
        }
    }

    /// Empty cells and free targets can be entered.
    pub fn is_free(self) -> bool {
        !matches!(self, CellMark::Occupied(_))
    }
}

/// Render-ready view of one piece.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PieceView {
    pub row: u8,
    pub col: u8,
    pub kind: PieceKind,
    pub color: &'static str,
    pub on_target: bool,
}

/// Board state handed to the presentation layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BoardSnapshot {
    pub rows: u8,
    pub cols: u8,
    /// Row-major cell markers as strings of length one.
    pub cells: Vec<String>,
    pub pieces: Vec<PieceView>,
    pub targets: Vec<Position>,
    pub is_solved: bool,
    /// Accepted moves since the last reset.
    pub move_count: u32,
}
