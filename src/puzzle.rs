use std::collections::{BTreeSet, HashSet};

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::error::PuzzleError;
use crate::types::{Piece, PieceKind, Position};

const MAX_SIDE: usize = u8::MAX as usize;

static DEFAULT_LEVEL: Lazy<Puzzle> = Lazy::new(|| Puzzle {
    rows: 3,
    cols: 4,
    pieces: vec![
        Piece::neutral(0, 1),
        Piece::neutral(1, 1),
        Piece::neutral(1, 2),
        Piece::puller(2, 3),
        Piece::pusher(2, 0),
    ],
    targets: [(0, 2), (1, 0), (1, 1), (2, 0), (2, 1)]
        .into_iter()
        .map(Position::from)
        .collect(),
});

/// Loose puzzle description as it arrives from a host, before validation.
#[derive(Debug, Clone, Deserialize)]
pub struct PuzzleConfig {
    pub rows: usize,
    pub cols: usize,
    #[serde(default)]
    pub pieces: Vec<Piece>,
    #[serde(default)]
    pub targets: Vec<Position>,
}

/// A validated starting layout: board size, initial pieces and targets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "PuzzleConfig")]
pub struct Puzzle {
    rows: u8,
    cols: u8,
    pieces: Vec<Piece>,
    targets: BTreeSet<Position>,
}

impl Puzzle {
    pub fn new(
        rows: usize,
        cols: usize,
        pieces: Vec<Piece>,
        targets: impl IntoIterator<Item = Position>,
    ) -> Result<Self, PuzzleError> {
        if rows == 0 || cols == 0 {
            return Err(PuzzleError::EmptyBoard);
        }
        if rows > MAX_SIDE || cols > MAX_SIDE {
            return Err(PuzzleError::TooLarge { rows, cols });
        }
        let (rows, cols) = (rows as u8, cols as u8);

        let check = |what: &'static str, at: Position| {
            if at.row < rows && at.col < cols {
                Ok(())
            } else {
                Err(PuzzleError::OutOfBounds {
                    what,
                    at,
                    rows,
                    cols,
                })
            }
        };

        let mut seen = HashSet::with_capacity(pieces.len());
        for piece in &pieces {
            check("piece", piece.position)?;
            if !seen.insert(piece.position) {
                return Err(PuzzleError::DuplicatePiece { at: piece.position });
            }
        }

        let targets: BTreeSet<Position> = targets.into_iter().collect();
        for &target in &targets {
            check("target", target)?;
        }

        Ok(Self {
            rows,
            cols,
            pieces,
            targets,
        })
    }

    /// Parses an ASCII layout, one line per row.
    ///
    /// `.` is an empty cell, `T` a target, `G`/`R`/`P` a neutral piece, a
    /// puller and a pusher. A lowercase piece letter stands on a target.
    /// Blank lines and leading/trailing whitespace are skipped.
    pub fn parse(layout: &str) -> Result<Self, PuzzleError> {
        let lines: Vec<&str> = layout
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .collect();

        let cols = lines.first().map_or(0, |line| line.chars().count());
        let mut pieces = Vec::new();
        let mut targets = Vec::new();

        for (row, line) in lines.iter().enumerate() {
            let found = line.chars().count();
            if found != cols {
                return Err(PuzzleError::RaggedRow {
                    row,
                    expected: cols,
                    found,
                });
            }
            if row >= MAX_SIDE || cols > MAX_SIDE {
                return Err(PuzzleError::TooLarge {
                    rows: lines.len(),
                    cols,
                });
            }

            for (col, ch) in line.chars().enumerate() {
                let pos = Position::new(row as u8, col as u8);
                match ch {
                    '.' => {}
                    'T' => targets.push(pos),
                    _ => {
                        let kind = PieceKind::from_marker(ch.to_ascii_uppercase())
                            .ok_or(PuzzleError::UnknownCell { row, col, ch })?;
                        if ch.is_ascii_lowercase() {
                            targets.push(pos);
                        }
                        pieces.push(Piece::new(kind, pos));
                    }
                }
            }
        }

        Self::new(lines.len(), cols, pieces, targets)
    }

    /// The 3x4 starter level.
    pub fn default_level() -> Self {
        DEFAULT_LEVEL.clone()
    }

    pub fn rows(&self) -> u8 {
        self.rows
    }

    pub fn cols(&self) -> u8 {
        self.cols
    }

    pub fn pieces(&self) -> &[Piece] {
        &self.pieces
    }

    pub fn targets(&self) -> &BTreeSet<Position> {
        &self.targets
    }
}

impl TryFrom<PuzzleConfig> for Puzzle {
    type Error = PuzzleError;

    fn try_from(config: PuzzleConfig) -> Result<Self, Self::Error> {
        Self::new(config.rows, config.cols, config.pieces, config.targets)
    }
}
