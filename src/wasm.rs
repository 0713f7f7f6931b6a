//! JS-facing wrapper around [`Game`] for the browser front end.

use wasm_bindgen::prelude::*;

use crate::error::PuzzleError;
use crate::game::Game;
use crate::puzzle::Puzzle;
use crate::types::Position;

#[wasm_bindgen]
pub struct WasmGame {
    inner: Game,
}

#[wasm_bindgen]
impl WasmGame {
    /// Starts the built-in level.
    #[wasm_bindgen(constructor)]
    pub fn new() -> WasmGame {
        WasmGame {
            inner: Game::default(),
        }
    }

    /// Starts a level given as an ASCII layout (see [`Puzzle::parse`]).
    #[wasm_bindgen(js_name = fromLayout)]
    pub fn from_layout(layout: &str) -> Result<WasmGame, JsError> {
        let puzzle = Puzzle::parse(layout)?;
        Ok(WasmGame {
            inner: Game::new(&puzzle),
        })
    }

    /// Starts a level from `{ rows, cols, pieces: [{ kind, position: { row, col } }], targets: [{ row, col }] }`.
    #[wasm_bindgen(js_name = fromConfig)]
    pub fn from_config(config: JsValue) -> Result<WasmGame, JsError> {
        let puzzle: Puzzle = serde_wasm_bindgen::from_value(config)
            .map_err(|err| PuzzleError::InvalidConfig(err.to_string()))?;
        Ok(WasmGame {
            inner: Game::new(&puzzle),
        })
    }

    pub fn rows(&self) -> u8 {
        self.inner.state().board().rows()
    }

    pub fn cols(&self) -> u8 {
        self.inner.state().board().cols()
    }

    #[wasm_bindgen(js_name = makeMove)]
    pub fn make_move(
        &mut self,
        from_row: u8,
        from_col: u8,
        to_row: u8,
        to_col: u8,
    ) -> Result<(), JsError> {
        let from = Position::new(from_row, from_col);
        let to = Position::new(to_row, to_col);
        self.inner.make_move(from, to)?;
        Ok(())
    }

    pub fn reset(&mut self) {
        self.inner.reset();
    }

    #[wasm_bindgen(js_name = isSolved)]
    pub fn is_solved(&self) -> bool {
        self.inner.is_solved()
    }

    #[wasm_bindgen(js_name = moveCount)]
    pub fn move_count(&self) -> u32 {
        self.inner.move_count()
    }

    /// Board state for rendering, as a plain JS object.
    pub fn snapshot(&self) -> Result<JsValue, JsError> {
        serde_wasm_bindgen::to_value(&self.inner.snapshot())
            .map_err(|err| JsError::new(&err.to_string()))
    }

    pub fn display(&self) -> String {
        self.inner.state().display()
    }

    /// Maps a click offset to `[row, col]`, or `undefined` outside the grid.
    #[wasm_bindgen(js_name = cellAtPixel)]
    pub fn cell_at_pixel(&self, x: f64, y: f64, cell_size: f64) -> Option<Vec<u8>> {
        pixel_to_cell(x, y, cell_size, self.rows(), self.cols())
            .map(|pos| vec![pos.row, pos.col])
    }
}

impl Default for WasmGame {
    fn default() -> Self {
        Self::new()
    }
}

fn pixel_to_cell(x: f64, y: f64, cell_size: f64, rows: u8, cols: u8) -> Option<Position> {
    let valid = cell_size > 0.0 && x.is_finite() && y.is_finite() && x >= 0.0 && y >= 0.0;
    if !valid {
        return None;
    }
    let row = (y / cell_size).floor();
    let col = (x / cell_size).floor();
    if row < rows as f64 && col < cols as f64 {
        Some(Position::new(row as u8, col as u8))
    } else {
        None
    }
}
