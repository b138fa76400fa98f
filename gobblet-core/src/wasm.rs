//! WASM bindings for gobblet-core
//!
//! Lets a browser page act as the presentation layer: it resolves clicks to
//! cells and sizes, calls in here, and redraws from the accessors.

use wasm_bindgen::prelude::*;

use crate::{Color, Game, GameConfig, MoveOutcome, Pos, RuleError, Size, Status};

/// WASM-friendly wrapper around Game
#[wasm_bindgen]
pub struct WasmGame {
    inner: Game,
}

#[wasm_bindgen]
impl WasmGame {
    /// Create a new game. `firstPlayer` is "red" (default) or "yellow".
    #[wasm_bindgen(constructor)]
    pub fn new(first_player: Option<String>) -> WasmGame {
        let first_player = first_player
            .as_deref()
            .and_then(Color::parse)
            .unwrap_or(Color::Red);
        WasmGame {
            inner: Game::with_config(GameConfig { first_player }),
        }
    }

    /// Current player: "red" or "yellow"
    #[wasm_bindgen(js_name = currentPlayer)]
    pub fn current_player(&self) -> String {
        color_str(self.inner.current_player()).to_string()
    }

    /// Place a reserve piece. Size is 1=S, 2=M, 3=L.
    /// Returns "ok" or the rejection message.
    pub fn place(&mut self, size: u8, row: u8, col: u8) -> String {
        let Some(size) = parse_size(size) else {
            return format!("size must be 1, 2 or 3, got {size}");
        };
        let result = Pos::new(row, col).and_then(|at| self.inner.place(size, at));
        report(result.map(|_| ()))
    }

    /// Touch a board piece. Returns "ok" or the rejection message.
    pub fn touch(&mut self, row: u8, col: u8) -> String {
        let result = Pos::new(row, col).and_then(|at| self.inner.touch(at));
        report(result.map(|_| ()))
    }

    /// Move the touched piece. Returns "success", "opponent_win" or the rejection message.
    #[wasm_bindgen(js_name = moveTo)]
    pub fn move_to(&mut self, row: u8, col: u8) -> String {
        match Pos::new(row, col).and_then(|to| self.inner.move_to(to)) {
            Ok(MoveOutcome::Success) => "success".to_string(),
            Ok(MoveOutcome::OpponentWin) => "opponent_win".to_string(),
            Err(err) => err.to_string(),
        }
    }

    /// Forfeit. Returns the winner ("red" / "yellow") or the rejection message.
    pub fn forfeit(&mut self) -> String {
        match self.inner.forfeit() {
            Ok(winner) => color_str(winner).to_string(),
            Err(err) => err.to_string(),
        }
    }

    #[wasm_bindgen(js_name = mustMoveTouched)]
    pub fn must_move_touched(&self) -> bool {
        self.inner.must_move_touched()
    }

    /// Touched cell as [row, col], or empty
    pub fn touched(&self) -> Vec<u8> {
        self.inner
            .touched()
            .map(|at| vec![at.row(), at.col()])
            .unwrap_or_default()
    }

    #[wasm_bindgen(js_name = hasLegalMoves)]
    pub fn has_legal_moves(&self) -> bool {
        self.inner.has_legal_moves()
    }

    /// Get reserves for a color as [small, medium, large]
    pub fn reserves(&self, color: &str) -> Vec<u8> {
        Color::parse(color)
            .map(|color| self.inner.reserve(color).counts().to_vec())
            .unwrap_or_default()
    }

    /// Get cell stack at position as array of [player, size, player, size, ...]
    /// Bottom to top order, player 1=red 2=yellow, size 1=S 2=M 3=L
    #[wasm_bindgen(js_name = cellStack)]
    pub fn cell_stack(&self, row: u8, col: u8) -> Vec<u8> {
        let Ok(at) = Pos::new(row, col) else {
            return vec![];
        };
        self.inner
            .board()
            .cell(at)
            .pieces()
            .flat_map(|piece| [piece.owner as u8, piece.size as u8 + 1])
            .collect()
    }

    /// Winner ("red" / "yellow") or empty while the game is on
    pub fn winner(&self) -> String {
        self.inner
            .winner()
            .map(|winner| color_str(winner).to_string())
            .unwrap_or_default()
    }

    /// Get winning line as array of positions [row, col, row, col, row, col]
    /// Returns empty array if no winning line (including a forfeit)
    #[wasm_bindgen(js_name = winningLine)]
    pub fn winning_line(&self) -> Vec<u8> {
        if let Some(winner) = self.inner.winner() {
            if let Some(line) = self.inner.winning_line(winner) {
                return line.iter().flat_map(|pos| [pos.row(), pos.col()]).collect();
            }
        }
        vec![]
    }

    /// Full game state as a JS object
    pub fn state(&self) -> Result<JsValue, JsValue> {
        serde_wasm_bindgen::to_value(&self.inner).map_err(JsValue::from)
    }

    /// "ongoing", "red_wins" or "yellow_wins"
    pub fn result(&self) -> String {
        match self.inner.status() {
            Status::InProgress => "ongoing".to_string(),
            Status::Won { winner, .. } => format!("{}_wins", color_str(winner)),
        }
    }
}

impl Default for WasmGame {
    fn default() -> Self {
        Self::new(None)
    }
}

fn color_str(color: Color) -> &'static str {
    match color {
        Color::Red => "red",
        Color::Yellow => "yellow",
    }
}

/// 1=S, 2=M, 3=L
fn parse_size(size: u8) -> Option<Size> {
    Size::from_index(size.checked_sub(1)? as usize)
}

fn report(result: Result<(), RuleError>) -> String {
    match result {
        Ok(()) => "ok".to_string(),
        Err(err) => err.to_string(),
    }
}
