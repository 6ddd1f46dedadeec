//! WebAssembly bindings for browser clients.
//!
//! The server owns the real game. A client loads each `gameState` snapshot it
//! receives into a `WasmGame` and asks it which moves are legal before sending
//! one, so it can highlight cells without a round trip.

use wasm_bindgen::prelude::*;

use crate::actions::Move;
use crate::board::{PlacedTile, Position, Rotation};
use crate::game::GameState;
use crate::placement::{is_valid_placement, valid_placements};
use crate::snapshot::GameSnapshot;

/// Initialize panic hook for better error messages in browser console
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
}

/// Client-side mirror of a server game
#[wasm_bindgen]
pub struct WasmGame {
    state: GameState,
}

#[wasm_bindgen]
impl WasmGame {
    /// Build from a snapshot received from the server
    #[wasm_bindgen(constructor)]
    pub fn new(snapshot_json: &str) -> Result<WasmGame, JsValue> {
        Ok(WasmGame {
            state: parse_snapshot(snapshot_json)?,
        })
    }

    /// Replace the mirrored state with a newer snapshot
    #[wasm_bindgen(js_name = loadSnapshot)]
    pub fn load_snapshot(&mut self, snapshot_json: &str) -> Result<(), JsValue> {
        self.state = parse_snapshot(snapshot_json)?;
        Ok(())
    }

    /// Key of the tile the next move places, if any
    #[wasm_bindgen(js_name = nextTile)]
    pub fn next_tile(&self) -> Option<String> {
        self.state.peek().map(|tile| tile.key().to_string())
    }

    /// Tiles left in the draw pile
    #[wasm_bindgen(js_name = remaining)]
    pub fn remaining(&self) -> usize {
        self.state.draw_pile().len()
    }

    #[wasm_bindgen(js_name = isFinished)]
    pub fn is_finished(&self) -> bool {
        self.state.is_finished()
    }

    /// Whether the next tile may go at (x, y) turned `angle` quarter turns
    #[wasm_bindgen(js_name = isValidPlacement)]
    pub fn is_valid_placement(&self, x: i32, y: i32, angle: i32) -> bool {
        match self.state.peek() {
            Some(tile) => is_valid_placement(
                self.state.board(),
                Position::new(x, y),
                &PlacedTile::new(tile, Rotation::new(angle)),
            ),
            None => false,
        }
    }

    /// All legal moves for the next tile as a JSON array of moves
    #[wasm_bindgen(js_name = getValidPlacements)]
    pub fn get_valid_placements(&self) -> String {
        let moves: Vec<Move> = match self.state.peek() {
            Some(tile) => valid_placements(self.state.board(), tile)
                .into_iter()
                .map(|(location, angle)| Move::new(location, angle))
                .collect(),
            None => Vec::new(),
        };
        serde_json::to_string(&moves).unwrap_or_else(|_| "[]".to_string())
    }

    /// Current state as snapshot JSON
    #[wasm_bindgen(js_name = getState)]
    pub fn get_state(&self) -> String {
        serde_json::to_string(&self.state.snapshot()).unwrap_or_else(|_| "{}".to_string())
    }
}

fn parse_snapshot(snapshot_json: &str) -> Result<GameState, JsValue> {
    let snapshot: GameSnapshot = serde_json::from_str(snapshot_json)
        .map_err(|e| JsValue::from_str(&format!("Invalid snapshot JSON: {}", e)))?;
    GameState::from_snapshot(&snapshot).map_err(|e| JsValue::from_str(&e.to_string()))
}
