//! Moves players submit and the events committing them produces.

use crate::board::{Position, Rotation};
use serde::{Deserialize, Serialize};

/// Place the tile on top of the draw pile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Move {
    /// Cell to place the tile on
    pub location: Position,
    /// Quarter turns, reduced modulo 4
    pub angle: Rotation,
}

impl Move {
    pub fn new(location: Position, angle: Rotation) -> Self {
        Self { location, angle }
    }
}

/// Events that occur as a result of moves
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameEvent {
    /// A tile left the draw pile and joined the board
    TilePlaced {
        tile_key: String,
        location: Position,
        rotation: Rotation,
        /// Tiles still in the draw pile
        remaining: usize,
    },
}
