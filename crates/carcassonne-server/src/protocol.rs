//! WebSocket protocol messages for Carcassonne multiplayer.

use carcassonne_core::{GameSnapshot, Move};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Messages sent from client to server.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload")]
pub enum ClientMessage {
    /// Leave the current room, if any, and join another
    Join { room: String },

    /// Start the game in the current room
    Start,

    /// Place the tile on top of the draw pile
    Move(Move),
}

/// Messages sent from server to client.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload")]
pub enum ServerMessage {
    /// Welcome message with assigned client ID
    Welcome { client_id: Uuid },

    /// Full authoritative game state
    GameState { state: GameSnapshot },

    /// The client's last request was rejected
    Error { message: String },
}
