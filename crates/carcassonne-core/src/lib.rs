//! Carcassonne - a shared-board tile placement engine
//!
//! This crate provides the core game logic, including:
//! - The catalog of tile types with their edges and interior connections
//! - Deck composition, with or without the river expansion
//! - Square grid coordinates, rotations and the board
//! - Placement rules
//! - The game state that applies moves and produces wire snapshots
//!
//! # Architecture
//!
//! The engine is platform-agnostic. The server hosts the authoritative
//! `GameState` for each room; browsers can load the same engine as
//! WebAssembly to check moves against the snapshots they receive.
//!
//! # Modules
//!
//! - [`tile`]: Tile catalog and connectivity patterns
//! - [`deck`]: Tile quantities, shuffling and the draw pile
//! - [`board`]: Positions, directions, rotations and the board
//! - [`placement`]: Placement validation
//! - [`game`]: Game state and moves
//! - [`snapshot`]: Wire form of the game state

pub mod actions;
pub mod board;
pub mod deck;
pub mod game;
pub mod placement;
pub mod snapshot;
pub mod tile;
#[cfg(feature = "wasm")]
pub mod wasm;

// Re-export commonly used types
pub use actions::{GameEvent, Move};
pub use board::{Board, Direction, PlacedTile, Position, PositionParseError, Rotation};
pub use deck::{build_deck, shuffled, DrawPile};
pub use game::{GameConfig, GameError, GameState, Meeple, PlayerId};
pub use placement::{check_placement, is_valid_placement, PlacementError};
pub use snapshot::{GameSnapshot, PlacedTileSnapshot};
pub use tile::{catalog, lookup, CatalogError, Connectivity, Quality, Terrain, Tile};
