//! Serializable copy of a game state, as sent to clients.
//!
//! Positions become `Point2(x, y)` map keys and tiles become catalog keys, so
//! a client can rebuild its own state with [`GameState::from_snapshot`].

use crate::board::{Board, PlacedTile, Position, PositionParseError, Rotation};
use crate::deck::DrawPile;
use crate::game::{GameError, GameState, Meeple, PlayerId};
use crate::placement::is_valid_board;
use crate::tile::lookup;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// One board cell on the wire
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlacedTileSnapshot {
    pub tile_key: String,
    pub rotation: Rotation,
    #[serde(default)]
    pub hidden: bool,
}

/// Full authoritative state on the wire
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameSnapshot {
    /// Placed tiles keyed by `Point2(x, y)`
    pub placed: BTreeMap<String, PlacedTileSnapshot>,
    /// Tile keys in stack order, the next tile last
    pub draw_pile: Vec<String>,
    pub remaining: usize,
    pub next_tile: Option<String>,
    pub meeples: BTreeMap<String, Meeple>,
    pub scores: Vec<u32>,
    pub current_player: PlayerId,
}

impl GameState {
    /// Deep copy of the state in wire form.
    pub fn snapshot(&self) -> GameSnapshot {
        GameSnapshot {
            placed: self
                .board
                .iter()
                .map(|(position, placed)| {
                    (
                        position.to_string(),
                        PlacedTileSnapshot {
                            tile_key: placed.tile.key().to_string(),
                            rotation: placed.rotation,
                            hidden: placed.hidden,
                        },
                    )
                })
                .collect(),
            draw_pile: self
                .draw_pile
                .as_stack()
                .iter()
                .map(|tile| tile.key().to_string())
                .collect(),
            remaining: self.draw_pile.len(),
            next_tile: self.peek().map(|tile| tile.key().to_string()),
            meeples: self
                .meeples
                .iter()
                .map(|(position, meeple)| (position.to_string(), *meeple))
                .collect(),
            scores: self.scores.clone(),
            current_player: self.current_player,
        }
    }

    /// Rebuild a state from its wire form.
    ///
    /// Fails on unknown tile keys, malformed or repeated positions, a board
    /// that breaks the placement rules, or counts that disagree.
    pub fn from_snapshot(snapshot: &GameSnapshot) -> Result<Self, GameError> {
        let mut board = Board::new();
        for (key, placed) in &snapshot.placed {
            let position = parse_position(key)?;
            if board.is_occupied(position) {
                return Err(GameError::InvalidSnapshot(format!("{position} appears twice")));
            }
            let tile = lookup(&placed.tile_key)?;
            board.insert_unchecked(
                position,
                PlacedTile {
                    tile,
                    rotation: placed.rotation,
                    hidden: placed.hidden,
                },
            );
        }
        if !is_valid_board(&board) {
            return Err(GameError::InvalidSnapshot(
                "placed tiles break the placement rules".to_string(),
            ));
        }

        let stack = snapshot
            .draw_pile
            .iter()
            .map(|key| lookup(key))
            .collect::<Result<Vec<_>, _>>()?;
        let draw_pile = DrawPile::from_stack(stack);
        if draw_pile.len() != snapshot.remaining {
            return Err(GameError::InvalidSnapshot(format!(
                "{} tiles listed but {} remaining",
                draw_pile.len(),
                snapshot.remaining
            )));
        }

        let mut meeples = HashMap::new();
        for (key, meeple) in &snapshot.meeples {
            meeples.insert(parse_position(key)?, *meeple);
        }

        if snapshot.current_player >= snapshot.scores.len().max(1) {
            return Err(GameError::InvalidSnapshot(format!(
                "current player {} out of range",
                snapshot.current_player
            )));
        }

        Ok(Self {
            board,
            draw_pile,
            meeples,
            scores: snapshot.scores.clone(),
            current_player: snapshot.current_player,
        })
    }
}

fn parse_position(key: &str) -> Result<Position, GameError> {
    key.parse()
        .map_err(|e: PositionParseError| GameError::InvalidSnapshot(e.to_string()))
}
