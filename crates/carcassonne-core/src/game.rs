//! Game session state.
//!
//! One `GameState` owns one board, its draw pile and the per-player tallies.
//! Moves either commit completely or leave the state exactly as it was.

use crate::actions::{GameEvent, Move};
use crate::board::{Board, PlacedTile, Position};
use crate::deck::{build_deck, DrawPile};
use crate::placement::{check_placement, PlacementError};
use crate::tile::{CatalogError, Tile};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

/// Player index, 0-based in join order
pub type PlayerId = usize;

/// Errors that can occur when applying moves or rebuilding state
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GameError {
    #[error("Invalid move: {0}")]
    InvalidMove(#[from] PlacementError),

    #[error("The draw pile is empty")]
    EmptyDrawPile,

    #[error(transparent)]
    UnknownTile(#[from] CatalogError),

    #[error("Invalid snapshot: {0}")]
    InvalidSnapshot(String),
}

/// Options fixed when a session is created.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameConfig {
    /// Deal the river expansion before the base tiles
    pub rivers: bool,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self { rivers: true }
    }
}

/// A follower on the board. Placement rules for these are not enforced yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Meeple {
    pub owner: PlayerId,
}

/// The complete game state.
///
/// `Clone` is a full deep copy: tiles are shared `'static` catalog entries,
/// everything else is owned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameState {
    pub(crate) board: Board,
    pub(crate) draw_pile: DrawPile,
    pub(crate) meeples: HashMap<Position, Meeple>,
    pub(crate) scores: Vec<u32>,
    pub(crate) current_player: PlayerId,
}

impl GameState {
    /// Create a new game with a freshly shuffled river deck
    pub fn new(player_count: usize) -> Self {
        Self::with_config(player_count, GameConfig::default())
    }

    pub fn with_config(player_count: usize, config: GameConfig) -> Self {
        let mut rng = rand::thread_rng();
        Self::with_rng(player_count, config, &mut rng)
    }

    /// Create a new game, shuffling with the given RNG.
    /// Lets tests and replays build the same deck twice.
    pub fn with_rng<R: Rng + ?Sized>(player_count: usize, config: GameConfig, rng: &mut R) -> Self {
        Self::with_draw_pile(player_count, build_deck(config.rivers, rng))
    }

    /// Create a new game drawing from a prepared pile.
    pub fn with_draw_pile(player_count: usize, draw_pile: DrawPile) -> Self {
        Self {
            board: Board::new(),
            draw_pile,
            meeples: HashMap::new(),
            scores: vec![0; player_count],
            current_player: 0,
        }
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn draw_pile(&self) -> &DrawPile {
        &self.draw_pile
    }

    pub fn meeples(&self) -> &HashMap<Position, Meeple> {
        &self.meeples
    }

    pub fn scores(&self) -> &[u32] {
        &self.scores
    }

    pub fn current_player(&self) -> PlayerId {
        self.current_player
    }

    pub fn player_count(&self) -> usize {
        self.scores.len()
    }

    /// The tile the next move will place
    pub fn peek(&self) -> Option<&'static Tile> {
        self.draw_pile.peek()
    }

    /// The game ends when the pile runs out
    pub fn is_finished(&self) -> bool {
        self.draw_pile.is_empty()
    }

    /// Check a move against the current board without applying it.
    pub fn check_move(&self, mv: Move) -> Result<PlacedTile, GameError> {
        let tile = self.peek().ok_or(GameError::EmptyDrawPile)?;
        let candidate = PlacedTile::new(tile, mv.angle);
        check_placement(&self.board, mv.location, &candidate)?;
        Ok(candidate)
    }

    /// Place the top tile of the draw pile.
    ///
    /// On error nothing changes, so the same tile is still on top and the
    /// move can be retried elsewhere or at another angle.
    pub fn apply_move(&mut self, mv: Move) -> Result<GameEvent, GameError> {
        let candidate = self.check_move(mv)?;

        self.board.insert_unchecked(mv.location, candidate);
        self.draw_pile.pop();

        Ok(GameEvent::TilePlaced {
            tile_key: candidate.tile.key().to_string(),
            location: mv.location,
            rotation: mv.angle,
            remaining: self.draw_pile.len(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::{Direction, Rotation};
    use crate::deck::{BASE_TILE_COUNT, RIVER_TILE_COUNT};
    use crate::placement::is_valid_placement;
    use crate::tile::{lookup, Terrain};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn pile(draw_order: &[&str]) -> DrawPile {
        DrawPile::from_draw_order(draw_order.iter().map(|key| lookup(key).unwrap()).collect())
    }

    fn mv(x: i32, y: i32, angle: i32) -> Move {
        Move::new(Position::new(x, y), Rotation::new(angle))
    }

    #[test]
    fn test_new_game() {
        let game = GameState::new(3);
        assert!(game.board().is_empty());
        assert_eq!(game.scores(), &[0, 0, 0]);
        assert_eq!(game.current_player(), 0);
        assert_eq!(game.draw_pile().len(), BASE_TILE_COUNT + RIVER_TILE_COUNT);
        assert!(game.meeples().is_empty());

        let base = GameState::with_config(2, GameConfig { rivers: false });
        assert_eq!(base.draw_pile().len(), BASE_TILE_COUNT);
    }

    #[test]
    fn test_same_seed_same_deck() {
        let a = GameState::with_rng(2, GameConfig::default(), &mut StdRng::seed_from_u64(9));
        let b = GameState::with_rng(2, GameConfig::default(), &mut StdRng::seed_from_u64(9));
        assert_eq!(a, b);
    }

    #[test]
    fn test_first_move_on_empty_board() {
        // CCFF: the two-city one-field corner
        let mut game = GameState::with_draw_pile(2, pile(&["0r2c_R0_(B)", "0r0c_R0+M"]));

        let event = game.apply_move(mv(0, 0, 0)).unwrap();
        assert_eq!(
            event,
            GameEvent::TilePlaced {
                tile_key: "0r2c_R0_(B)".to_string(),
                location: Position::ORIGIN,
                rotation: Rotation::NONE,
                remaining: 1,
            }
        );
        assert_eq!(game.board().len(), 1);
        assert_eq!(game.draw_pile().len(), 1);
        assert_eq!(game.peek().map(Tile::key), Some("0r0c_R0+M"));
    }

    #[test]
    fn test_rejected_move_changes_nothing() {
        let mut game = GameState::with_draw_pile(2, pile(&["2r0c_R0_(A)", "0r0c_R0+M"]));
        game.apply_move(mv(0, 0, 0)).unwrap();
        let before = game.clone();

        let result = game.apply_move(mv(1, 0, 0));
        assert_eq!(
            result,
            Err(GameError::InvalidMove(PlacementError::EdgeMismatch {
                direction: Direction::West,
                ours: Terrain::Field,
                theirs: Terrain::Road,
            }))
        );
        assert_eq!(game, before);
        assert_eq!(game.peek().map(Tile::key), Some("0r0c_R0+M"));

        // Same tile, somewhere it fits
        game.apply_move(mv(0, 1, 0)).unwrap();
        assert!(game.is_finished());
    }

    #[test]
    fn test_moves_at_grid_edge() {
        let mut game = GameState::with_draw_pile(2, pile(&["0r0c_R0+M", "0r0c_R0+M", "0r0c_R0+M"]));

        game.apply_move(mv(i32::MAX, i32::MIN, 0)).unwrap();
        game.apply_move(mv(i32::MAX, i32::MIN + 1, 0)).unwrap();
        assert_eq!(game.board().len(), 2);

        // Far from both tiles, with neighbours that would overflow
        let before = game.clone();
        assert!(matches!(
            game.apply_move(mv(i32::MIN, i32::MAX, 0)),
            Err(GameError::InvalidMove(PlacementError::NotAdjacent(_)))
        ));
        assert_eq!(game, before);
    }

    #[test]
    fn test_empty_pile() {
        let mut game = GameState::with_draw_pile(1, DrawPile::default());
        assert!(game.is_finished());
        assert_eq!(game.apply_move(mv(0, 0, 0)), Err(GameError::EmptyDrawPile));
    }

    #[test]
    fn test_apply_move_agrees_with_validator() {
        let mut rng = StdRng::seed_from_u64(21);
        let mut game = GameState::with_rng(2, GameConfig { rivers: false }, &mut rng);
        game.apply_move(mv(0, 0, 0)).unwrap();

        for x in -2..=2 {
            for y in -2..=2 {
                for angle in 0..4 {
                    let m = mv(x, y, angle);
                    let tile = game.peek().unwrap();
                    let candidate = PlacedTile::new(tile, m.angle);
                    let expected = is_valid_placement(game.board(), m.location, &candidate);

                    let mut trial = game.clone();
                    let result = trial.apply_move(m);
                    assert_eq!(result.is_ok(), expected, "{:?}", m);

                    if expected {
                        assert_eq!(trial.board().len(), game.board().len() + 1);
                        assert_eq!(trial.draw_pile().len(), game.draw_pile().len() - 1);
                        assert_eq!(trial.board().get(m.location), Some(&candidate));
                    } else {
                        assert_eq!(trial, game);
                    }
                }
            }
        }
    }

    #[test]
    fn test_clone_is_independent() {
        let mut game = GameState::with_draw_pile(2, pile(&["0r0c_R0+M", "0r0c_R0+M"]));
        let copy = game.clone();
        game.apply_move(mv(0, 0, 0)).unwrap();
        game.scores[1] = 5;

        assert!(copy.board().is_empty());
        assert_eq!(copy.draw_pile().len(), 2);
        assert_eq!(copy.scores(), &[0, 0]);
    }
}
