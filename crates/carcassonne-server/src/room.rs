//! Game room management.

use carcassonne_core::{GameConfig, GameEvent, GameSnapshot, GameState, Move};
use std::collections::HashSet;
use thiserror::Error;
use tracing::debug;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RoomError {
    #[error("Game already active in this room")]
    RoomAlreadyActive,

    #[error("Cannot start game from lobby")]
    CannotStartFromLobby,

    #[error("No game in progress")]
    GameNotStarted,

    #[error("Invalid move")]
    InvalidMove,
}

/// A named group of clients sharing at most one game.
///
/// Rooms exist from the first join until the last member leaves. The game is
/// created by `start_game` and lives as long as the room.
pub struct Room {
    pub id: String,
    pub members: HashSet<Uuid>,
    /// The game state (once started)
    pub game: Option<GameState>,
    config: GameConfig,
}

impl Room {
    pub fn new(id: String, config: GameConfig) -> Self {
        Self {
            id,
            members: HashSet::new(),
            game: None,
            config,
        }
    }

    pub fn member_count(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Whether a game has been started here
    pub fn is_active(&self) -> bool {
        self.game.is_some()
    }

    pub fn add_member(&mut self, client_id: Uuid) -> Result<(), RoomError> {
        if self.is_active() {
            return Err(RoomError::RoomAlreadyActive);
        }
        self.members.insert(client_id);
        Ok(())
    }

    /// Remove a member. Returns true if the room is now empty.
    pub fn remove_member(&mut self, client_id: Uuid) -> bool {
        self.members.remove(&client_id);
        self.members.is_empty()
    }

    /// Create the game with one seat per current member.
    pub fn start_game(&mut self) -> Result<GameSnapshot, RoomError> {
        if self.is_active() {
            return Err(RoomError::RoomAlreadyActive);
        }

        let game = GameState::with_config(self.member_count(), self.config);
        let snapshot = game.snapshot();
        self.game = Some(game);
        Ok(snapshot)
    }

    /// Apply a move and return the resulting event and state.
    pub fn apply_move(&mut self, mv: Move) -> Result<(GameEvent, GameSnapshot), RoomError> {
        let game = self.game.as_mut().ok_or(RoomError::GameNotStarted)?;

        let event = game.apply_move(mv).map_err(|e| {
            debug!(room = %self.id, "Rejected {:?}: {}", mv, e);
            RoomError::InvalidMove
        })?;

        Ok((event, game.snapshot()))
    }

    pub fn snapshot(&self) -> Option<GameSnapshot> {
        self.game.as_ref().map(GameState::snapshot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use carcassonne_core::{Position, Rotation};

    fn room_with(members: usize) -> Room {
        let mut room = Room::new("r1".to_string(), GameConfig::default());
        for _ in 0..members {
            room.add_member(Uuid::new_v4()).unwrap();
        }
        room
    }

    #[test]
    fn test_add_remove_members() {
        let mut room = room_with(0);
        assert!(room.is_empty());

        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        room.add_member(a).unwrap();
        room.add_member(b).unwrap();
        assert_eq!(room.member_count(), 2);

        assert!(!room.remove_member(a));
        assert!(room.remove_member(b));
        // Removing twice is harmless
        assert!(room.remove_member(b));
    }

    #[test]
    fn test_start_game() {
        let mut room = room_with(3);
        assert!(!room.is_active());
        assert_eq!(
            room.apply_move(Move::new(Position::ORIGIN, Rotation::NONE)).err(),
            Some(RoomError::GameNotStarted)
        );

        let snapshot = room.start_game().unwrap();
        assert!(room.is_active());
        assert_eq!(snapshot.scores, vec![0, 0, 0]);
        assert!(snapshot.placed.is_empty());

        assert_eq!(room.start_game().err(), Some(RoomError::RoomAlreadyActive));
        assert_eq!(room.add_member(Uuid::new_v4()), Err(RoomError::RoomAlreadyActive));
        assert_eq!(room.member_count(), 3);
    }

    #[test]
    fn test_apply_move() {
        let mut room = room_with(2);
        room.start_game().unwrap();

        let (event, snapshot) = room
            .apply_move(Move::new(Position::ORIGIN, Rotation::NONE))
            .unwrap();
        assert!(matches!(
            event,
            GameEvent::TilePlaced { remaining, .. } if remaining == snapshot.remaining
        ));
        assert_eq!(snapshot.placed.len(), 1);

        // Occupied
        let before = room.snapshot();
        assert_eq!(
            room.apply_move(Move::new(Position::ORIGIN, Rotation::NONE)).err(),
            Some(RoomError::InvalidMove)
        );
        assert_eq!(room.snapshot(), before);
    }

    #[test]
    fn test_invalid_move_message() {
        assert_eq!(RoomError::InvalidMove.to_string(), "Invalid move");
    }
}
