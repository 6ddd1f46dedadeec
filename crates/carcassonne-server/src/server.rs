//! WebSocket server and connection handling.
//!
//! Every connection runs in its own task, but each message is handled by a
//! synchronous function that never awaits. A room's state is only touched
//! while holding its `DashMap` entry, so join/start/move on one room are
//! applied one at a time in the order they arrive.

use crate::protocol::{ClientMessage, ServerMessage};
use crate::room::{Room, RoomError};
use carcassonne_core::{GameConfig, GameEvent, Move};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use futures_util::{SinkExt, StreamExt};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;
use tokio_tungstenite::{accept_async, tungstenite::Message};
use tracing::{error, info, warn};
use uuid::Uuid;

/// Server state shared across all connections.
pub struct ServerState {
    /// Rooms by name. A client missing from `client_rooms` is in the lobby.
    pub rooms: DashMap<String, Room>,
    /// Mapping from client ID to the room it joined
    pub client_rooms: DashMap<Uuid, String>,
    /// Mapping from client ID to its message sender
    pub client_senders: DashMap<Uuid, mpsc::UnboundedSender<ServerMessage>>,
    /// Options for every game started on this server
    pub game_config: GameConfig,
}

impl ServerState {
    pub fn new(game_config: GameConfig) -> Self {
        Self {
            rooms: DashMap::new(),
            client_rooms: DashMap::new(),
            client_senders: DashMap::new(),
            game_config,
        }
    }

    /// Send a message to a specific client.
    pub fn send_to_client(&self, client_id: Uuid, msg: ServerMessage) {
        if let Some(sender) = self.client_senders.get(&client_id) {
            let _ = sender.send(msg);
        }
    }

    /// Broadcast a message to all clients in a room.
    pub fn broadcast_to_room(&self, room_id: &str, msg: ServerMessage) {
        let members: Vec<Uuid> = match self.rooms.get(room_id) {
            Some(room) => room.members.iter().copied().collect(),
            None => return,
        };
        for client_id in members {
            self.send_to_client(client_id, msg.clone());
        }
    }

    /// The room a client joined, or `None` while it is in the lobby.
    pub fn room_of(&self, client_id: Uuid) -> Option<String> {
        self.client_rooms.get(&client_id).map(|r| r.value().clone())
    }

    /// Drop every room with no members left. Safe to call any number of
    /// times; a room already gone is simply not seen again.
    pub fn remove_dead_rooms(&self) {
        self.rooms.retain(|room_id, room| {
            if room.is_empty() {
                info!("Deleted room {}", room_id);
                false
            } else {
                true
            }
        });
    }
}

impl Default for ServerState {
    fn default() -> Self {
        Self::new(GameConfig::default())
    }
}

/// Run the WebSocket server.
pub async fn run_server(addr: SocketAddr, state: Arc<ServerState>) -> anyhow::Result<()> {
    let listener = TcpListener::bind(addr).await?;
    info!("Carcassonne server listening on {}", addr);

    while let Ok((stream, peer_addr)) = listener.accept().await {
        let state = Arc::clone(&state);
        tokio::spawn(async move {
            if let Err(e) = handle_connection(stream, peer_addr, state).await {
                error!("Connection error from {}: {}", peer_addr, e);
            }
        });
    }

    Ok(())
}

/// Handle a single WebSocket connection.
async fn handle_connection(
    stream: TcpStream,
    addr: SocketAddr,
    state: Arc<ServerState>,
) -> anyhow::Result<()> {
    let ws_stream = accept_async(stream).await?;
    info!("New WebSocket connection from {}", addr);

    let (mut ws_sender, mut ws_receiver) = ws_stream.split();

    // Assign a client ID; the client starts out in the lobby
    let client_id = Uuid::new_v4();

    // Create channel for outgoing messages
    let (tx, mut rx) = mpsc::unbounded_channel::<ServerMessage>();
    state.client_senders.insert(client_id, tx);
    let _disconnect = DisconnectGuard::new(client_id, Arc::clone(&state));

    let welcome = ServerMessage::Welcome { client_id };
    let msg_text = serde_json::to_string(&welcome)?;
    ws_sender.send(Message::Text(msg_text)).await?;

    // Spawn task to forward messages from channel to WebSocket
    let send_task = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            match serde_json::to_string(&msg) {
                Ok(text) => {
                    if ws_sender.send(Message::Text(text)).await.is_err() {
                        break;
                    }
                }
                Err(e) => error!("Failed to encode {:?}: {}", msg, e),
            }
        }
    });

    // Handle incoming messages
    while let Some(msg) = ws_receiver.next().await {
        match msg {
            Ok(Message::Text(text)) => match serde_json::from_str::<ClientMessage>(&text) {
                Ok(client_msg) => handle_message(client_id, client_msg, &state),
                Err(e) => warn!("Invalid message from {}: {} ({})", client_id, text, e),
            },
            Ok(Message::Close(_)) => {
                info!("Client {} closing connection", client_id);
                break;
            }
            Err(e) => {
                error!("WebSocket error from {}: {}", client_id, e);
                break;
            }
            _ => {}
        }
    }

    send_task.abort();

    info!("Connection closed for {}", client_id);
    Ok(())
}

/// Handle a client message. Rejections go back to the sender only.
pub fn handle_message(client_id: Uuid, msg: ClientMessage, state: &ServerState) {
    let result = match msg {
        ClientMessage::Join { room } => handle_join(client_id, room, state),
        ClientMessage::Start => handle_start(client_id, state),
        ClientMessage::Move(mv) => handle_move(client_id, mv, state),
    };

    if let Err(e) = result {
        warn!("Rejected request from {}: {}", client_id, e);
        state.send_to_client(
            client_id,
            ServerMessage::Error {
                message: e.to_string(),
            },
        );
    }
}

fn handle_join(client_id: Uuid, room_id: String, state: &ServerState) -> Result<(), RoomError> {
    info!("Client {} joining room {}", client_id, room_id);

    // Enter the new room first so a refused join keeps the old membership
    match state.rooms.entry(room_id.clone()) {
        Entry::Occupied(mut entry) => entry.get_mut().add_member(client_id)?,
        Entry::Vacant(entry) => {
            let mut room = Room::new(room_id.clone(), state.game_config);
            room.add_member(client_id)?;
            entry.insert(room);
        }
    }

    if state.room_of(client_id).is_some_and(|previous| previous != room_id) {
        leave_room(client_id, state);
    }

    state.client_rooms.insert(client_id, room_id);
    Ok(())
}

fn handle_start(client_id: Uuid, state: &ServerState) -> Result<(), RoomError> {
    let room_id = state
        .room_of(client_id)
        .ok_or(RoomError::CannotStartFromLobby)?;

    let (snapshot, players) = {
        let mut room = state
            .rooms
            .get_mut(&room_id)
            .ok_or(RoomError::CannotStartFromLobby)?;
        (room.start_game()?, room.member_count())
    };

    info!("Starting game in room {} with {} players", room_id, players);
    state.broadcast_to_room(&room_id, ServerMessage::GameState { state: snapshot });
    Ok(())
}

fn handle_move(client_id: Uuid, mv: Move, state: &ServerState) -> Result<(), RoomError> {
    let room_id = state.room_of(client_id).ok_or(RoomError::GameNotStarted)?;

    let (event, snapshot) = {
        let mut room = state
            .rooms
            .get_mut(&room_id)
            .ok_or(RoomError::GameNotStarted)?;
        room.apply_move(mv)?
    };

    let GameEvent::TilePlaced {
        tile_key,
        location,
        rotation,
        remaining,
    } = event;
    info!(
        "Room {}: placed {} at {} turned {} ({} left)",
        room_id,
        tile_key,
        location,
        rotation.quarter_turns(),
        remaining
    );

    state.broadcast_to_room(&room_id, ServerMessage::GameState { state: snapshot });
    Ok(())
}

/// Take a client out of its room, back into the lobby.
fn leave_room(client_id: Uuid, state: &ServerState) {
    if let Some((_, room_id)) = state.client_rooms.remove(&client_id) {
        if let Some(mut room) = state.rooms.get_mut(&room_id) {
            room.remove_member(client_id);
        }
        info!("Client {} left room {}", client_id, room_id);
        state.remove_dead_rooms();
    }
}

/// Handle client disconnect.
pub fn handle_disconnect(client_id: Uuid, state: &ServerState) {
    state.client_senders.remove(&client_id);
    leave_room(client_id, state);
}

/// Runs `handle_disconnect` when a connection task ends, including early
/// returns and panics.
struct DisconnectGuard {
    client_id: Uuid,
    state: Arc<ServerState>,
}

impl DisconnectGuard {
    fn new(client_id: Uuid, state: Arc<ServerState>) -> Self {
        Self { client_id, state }
    }
}

impl Drop for DisconnectGuard {
    fn drop(&mut self) {
        handle_disconnect(self.client_id, &self.state);
    }
}
