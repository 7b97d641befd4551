//! Room manager for spawning and managing multiple room actors.

use rand::{Rng, distr::Alphanumeric};
use serde::Serialize;
use std::{collections::HashMap, sync::Arc};
use tokio::sync::RwLock;

use super::{
    actor::{RoomActor, RoomHandle},
    config::RoomConfig,
    errors::{RoomError, RoomResult},
    messages::{Command, RoomSnapshot},
    state::{Room, RoomStatus},
};
use crate::{
    accounts::{AccountService, RoomId, UserProfile},
    game::{
        constants::ROOM_ID_LENGTH,
        entities::{DeckSource, ShuffledDecks},
    },
};

/// Room metadata for discovery
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomMetadata {
    pub id: RoomId,
    pub status: RoomStatus,
    pub round: u64,
    pub seated: usize,
    pub spectators: usize,
}

impl From<&RoomSnapshot> for RoomMetadata {
    fn from(snapshot: &RoomSnapshot) -> Self {
        Self {
            id: snapshot.id.clone(),
            status: snapshot.status,
            round: snapshot.round,
            seated: snapshot.seated_count(),
            spectators: snapshot.spectators.len(),
        }
    }
}

/// Random room id of `ROOM_ID_LENGTH` alphanumeric characters
pub fn generate_room_id() -> RoomId {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(ROOM_ID_LENGTH)
        .map(char::from)
        .collect()
}

/// Room manager for managing multiple room instances
pub struct RoomManager {
    /// Account service shared by every room
    accounts: Arc<dyn AccountService>,

    /// Configuration new rooms are created with
    config: RoomConfig,

    /// Active room handles
    rooms: Arc<RwLock<HashMap<RoomId, RoomHandle>>>,

    /// The room new users are pointed at
    main_room: Arc<RwLock<Option<RoomId>>>,
}

impl RoomManager {
    /// Create a new room manager
    ///
    /// # Arguments
    ///
    /// * `accounts` - Account service rooms debit and credit
    /// * `config` - Configuration for every room this manager creates
    pub fn new(accounts: Arc<dyn AccountService>, config: RoomConfig) -> Self {
        Self {
            accounts,
            config,
            rooms: Arc::new(RwLock::new(HashMap::new())),
            main_room: Arc::new(RwLock::new(None)),
        }
    }

    pub fn config(&self) -> &RoomConfig {
        &self.config
    }

    /// Create a room that shuffles a fresh deck every round
    ///
    /// # Returns
    ///
    /// * `RoomId` - Id of the spawned room
    pub async fn create_room(&self) -> RoomResult<RoomId> {
        self.create_room_with_decks(Box::new(ShuffledDecks::new()))
            .await
    }

    /// Create a room that draws its decks from `decks`
    pub async fn create_room_with_decks(&self, decks: Box<dyn DeckSource>) -> RoomResult<RoomId> {
        let mut rooms = self.rooms.write().await;

        let mut room_id = generate_room_id();
        while rooms.contains_key(&room_id) {
            log::debug!("Room id {} collided, retrying", room_id);
            room_id = generate_room_id();
        }

        let room = Room::new(
            room_id.clone(),
            self.config.clone(),
            self.accounts.clone(),
            decks,
        );
        let (actor, handle) = RoomActor::new(room, self.accounts.clone());
        tokio::spawn(actor.run());

        rooms.insert(room_id.clone(), handle);
        log::info!("Created and spawned room {}", room_id);

        Ok(room_id)
    }

    /// Get room handle by ID
    pub async fn get_room(&self, room_id: &str) -> Option<RoomHandle> {
        self.rooms.read().await.get(room_id).cloned()
    }

    /// Get room handle by ID or fail with `RoomNotFound`
    pub async fn room(&self, room_id: &str) -> RoomResult<RoomHandle> {
        self.get_room(room_id)
            .await
            .ok_or_else(|| RoomError::RoomNotFound(room_id.to_string()))
    }

    /// The first room, created on demand
    pub async fn main_room(&self) -> RoomResult<RoomId> {
        let mut main_room = self.main_room.write().await;
        if let Some(room_id) = main_room.as_ref()
            && self.get_room(room_id).await.is_some_and(|h| !h.is_closed())
        {
            return Ok(room_id.clone());
        }

        let room_id = self.create_room().await?;
        *main_room = Some(room_id.clone());
        Ok(room_id)
    }

    /// List all live rooms, ordered by id. Rooms whose actor has stopped
    /// are dropped from the registry.
    pub async fn list_rooms(&self) -> Vec<RoomMetadata> {
        let handles: Vec<RoomHandle> = self.rooms.read().await.values().cloned().collect();

        let mut metadata = Vec::with_capacity(handles.len());
        let mut dead = Vec::new();
        for handle in handles {
            match handle.state().await {
                Ok(snapshot) => metadata.push(RoomMetadata::from(&snapshot)),
                Err(_) => dead.push(handle.room_id().to_string()),
            }
        }

        if !dead.is_empty() {
            let mut rooms = self.rooms.write().await;
            for room_id in dead {
                log::warn!("Room {} stopped unexpectedly, removing", room_id);
                rooms.remove(&room_id);
            }
        }

        metadata.sort_by(|a, b| a.id.cmp(&b.id));
        metadata
    }

    /// Close a room
    ///
    /// Refunds bets still riding, releases every seat and stops the actor.
    pub async fn close_room(&self, room_id: &str) -> RoomResult<()> {
        let handle = self
            .rooms
            .write()
            .await
            .remove(room_id)
            .ok_or_else(|| RoomError::RoomNotFound(room_id.to_string()))?;

        handle.close().await?;
        log::info!("Closed room {}", room_id);
        Ok(())
    }

    /// Enter a room as a spectator
    pub async fn join_room(&self, room_id: &str, profile: UserProfile) -> RoomResult<()> {
        self.room(room_id).await?.join(profile).await
    }

    /// Route a validated command to a room and wait for its verdict
    pub async fn dispatch(&self, room_id: &str, command: Command) -> RoomResult<()> {
        self.room(room_id).await?.submit(command).await
    }

    /// Get a room's current snapshot
    pub async fn get_room_state(&self, room_id: &str) -> RoomResult<RoomSnapshot> {
        self.room(room_id).await?.state().await
    }

    /// Get active room count
    pub async fn active_room_count(&self) -> usize {
        self.rooms.read().await.len()
    }
}
