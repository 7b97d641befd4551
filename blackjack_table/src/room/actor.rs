//! Room actor implementation.
//!
//! One tokio task per room owns the [`Room`] and serializes everything that
//! touches it: inbox messages and armed wakeups are awaited in the same
//! `select!` loop, so no two mutations ever interleave.

use std::{collections::HashMap, sync::Arc};
use tokio::{
    sync::{mpsc, oneshot},
    time::{Instant, sleep_until},
};

use super::{
    errors::{RoomError, RoomResult},
    messages::{Command, ConnectionId, RoomEvent, RoomMessage, RoomSnapshot},
    state::Room,
};
use crate::{
    accounts::{AccountService, RoomId, UserProfile},
    game::entities::UserId,
};

/// Room actor handle for sending messages
#[derive(Clone, Debug)]
pub struct RoomHandle {
    sender: mpsc::Sender<RoomMessage>,
    room_id: RoomId,
}

impl RoomHandle {
    /// Create a new room handle
    pub fn new(sender: mpsc::Sender<RoomMessage>, room_id: RoomId) -> Self {
        Self { sender, room_id }
    }

    pub fn room_id(&self) -> &str {
        &self.room_id
    }

    /// Whether the actor has stopped
    pub fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }

    /// Send a message to the room
    pub async fn send(&self, message: RoomMessage) -> RoomResult<()> {
        self.sender
            .send(message)
            .await
            .map_err(|_| RoomError::RoomClosed)
    }

    async fn request<T>(
        &self,
        message: impl FnOnce(oneshot::Sender<T>) -> RoomMessage,
    ) -> RoomResult<T> {
        let (tx, rx) = oneshot::channel();
        self.send(message(tx)).await?;
        rx.await.map_err(|_| RoomError::RoomClosed)
    }

    /// Enter the room as a spectator
    pub async fn join(&self, profile: UserProfile) -> RoomResult<()> {
        self.request(|response| RoomMessage::Join { profile, response })
            .await?
    }

    /// Submit a validated command and wait for the verdict
    pub async fn submit(&self, command: Command) -> RoomResult<()> {
        self.request(|response| RoomMessage::Command { command, response })
            .await?
    }

    pub async fn state(&self) -> RoomResult<RoomSnapshot> {
        self.request(|response| RoomMessage::GetState { response })
            .await
    }

    /// Receive every broadcast of this room on `sender`
    pub async fn subscribe(
        &self,
        user_id: UserId,
        connection_id: ConnectionId,
        sender: mpsc::Sender<RoomEvent>,
    ) -> RoomResult<()> {
        self.send(RoomMessage::Subscribe {
            user_id,
            connection_id,
            sender,
        })
        .await
    }

    /// Drop one connection's subscription
    pub async fn disconnect(
        &self,
        user_id: UserId,
        connection_id: ConnectionId,
    ) -> RoomResult<()> {
        self.send(RoomMessage::Disconnect {
            user_id,
            connection_id,
        })
        .await
    }

    /// Stop the actor after refunding open bets
    pub async fn close(&self) -> RoomResult<()> {
        self.request(|response| RoomMessage::Close { response })
            .await
    }
}

struct Subscriber {
    user_id: UserId,
    sender: mpsc::Sender<RoomEvent>,
}

/// Room actor managing a single room
pub struct RoomActor {
    room: Room,

    /// Message inbox
    inbox: mpsc::Receiver<RoomMessage>,

    /// Used to mirror presence into user records
    accounts: Arc<dyn AccountService>,

    /// Broadcast targets keyed by connection
    subscribers: HashMap<ConnectionId, Subscriber>,

    is_closed: bool,
}

impl RoomActor {
    /// Create a new room actor
    ///
    /// # Returns
    ///
    /// * `(RoomActor, RoomHandle)` - Actor to spawn and handle to reach it
    pub fn new(room: Room, accounts: Arc<dyn AccountService>) -> (Self, RoomHandle) {
        let (sender, inbox) = mpsc::channel(room.config().inbox_capacity);
        let handle = RoomHandle::new(sender, room.id().to_string());

        let actor = Self {
            room,
            inbox,
            accounts,
            subscribers: HashMap::new(),
            is_closed: false,
        };

        (actor, handle)
    }

    /// Run the actor event loop
    pub async fn run(mut self) {
        log::info!("Room {} starting", self.room.id());

        // Deadline and generation of the wakeup currently being slept on
        let mut armed: Option<(Instant, u64)> = None;

        loop {
            armed = match self.room.wakeup() {
                Some(wakeup) if armed.map(|(_, g)| g) != Some(wakeup.generation) => {
                    Some((Instant::now() + wakeup.after, wakeup.generation))
                }
                Some(_) => armed,
                None => None,
            };
            let deadline = armed.map(|(at, _)| at);

            tokio::select! {
                message = self.inbox.recv() => match message {
                    Some(message) => self.handle_message(message).await,
                    None => break,
                },

                _ = sleep_until(deadline.unwrap_or_else(Instant::now)), if deadline.is_some() => {
                    if let Some((_, generation)) = armed.take() {
                        self.room.fire(generation).await;
                    }
                }
            }

            self.broadcast();
            if self.is_closed {
                break;
            }
        }

        log::info!("Room {} stopped", self.room.id());
    }

    async fn handle_message(&mut self, message: RoomMessage) {
        match message {
            RoomMessage::Join { profile, response } => {
                self.room.join(profile);
                let _ = response.send(Ok(()));
            }

            RoomMessage::Command { command, response } => {
                let result = self.room.apply(command).await;
                if let Err(err) = &result {
                    log::warn!(
                        "Room {}: rejected {} from {}: {}",
                        self.room.id(),
                        command.name(),
                        command.issuer(),
                        err
                    );
                }
                let _ = response.send(result);
            }

            RoomMessage::GetState { response } => {
                let _ = response.send(self.room.snapshot());
            }

            RoomMessage::Subscribe {
                user_id,
                connection_id,
                sender,
            } => {
                log::debug!(
                    "Room {}: {} subscribed on {}",
                    self.room.id(),
                    user_id,
                    connection_id
                );
                let event = RoomEvent {
                    state: Arc::new(self.room.snapshot()),
                    cause: None,
                };
                if sender.try_send(event).is_ok() {
                    self.subscribers
                        .insert(connection_id, Subscriber { user_id, sender });
                }
                self.room.set_online(user_id, true);
                Self::mirror_presence(&self.accounts, self.room.id(), user_id, true).await;
            }

            RoomMessage::Disconnect {
                user_id,
                connection_id,
            } => {
                log::debug!(
                    "Room {}: {} disconnected from {}",
                    self.room.id(),
                    user_id,
                    connection_id
                );
                self.subscribers.remove(&connection_id);
                if self.is_connected(user_id) {
                    return;
                }
                self.room.set_online(user_id, false);
                Self::mirror_presence(&self.accounts, self.room.id(), user_id, false).await;
            }

            RoomMessage::Close { response } => {
                self.room.close().await;
                self.room.drain_events();
                self.subscribers.clear();
                self.is_closed = true;
                let _ = response.send(());
            }
        }
    }

    /// Whether the user still has a live connection to this room
    fn is_connected(&self, user_id: UserId) -> bool {
        self.subscribers
            .values()
            .any(|s| s.user_id == user_id && !s.sender.is_closed())
    }

    /// Copy presence into the user record
    async fn mirror_presence(
        accounts: &Arc<dyn AccountService>,
        room_id: &str,
        user_id: UserId,
        online: bool,
    ) {
        if let Err(err) = accounts.set_online(user_id, online).await {
            log::warn!(
                "Room {}: could not mark {} {}: {}",
                room_id,
                user_id,
                if online { "online" } else { "offline" },
                err
            );
        }
    }

    /// Fan queued events out to subscribers without ever waiting on one
    fn broadcast(&mut self) {
        let room_id = self.room.id().to_string();
        for event in self.room.drain_events() {
            self.subscribers.retain(|connection_id, subscriber| {
                match subscriber.sender.try_send(event.clone()) {
                    Ok(_) => true,
                    Err(mpsc::error::TrySendError::Full(_)) => {
                        log::warn!(
                            "Room {}: subscriber {} channel full, dropping event",
                            room_id,
                            subscriber.user_id
                        );
                        true
                    }
                    Err(mpsc::error::TrySendError::Closed(_)) => {
                        log::debug!(
                            "Room {}: connection {} gone, removing",
                            room_id,
                            connection_id
                        );
                        false
                    }
                }
            });
        }
    }
}
