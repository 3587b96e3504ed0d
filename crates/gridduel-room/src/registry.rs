//! The room registry: creates rooms on first use and drops them when empty.
//!
//! # Concurrency note
//!
//! `RoomRegistry` is a plain `HashMap` wrapper, not a concurrent map. The
//! server owns exactly one and guards it with a single mutex, which is
//! also what serializes moves within a room.

use std::collections::HashMap;

use gridduel_protocol::RoomId;
use gridduel_transport::ConnectionId;
use rand::Rng;

use crate::{Departure, Joined, ParticipantSender, Room, RoomError};

/// Maps room identifiers to live rooms.
///
/// ## Lifecycle
///
/// ```text
/// join(unknown id) ──→ [created] ──→ join / move ──→ disconnect(last) ──→ [removed]
/// ```
#[derive(Debug, Default)]
pub struct RoomRegistry {
    rooms: HashMap<RoomId, Room>,
}

impl RoomRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the room under `requested`, creating it if needed.
    ///
    /// With no id (or an empty one) a fresh room is created under a
    /// random identifier.
    pub fn get_or_create(&mut self, requested: Option<RoomId>) -> &mut Room {
        let room_id = match requested.filter(|id| !id.is_empty()) {
            Some(id) => id,
            None => self.fresh_room_id(),
        };
        self.rooms.entry(room_id).or_insert_with_key(|room_id| {
            tracing::info!(%room_id, "room created");
            Room::new(room_id.clone())
        })
    }

    /// Finds or creates the room and seats `conn_id` in it.
    ///
    /// A rejected join never leaves an empty room behind: a room created
    /// here always accepts its first participant.
    ///
    /// # Errors
    /// Propagates [`Room::join`] rejections.
    pub fn join(
        &mut self,
        requested: Option<RoomId>,
        conn_id: ConnectionId,
        sender: ParticipantSender,
    ) -> Result<Joined, RoomError> {
        self.get_or_create(requested).join(conn_id, sender)
    }

    /// Removes `conn_id` from every room it sits in.
    ///
    /// Remaining opponents are notified; rooms left empty are destroyed.
    /// Scans all rooms so cleanup doesn't depend on the caller remembering
    /// where the connection joined. Returns the ids of affected rooms.
    pub fn disconnect(&mut self, conn_id: ConnectionId) -> Vec<RoomId> {
        let mut affected = Vec::new();
        self.rooms.retain(|room_id, room| {
            match room.remove_participant(conn_id) {
                Departure::NotSeated => true,
                Departure::OpponentNotified => {
                    affected.push(room_id.clone());
                    true
                }
                Departure::Empty => {
                    tracing::info!(%room_id, "room destroyed");
                    affected.push(room_id.clone());
                    false
                }
            }
        });
        affected
    }

    /// Deletes a room. No-op if absent.
    pub fn remove(&mut self, room_id: &RoomId) {
        if self.rooms.remove(room_id).is_some() {
            tracing::info!(%room_id, "room destroyed");
        }
    }

    pub fn get(&self, room_id: &RoomId) -> Option<&Room> {
        self.rooms.get(room_id)
    }

    pub fn get_mut(&mut self, room_id: &RoomId) -> Option<&mut Room> {
        self.rooms.get_mut(room_id)
    }

    pub fn contains(&self, room_id: &RoomId) -> bool {
        self.rooms.contains_key(room_id)
    }

    /// Returns the number of live rooms.
    pub fn len(&self) -> usize {
        self.rooms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rooms.is_empty()
    }

    /// Lists all live room ids.
    pub fn room_ids(&self) -> Vec<RoomId> {
        self.rooms.keys().cloned().collect()
    }

    fn fresh_room_id(&self) -> RoomId {
        loop {
            let id = generate_room_id();
            if !self.rooms.contains_key(&id) {
                return id;
            }
        }
    }
}

/// Generates `room-` followed by 32 lowercase hex characters (128 bits of
/// entropy), so collisions are not a practical concern.
fn generate_room_id() -> RoomId {
    let mut rng = rand::rng();
    let bytes: [u8; 16] = rng.random();
    let hex: String = bytes.iter().map(|b| format!("{b:02x}")).collect();
    RoomId::new(format!("room-{hex}"))
}
