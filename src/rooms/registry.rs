/**
 * Room Registry
 *
 * This module owns the canonical room list and the append-only per-room
 * message history. It is a pure in-memory data structure with no locking
 * of its own: the application state wraps it in `Arc<RwLock<_>>` and the
 * callers (HTTP handlers and the connection hub) guard all access.
 *
 * # Invariants
 *
 * - Room names are unique among active rooms (case-insensitive check)
 * - History within a room is strictly ordered by arrival and append-only
 * - Renaming a room moves its history bucket atomically to the new key
 * - Deleting a room removes both the room entry and its history
 *
 * # Lifetime
 *
 * State lives for the process lifetime only. A storage-backed registry
 * could be substituted behind the same interface without touching the hub.
 */
use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::shared::message::ChatMessage;
use crate::shared::time::timestamp_now;
use crate::shared::UserId;

/// Errors produced by registry operations
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    /// A different room already uses this name (case-insensitive)
    #[error("room with this name already exists: {0}")]
    DuplicateName(String),

    /// No room with this id
    #[error("room not found: {0}")]
    NotFound(u64),

    /// No room with this name
    #[error("unknown room: {0}")]
    UnknownRoom(String),
}

/// Metadata for a single chat room
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Room {
    /// Sequential identifier assigned at creation
    pub id: u64,
    /// Unique display name (case-sensitive in storage)
    pub name: String,
    /// Free-form description
    pub description: String,
    /// RFC3339 creation timestamp
    pub created_at: String,
    /// RFC3339 timestamp of the last update, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
    /// User that created the room; absent for seeded rooms
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_by: Option<UserId>,
}

/// Canonical room list and per-room message history
#[derive(Debug, Default)]
pub struct RoomRegistry {
    rooms: Vec<Room>,
    histories: HashMap<String, Vec<ChatMessage>>,
    next_id: u64,
}

impl RoomRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self {
            rooms: Vec::new(),
            histories: HashMap::new(),
            next_id: 1,
        }
    }

    /// Create a registry seeded with the default rooms
    pub fn with_default_rooms() -> Self {
        let mut registry = Self::new();
        registry.seed("General", "General chat room");
        registry.seed("Random", "Random discussions");
        registry
    }

    fn seed(&mut self, name: &str, description: &str) {
        // Seeded names are known-unique, so create cannot fail here.
        let _ = self.create(name, description, None);
    }

    /// Create a new room
    ///
    /// Fails with [`RegistryError::DuplicateName`] if a room with the same
    /// name already exists (compared case-insensitively). On success the
    /// room gets a fresh sequential id, a creation timestamp, and an empty
    /// history bucket.
    pub fn create(
        &mut self,
        name: &str,
        description: &str,
        created_by: Option<UserId>,
    ) -> Result<Room, RegistryError> {
        if self.find_by_name_ci(name).is_some() {
            return Err(RegistryError::DuplicateName(name.to_string()));
        }

        let room = Room {
            id: self.next_id,
            name: name.to_string(),
            description: description.to_string(),
            created_at: timestamp_now(),
            updated_at: None,
            created_by,
        };
        self.next_id += 1;
        self.histories.insert(room.name.clone(), Vec::new());
        self.rooms.push(room.clone());
        Ok(room)
    }

    /// Update a room's name and/or description
    ///
    /// A rename fails with [`RegistryError::DuplicateName`] if the new name
    /// collides case-insensitively with a *different* existing room. On a
    /// successful rename the history bucket keyed by the old name is moved
    /// to the new name in the same call, so there is no window where the
    /// history exists under both keys or neither.
    pub fn update(
        &mut self,
        id: u64,
        name: Option<&str>,
        description: Option<&str>,
    ) -> Result<Room, RegistryError> {
        let index = self
            .rooms
            .iter()
            .position(|r| r.id == id)
            .ok_or(RegistryError::NotFound(id))?;

        let old_name = self.rooms[index].name.clone();

        if let Some(new_name) = name {
            if new_name != old_name {
                let collision = self
                    .rooms
                    .iter()
                    .any(|r| r.id != id && r.name.eq_ignore_ascii_case(new_name));
                if collision {
                    return Err(RegistryError::DuplicateName(new_name.to_string()));
                }
                if let Some(history) = self.histories.remove(&old_name) {
                    self.histories.insert(new_name.to_string(), history);
                }
                self.rooms[index].name = new_name.to_string();
            }
        }

        if let Some(description) = description {
            self.rooms[index].description = description.to_string();
        }

        self.rooms[index].updated_at = Some(timestamp_now());
        Ok(self.rooms[index].clone())
    }

    /// Delete a room and its entire history
    pub fn delete(&mut self, id: u64) -> Result<(), RegistryError> {
        let index = self
            .rooms
            .iter()
            .position(|r| r.id == id)
            .ok_or(RegistryError::NotFound(id))?;
        let room = self.rooms.remove(index);
        self.histories.remove(&room.name);
        Ok(())
    }

    /// All rooms in insertion order
    pub fn rooms(&self) -> &[Room] {
        &self.rooms
    }

    /// Look up a room by id
    pub fn get(&self, id: u64) -> Option<&Room> {
        self.rooms.iter().find(|r| r.id == id)
    }

    /// Case-insensitive substring search against name and description
    ///
    /// Results come back in registry (insertion) order, not ranked.
    pub fn search(&self, pattern: &str) -> Vec<Room> {
        let pattern = pattern.to_lowercase();
        self.rooms
            .iter()
            .filter(|r| {
                r.name.to_lowercase().contains(&pattern)
                    || r.description.to_lowercase().contains(&pattern)
            })
            .cloned()
            .collect()
    }

    /// Whether a room with this exact name exists
    pub fn contains(&self, name: &str) -> bool {
        self.histories.contains_key(name)
    }

    /// Append a message to a room's history
    ///
    /// Fails with [`RegistryError::UnknownRoom`] if the room is not
    /// registered; chat traffic into unregistered room names is rejected.
    pub fn append_message(
        &mut self,
        room_name: &str,
        message: ChatMessage,
    ) -> Result<(), RegistryError> {
        let history = self
            .histories
            .get_mut(room_name)
            .ok_or_else(|| RegistryError::UnknownRoom(room_name.to_string()))?;
        history.push(message);
        Ok(())
    }

    /// The ordered history of a room, oldest first
    ///
    /// Returns `None` for unregistered rooms. Callers receive a slice view;
    /// the hub snapshots it while it holds the registry lock.
    pub fn history(&self, room_name: &str) -> Option<&[ChatMessage]> {
        self.histories.get(room_name).map(|h| h.as_slice())
    }

    fn find_by_name_ci(&self, name: &str) -> Option<&Room> {
        self.rooms.iter().find(|r| r.name.eq_ignore_ascii_case(name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_create_assigns_sequential_ids() {
        let mut registry = RoomRegistry::new();
        let a = registry.create("alpha", "", None).unwrap();
        let b = registry.create("beta", "", None).unwrap();
        assert_eq!(a.id, 1);
        assert_eq!(b.id, 2);
        assert!(registry.history("alpha").unwrap().is_empty());
    }

    #[test]
    fn test_create_rejects_duplicate_name_case_insensitively() {
        let mut registry = RoomRegistry::new();
        registry.create("General", "", None).unwrap();
        let err = registry.create("general", "", None).unwrap_err();
        assert_eq!(err, RegistryError::DuplicateName("general".to_string()));
    }

    #[test]
    fn test_default_rooms_are_seeded() {
        let registry = RoomRegistry::with_default_rooms();
        let names: Vec<&str> = registry.rooms().iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["General", "Random"]);
        assert!(registry.rooms().iter().all(|r| r.created_by.is_none()));
    }

    #[test]
    fn test_rename_moves_history() {
        let mut registry = RoomRegistry::new();
        let room = registry.create("old", "", None).unwrap();
        registry
            .append_message("old", ChatMessage::new("alice", "hi"))
            .unwrap();

        registry.update(room.id, Some("new"), None).unwrap();

        assert!(registry.history("old").is_none());
        let history = registry.history("new").unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].text, "hi");
    }

    #[test]
    fn test_rename_rejects_collision_with_other_room() {
        let mut registry = RoomRegistry::new();
        registry.create("alpha", "", None).unwrap();
        let beta = registry.create("beta", "", None).unwrap();
        let err = registry.update(beta.id, Some("ALPHA"), None).unwrap_err();
        assert_eq!(err, RegistryError::DuplicateName("ALPHA".to_string()));
        // No partial state change: beta keeps its name and history.
        assert_eq!(registry.get(beta.id).unwrap().name, "beta");
        assert!(registry.contains("beta"));
    }

    #[test]
    fn test_update_to_same_name_is_allowed() {
        let mut registry = RoomRegistry::new();
        let room = registry.create("alpha", "first", None).unwrap();
        let updated = registry
            .update(room.id, Some("alpha"), Some("second"))
            .unwrap();
        assert_eq!(updated.description, "second");
        assert!(updated.updated_at.is_some());
    }

    #[test]
    fn test_delete_removes_room_and_history() {
        let mut registry = RoomRegistry::new();
        let room = registry.create("alpha", "", None).unwrap();
        registry
            .append_message("alpha", ChatMessage::new("alice", "hi"))
            .unwrap();

        registry.delete(room.id).unwrap();

        assert!(registry.get(room.id).is_none());
        assert!(registry.history("alpha").is_none());
        assert_eq!(registry.delete(room.id), Err(RegistryError::NotFound(room.id)));
    }

    #[test]
    fn test_search_matches_name_and_description() {
        let mut registry = RoomRegistry::new();
        registry.create("General", "everyday chatter", None).unwrap();
        registry.create("Rust", "systems programming", None).unwrap();
        registry.create("Cooking", "recipes and chat", None).unwrap();

        let by_name = registry.search("gen");
        assert_eq!(by_name.len(), 1);
        assert_eq!(by_name[0].name, "General");

        // "chat" matches descriptions of General and Cooking, in insertion order.
        let by_description = registry.search("CHAT");
        let names: Vec<&str> = by_description.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["General", "Cooking"]);
    }

    #[test]
    fn test_append_to_unknown_room_fails() {
        let mut registry = RoomRegistry::new();
        let err = registry
            .append_message("ghost", ChatMessage::new("alice", "hi"))
            .unwrap_err();
        assert_eq!(err, RegistryError::UnknownRoom("ghost".to_string()));
    }

    #[test]
    fn test_history_is_ordered_by_arrival() {
        let mut registry = RoomRegistry::new();
        registry.create("alpha", "", None).unwrap();
        for i in 0..5 {
            registry
                .append_message("alpha", ChatMessage::new("alice", format!("m{i}")))
                .unwrap();
        }
        let texts: Vec<&str> = registry
            .history("alpha")
            .unwrap()
            .iter()
            .map(|m| m.text.as_str())
            .collect();
        assert_eq!(texts, vec!["m0", "m1", "m2", "m3", "m4"]);
    }
}
