/**
 * Typing Tracker
 *
 * Ephemeral per-room set of display names currently typing. The tracker is
 * pure data: the hub drives it and broadcasts the resulting
 * `userTyping` / `userStopTyping` events.
 *
 * # Expiry Policy
 *
 * The client owns the quiet-period timeout: after a fixed pause since the
 * last keystroke it emits a stop-typing signal itself. The server does not
 * run its own timers. The one server-side safety net is ownership
 * tracking: every entry remembers which connection created it, and when
 * that connection leaves the room or disconnects its entries are purged so
 * an abrupt disconnect cannot leave a stuck "is typing" indicator.
 */
use std::collections::{HashMap, HashSet};

use super::connection::ConnectionId;

/// Per-room typing state with per-connection ownership
#[derive(Debug, Default)]
pub struct TypingTracker {
    /// room -> set of display names currently typing
    by_room: HashMap<String, HashSet<String>>,
    /// connection -> (room, username) entries it owns
    by_owner: HashMap<ConnectionId, HashSet<(String, String)>>,
}

impl TypingTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that `username` started typing in `room`
    ///
    /// Returns `true` if the entry is new.
    pub fn start(&mut self, owner: ConnectionId, room: &str, username: &str) -> bool {
        self.by_owner
            .entry(owner)
            .or_default()
            .insert((room.to_string(), username.to_string()));
        self.by_room
            .entry(room.to_string())
            .or_default()
            .insert(username.to_string())
    }

    /// Record that `username` stopped typing in `room`
    ///
    /// Returns `true` if an entry was actually removed.
    pub fn stop(&mut self, owner: ConnectionId, room: &str, username: &str) -> bool {
        if let Some(owned) = self.by_owner.get_mut(&owner) {
            owned.remove(&(room.to_string(), username.to_string()));
            if owned.is_empty() {
                self.by_owner.remove(&owner);
            }
        }
        self.remove_entry(room, username)
    }

    /// Remove `username`'s typing entry in `room` regardless of owner
    ///
    /// Used when a chat message from that user arrives: sending a message
    /// implicitly ends the typing state. Returns `true` if an entry was
    /// removed.
    pub fn clear_for_message(&mut self, room: &str, username: &str) -> bool {
        let removed = self.remove_entry(room, username);
        if removed {
            let key = (room.to_string(), username.to_string());
            self.by_owner.retain(|_, owned| {
                owned.remove(&key);
                !owned.is_empty()
            });
        }
        removed
    }

    /// Remove every entry owned by `owner` in `room`
    ///
    /// Returns the usernames whose entries were removed, so the hub can
    /// broadcast the matching stop-typing events. Used on room leave.
    pub fn purge_room(&mut self, owner: ConnectionId, room: &str) -> Vec<String> {
        let mut removed = Vec::new();
        let Some(owned) = self.by_owner.get_mut(&owner) else {
            return removed;
        };
        let in_room: Vec<(String, String)> = owned
            .iter()
            .filter(|(r, _)| r == room)
            .cloned()
            .collect();
        for entry in &in_room {
            owned.remove(entry);
        }
        if owned.is_empty() {
            self.by_owner.remove(&owner);
        }
        for (room, username) in in_room {
            if self.remove_entry(&room, &username) {
                removed.push(username);
            }
        }
        removed
    }

    /// Remove every entry owned by `owner` across all rooms
    ///
    /// Returns the removed `(room, username)` pairs. Used on disconnect.
    pub fn purge_connection(&mut self, owner: ConnectionId) -> Vec<(String, String)> {
        let mut removed = Vec::new();
        if let Some(owned) = self.by_owner.remove(&owner) {
            for (room, username) in owned {
                if self.remove_entry(&room, &username) {
                    removed.push((room, username));
                }
            }
        }
        removed
    }

    /// Display names currently typing in `room`, sorted for stable output
    pub fn typing_users(&self, room: &str) -> Vec<String> {
        let mut users: Vec<String> = self
            .by_room
            .get(room)
            .map(|set| set.iter().cloned().collect())
            .unwrap_or_default();
        users.sort();
        users
    }

    fn remove_entry(&mut self, room: &str, username: &str) -> bool {
        match self.by_room.get_mut(room) {
            Some(set) => {
                let removed = set.remove(username);
                if set.is_empty() {
                    self.by_room.remove(room);
                }
                removed
            }
            None => false,
        }
    }
}
