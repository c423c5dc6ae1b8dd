use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock};
use std::time::Duration;
use tracing::{debug, info, instrument};

use super::errors::RoomError;
use super::models::{Bug, Bullet, Position, Room, RoomPlayer, RoomStatus};
use crate::clock::{Clock, SystemClock};
use crate::config::RoomLimits;

/// Result of a join request
#[derive(Debug, Clone)]
pub struct JoinOutcome {
    pub room: Room,
    /// The room did not exist and was created by this join
    pub created: bool,
}

/// Result of evicting inactive players from one room
#[derive(Debug, Clone, Default)]
pub struct Eviction {
    /// Ids of the players that were removed
    pub removed: Vec<String>,
    /// Room after eviction, `None` once the last player is gone and the room deleted
    pub room: Option<Room>,
}

/// Authoritative store of rooms. Every operation is atomic with respect to the
/// room it touches; operations on different rooms do not block each other.
pub trait RoomRepository: Send + Sync {
    /// Creates a room holding `player`. If the id is already taken the existing
    /// room is returned unchanged.
    fn create_room(&self, room_id: &str, player: RoomPlayer, max_bugs: Option<usize>) -> Room;

    /// Joins `player` to the room, creating the room when the id is unknown
    fn join_room(&self, room_id: &str, player: RoomPlayer) -> Result<JoinOutcome, RoomError>;

    fn add_player_to_room(&self, room_id: &str, player: RoomPlayer) -> Result<Room, RoomError>;

    /// Removes a player. Returns `None` when the room became empty and was deleted.
    fn remove_player_from_room(
        &self,
        room_id: &str,
        player_id: &str,
    ) -> Result<Option<Room>, RoomError>;

    fn find_room(&self, room_id: &str) -> Option<Room>;

    fn list_rooms(&self) -> Vec<Room>;

    fn room_ids(&self) -> Vec<String>;

    fn add_bug_to_room(&self, room_id: &str, bug: Bug) -> Result<Room, RoomError>;

    /// Removes a bug and credits its level to the room score
    fn remove_bug_from_room(&self, room_id: &str, bug_id: &str) -> Result<Room, RoomError>;

    /// `remove_bug_from_room` that also refreshes the killer's `last_active_at`,
    /// in the same step. An unknown killer only skips the refresh.
    fn kill_bug(&self, room_id: &str, bug_id: &str, player_id: &str) -> Result<Room, RoomError>;

    fn update_bug_health(&self, room_id: &str, bug_id: &str, health: i64)
        -> Result<Room, RoomError>;

    fn update_player_position(
        &self,
        room_id: &str,
        player_id: &str,
        position: Position,
    ) -> Result<Room, RoomError>;

    fn add_bullet_to_player(
        &self,
        room_id: &str,
        player_id: &str,
        bullet: Bullet,
    ) -> Result<Room, RoomError>;

    /// Replaces the player's bullets wholesale
    fn update_player_bullets(
        &self,
        room_id: &str,
        player_id: &str,
        bullets: Vec<Bullet>,
    ) -> Result<Room, RoomError>;

    fn set_room_status(&self, room_id: &str, status: RoomStatus) -> Result<Room, RoomError>;

    /// Back to a fresh round: playing, no score, no bugs, no bullets. Members stay.
    fn restart_room(&self, room_id: &str) -> Result<Room, RoomError>;

    /// Refreshes the room's `updated_at` and, if present, the player's `last_active_at`
    fn record_activity(&self, room_id: &str, player_id: &str) -> Result<(), RoomError>;

    /// Removes every player whose last activity is older than `timeout`, deleting
    /// the room if it ends up empty
    fn evict_inactive_players(
        &self,
        room_id: &str,
        now: DateTime<Utc>,
        timeout: Duration,
    ) -> Result<Eviction, RoomError>;

    /// Drops every room not mutated within `max_inactive`. Returns the dropped ids.
    fn sweep_inactive_rooms(&self, now: DateTime<Utc>, max_inactive: Duration) -> Vec<String>;
}

/// A room behind its own lock. `None` marks a room that has been deleted while
/// someone still held a handle to it.
type RoomSlot = Arc<Mutex<Option<Room>>>;

enum SlotLookup {
    Existing(RoomSlot),
    Created(Room),
}

/// In-memory implementation of RoomRepository
pub struct InMemoryRoomRepository {
    rooms: RwLock<HashMap<String, RoomSlot>>,
    limits: RoomLimits,
    clock: Arc<dyn Clock>,
}

impl Default for InMemoryRoomRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryRoomRepository {
    /// Creates a new empty repository with default limits and the system clock
    pub fn new() -> Self {
        Self::with_config(RoomLimits::default(), Arc::new(SystemClock))
    }

    pub fn with_config(limits: RoomLimits, clock: Arc<dyn Clock>) -> Self {
        Self {
            rooms: RwLock::new(HashMap::new()),
            limits,
            clock,
        }
    }

    fn slot(&self, room_id: &str) -> Option<RoomSlot> {
        self.rooms
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(room_id)
            .cloned()
    }

    fn slots(&self) -> Vec<(String, RoomSlot)> {
        self.rooms
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|(id, slot)| (id.clone(), Arc::clone(slot)))
            .collect()
    }

    /// Runs `mutate` against the live room while holding its lock
    fn with_room<T>(
        &self,
        room_id: &str,
        mutate: impl FnOnce(&mut Room, DateTime<Utc>) -> Result<T, RoomError>,
    ) -> Result<T, RoomError> {
        let slot = self
            .slot(room_id)
            .ok_or_else(|| RoomError::NotFound(room_id.to_string()))?;
        let mut guard = lock_slot(&slot);
        let room = guard
            .as_mut()
            .ok_or_else(|| RoomError::NotFound(room_id.to_string()))?;
        mutate(room, self.clock.now())
    }

    /// Looks up the slot for `room_id`, inserting the room built by `create` when
    /// the id is unknown
    fn slot_or_insert(&self, room_id: &str, create: impl FnOnce() -> Room) -> SlotLookup {
        let mut rooms = self.rooms.write().unwrap_or_else(PoisonError::into_inner);
        if let Some(slot) = rooms.get(room_id) {
            return SlotLookup::Existing(Arc::clone(slot));
        }
        let room = create();
        rooms.insert(room_id.to_string(), Arc::new(Mutex::new(Some(room.clone()))));
        SlotLookup::Created(room)
    }

    /// Deletes the room if it has no players left. Must be called with the
    /// room's slot locked; this is the only path that removes a room because it emptied.
    fn retire_if_empty(
        &self,
        room_id: &str,
        slot: &RoomSlot,
        guard: &mut MutexGuard<'_, Option<Room>>,
    ) -> Option<Room> {
        let emptied = matches!(&**guard, Some(room) if room.players.is_empty());
        if emptied {
            self.retire(room_id, slot, guard);
            info!(room_id = %room_id, "Room is now empty, deleting");
            return None;
        }
        (**guard).clone()
    }

    fn retire(&self, room_id: &str, slot: &RoomSlot, guard: &mut MutexGuard<'_, Option<Room>>) {
        **guard = None;
        let mut rooms = self.rooms.write().unwrap_or_else(PoisonError::into_inner);
        if rooms
            .get(room_id)
            .is_some_and(|current| Arc::ptr_eq(current, slot))
        {
            rooms.remove(room_id);
        }
    }

    fn try_add_player(
        &self,
        room: &mut Room,
        player: RoomPlayer,
        now: DateTime<Utc>,
    ) -> Result<Room, RoomError> {
        if room.player_count() >= self.limits.max_players {
            debug!(room_id = %room.id, current_count = room.player_count(), "Room is full");
            return Err(RoomError::RoomFull(room.id.clone()));
        }

        if room.has_player(&player.id) {
            debug!(room_id = %room.id, player_id = %player.id, "Player already in room");
            return Ok(room.clone());
        }

        info!(
            room_id = %room.id,
            player_id = %player.id,
            new_player_count = room.player_count() + 1,
            "Player joined room"
        );
        room.players.push(RoomPlayer::joining(player, now));
        room.touch(now);
        Ok(room.clone())
    }
}

/// Credits the bug's level to the score, once, and drops it
fn credit_and_remove_bug(room: &mut Room, bug_id: &str) {
    if let Some(level) = room.bug(bug_id).map(|bug| bug.level) {
        room.score += u64::from(level);
        debug!(room_id = %room.id, level, score = room.score, "Bug killed");
    }
    room.bugs.retain(|b| b.id != bug_id);
}

fn lock_slot(slot: &Mutex<Option<Room>>) -> MutexGuard<'_, Option<Room>> {
    slot.lock().unwrap_or_else(PoisonError::into_inner)
}

fn to_chrono(duration: Duration) -> chrono::Duration {
    chrono::Duration::from_std(duration).unwrap_or(chrono::Duration::MAX)
}

impl RoomRepository for InMemoryRoomRepository {
    #[instrument(skip(self, player), fields(player_id = %player.id))]
    fn create_room(&self, room_id: &str, player: RoomPlayer, max_bugs: Option<usize>) -> Room {
        let max_bugs = max_bugs.unwrap_or(self.limits.default_max_bugs);
        loop {
            let slot = match self.slot_or_insert(room_id, || {
                Room::new(room_id, player.clone(), max_bugs, self.clock.now())
            }) {
                SlotLookup::Existing(slot) => slot,
                SlotLookup::Created(created) => {
                    info!(room_id = %room_id, max_bugs, "Room created");
                    return created;
                }
            };

            let guard = lock_slot(&slot);
            if let Some(existing) = guard.as_ref() {
                debug!(room_id = %room_id, "Room already exists, returning it unchanged");
                return existing.clone();
            }
            // Deleted between lookup and lock; the map no longer holds it.
        }
    }

    #[instrument(skip(self, player), fields(player_id = %player.id))]
    fn join_room(&self, room_id: &str, player: RoomPlayer) -> Result<JoinOutcome, RoomError> {
        loop {
            let slot = match self.slot_or_insert(room_id, || {
                Room::new(
                    room_id,
                    player.clone(),
                    self.limits.default_max_bugs,
                    self.clock.now(),
                )
            }) {
                SlotLookup::Existing(slot) => slot,
                SlotLookup::Created(room) => {
                    info!(room_id = %room_id, "Room created on first join");
                    return Ok(JoinOutcome {
                        room,
                        created: true,
                    });
                }
            };

            let mut guard = lock_slot(&slot);
            if let Some(room) = guard.as_mut() {
                let now = self.clock.now();
                return self
                    .try_add_player(room, player, now)
                    .map(|room| JoinOutcome {
                        room,
                        created: false,
                    });
            }
        }
    }

    #[instrument(skip(self, player), fields(player_id = %player.id))]
    fn add_player_to_room(&self, room_id: &str, player: RoomPlayer) -> Result<Room, RoomError> {
        self.with_room(room_id, |room, now| self.try_add_player(room, player, now))
    }

    #[instrument(skip(self))]
    fn remove_player_from_room(
        &self,
        room_id: &str,
        player_id: &str,
    ) -> Result<Option<Room>, RoomError> {
        let slot = self
            .slot(room_id)
            .ok_or_else(|| RoomError::NotFound(room_id.to_string()))?;
        let mut guard = lock_slot(&slot);
        let room = guard
            .as_mut()
            .ok_or_else(|| RoomError::NotFound(room_id.to_string()))?;

        room.players.retain(|p| p.id != player_id);
        room.touch(self.clock.now());
        debug!(
            room_id = %room_id,
            player_id = %player_id,
            remaining = room.player_count(),
            "Player removed from room"
        );

        Ok(self.retire_if_empty(room_id, &slot, &mut guard))
    }

    fn find_room(&self, room_id: &str) -> Option<Room> {
        let slot = self.slot(room_id)?;
        let room = lock_slot(&slot).clone();
        room
    }

    fn list_rooms(&self) -> Vec<Room> {
        self.slots()
            .into_iter()
            .filter_map(|(_, slot)| lock_slot(&slot).clone())
            .collect()
    }

    fn room_ids(&self) -> Vec<String> {
        self.rooms
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .cloned()
            .collect()
    }

    #[instrument(skip(self, bug), fields(bug_id = %bug.id))]
    fn add_bug_to_room(&self, room_id: &str, bug: Bug) -> Result<Room, RoomError> {
        self.with_room(room_id, |room, now| {
            if room.is_bug_capacity_reached() {
                debug!(room_id = %room_id, max_bugs = room.max_bugs, "Bug capacity reached");
                return Ok(room.clone());
            }
            room.bugs.push(bug);
            room.touch(now);
            Ok(room.clone())
        })
    }

    #[instrument(skip(self))]
    fn remove_bug_from_room(&self, room_id: &str, bug_id: &str) -> Result<Room, RoomError> {
        self.with_room(room_id, |room, now| {
            credit_and_remove_bug(room, bug_id);
            room.touch(now);
            Ok(room.clone())
        })
    }

    #[instrument(skip(self))]
    fn kill_bug(&self, room_id: &str, bug_id: &str, player_id: &str) -> Result<Room, RoomError> {
        self.with_room(room_id, |room, now| {
            credit_and_remove_bug(room, bug_id);
            if let Some(killer) = room.player_mut(player_id) {
                killer.last_active_at = Some(now);
            }
            room.touch(now);
            Ok(room.clone())
        })
    }

    #[instrument(skip(self))]
    fn update_bug_health(
        &self,
        room_id: &str,
        bug_id: &str,
        health: i64,
    ) -> Result<Room, RoomError> {
        self.with_room(room_id, |room, now| {
            if let Some(bug) = room.bugs.iter_mut().find(|b| b.id == bug_id) {
                bug.health = health;
            }
            room.touch(now);
            Ok(room.clone())
        })
    }

    fn update_player_position(
        &self,
        room_id: &str,
        player_id: &str,
        position: Position,
    ) -> Result<Room, RoomError> {
        self.with_room(room_id, |room, now| {
            let player = room
                .player_mut(player_id)
                .ok_or_else(|| RoomError::PlayerNotFound(player_id.to_string()))?;
            player.position = position;
            player.last_active_at = Some(now);
            room.touch(now);
            Ok(room.clone())
        })
    }

    fn add_bullet_to_player(
        &self,
        room_id: &str,
        player_id: &str,
        bullet: Bullet,
    ) -> Result<Room, RoomError> {
        self.with_room(room_id, |room, now| {
            let Some(player) = room.player_mut(player_id) else {
                return Ok(room.clone());
            };
            player.bullets.push(bullet);
            player.last_active_at = Some(now);
            room.touch(now);
            Ok(room.clone())
        })
    }

    fn update_player_bullets(
        &self,
        room_id: &str,
        player_id: &str,
        bullets: Vec<Bullet>,
    ) -> Result<Room, RoomError> {
        self.with_room(room_id, |room, now| {
            let Some(player) = room.player_mut(player_id) else {
                return Ok(room.clone());
            };
            player.bullets = bullets;
            player.last_active_at = Some(now);
            room.touch(now);
            Ok(room.clone())
        })
    }

    #[instrument(skip(self))]
    fn set_room_status(&self, room_id: &str, status: RoomStatus) -> Result<Room, RoomError> {
        self.with_room(room_id, |room, now| {
            room.status = status;
            room.touch(now);
            Ok(room.clone())
        })
    }

    #[instrument(skip(self))]
    fn restart_room(&self, room_id: &str) -> Result<Room, RoomError> {
        self.with_room(room_id, |room, now| {
            room.status = RoomStatus::Playing;
            room.score = 0;
            room.bugs.clear();
            for player in &mut room.players {
                player.bullets.clear();
            }
            room.touch(now);
            info!(room_id = %room_id, players = room.player_count(), "Room restarted");
            Ok(room.clone())
        })
    }

    fn record_activity(&self, room_id: &str, player_id: &str) -> Result<(), RoomError> {
        self.with_room(room_id, |room, now| {
            room.touch(now);
            if let Some(player) = room.player_mut(player_id) {
                player.last_active_at = Some(now);
            }
            Ok(())
        })
    }

    #[instrument(skip(self))]
    fn evict_inactive_players(
        &self,
        room_id: &str,
        now: DateTime<Utc>,
        timeout: Duration,
    ) -> Result<Eviction, RoomError> {
        let timeout = to_chrono(timeout);
        let slot = self
            .slot(room_id)
            .ok_or_else(|| RoomError::NotFound(room_id.to_string()))?;
        let mut guard = lock_slot(&slot);
        let room = guard
            .as_mut()
            .ok_or_else(|| RoomError::NotFound(room_id.to_string()))?;

        let (inactive, active): (Vec<_>, Vec<_>) = std::mem::take(&mut room.players)
            .into_iter()
            .partition(|p| p.is_inactive(now, timeout));
        room.players = active;

        if inactive.is_empty() {
            return Ok(Eviction {
                removed: Vec::new(),
                room: Some(room.clone()),
            });
        }

        room.touch(now);
        let removed: Vec<String> = inactive.into_iter().map(|p| p.id).collect();
        info!(room_id = %room_id, removed = ?removed, "Evicted inactive players");

        Ok(Eviction {
            removed,
            room: self.retire_if_empty(room_id, &slot, &mut guard),
        })
    }

    #[instrument(skip(self))]
    fn sweep_inactive_rooms(&self, now: DateTime<Utc>, max_inactive: Duration) -> Vec<String> {
        let max_inactive = to_chrono(max_inactive);
        let mut removed = Vec::new();

        for (room_id, slot) in self.slots() {
            let mut guard = lock_slot(&slot);
            let stale = guard
                .as_ref()
                .is_some_and(|room| room.is_inactive(now, max_inactive));
            if stale {
                self.retire(&room_id, &slot, &mut guard);
                removed.push(room_id);
            }
        }

        if !removed.is_empty() {
            info!(count = removed.len(), "Removed inactive rooms");
        }
        removed
    }
}
