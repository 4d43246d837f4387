//! Index-stable entity storage
//!
//! Entities are placed once when the track is built and only ever removed
//! afterwards. Removal leaves a tombstone so every other entity keeps its
//! index for the whole run.

use serde::{Deserialize, Serialize};

/// Stable handle to an entity slot
pub type EntityId = u32;

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Slot<T> {
    value: T,
    alive: bool,
}

/// Append-only storage with O(1) tombstone removal
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Arena<T> {
    slots: Vec<Slot<T>>,
    live: usize,
}

impl<T> Default for Arena<T> {
    fn default() -> Self {
        Self {
            slots: Vec::new(),
            live: 0,
        }
    }
}

impl<T> Arena<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a value and return its handle
    pub fn insert(&mut self, value: T) -> EntityId {
        let id = self.slots.len() as EntityId;
        self.slots.push(Slot { value, alive: true });
        self.live += 1;
        id
    }

    /// Tombstone an entity. Returns the value if it was still alive.
    pub fn remove(&mut self, id: EntityId) -> Option<&T> {
        let slot = self.slots.get_mut(id as usize)?;
        if !slot.alive {
            return None;
        }
        slot.alive = false;
        self.live -= 1;
        Some(&slot.value)
    }

    /// Live entities in placement order
    pub fn iter(&self) -> impl Iterator<Item = (EntityId, &T)> {
        self.slots
            .iter()
            .enumerate()
            .filter(|(_, slot)| slot.alive)
            .map(|(i, slot)| (i as EntityId, &slot.value))
    }

    /// Number of live entities
    pub fn len(&self) -> usize {
        self.live
    }

    pub fn is_empty(&self) -> bool {
        self.live == 0
    }
}

impl<T> FromIterator<T> for Arena<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut arena = Arena::new();
        for value in iter {
            arena.insert(value);
        }
        arena
    }
}
