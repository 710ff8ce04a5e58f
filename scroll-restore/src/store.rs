use alloc::collections::BTreeMap;
use alloc::string::String;
use alloc::vec::Vec;

use crate::state::{PositionMap, PositionRecord, SessionState};
use crate::{LocationKey, Offset, StateError};

/// Stored scroll positions plus the list of history entries they belong to.
///
/// `live_locations` holds the keys of entries still reachable by back/forward navigation, in
/// push order. It only shrinks from the tail (see [`PositionStore::prune`]).
///
/// This type is pure bookkeeping. Superseding an in-flight retry on save is the manager's
/// job (see `ScrollManager::save_position`).
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PositionStore {
    positions: PositionMap,
    locations: Vec<LocationKey>,
}

impl PositionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a store from persisted state. Returns the stored active location key, if any.
    pub fn from_state(state: SessionState) -> (Self, Option<LocationKey>) {
        let SessionState {
            positions,
            locations,
            location_key,
        } = state;
        (
            Self {
                positions,
                locations,
            },
            location_key,
        )
    }

    pub fn to_state(&self, active: &str) -> SessionState {
        SessionState {
            positions: self.positions.clone(),
            locations: self.locations.clone(),
            location_key: Some(String::from(active)),
        }
    }

    pub fn serialize(&self, active: &str) -> Result<String, StateError> {
        self.to_state(active).encode()
    }

    pub fn deserialize(raw: &str) -> Result<(Self, Option<LocationKey>), StateError> {
        SessionState::decode(raw).map(Self::from_state)
    }

    /// Overwrites the offset stored for `(location, scroll_key)`.
    pub fn save(&mut self, location: &str, scroll_key: &str, offset: Offset) {
        strace!(location, scroll_key, x = offset.x, y = offset.y, "save");
        self.positions
            .entry(String::from(location))
            .or_insert_with(BTreeMap::new)
            .insert(String::from(scroll_key), PositionRecord::new(scroll_key, offset));
    }

    /// Returns the stored offset, or `None` when nothing was saved for the pair.
    pub fn load(&self, location: &str, scroll_key: &str) -> Option<Offset> {
        self.positions
            .get(location)?
            .get(scroll_key)
            .map(|record| record.offset(scroll_key))
    }

    /// Pops live locations from the tail until at most `keep` remain, dropping their stored
    /// positions. Returns the number of locations removed.
    pub fn prune(&mut self, keep: usize) -> usize {
        let mut removed = 0usize;
        while self.locations.len() > keep {
            let Some(key) = self.locations.pop() else {
                break;
            };
            strace!(location = %key, "prune");
            self.positions.remove(&key);
            removed += 1;
        }
        removed
    }

    pub fn push_location(&mut self, key: LocationKey) {
        self.locations.push(key);
    }

    pub fn live_locations(&self) -> &[LocationKey] {
        &self.locations
    }

    pub fn live_len(&self) -> usize {
        self.locations.len()
    }

    /// Whether any position is stored for `location`.
    pub fn has_positions(&self, location: &str) -> bool {
        self.positions.contains_key(location)
    }

    pub fn stored_locations(&self) -> impl Iterator<Item = &str> {
        self.positions.keys().map(String::as_str)
    }
}
