use alloc::string::String;

use crate::{HistoryAction, HistoryEvent, INITIAL_LOCATION_KEY, LocationKey, PositionStore};

/// What a history notification changed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Transition {
    /// Location that was active before the notification.
    pub outgoing: LocationKey,
    /// Location that is active now.
    pub incoming: LocationKey,
    /// Live locations dropped by pruning.
    pub pruned: usize,
    /// Element id to bring into view, for PUSH/REPLACE to a location with a fragment.
    pub hash_target: Option<String>,
}

/// Follows history notifications: keeps the live-location list in step with the history stack
/// and tracks the active location key.
///
/// `history_start` is the history length that precedes the first live location. It can be
/// negative when persisted state lists more locations than the current history holds.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LocationTracker {
    history_start: i64,
    active: LocationKey,
}

impl LocationTracker {
    pub fn new(history_length: usize, store: &PositionStore, active: Option<LocationKey>) -> Self {
        Self {
            history_start: history_length as i64 - store.live_len() as i64,
            active: active.unwrap_or_else(|| String::from(INITIAL_LOCATION_KEY)),
        }
    }

    /// Key under which the next save happens.
    pub fn active(&self) -> &str {
        &self.active
    }

    pub fn history_start(&self) -> i64 {
        self.history_start
    }

    /// Number of live locations that survive `event`.
    ///
    /// PUSH and REPLACE exclude the top entry (it is being replaced, or lies past the new
    /// top); POP keeps everything so back/forward keep working.
    pub fn keep_count(&self, event: &HistoryEvent) -> usize {
        let discard = if event.action == HistoryAction::Pop { 0 } else { 1 };
        let keep = event.length as i64 - self.history_start - discard;
        keep.max(0) as usize
    }

    /// Prunes, records the incoming key (for PUSH/REPLACE), and switches the active key.
    ///
    /// Saving the outgoing location's positions must happen before this call.
    pub fn transition(&mut self, store: &mut PositionStore, event: &HistoryEvent) -> Transition {
        let pruned = store.prune(self.keep_count(event));

        let key = event.location.location_key();
        let mut hash_target = None;
        if event.action != HistoryAction::Pop {
            store.push_location(key.clone());
            self.history_start = event.length as i64 - store.live_len() as i64;
            hash_target = event.location.fragment_id().map(String::from);
        }

        let outgoing = core::mem::replace(&mut self.active, key.clone());
        strace!(outgoing = %outgoing, incoming = %key, pruned, "location change");
        Transition {
            outgoing,
            incoming: key,
            pruned,
            hash_target,
        }
    }
}
