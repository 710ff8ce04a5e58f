//! "Something changed" notifications used to re-drive deferred work.
//!
//! Two implementations share the [`ChangeWatcher`] capability: [`MutationWatcher`] relays
//! native DOM mutation notifications reported by the host, [`PollingWatcher`] fires on a
//! fixed interval when the platform has no mutation observer. The engine never branches on
//! which one is in use.

use alloc::boxed::Box;
use alloc::collections::BTreeMap;
use alloc::vec::Vec;

use crate::ScrollKey;

/// Handle to one active watch.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct WatchId(pub u64);

/// The part of the document a watch observes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum WatchScope {
    /// The whole document (subtree, attributes and child lists).
    Document,
    /// The subtree of a registered scroll target.
    Element(ScrollKey),
}

/// An input to [`ChangeWatcher::fired`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum WatchEvent {
    /// The host observed a structural or attribute change within `scope`.
    Mutation(WatchScope),
    /// Host timer tick.
    Tick(u64),
}

pub trait ChangeWatcher {
    /// Starts observing `scope`. `timeout_ms` is the lifetime the caller expects the watch to
    /// have; polling implementations derive their interval from it.
    fn watch(&mut self, scope: WatchScope, now_ms: u64, timeout_ms: u64) -> WatchId;

    /// Stops a watch. Unknown ids are ignored.
    fn unwatch(&mut self, id: WatchId);

    /// Returns the watches that fire for `event`, in creation order.
    fn fired(&mut self, event: &WatchEvent) -> Vec<WatchId>;

    fn active_watches(&self) -> usize;
}

/// Relays host-reported mutations.
///
/// Document watches fire for every mutation; element watches fire for mutations reported on
/// the same scroll key.
#[derive(Clone, Debug, Default)]
pub struct MutationWatcher {
    next_id: u64,
    watches: BTreeMap<WatchId, WatchScope>,
}

impl MutationWatcher {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ChangeWatcher for MutationWatcher {
    fn watch(&mut self, scope: WatchScope, _now_ms: u64, _timeout_ms: u64) -> WatchId {
        let id = WatchId(self.next_id);
        self.next_id += 1;
        self.watches.insert(id, scope);
        id
    }

    fn unwatch(&mut self, id: WatchId) {
        self.watches.remove(&id);
    }

    fn fired(&mut self, event: &WatchEvent) -> Vec<WatchId> {
        let WatchEvent::Mutation(changed) = event else {
            return Vec::new();
        };
        self.watches
            .iter()
            .filter(|(_, scope)| match scope {
                WatchScope::Document => true,
                WatchScope::Element(_) => *scope == changed,
            })
            .map(|(id, _)| *id)
            .collect()
    }

    fn active_watches(&self) -> usize {
        self.watches.len()
    }
}

#[derive(Clone, Copy, Debug)]
struct Poll {
    interval_ms: u64,
    next_due_ms: u64,
}

/// Fallback for platforms without mutation notifications: each watch fires every
/// `min(timeout, max_interval_ms)` milliseconds (at least 1 ms).
#[derive(Clone, Debug)]
pub struct PollingWatcher {
    max_interval_ms: u64,
    next_id: u64,
    watches: BTreeMap<WatchId, Poll>,
}

impl PollingWatcher {
    pub fn new(max_interval_ms: u64) -> Self {
        Self {
            max_interval_ms: max_interval_ms.max(1),
            next_id: 0,
            watches: BTreeMap::new(),
        }
    }

    pub fn max_interval_ms(&self) -> u64 {
        self.max_interval_ms
    }
}

impl ChangeWatcher for PollingWatcher {
    fn watch(&mut self, _scope: WatchScope, now_ms: u64, timeout_ms: u64) -> WatchId {
        let id = WatchId(self.next_id);
        self.next_id += 1;
        let interval_ms = timeout_ms.min(self.max_interval_ms).max(1);
        self.watches.insert(
            id,
            Poll {
                interval_ms,
                next_due_ms: now_ms.saturating_add(interval_ms),
            },
        );
        id
    }

    fn unwatch(&mut self, id: WatchId) {
        self.watches.remove(&id);
    }

    fn fired(&mut self, event: &WatchEvent) -> Vec<WatchId> {
        let WatchEvent::Tick(now_ms) = *event else {
            return Vec::new();
        };
        let mut due = Vec::new();
        for (id, poll) in self.watches.iter_mut() {
            if now_ms >= poll.next_due_ms {
                poll.next_due_ms = now_ms.saturating_add(poll.interval_ms);
                due.push(*id);
            }
        }
        due
    }

    fn active_watches(&self) -> usize {
        self.watches.len()
    }
}

/// Picks the watcher implementation for the current platform.
pub fn select_watcher(
    native_available: bool,
    max_poll_interval_ms: u64,
) -> Box<dyn ChangeWatcher> {
    if native_available {
        Box::new(MutationWatcher::new())
    } else {
        Box::new(PollingWatcher::new(max_poll_interval_ms))
    }
}
