use alloc::boxed::Box;
use alloc::collections::VecDeque;
use alloc::format;
use alloc::rc::Rc;
use alloc::vec;
use alloc::vec::Vec;
use core::cell::RefCell;

use scroll_restore::{HistoryAction, HistoryEvent, Location, LocationKey, ScrollManager};

/// A manager shared between the history listener and the view layer.
pub type SharedManager = Rc<RefCell<ScrollManager>>;

pub type HistoryListener = Box<dyn FnMut(&HistoryEvent)>;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ListenerId(pub u64);

/// A history source that notifies listeners on every location change.
///
/// Notifications carry the history length observed at emission.
pub trait ListenableHistory {
    fn length(&self) -> usize;
    fn listen(&mut self, listener: HistoryListener) -> ListenerId;
    fn unlisten(&mut self, id: ListenerId);
}

/// Notifications waiting for the manager, with the time they were emitted.
type Backlog = Rc<RefCell<VecDeque<(HistoryEvent, u64)>>>;

/// A live subscription of a [`SharedManager`] to a history source.
#[derive(Debug)]
#[must_use = "dropping the binding does not unsubscribe; call `unbind`"]
pub struct HistoryBinding {
    id: ListenerId,
    backlog: Backlog,
}

impl HistoryBinding {
    pub fn id(&self) -> ListenerId {
        self.id
    }

    /// Number of notifications that arrived while the manager was borrowed and have not been
    /// delivered yet.
    pub fn pending(&self) -> usize {
        self.backlog.borrow().len()
    }

    /// Delivers queued notifications in emission order. Returns how many were delivered.
    ///
    /// Does nothing while `manager` is still borrowed.
    pub fn flush_pending(&self, manager: &SharedManager) -> usize {
        match manager.try_borrow_mut() {
            Ok(mut m) => replay(&self.backlog, &mut m),
            Err(_) => 0,
        }
    }

    pub fn unbind(self, history: &mut impl ListenableHistory) {
        history.unlisten(self.id);
    }
}

fn replay(backlog: &Backlog, manager: &mut ScrollManager) -> usize {
    let mut delivered = 0;
    loop {
        let next = backlog.borrow_mut().pop_front();
        let Some((event, now_ms)) = next else {
            return delivered;
        };
        manager.handle_history(&event, now_ms);
        delivered += 1;
    }
}

/// Forwards every notification from `history` into `manager`, in emission order.
///
/// `clock` supplies `now_ms` for each notification. A notification that arrives while the
/// manager is already borrowed (re-entrant navigation from inside a manager call) is queued
/// and delivered ahead of the next one, or by [`HistoryBinding::flush_pending`].
pub fn bind_history(
    manager: &SharedManager,
    history: &mut impl ListenableHistory,
    clock: impl Fn() -> u64 + 'static,
) -> HistoryBinding {
    let manager = Rc::clone(manager);
    let backlog: Backlog = Rc::default();
    let queue = Rc::clone(&backlog);
    let id = history.listen(Box::new(move |event: &HistoryEvent| {
        let now_ms = clock();
        match manager.try_borrow_mut() {
            Ok(mut m) => {
                replay(&queue, &mut m);
                m.handle_history(event, now_ms);
            }
            Err(_) => {
                adebug!(action = ?event.action, "manager busy; queueing history notification");
                queue.borrow_mut().push_back((event.clone(), now_ms));
            }
        }
    }));
    HistoryBinding { id, backlog }
}

/// An in-memory history stack, for hosts without a browser history and for tests.
///
/// Starts with a single entry that has no key. Pushed entries without a key get a generated
/// one. Like a browser, pushing discards any forward entries and traversal never changes the
/// length.
pub struct MemoryHistory {
    entries: Vec<Location>,
    index: usize,
    next_key: u64,
    next_listener: u64,
    listeners: Vec<(ListenerId, HistoryListener)>,
}

impl MemoryHistory {
    pub fn new() -> Self {
        Self::with_initial(Location::new())
    }

    pub fn with_initial(location: Location) -> Self {
        Self {
            entries: vec![location],
            index: 0,
            next_key: 0,
            next_listener: 0,
            listeners: Vec::new(),
        }
    }

    pub fn location(&self) -> &Location {
        &self.entries[self.index]
    }

    pub fn index(&self) -> usize {
        self.index
    }

    /// Pushes a new entry and returns its key.
    pub fn push(&mut self, location: Location) -> LocationKey {
        let location = self.keyed(location);
        let key = location.location_key();
        self.entries.truncate(self.index + 1);
        self.entries.push(location);
        self.index += 1;
        self.notify(HistoryAction::Push);
        key
    }

    /// Replaces the current entry and returns its key.
    pub fn replace(&mut self, location: Location) -> LocationKey {
        let location = self.keyed(location);
        let key = location.location_key();
        self.entries[self.index] = location;
        self.notify(HistoryAction::Replace);
        key
    }

    /// Moves `delta` entries back (negative) or forward. Out-of-range moves and `0` are
    /// ignored. Returns whether the position changed.
    pub fn go(&mut self, delta: isize) -> bool {
        let Some(target) = self.index.checked_add_signed(delta) else {
            return false;
        };
        if delta == 0 || target >= self.entries.len() {
            return false;
        }
        self.index = target;
        self.notify(HistoryAction::Pop);
        true
    }

    pub fn back(&mut self) -> bool {
        self.go(-1)
    }

    pub fn forward(&mut self) -> bool {
        self.go(1)
    }

    fn keyed(&mut self, mut location: Location) -> Location {
        if location.key.is_none() {
            self.next_key += 1;
            location.key = Some(format!("m{}", self.next_key));
        }
        location
    }

    fn notify(&mut self, action: HistoryAction) {
        let event = HistoryEvent::new(self.location().clone(), action, self.entries.len());
        adebug!(?action, length = event.length, "history notification");
        for (_, listener) in self.listeners.iter_mut() {
            listener(&event);
        }
    }
}

impl Default for MemoryHistory {
    fn default() -> Self {
        Self::new()
    }
}

impl ListenableHistory for MemoryHistory {
    fn length(&self) -> usize {
        self.entries.len()
    }

    fn listen(&mut self, listener: HistoryListener) -> ListenerId {
        let id = ListenerId(self.next_listener);
        self.next_listener += 1;
        self.listeners.push((id, listener));
        id
    }

    fn unlisten(&mut self, id: ListenerId) {
        self.listeners.retain(|(l, _)| *l != id);
    }
}

impl core::fmt::Debug for MemoryHistory {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("MemoryHistory")
            .field("entries", &self.entries)
            .field("index", &self.index)
            .field("listeners", &self.listeners.len())
            .finish_non_exhaustive()
    }
}
