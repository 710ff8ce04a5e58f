//! A headless scroll-position restoration engine for client-side navigation.
//!
//! For view-layer bindings (window/element scrollers, history plumbing), see the
//! `scroll-restore-adapter` crate.
//!
//! The crate remembers where the viewport and any number of keyed scroll containers were
//! scrolled for each history entry, and puts them back when the user navigates back or
//! forward. Positions survive full page reloads through a session-scoped key/value store.
//! When a freshly rendered container is not yet large enough to accept its stored offset,
//! restoration is deferred and re-attempted whenever the document changes, up to a timeout.
//!
//! It is UI-agnostic. A host is expected to provide:
//! - history notifications (location + PUSH/REPLACE/POP + history length)
//! - scrollable targets ([`Scrollable`], [`Viewport`])
//! - a session store ([`SessionStorage`])
//! - change notifications, natively or by polling ([`ChangeWatcher`])
//! - a clock, as `now_ms` arguments and [`ScrollManager::tick`] calls
#![cfg_attr(not(feature = "std"), no_std)]
#![forbid(unsafe_code)]

extern crate alloc;

#[cfg(test)]
extern crate std;

#[macro_use]
mod macros;

mod engine;
mod error;
mod hash;
mod manager;
mod options;
mod retry;
mod state;
mod storage;
mod store;
mod target;
mod tracker;
mod types;
mod watch;


pub use engine::{RestorationEngine, RestoreOutcome};
pub use error::{Diagnostic, StateError, StorageError};
pub use hash::HashTargetScroller;
pub use manager::ScrollManager;
pub use options::{
    DEFAULT_MAX_POLL_INTERVAL_MS, DEFAULT_SESSION_KEY, DEFAULT_TIMEOUT_MS, DiagnosticCallback,
    ScrollManagerOptions,
};
pub use retry::{RetryState, RetryableAction};
pub use state::{PositionMap, PositionRecord, SessionState, on_corrupt_state};
pub use storage::{MemoryStorage, SessionStorage};
pub use store::PositionStore;
pub use target::{Scrollable, Viewport, attempt_scroll, available_range};
pub use tracker::{LocationTracker, Transition};
pub use types::{
    Extent, HistoryAction, HistoryEvent, INITIAL_LOCATION_KEY, Location, LocationKey, Offset,
    ScrollKey, ScrollRestoration, WINDOW_SCROLL_KEY, fragment_id,
};
pub use watch::{
    ChangeWatcher, MutationWatcher, PollingWatcher, WatchEvent, WatchId, WatchScope,
    select_watcher,
};
