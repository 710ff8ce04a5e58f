use alloc::boxed::Box;
use alloc::collections::BTreeMap;
use alloc::string::String;
use alloc::vec::Vec;

use crate::target::{attempt_scroll, available_range};
use crate::{
    ChangeWatcher, Diagnostic, Extent, LocationKey, Offset, RetryState, RetryableAction,
    ScrollKey, Scrollable, Viewport, WINDOW_SCROLL_KEY, WatchId, WatchScope,
};

/// Result of [`RestorationEngine::restore`].
#[derive(Clone, Debug, PartialEq)]
pub enum RestoreOutcome {
    /// The target already sits at (or was moved to) the requested offset.
    Applied,
    /// The target could not accept the offset yet; a retry is armed.
    Deferred,
    /// The target could not accept the offset and retrying is disabled.
    Unavailable(Diagnostic),
    /// No target is registered under the scroll key.
    NoTarget,
    /// The active navigation scrolls to a fragment target; the window is left alone.
    Superseded,
}

#[derive(Debug)]
struct PendingRestore {
    action: RetryableAction,
    location: LocationKey,
    requested: Offset,
}

/// Applies offsets to the viewport and registered element targets, deferring through a
/// [`RetryableAction`] when a target is not yet large enough.
///
/// At most one retry is pending per scroll key; any new restore (or a cancel) for a key
/// supersedes the previous one.
pub struct RestorationEngine {
    viewport: Box<dyn Viewport>,
    targets: BTreeMap<ScrollKey, Box<dyn Scrollable>>,
    watcher: Box<dyn ChangeWatcher>,
    pending: BTreeMap<ScrollKey, PendingRestore>,
    timeout_ms: u64,
    tolerance: f64,
}

fn attempt_target(
    viewport: &mut dyn Viewport,
    targets: &mut BTreeMap<ScrollKey, Box<dyn Scrollable>>,
    scroll_key: &str,
    requested: Offset,
    tolerance: f64,
) -> bool {
    if scroll_key == WINDOW_SCROLL_KEY {
        return attempt_scroll(viewport, requested, tolerance);
    }
    match targets.get_mut(scroll_key) {
        Some(target) => attempt_scroll(target.as_mut(), requested, tolerance),
        None => false,
    }
}

impl RestorationEngine {
    pub fn new(
        viewport: Box<dyn Viewport>,
        watcher: Box<dyn ChangeWatcher>,
        timeout_ms: u64,
        tolerance: f64,
    ) -> Self {
        Self {
            viewport,
            targets: BTreeMap::new(),
            watcher,
            pending: BTreeMap::new(),
            timeout_ms,
            tolerance,
        }
    }

    pub fn viewport(&self) -> &dyn Viewport {
        self.viewport.as_ref()
    }

    pub fn viewport_mut(&mut self) -> &mut dyn Viewport {
        self.viewport.as_mut()
    }

    pub fn watcher(&self) -> &dyn ChangeWatcher {
        self.watcher.as_ref()
    }

    pub fn watcher_mut(&mut self) -> &mut dyn ChangeWatcher {
        self.watcher.as_mut()
    }

    /// Splits out the viewport and watcher for work that needs both at once.
    pub fn host_mut(&mut self) -> (&mut dyn Viewport, &mut dyn ChangeWatcher) {
        (self.viewport.as_mut(), self.watcher.as_mut())
    }

    /// Registers an element target. Returns the handle previously registered under the key.
    pub fn register_target(
        &mut self,
        scroll_key: impl Into<ScrollKey>,
        target: Box<dyn Scrollable>,
    ) -> Option<Box<dyn Scrollable>> {
        self.targets.insert(scroll_key.into(), target)
    }

    /// Drops the handle for `scroll_key` and silently cancels its pending retry.
    pub fn unregister_target(&mut self, scroll_key: &str) -> Option<Box<dyn Scrollable>> {
        self.cancel(scroll_key);
        self.targets.remove(scroll_key)
    }

    pub fn has_target(&self, scroll_key: &str) -> bool {
        scroll_key == WINDOW_SCROLL_KEY || self.targets.contains_key(scroll_key)
    }

    pub fn registered_keys(&self) -> impl Iterator<Item = &str> {
        self.targets.keys().map(String::as_str)
    }

    /// Current offsets of the viewport and every registered element, viewport first.
    pub fn current_offsets(&self) -> Vec<(ScrollKey, Offset)> {
        let mut out = Vec::with_capacity(self.targets.len() + 1);
        out.push((
            String::from(WINDOW_SCROLL_KEY),
            self.viewport.scroll_offset(),
        ));
        for (key, target) in &self.targets {
            out.push((key.clone(), target.scroll_offset()));
        }
        out
    }

    /// `(available range, scroll size)` of the target, for diagnostics.
    fn extents(&self, scroll_key: &str) -> (Extent, Extent) {
        if scroll_key == WINDOW_SCROLL_KEY {
            let viewport = self.viewport.as_ref();
            return (
                available_range(viewport, self.tolerance),
                viewport.scroll_size(),
            );
        }
        self.targets
            .get(scroll_key)
            .map(|t| (available_range(&**t, self.tolerance), t.scroll_size()))
            .unwrap_or_default()
    }

    pub fn is_pending(&self, scroll_key: &str) -> bool {
        self.pending.contains_key(scroll_key)
    }

    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Restores `requested` onto the target for `scroll_key`, on behalf of `location`.
    pub fn restore(
        &mut self,
        location: &str,
        scroll_key: &str,
        requested: Offset,
        now_ms: u64,
    ) -> RestoreOutcome {
        strace!(location, scroll_key, x = requested.x, y = requested.y, "restore");
        self.cancel(scroll_key);

        if !self.has_target(scroll_key) {
            return RestoreOutcome::NoTarget;
        }

        if attempt_target(
            self.viewport.as_mut(),
            &mut self.targets,
            scroll_key,
            requested,
            self.tolerance,
        ) {
            return RestoreOutcome::Applied;
        }

        if self.timeout_ms == 0 {
            let (available, scroll_size) = self.extents(scroll_key);
            return RestoreOutcome::Unavailable(Diagnostic::RestoreUnavailable {
                location: String::from(location),
                scroll_key: String::from(scroll_key),
                requested,
                available,
                scroll_size,
            });
        }

        sdebug!(
            scroll_key,
            timeout_ms = self.timeout_ms,
            "deferring scroll until the target can accommodate it"
        );
        let scope = if scroll_key == WINDOW_SCROLL_KEY {
            WatchScope::Document
        } else {
            WatchScope::Element(String::from(scroll_key))
        };
        let action = RetryableAction::start(self.watcher.as_mut(), scope, now_ms, self.timeout_ms);
        self.pending.insert(
            String::from(scroll_key),
            PendingRestore {
                action,
                location: String::from(location),
                requested,
            },
        );
        RestoreOutcome::Deferred
    }

    /// Cancels the pending retry for `scroll_key`. Returns whether one was pending.
    pub fn cancel(&mut self, scroll_key: &str) -> bool {
        let Some(mut entry) = self.pending.remove(scroll_key) else {
            return false;
        };
        sdebug!(scroll_key, "cancelling deferred scroll");
        entry.action.cancel(self.watcher.as_mut());
        true
    }

    pub fn cancel_all(&mut self) {
        let watcher = self.watcher.as_mut();
        for (_, mut entry) in core::mem::take(&mut self.pending) {
            entry.action.cancel(watcher);
        }
    }

    /// Re-attempts every pending restore whose watch fired. Returns the keys that succeeded.
    pub fn on_fired(&mut self, fired: &[WatchId]) -> Vec<ScrollKey> {
        let Self {
            viewport,
            targets,
            watcher,
            pending,
            tolerance,
            ..
        } = self;
        let mut succeeded = Vec::new();
        for (key, entry) in pending.iter_mut() {
            let Some(id) = entry.action.watch_id() else {
                continue;
            };
            if !fired.contains(&id) {
                continue;
            }
            let requested = entry.requested;
            let state = entry.action.on_change(watcher.as_mut(), || {
                attempt_target(viewport.as_mut(), &mut *targets, key, requested, *tolerance)
            });
            if state == RetryState::Succeeded {
                strace!(scroll_key = %key, "deferred scroll succeeded");
                succeeded.push(key.clone());
            }
        }
        pending.retain(|_, entry| entry.action.is_pending());
        succeeded
    }

    /// Times out pending restores whose deadline has passed.
    pub fn expire(&mut self, now_ms: u64) -> Vec<Diagnostic> {
        let mut timed_out = Vec::new();
        for (key, entry) in self.pending.iter_mut() {
            if entry.action.on_tick(self.watcher.as_mut(), now_ms) == RetryState::TimedOut {
                timed_out.push((key.clone(), entry.location.clone(), entry.requested));
            }
        }
        self.pending.retain(|_, entry| entry.action.is_pending());
        timed_out
            .into_iter()
            .map(|(scroll_key, location, requested)| {
                let (available, scroll_size) = self.extents(&scroll_key);
                Diagnostic::RestoreTimedOut {
                    location,
                    scroll_key,
                    requested,
                    available,
                    scroll_size,
                }
            })
            .collect()
    }
}

impl core::fmt::Debug for RestorationEngine {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("RestorationEngine")
            .field("targets", &self.targets.keys().collect::<Vec<_>>())
            .field("pending", &self.pending)
            .field("timeout_ms", &self.timeout_ms)
            .field("tolerance", &self.tolerance)
            .finish_non_exhaustive()
    }
}
