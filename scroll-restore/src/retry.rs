use crate::{ChangeWatcher, WatchId, WatchScope};

/// Lifecycle of a [`RetryableAction`]. Every state but `Pending` is terminal.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RetryState {
    Pending,
    Succeeded,
    TimedOut,
    /// Superseded by newer intent. Never reported as a failure.
    Cancelled,
}

impl RetryState {
    pub fn is_pending(self) -> bool {
        self == Self::Pending
    }
}

/// A time-bounded wait that re-runs an attempt whenever the watched scope changes.
///
/// The attempt is supplied per notification (see [`RetryableAction::on_change`]) so the action
/// never borrows the target it retries against. The watch is released on every terminal
/// transition; the deadline is checked by [`RetryableAction::on_tick`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RetryableAction {
    watch: Option<WatchId>,
    deadline_ms: u64,
    state: RetryState,
}

impl RetryableAction {
    pub fn start(
        watcher: &mut dyn ChangeWatcher,
        scope: WatchScope,
        now_ms: u64,
        timeout_ms: u64,
    ) -> Self {
        let watch = watcher.watch(scope, now_ms, timeout_ms);
        Self {
            watch: Some(watch),
            deadline_ms: now_ms.saturating_add(timeout_ms),
            state: RetryState::Pending,
        }
    }

    pub fn state(&self) -> RetryState {
        self.state
    }

    pub fn is_pending(&self) -> bool {
        self.state.is_pending()
    }

    pub fn watch_id(&self) -> Option<WatchId> {
        self.watch
    }

    pub fn deadline_ms(&self) -> u64 {
        self.deadline_ms
    }

    /// Handles a change notification: re-runs `attempt` while pending and succeeds on the
    /// first `true`.
    pub fn on_change(
        &mut self,
        watcher: &mut dyn ChangeWatcher,
        attempt: impl FnOnce() -> bool,
    ) -> RetryState {
        if self.is_pending() && attempt() {
            self.resolve(watcher, RetryState::Succeeded);
        }
        self.state
    }

    /// Times the action out once `now_ms` reaches the deadline.
    pub fn on_tick(&mut self, watcher: &mut dyn ChangeWatcher, now_ms: u64) -> RetryState {
        if self.is_pending() && now_ms >= self.deadline_ms {
            self.resolve(watcher, RetryState::TimedOut);
        }
        self.state
    }

    /// Cancels a pending action. Returns `false` (and does nothing) if already resolved.
    pub fn cancel(&mut self, watcher: &mut dyn ChangeWatcher) -> bool {
        if !self.is_pending() {
            return false;
        }
        self.resolve(watcher, RetryState::Cancelled);
        true
    }

    fn resolve(&mut self, watcher: &mut dyn ChangeWatcher, state: RetryState) {
        debug_assert!(self.is_pending(), "RetryableAction resolved twice");
        if let Some(id) = self.watch.take() {
            watcher.unwatch(id);
        }
        self.state = state;
    }
}
