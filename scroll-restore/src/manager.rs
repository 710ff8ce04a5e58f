use alloc::boxed::Box;
use alloc::string::{String, ToString};

use crate::state::on_corrupt_state;
use crate::{
    ChangeWatcher, Diagnostic, HashTargetScroller, HistoryEvent, LocationKey, LocationTracker,
    Offset, PositionStore, RestorationEngine, RestoreOutcome, RetryState, ScrollManagerOptions,
    ScrollRestoration, Scrollable, SessionState, SessionStorage, Transition, Viewport,
    WINDOW_SCROLL_KEY, WatchEvent, WatchId, WatchScope, fragment_id,
};

/// The scroll restoration service.
///
/// Owns the position store, the location tracker and the restoration engine, and wires them
/// to the host's collaborators. It holds no UI objects of its own beyond the handles the host
/// registers. The host drives it by forwarding:
/// - history notifications to [`ScrollManager::handle_history`]
/// - mutation notifications to [`ScrollManager::notify_mutation`]
/// - timer ticks to [`ScrollManager::tick`]
/// - page unload to [`ScrollManager::flush`]
///
/// Lifecycle: construct, [`start`](Self::start), ..., [`stop`](Self::stop). History
/// notifications are ignored while stopped.
pub struct ScrollManager {
    options: ScrollManagerOptions,
    storage: Box<dyn SessionStorage>,
    store: PositionStore,
    tracker: LocationTracker,
    engine: RestorationEngine,
    hash_scroller: Option<HashTargetScroller>,
    /// Fragment targeted by the active navigation, until the next history notification.
    fragment: Option<String>,
    running: bool,
    previous_restoration: Option<ScrollRestoration>,
}

impl ScrollManager {
    /// Creates a manager, loading persisted state from `storage`.
    ///
    /// Unreadable or corrupt state is reported as a diagnostic and replaced by an empty state.
    pub fn new(
        options: ScrollManagerOptions,
        storage: impl SessionStorage + 'static,
        viewport: impl Viewport + 'static,
        watcher: Box<dyn ChangeWatcher>,
        history_length: usize,
    ) -> Self {
        let state = load_state(&options, &storage);
        let (store, active) = PositionStore::from_state(state);
        let tracker = LocationTracker::new(history_length, &store, active);
        let engine = RestorationEngine::new(
            Box::new(viewport),
            watcher,
            options.timeout_ms,
            options.tolerance,
        );
        sdebug!(
            session_key = %options.session_key,
            live = store.live_len(),
            active = tracker.active(),
            "ScrollManager::new"
        );
        Self {
            options,
            storage: Box::new(storage),
            store,
            tracker,
            engine,
            hash_scroller: None,
            fragment: None,
            running: false,
            previous_restoration: None,
        }
    }

    pub fn options(&self) -> &ScrollManagerOptions {
        &self.options
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Takes over scroll restoration from the platform and starts accepting notifications.
    pub fn start(&mut self) {
        if self.running {
            return;
        }
        self.previous_restoration = self
            .engine
            .viewport_mut()
            .set_scroll_restoration(ScrollRestoration::Manual);
        self.running = true;
    }

    /// Stops accepting notifications, cancels all deferred work and hands scroll restoration
    /// back to the platform.
    pub fn stop(&mut self) {
        if !self.running {
            return;
        }
        self.running = false;
        self.engine.cancel_all();
        self.cancel_hash_scroller();
        if let Some(previous) = self.previous_restoration.take() {
            self.engine.viewport_mut().set_scroll_restoration(previous);
        }
    }

    pub fn active_location(&self) -> &str {
        self.tracker.active()
    }

    pub fn live_locations(&self) -> &[LocationKey] {
        self.store.live_locations()
    }

    pub fn store(&self) -> &PositionStore {
        &self.store
    }

    pub fn tracker(&self) -> &LocationTracker {
        &self.tracker
    }

    pub fn storage(&self) -> &dyn SessionStorage {
        self.storage.as_ref()
    }

    pub fn viewport(&self) -> &dyn Viewport {
        self.engine.viewport()
    }

    pub fn viewport_mut(&mut self) -> &mut dyn Viewport {
        self.engine.viewport_mut()
    }

    pub fn watcher(&self) -> &dyn ChangeWatcher {
        self.engine.watcher()
    }

    pub fn position(&self, location: &str, scroll_key: &str) -> Option<Offset> {
        self.store.load(location, scroll_key)
    }

    pub fn is_restore_pending(&self, scroll_key: &str) -> bool {
        self.engine.is_pending(scroll_key)
    }

    pub fn is_hash_scroll_pending(&self) -> bool {
        self.hash_scroller
            .as_ref()
            .is_some_and(HashTargetScroller::is_pending)
    }

    /// Element id the active navigation scrolls to, if its location carried a fragment.
    ///
    /// Kept after the hash scroll resolves, until the next history notification.
    pub fn hash_target(&self) -> Option<&str> {
        self.fragment.as_deref()
    }

    /// Processes one history notification.
    ///
    /// Order matters: positions are saved under the outgoing location before pruning, and
    /// pruning happens before the incoming key is recorded.
    pub fn handle_history(&mut self, event: &HistoryEvent, now_ms: u64) -> Option<Transition> {
        if !self.running {
            sdebug!("ignoring history notification while stopped");
            return None;
        }
        self.save_positions();
        self.cancel_hash_scroller();
        self.fragment = None;

        let transition = self.tracker.transition(&mut self.store, event);
        if let Some(element_id) = &transition.hash_target {
            self.arm_hash_scroller(element_id, now_ms);
        }
        Some(transition)
    }

    /// Saves `offset` for `scroll_key` under the active location.
    ///
    /// A save always wins: a retry pending for the key is cancelled first.
    pub fn save_position(&mut self, scroll_key: &str, offset: Offset) {
        self.engine.cancel(scroll_key);
        self.store.save(self.tracker.active(), scroll_key, offset);
    }

    /// Saves the viewport and every registered element under the active location.
    pub fn save_positions(&mut self) {
        for (scroll_key, offset) in self.engine.current_offsets() {
            self.save_position(&scroll_key, offset);
        }
    }

    /// Registers an element target and immediately restores it.
    pub fn register_target(
        &mut self,
        scroll_key: &str,
        target: impl Scrollable + 'static,
        now_ms: u64,
    ) -> RestoreOutcome {
        if scroll_key == WINDOW_SCROLL_KEY {
            swarn!(scroll_key, "scroll key is reserved for the viewport");
            return RestoreOutcome::NoTarget;
        }
        self.engine.register_target(scroll_key, Box::new(target));
        self.restore(scroll_key, now_ms)
    }

    /// Drops the handle for `scroll_key`. Stored positions are untouched.
    pub fn unregister_target(&mut self, scroll_key: &str) {
        self.engine.unregister_target(scroll_key);
    }

    /// Restores the stored offset (or zero) for `scroll_key` at the active location.
    ///
    /// The window is not restored while the active navigation targets a fragment.
    pub fn restore(&mut self, scroll_key: &str, now_ms: u64) -> RestoreOutcome {
        if scroll_key == WINDOW_SCROLL_KEY && self.fragment.is_some() {
            strace!(fragment = ?self.fragment, "window restore superseded by fragment");
            return RestoreOutcome::Superseded;
        }
        let location = self.tracker.active();
        let requested = self.store.load(location, scroll_key).unwrap_or_default();
        let outcome = self.engine.restore(location, scroll_key, requested, now_ms);
        if let RestoreOutcome::Unavailable(diagnostic) = &outcome {
            self.options.report(diagnostic.clone());
        }
        outcome
    }

    pub fn restore_window(&mut self, now_ms: u64) -> RestoreOutcome {
        self.restore(WINDOW_SCROLL_KEY, now_ms)
    }

    /// First-mount restore. A fragment (`"#id"`) in the current URL takes precedence over the
    /// stored window position. Returns `None` when the fragment was handled instead.
    pub fn restore_initial(&mut self, hash: Option<&str>, now_ms: u64) -> Option<RestoreOutcome> {
        match hash.and_then(fragment_id) {
            Some(element_id) => {
                self.cancel_hash_scroller();
                self.arm_hash_scroller(element_id, now_ms);
                None
            }
            None => Some(self.restore_window(now_ms)),
        }
    }

    /// Forwards a mutation reported by the host's native observer.
    pub fn notify_mutation(&mut self, scope: WatchScope) {
        let fired = self
            .engine
            .watcher_mut()
            .fired(&WatchEvent::Mutation(scope));
        self.dispatch(&fired);
    }

    /// Advances timers: runs due polls, then expires deferred work past its deadline.
    pub fn tick(&mut self, now_ms: u64) {
        let fired = self.engine.watcher_mut().fired(&WatchEvent::Tick(now_ms));
        self.dispatch(&fired);

        for diagnostic in self.engine.expire(now_ms) {
            self.options.report(diagnostic);
        }

        if let Some(scroller) = self.hash_scroller.as_mut() {
            let state = scroller.on_tick(self.engine.watcher_mut(), now_ms);
            if state == RetryState::TimedOut {
                let element_id = scroller.element_id().to_string();
                self.hash_scroller = None;
                self.options
                    .report(Diagnostic::HashTargetTimedOut { element_id });
            }
        }
    }

    /// Writes the session state back to storage (page unload).
    ///
    /// Best-effort: failures are reported as diagnostics and otherwise ignored.
    pub fn flush(&mut self) {
        self.save_positions();
        let encoded = match self.store.serialize(self.tracker.active()) {
            Ok(encoded) => encoded,
            Err(err) => {
                self.options.report(Diagnostic::EncodeFailed(err.to_string()));
                return;
            }
        };
        if let Err(err) = self.storage.set_item(&self.options.session_key, &encoded) {
            self.options.report(Diagnostic::StorageWriteFailed(err));
        }
    }

    fn dispatch(&mut self, fired: &[WatchId]) {
        if fired.is_empty() {
            return;
        }
        self.engine.on_fired(fired);

        if let Some(scroller) = self.hash_scroller.as_mut() {
            let (viewport, watcher) = self.engine.host_mut();
            if !scroller.on_fired(fired, viewport, watcher).is_pending() {
                self.hash_scroller = None;
            }
        }
    }

    /// Records `element_id` as the active fragment and scrolls to it, waiting for the element
    /// to appear. With retrying disabled the element gets a single attempt.
    fn arm_hash_scroller(&mut self, element_id: &str, now_ms: u64) {
        self.fragment = Some(String::from(element_id));
        if self.options.timeout_ms == 0 {
            if !self.engine.viewport_mut().scroll_into_view(element_id) {
                self.options.report(Diagnostic::HashTargetTimedOut {
                    element_id: String::from(element_id),
                });
            }
            return;
        }
        self.hash_scroller = Some(HashTargetScroller::arm(
            element_id,
            self.engine.watcher_mut(),
            now_ms,
            self.options.timeout_ms,
        ));
    }

    fn cancel_hash_scroller(&mut self) {
        if let Some(mut scroller) = self.hash_scroller.take() {
            scroller.cancel(self.engine.watcher_mut());
        }
    }
}

fn load_state(options: &ScrollManagerOptions, storage: &dyn SessionStorage) -> SessionState {
    let raw = match storage.get_item(&options.session_key) {
        Ok(Some(raw)) => raw,
        Ok(None) => return SessionState::default(),
        Err(err) => {
            options.report(Diagnostic::StorageReadFailed(err));
            return SessionState::default();
        }
    };
    let (state, err) = on_corrupt_state(&raw);
    if let Some(err) = err {
        options.report(Diagnostic::CorruptState(err.to_string()));
    }
    state
}

impl Drop for ScrollManager {
    fn drop(&mut self) {
        self.stop();
    }
}

impl core::fmt::Debug for ScrollManager {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ScrollManager")
            .field("options", &self.options)
            .field("store", &self.store)
            .field("tracker", &self.tracker)
            .field("engine", &self.engine)
            .field("hash_scroller", &self.hash_scroller)
            .field("fragment", &self.fragment)
            .field("running", &self.running)
            .finish_non_exhaustive()
    }
}
