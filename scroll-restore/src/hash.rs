use alloc::string::String;

use crate::{ChangeWatcher, RetryState, RetryableAction, Viewport, WatchId, WatchScope};

/// Waits for the element named by a location fragment and scrolls it into view.
///
/// Armed on navigation to a location with a fragment; superseded (cancelled) by the next
/// history notification. Existence is binary, so there is no tolerance here.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HashTargetScroller {
    element_id: String,
    action: RetryableAction,
}

impl HashTargetScroller {
    pub fn arm(
        element_id: impl Into<String>,
        watcher: &mut dyn ChangeWatcher,
        now_ms: u64,
        timeout_ms: u64,
    ) -> Self {
        let element_id = element_id.into();
        sdebug!(element_id = %element_id, timeout_ms, "waiting for hash target");
        Self {
            action: RetryableAction::start(watcher, WatchScope::Document, now_ms, timeout_ms),
            element_id,
        }
    }

    pub fn element_id(&self) -> &str {
        &self.element_id
    }

    pub fn state(&self) -> RetryState {
        self.action.state()
    }

    pub fn is_pending(&self) -> bool {
        self.action.is_pending()
    }

    /// Probes for the element if this scroller's watch is among `fired`.
    pub fn on_fired(
        &mut self,
        fired: &[WatchId],
        viewport: &mut dyn Viewport,
        watcher: &mut dyn ChangeWatcher,
    ) -> RetryState {
        let Some(id) = self.action.watch_id() else {
            return self.action.state();
        };
        if !fired.contains(&id) {
            return self.action.state();
        }
        let element_id = &self.element_id;
        let state = self
            .action
            .on_change(watcher, || viewport.scroll_into_view(element_id));
        if state == RetryState::Succeeded {
            sdebug!(element_id = %element_id, "scrolled hash target into view");
        }
        state
    }

    pub fn on_tick(&mut self, watcher: &mut dyn ChangeWatcher, now_ms: u64) -> RetryState {
        self.action.on_tick(watcher, now_ms)
    }

    pub fn cancel(&mut self, watcher: &mut dyn ChangeWatcher) -> bool {
        self.action.cancel(watcher)
    }
}
