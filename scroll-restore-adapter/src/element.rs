use scroll_restore::{RestoreOutcome, ScrollKey, ScrollManager, Scrollable};

/// View-layer binding for one keyed scroll container.
///
/// The node is registered with the manager on mount (which restores it right away), swapped
/// on update, and dropped on unmount. Stored positions are never touched by unregistering.
/// An empty scroll key disables the binding.
#[derive(Clone, Debug)]
pub struct ElementScroller {
    scroll_key: ScrollKey,
    registered: bool,
    misuse_reported: bool,
}

impl ElementScroller {
    pub fn new(scroll_key: impl Into<ScrollKey>) -> Self {
        Self {
            scroll_key: scroll_key.into(),
            registered: false,
            misuse_reported: false,
        }
    }

    pub fn scroll_key(&self) -> &str {
        &self.scroll_key
    }

    pub fn is_registered(&self) -> bool {
        self.registered
    }

    pub fn misuse_reported(&self) -> bool {
        self.misuse_reported
    }

    pub fn mount<T: Scrollable + 'static>(
        &mut self,
        manager: Option<&mut ScrollManager>,
        node: Option<T>,
        now_ms: u64,
    ) -> Option<RestoreOutcome> {
        self.register(manager, node, now_ms)
    }

    /// Re-render: unregisters under the previous key, then registers `node` under
    /// `scroll_key`.
    pub fn update<T: Scrollable + 'static>(
        &mut self,
        mut manager: Option<&mut ScrollManager>,
        scroll_key: impl Into<ScrollKey>,
        node: Option<T>,
        now_ms: u64,
    ) -> Option<RestoreOutcome> {
        self.unregister(manager.as_deref_mut());
        self.scroll_key = scroll_key.into();
        self.register(manager, node, now_ms)
    }

    pub fn unmount(&mut self, manager: Option<&mut ScrollManager>) {
        self.unregister(manager);
    }

    fn register<T: Scrollable + 'static>(
        &mut self,
        manager: Option<&mut ScrollManager>,
        node: Option<T>,
        now_ms: u64,
    ) -> Option<RestoreOutcome> {
        let Some(manager) = manager else {
            if !self.misuse_reported {
                awarn!(
                    scroll_key = %self.scroll_key,
                    "ElementScroller only works when given a ScrollManager"
                );
                self.misuse_reported = true;
            }
            return None;
        };
        let node = node?;
        if self.scroll_key.is_empty() {
            return None;
        }
        let outcome = manager.register_target(&self.scroll_key, node, now_ms);
        self.registered = outcome != RestoreOutcome::NoTarget;
        Some(outcome)
    }

    fn unregister(&mut self, manager: Option<&mut ScrollManager>) {
        if let Some(manager) = manager {
            if !self.scroll_key.is_empty() {
                manager.unregister_target(&self.scroll_key);
            }
        }
        self.registered = false;
    }
}
