use scroll_restore::{RestoreOutcome, ScrollManager};

/// View-layer binding for the viewport.
///
/// Call [`WindowScroller::mount`] once when the view first renders and
/// [`WindowScroller::update`] after every re-render (typically after navigation).
#[derive(Clone, Debug, Default)]
pub struct WindowScroller {
    misuse_reported: bool,
}

impl WindowScroller {
    pub fn new() -> Self {
        Self::default()
    }

    /// First render: restores the window, or scrolls to the fragment target when `hash` names
    /// one. Returns `None` without a manager, or when a fragment scroll was armed.
    pub fn mount(
        &mut self,
        manager: Option<&mut ScrollManager>,
        hash: Option<&str>,
        now_ms: u64,
    ) -> Option<RestoreOutcome> {
        let Some(manager) = manager else {
            self.report_missing_manager();
            return None;
        };
        manager.restore_initial(hash, now_ms)
    }

    /// Re-render: restores the window for the active location. While that location was
    /// reached through a fragment the outcome is [`RestoreOutcome::Superseded`] and the window
    /// is not moved.
    pub fn update(
        &mut self,
        manager: Option<&mut ScrollManager>,
        now_ms: u64,
    ) -> Option<RestoreOutcome> {
        manager.map(|m| m.restore_window(now_ms))
    }

    /// Whether this scroller was used without a manager.
    pub fn misuse_reported(&self) -> bool {
        self.misuse_reported
    }

    fn report_missing_manager(&mut self) {
        if self.misuse_reported {
            return;
        }
        awarn!("WindowScroller only works when given a ScrollManager");
        self.misuse_reported = true;
    }
}
