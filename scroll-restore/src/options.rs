use alloc::string::String;
use alloc::sync::Arc;

use crate::Diagnostic;

/// A callback fired for every non-fatal [`Diagnostic`] the manager observes.
pub type DiagnosticCallback = Arc<dyn Fn(&Diagnostic) + Send + Sync>;

pub const DEFAULT_SESSION_KEY: &str = "ScrollManager";
pub const DEFAULT_TIMEOUT_MS: u64 = 3000;
pub const DEFAULT_MAX_POLL_INTERVAL_MS: u64 = 500;

/// Configuration for [`crate::ScrollManager`].
pub struct ScrollManagerOptions {
    /// Session storage key holding the persisted state.
    pub session_key: String,
    /// How long a deferred restore (or fragment scroll) waits for the DOM to catch up.
    ///
    /// `0` disables deferral: a restore that cannot be applied immediately is reported right
    /// away.
    pub timeout_ms: u64,
    /// Allowed pixel slack when deciding whether a target already sits at the requested offset.
    pub tolerance: f64,
    /// Upper bound for the polling interval used when native mutation notifications are not
    /// available.
    pub max_poll_interval_ms: u64,
    pub on_diagnostic: Option<DiagnosticCallback>,
}

impl Default for ScrollManagerOptions {
    fn default() -> Self {
        Self {
            session_key: String::from(DEFAULT_SESSION_KEY),
            timeout_ms: DEFAULT_TIMEOUT_MS,
            tolerance: 0.0,
            max_poll_interval_ms: DEFAULT_MAX_POLL_INTERVAL_MS,
            on_diagnostic: None,
        }
    }
}

impl Clone for ScrollManagerOptions {
    fn clone(&self) -> Self {
        Self {
            session_key: self.session_key.clone(),
            timeout_ms: self.timeout_ms,
            tolerance: self.tolerance,
            max_poll_interval_ms: self.max_poll_interval_ms,
            on_diagnostic: self.on_diagnostic.clone(),
        }
    }
}

impl ScrollManagerOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_session_key(mut self, session_key: impl Into<String>) -> Self {
        self.session_key = session_key.into();
        self
    }

    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    /// Sets the tolerance in pixels. Negative values are treated as zero.
    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = if tolerance > 0.0 { tolerance } else { 0.0 };
        self
    }

    pub fn with_max_poll_interval_ms(mut self, interval_ms: u64) -> Self {
        self.max_poll_interval_ms = interval_ms;
        self
    }

    pub fn with_on_diagnostic(
        mut self,
        on_diagnostic: Option<impl Fn(&Diagnostic) + Send + Sync + 'static>,
    ) -> Self {
        self.on_diagnostic = on_diagnostic.map(|f| Arc::new(f) as _);
        self
    }

    pub(crate) fn report(&self, diagnostic: Diagnostic) {
        swarn!(%diagnostic, "scroll manager diagnostic");
        if let Some(cb) = &self.on_diagnostic {
            cb(&diagnostic);
        }
    }
}

impl core::fmt::Debug for ScrollManagerOptions {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ScrollManagerOptions")
            .field("session_key", &self.session_key)
            .field("timeout_ms", &self.timeout_ms)
            .field("tolerance", &self.tolerance)
            .field("max_poll_interval_ms", &self.max_poll_interval_ms)
            .finish_non_exhaustive()
    }
}
