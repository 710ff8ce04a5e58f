use alloc::string::String;

/// Identifies one entry of the navigation history stack.
pub type LocationKey = String;

/// Identifies one scrollable target (the viewport or a registered element).
pub type ScrollKey = String;

/// Location key used for the history entry that was present at load time.
pub const INITIAL_LOCATION_KEY: &str = "initial";

/// Scroll key reserved for the viewport.
pub const WINDOW_SCROLL_KEY: &str = "window";

/// A scroll position.
///
/// For the viewport this is the absolute page offset (`scrollX`/`scrollY`); for elements it is
/// `scrollLeft`/`scrollTop`.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Offset {
    pub x: f64,
    pub y: f64,
}

impl Offset {
    pub const ZERO: Self = Self { x: 0.0, y: 0.0 };

    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// A width/height pair, used for both scroll sizes and client sizes.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Extent {
    pub width: f64,
    pub height: f64,
}

impl Extent {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

/// How a history entry was reached.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HistoryAction {
    Push,
    Replace,
    /// Back/forward traversal. Never discards entries.
    Pop,
}

/// The subset of a history location the engine cares about.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Location {
    pub key: Option<String>,
    /// Fragment including the leading `#`, e.g. `"#section"`.
    pub hash: Option<String>,
}

impl Location {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }

    pub fn with_hash(mut self, hash: impl Into<String>) -> Self {
        self.hash = Some(hash.into());
        self
    }

    /// Key under which positions for this location are stored.
    pub fn location_key(&self) -> LocationKey {
        self.key
            .clone()
            .unwrap_or_else(|| String::from(INITIAL_LOCATION_KEY))
    }

    /// The element id named by the fragment, if the fragment is longer than a bare `#`.
    pub fn fragment_id(&self) -> Option<&str> {
        self.hash.as_deref().and_then(fragment_id)
    }
}

/// Strips the leading `#` from a fragment. Returns `None` for empty or bare fragments.
pub fn fragment_id(hash: &str) -> Option<&str> {
    if hash.len() > 1 {
        hash.get(1..)
    } else {
        None
    }
}

/// One notification from the history source.
///
/// `length` is the history length observed when the notification was emitted.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HistoryEvent {
    pub location: Location,
    pub action: HistoryAction,
    pub length: usize,
}

impl HistoryEvent {
    pub fn new(location: Location, action: HistoryAction, length: usize) -> Self {
        Self {
            location,
            action,
            length,
        }
    }
}

/// Native scroll restoration mode of the platform history.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ScrollRestoration {
    Auto,
    Manual,
}
