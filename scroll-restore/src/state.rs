use alloc::collections::BTreeMap;
use alloc::string::String;
use alloc::vec::Vec;

use serde::{Deserialize, Serialize};

use crate::{LocationKey, Offset, ScrollKey, StateError, WINDOW_SCROLL_KEY};

/// One stored scroll position as it appears in the session medium.
///
/// The viewport is stored as `{scrollX, scrollY}` and elements as `{scrollLeft, scrollTop}`.
/// Missing axes read back as zero.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PositionRecord {
    #[serde(rename = "scrollX", skip_serializing_if = "Option::is_none")]
    pub scroll_x: Option<f64>,
    #[serde(rename = "scrollY", skip_serializing_if = "Option::is_none")]
    pub scroll_y: Option<f64>,
    #[serde(rename = "scrollLeft", skip_serializing_if = "Option::is_none")]
    pub scroll_left: Option<f64>,
    #[serde(rename = "scrollTop", skip_serializing_if = "Option::is_none")]
    pub scroll_top: Option<f64>,
}

impl PositionRecord {
    pub fn new(scroll_key: &str, offset: Offset) -> Self {
        if scroll_key == WINDOW_SCROLL_KEY {
            Self {
                scroll_x: Some(offset.x),
                scroll_y: Some(offset.y),
                ..Self::default()
            }
        } else {
            Self {
                scroll_left: Some(offset.x),
                scroll_top: Some(offset.y),
                ..Self::default()
            }
        }
    }

    pub fn offset(&self, scroll_key: &str) -> Offset {
        let (x, y) = if scroll_key == WINDOW_SCROLL_KEY {
            (self.scroll_x, self.scroll_y)
        } else {
            (self.scroll_left, self.scroll_top)
        };
        Offset::new(x.unwrap_or(0.0), y.unwrap_or(0.0))
    }
}

/// Stored positions per location: location key → (scroll key → record).
pub type PositionMap = BTreeMap<LocationKey, BTreeMap<ScrollKey, PositionRecord>>;

/// The persisted session state.
///
/// Layout: `{ positions: {...}, locations: [...], locationKey: "..." }`. Every field is
/// optional on input and unknown fields are ignored.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SessionState {
    pub positions: PositionMap,
    pub locations: Vec<LocationKey>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location_key: Option<LocationKey>,
}

impl SessionState {
    pub fn decode(raw: &str) -> Result<Self, StateError> {
        serde_json::from_str(raw).map_err(StateError::Decode)
    }

    pub fn encode(&self) -> Result<String, StateError> {
        serde_json::to_string(self).map_err(StateError::Encode)
    }
}

/// Fallback policy for unreadable persisted state: decode `raw`, or start empty.
///
/// The decode error, if any, is handed back so the caller can report it.
pub fn on_corrupt_state(raw: &str) -> (SessionState, Option<StateError>) {
    match SessionState::decode(raw) {
        Ok(state) => (state, None),
        Err(err) => (SessionState::default(), Some(err)),
    }
}
