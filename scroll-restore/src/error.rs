use alloc::string::String;

use crate::{Extent, LocationKey, Offset, ScrollKey};

/// Failure reported by a [`crate::SessionStorage`] implementation.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum StorageError {
    #[error("session storage is unavailable")]
    Unavailable,
    #[error("session storage quota exceeded ({needed} bytes needed, quota is {quota})")]
    QuotaExceeded { needed: usize, quota: usize },
    #[error("session storage error: {0}")]
    Other(String),
}

/// Failure while encoding or decoding persisted session state.
#[derive(Debug, thiserror::Error)]
pub enum StateError {
    #[error("failed to decode session state: {0}")]
    Decode(#[source] serde_json::Error),
    #[error("failed to encode session state: {0}")]
    Encode(#[source] serde_json::Error),
}

/// A non-fatal condition observed by the manager.
///
/// Diagnostics are delivered to `ScrollManagerOptions::on_diagnostic` and logged. Cancelled
/// retries are never reported.
#[derive(Clone, Debug, PartialEq)]
pub enum Diagnostic {
    /// A deferred restore did not succeed before its timeout.
    RestoreTimedOut {
        location: LocationKey,
        scroll_key: ScrollKey,
        requested: Offset,
        /// Scroll range the target could accept (`scroll - client + tolerance`).
        available: Extent,
        scroll_size: Extent,
    },
    /// A restore failed immediately and retrying is disabled (`timeout_ms == 0`).
    RestoreUnavailable {
        location: LocationKey,
        scroll_key: ScrollKey,
        requested: Offset,
        /// Scroll range the target could accept (`scroll - client + tolerance`).
        available: Extent,
        scroll_size: Extent,
    },
    /// The element named by a location fragment never appeared.
    HashTargetTimedOut { element_id: String },
    /// Reading persisted state failed; the manager started empty.
    StorageReadFailed(StorageError),
    /// Writing persisted state failed; state stays in memory only.
    StorageWriteFailed(StorageError),
    /// Persisted state could not be decoded; the manager started empty.
    CorruptState(String),
    /// Persisted state could not be encoded.
    EncodeFailed(String),
}

impl core::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::RestoreTimedOut {
                scroll_key,
                requested,
                available,
                scroll_size,
                ..
            }
            | Self::RestoreUnavailable {
                scroll_key,
                requested,
                available,
                scroll_size,
                ..
            } => write!(
                f,
                "could not scroll {scroll_key} to ({}, {}); available range is ({}, {}) \
                 of scroll size ({}, {})",
                requested.x,
                requested.y,
                available.width,
                available.height,
                scroll_size.width,
                scroll_size.height
            ),
            Self::HashTargetTimedOut { element_id } => {
                write!(f, "timeout scrolling hash element {element_id} into view")
            }
            Self::StorageReadFailed(err) => write!(f, "error reading session storage: {err}"),
            Self::StorageWriteFailed(err) => write!(f, "error writing session storage: {err}"),
            Self::CorruptState(msg) => write!(f, "discarding corrupt session state: {msg}"),
            Self::EncodeFailed(msg) => write!(f, "could not encode session state: {msg}"),
        }
    }
}
