use alloc::collections::BTreeMap;
use alloc::string::String;

use crate::StorageError;

/// A session-scoped key/value string store (e.g. `window.sessionStorage`).
///
/// Both operations may fail; the manager degrades to in-memory state when they do.
pub trait SessionStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set_item(&mut self, key: &str, value: &str) -> Result<(), StorageError>;
}

/// An in-memory [`SessionStorage`].
///
/// Useful for headless hosts and tests. A quota (in bytes, counting keys and values) makes
/// writes fail the same way a full browser store does.
#[derive(Clone, Debug)]
pub struct MemoryStorage {
    items: BTreeMap<String, String>,
    quota: Option<usize>,
    available: bool,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self {
            items: BTreeMap::new(),
            quota: None,
            available: true,
        }
    }

    pub fn with_quota(mut self, quota: usize) -> Self {
        self.quota = Some(quota);
        self
    }

    /// A store whose reads and writes always fail with [`StorageError::Unavailable`].
    pub fn unavailable() -> Self {
        Self {
            available: false,
            ..Self::new()
        }
    }

    pub fn with_item(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.items.insert(key.into(), value.into());
        self
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    fn used_bytes_without(&self, key: &str) -> usize {
        self.items
            .iter()
            .filter(|(k, _)| k.as_str() != key)
            .map(|(k, v)| k.len() + v.len())
            .sum()
    }
}

impl Default for MemoryStorage {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionStorage for MemoryStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        if !self.available {
            return Err(StorageError::Unavailable);
        }
        Ok(self.items.get(key).cloned())
    }

    fn set_item(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        if !self.available {
            return Err(StorageError::Unavailable);
        }
        if let Some(quota) = self.quota {
            let needed = self.used_bytes_without(key) + key.len() + value.len();
            if needed > quota {
                return Err(StorageError::QuotaExceeded { needed, quota });
            }
        }
        self.items.insert(String::from(key), String::from(value));
        Ok(())
    }
}
