//! `window.localStorage` as a legacy import source

use flashdeck_core::legacy::LegacyStorage;
use flashdeck_core::storage::{StoreError, StoreResult};
use web_sys::Storage;

use crate::error::{IndexedDbError, Result};

/// The browser's `localStorage`, read by the one-time legacy import.
pub struct LocalStorage {
    storage: Storage,
}

impl LocalStorage {
    /// `localStorage` of the current window.
    ///
    /// Fails with `NotAvailable` outside a window context (workers) or when
    /// storage access is blocked.
    pub fn from_window() -> Result<Self> {
        let window = web_sys::window()
            .ok_or_else(|| IndexedDbError::NotAvailable("no window".into()))?;
        let storage = window
            .local_storage()
            .map_err(|e| IndexedDbError::NotAvailable(format!("localStorage: {:?}", e)))?
            .ok_or_else(|| IndexedDbError::NotAvailable("localStorage is null".into()))?;
        Ok(Self { storage })
    }
}

impl LegacyStorage for LocalStorage {
    fn get_item(&self, key: &str) -> StoreResult<Option<String>> {
        self.storage
            .get_item(key)
            .map_err(|e| StoreError::Backend(format!("localStorage.getItem({}): {:?}", key, e)))
    }
}
