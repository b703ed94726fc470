//! Registry of saves currently in flight.
//!
//! Holding a `SaveGuard` marks one page section as being written; dropping it
//! (on success, error or panic) releases the mark. Sessions sharing a registry
//! cannot overlap saves of the same section.

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

#[derive(Clone, Default)]
pub struct InFlightSaves {
    inner: Arc<Mutex<HashSet<(String, String)>>>,
}

impl InFlightSaves {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark `page/section` as saving. `None` when it already is.
    pub fn try_begin(&self, page_key: &str, section_key: &str) -> Option<SaveGuard> {
        let key = (page_key.to_string(), section_key.to_string());
        let mut set = self.inner.lock().unwrap_or_else(|p| p.into_inner());
        if !set.insert(key.clone()) {
            return None;
        }
        Some(SaveGuard {
            inner: Arc::clone(&self.inner),
            key,
        })
    }

    pub fn is_saving(&self, page_key: &str, section_key: &str) -> bool {
        let set = self.inner.lock().unwrap_or_else(|p| p.into_inner());
        set.contains(&(page_key.to_string(), section_key.to_string()))
    }
}

/// RAII mark for one in-flight save.
pub struct SaveGuard {
    inner: Arc<Mutex<HashSet<(String, String)>>>,
    key: (String, String),
}

impl Drop for SaveGuard {
    fn drop(&mut self) {
        let mut set = self.inner.lock().unwrap_or_else(|p| p.into_inner());
        set.remove(&self.key);
    }
}
