//! Process-local page documents keyed by page key, behind `memory://`.
//!
//! Nothing survives the process; tests and fixtures use it as the reference
//! `SectionStore`.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use serde_json::Value;

use pagekit_core::error::{Error, Result};
use pagekit_core::hash::etag_for_json;
use pagekit_core::record::{put_section, PersistedSectionRecord};
use pagekit_core::SectionStore;

/// Thread-safe in-memory store. Clones share the same pages.
#[derive(Clone, Default)]
pub struct MemorySectionStore {
    pages: Arc<Mutex<HashMap<String, Value>>>,
}

impl MemorySectionStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn pages(&self) -> Result<MutexGuard<'_, HashMap<String, Value>>> {
        self.pages
            .lock()
            .map_err(|_| Error::Store("memory store lock poisoned".into()))
    }

    /// Pre-populate a whole page document (used by tests and fixtures).
    pub fn insert_page(&self, page_key: impl Into<String>, doc: Value) -> Result<()> {
        self.pages()?.insert(page_key.into(), doc);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.pages().map(|p| p.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) -> Result<()> {
        self.pages()?.clear();
        Ok(())
    }
}

fn etag_of(doc: Option<&Value>) -> Result<Option<String>> {
    doc.map(etag_for_json).transpose()
}

impl SectionStore for MemorySectionStore {
    fn get(&self, page_key: &str) -> Result<Option<Value>> {
        Ok(self.pages()?.get(page_key).cloned())
    }

    fn set(&self, page_key: &str, section_key: &str, record: &PersistedSectionRecord) -> Result<()> {
        let mut pages = self.pages()?;
        let doc = pages.entry(page_key.to_string()).or_insert(Value::Null);
        put_section(doc, section_key, record);
        Ok(())
    }

    fn etag(&self, page_key: &str) -> Result<Option<String>> {
        etag_of(self.pages()?.get(page_key))
    }

    fn get_with_etag(&self, page_key: &str) -> Result<(Option<Value>, Option<String>)> {
        let pages = self.pages()?;
        let doc = pages.get(page_key);
        Ok((doc.cloned(), etag_of(doc)?))
    }

    fn set_if_match(
        &self,
        page_key: &str,
        section_key: &str,
        record: &PersistedSectionRecord,
        expected: Option<&str>,
    ) -> Result<String> {
        // Check, write and fingerprint under one lock.
        let mut pages = self.pages()?;
        let found = etag_of(pages.get(page_key))?;
        if found.as_deref() != expected {
            return Err(Error::Conflict {
                page: page_key.to_string(),
                expected: expected.map(str::to_string),
                found,
            });
        }
        let doc = pages.entry(page_key.to_string()).or_insert(Value::Null);
        put_section(doc, section_key, record);
        etag_for_json(doc)
    }
}
