//! The section store interface. Concrete adapters live in `pagekit-io`.

use std::sync::Arc;

use serde_json::Value;

use crate::error::{Error, Result};
use crate::record::PersistedSectionRecord;

/// Key-value persistence of page documents, written one section at a time.
///
/// Each section is read and written independently; there is no atomicity
/// across sections and the last write of a section wins. Implementations
/// only fail for IO reasons, never because of the shape of stored data.
pub trait SectionStore: Send + Sync {
    /// The full page document, or `None` when nothing was ever stored.
    fn get(&self, page_key: &str) -> Result<Option<Value>>;

    /// Replace one section's record wholesale. Other sections are untouched.
    fn set(&self, page_key: &str, section_key: &str, record: &PersistedSectionRecord)
        -> Result<()>;

    /// Opaque version tag of the page document (`None` if absent).
    fn etag(&self, page_key: &str) -> Result<Option<String>>;

    /// The page document together with the etag of exactly that document.
    ///
    /// The default implementation reads twice and can pair a document with
    /// the etag of a later write; adapters override it with a single read.
    fn get_with_etag(&self, page_key: &str) -> Result<(Option<Value>, Option<String>)> {
        let doc = self.get(page_key)?;
        let etag = self.etag(page_key)?;
        Ok((doc, etag))
    }

    /// `set` guarded by an etag comparison. Returns the etag of the document
    /// as written.
    ///
    /// The default implementation is check-then-write and therefore racy;
    /// adapters that can do better override it.
    fn set_if_match(
        &self,
        page_key: &str,
        section_key: &str,
        record: &PersistedSectionRecord,
        expected: Option<&str>,
    ) -> Result<String> {
        let found = self.etag(page_key)?;
        if found.as_deref() != expected {
            return Err(Error::Conflict {
                page: page_key.to_string(),
                expected: expected.map(str::to_string),
                found,
            });
        }
        self.set(page_key, section_key, record)?;
        self.etag(page_key)?
            .ok_or_else(|| Error::Store(format!("page '{page_key}' vanished after write")))
    }
}

impl<T: SectionStore + ?Sized> SectionStore for Box<T> {
    fn get(&self, page_key: &str) -> Result<Option<Value>> {
        (**self).get(page_key)
    }

    fn set(&self, page_key: &str, section_key: &str, record: &PersistedSectionRecord) -> Result<()> {
        (**self).set(page_key, section_key, record)
    }

    fn etag(&self, page_key: &str) -> Result<Option<String>> {
        (**self).etag(page_key)
    }

    fn get_with_etag(&self, page_key: &str) -> Result<(Option<Value>, Option<String>)> {
        (**self).get_with_etag(page_key)
    }

    fn set_if_match(
        &self,
        page_key: &str,
        section_key: &str,
        record: &PersistedSectionRecord,
        expected: Option<&str>,
    ) -> Result<String> {
        (**self).set_if_match(page_key, section_key, record, expected)
    }
}

impl<T: SectionStore + ?Sized> SectionStore for Arc<T> {
    fn get(&self, page_key: &str) -> Result<Option<Value>> {
        (**self).get(page_key)
    }

    fn set(&self, page_key: &str, section_key: &str, record: &PersistedSectionRecord) -> Result<()> {
        (**self).set(page_key, section_key, record)
    }

    fn etag(&self, page_key: &str) -> Result<Option<String>> {
        (**self).etag(page_key)
    }

    fn get_with_etag(&self, page_key: &str) -> Result<(Option<Value>, Option<String>)> {
        (**self).get_with_etag(page_key)
    }

    fn set_if_match(
        &self,
        page_key: &str,
        section_key: &str,
        record: &PersistedSectionRecord,
        expected: Option<&str>,
    ) -> Result<String> {
        (**self).set_if_match(page_key, section_key, record, expected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hash::etag_for_json;
    use crate::record::put_section;
    use serde_json::Map;
    use std::sync::Mutex;

    /// Only the required methods; everything else is the trait default.
    #[derive(Default)]
    struct OnePage(Mutex<Option<Value>>);

    impl SectionStore for OnePage {
        fn get(&self, _page_key: &str) -> Result<Option<Value>> {
            Ok(self.0.lock().unwrap().clone())
        }

        fn set(&self, _page_key: &str, section_key: &str, record: &PersistedSectionRecord) -> Result<()> {
            let mut doc = self.0.lock().unwrap();
            put_section(doc.get_or_insert(Value::Null), section_key, record);
            Ok(())
        }

        fn etag(&self, _page_key: &str) -> Result<Option<String>> {
            self.0.lock().unwrap().as_ref().map(etag_for_json).transpose()
        }
    }

    #[test]
    fn default_conditional_write_returns_new_etag() {
        let store = OnePage::default();
        assert_eq!(store.get_with_etag("home").unwrap(), (None, None));

        let rec = PersistedSectionRecord::new(Map::new());
        let written = store.set_if_match("home", "hero", &rec, None).unwrap();
        let (doc, etag) = store.get_with_etag("home").unwrap();
        assert!(doc.is_some());
        assert_eq!(etag.as_deref(), Some(written.as_str()));

        let err = store.set_if_match("home", "hero", &rec, None).unwrap_err();
        assert!(matches!(err, Error::Conflict { found: Some(_), .. }));
        store.set_if_match("home", "hero", &rec, Some(&written)).unwrap();
    }
}
