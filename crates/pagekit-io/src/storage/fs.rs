use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use serde_json::Value;

use pagekit_core::error::{Error, Result};
use pagekit_core::hash::etag_for_bytes;
use pagekit_core::record::{put_section, PersistedSectionRecord};
use pagekit_core::SectionStore;

/// Page documents stored as `<root>/<page_key>.json`.
///
/// Writes are read-modify-write of the whole page document, serialized
/// within this process and published with a rename. Other processes writing
/// the same page race with last-writer-wins semantics.
#[derive(Debug)]
pub struct FsSectionStore {
    root: PathBuf,
    pretty: bool,
    write_lock: Mutex<()>,
}

impl FsSectionStore {
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
            pretty: true,
            write_lock: Mutex::new(()),
        }
    }

    pub fn with_pretty(mut self, pretty: bool) -> Self {
        self.pretty = pretty;
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, page_key: &str) -> Result<PathBuf> {
        let valid = !page_key.is_empty()
            && page_key != "."
            && page_key != ".."
            && !page_key.contains(['/', '\\']);
        if !valid {
            return Err(Error::Store(format!("invalid page key '{page_key}'")));
        }
        Ok(self.root.join(format!("{page_key}.json")))
    }

    fn lock(&self) -> Result<MutexGuard<'_, ()>> {
        self.write_lock
            .lock()
            .map_err(|_| Error::Store("fs store lock poisoned".into()))
    }

    fn read_bytes(&self, path: &Path) -> Result<Option<Vec<u8>>> {
        match fs::read(path) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(Error::Store(format!("read {}: {e}", path.display()))),
        }
    }

    fn parse_doc(path: &Path, bytes: &[u8]) -> Result<Value> {
        serde_json::from_slice(bytes)
            .map_err(|e| Error::Store(format!("parse {}: {e}", path.display())))
    }

    fn read_doc(&self, path: &Path) -> Result<Option<Value>> {
        self.read_bytes(path)?
            .map(|bytes| Self::parse_doc(path, &bytes))
            .transpose()
    }

    /// Publish `doc` at `path`; returns the etag of the bytes written.
    fn write_doc(&self, path: &Path, doc: &Value) -> Result<String> {
        fs::create_dir_all(&self.root).map_err(|e| Error::Store(format!("mkdir: {e}")))?;
        let bytes = if self.pretty {
            serde_json::to_vec_pretty(doc)?
        } else {
            serde_json::to_vec(doc)?
        };
        let tmp = path.with_extension("json.tmp");
        let mut f = File::create(&tmp).map_err(|e| Error::Store(format!("create: {e}")))?;
        f.write_all(&bytes)
            .map_err(|e| Error::Store(format!("write: {e}")))?;
        f.flush()
            .map_err(|e| Error::Store(format!("flush: {e}")))?;
        fs::rename(&tmp, path).map_err(|e| Error::Store(format!("rename: {e}")))?;
        Ok(etag_for_bytes(&bytes))
    }

    fn etag_at(&self, path: &Path) -> Result<Option<String>> {
        Ok(self.read_bytes(path)?.map(|b| etag_for_bytes(&b)))
    }

    fn write_section(
        &self,
        path: &Path,
        section_key: &str,
        record: &PersistedSectionRecord,
    ) -> Result<String> {
        let mut doc = self.read_doc(path)?.unwrap_or(Value::Null);
        put_section(&mut doc, section_key, record);
        let etag = self.write_doc(path, &doc)?;
        #[cfg(feature = "tracing")]
        tracing::debug!(path = %path.display(), section = section_key, "section written");
        Ok(etag)
    }
}

impl SectionStore for FsSectionStore {
    fn get(&self, page_key: &str) -> Result<Option<Value>> {
        let path = self.path_for(page_key)?;
        self.read_doc(&path)
    }

    fn set(&self, page_key: &str, section_key: &str, record: &PersistedSectionRecord) -> Result<()> {
        let path = self.path_for(page_key)?;
        let _guard = self.lock()?;
        self.write_section(&path, section_key, record)?;
        Ok(())
    }

    fn etag(&self, page_key: &str) -> Result<Option<String>> {
        let path = self.path_for(page_key)?;
        self.etag_at(&path)
    }

    fn get_with_etag(&self, page_key: &str) -> Result<(Option<Value>, Option<String>)> {
        let path = self.path_for(page_key)?;
        // One read; writers publish by rename, so the bytes are one version.
        match self.read_bytes(&path)? {
            Some(bytes) => Ok((Some(Self::parse_doc(&path, &bytes)?), Some(etag_for_bytes(&bytes)))),
            None => Ok((None, None)),
        }
    }

    fn set_if_match(
        &self,
        page_key: &str,
        section_key: &str,
        record: &PersistedSectionRecord,
        expected: Option<&str>,
    ) -> Result<String> {
        let path = self.path_for(page_key)?;
        let _guard = self.lock()?;
        let found = self.etag_at(&path)?;
        if found.as_deref() != expected {
            return Err(Error::Conflict {
                page: page_key.to_string(),
                expected: expected.map(str::to_string),
                found,
            });
        }
        self.write_section(&path, section_key, record)
    }
}
