//! EditorSession: store → decoder → owned page state → encoder → store.

use std::collections::BTreeSet;

use serde_json::{Map, Value};
use thiserror::Error;

use pagekit_codec::PageCodec;
use pagekit_core::field::{FieldDescriptor, FieldValue};
use pagekit_core::section::{PageState, Section};
use pagekit_core::SectionStore;
use pagekit_normalize::{normalize_items, FALLBACK_FIELD};

use crate::guard::InFlightSaves;
use crate::metrics::emit_event;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Store(#[from] pagekit_core::error::Error),
    #[error("unknown section '{0}'")]
    UnknownSection(String),
    #[error("unknown field '{section}.{field}'")]
    UnknownField { section: String, field: String },
    #[error("field '{section}.{field}' is a {kind} field")]
    WrongFieldKind {
        section: String,
        field: String,
        kind: &'static str,
    },
    #[error("'{sub_field}' is not a sub-field of '{section}.{field}'")]
    UnknownSubField {
        section: String,
        field: String,
        sub_field: String,
    },
    #[error("item {index} out of range for '{section}.{field}' ({len} items)")]
    ItemOutOfRange {
        section: String,
        field: String,
        index: usize,
        len: usize,
    },
    #[error("item {index} of '{section}.{field}' is not a record")]
    NotARecord {
        section: String,
        field: String,
        index: usize,
    },
    #[error("a save of section '{0}' is already in flight")]
    SaveInFlight(String),
}

pub type Result<T> = std::result::Result<T, SessionError>;

/// How saves treat concurrent writers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SaveMode {
    /// Overwrite unconditionally.
    #[default]
    LastWriterWins,
    /// Refuse the write when the page changed since this session last read
    /// or wrote it.
    IfUnchanged,
}

pub struct EditorSession<S: SectionStore> {
    store: S,
    codec: PageCodec,
    state: PageState,
    etag: Option<String>,
    mode: SaveMode,
    in_flight: InFlightSaves,
    dirty: BTreeSet<String>,
}

impl<S: SectionStore> EditorSession<S> {
    /// Load the page from `store`. A page that was never saved opens with
    /// every section at its template defaults.
    pub fn open(store: S, codec: PageCodec) -> Result<Self> {
        let mut session = Self {
            state: codec.template().default_state(),
            store,
            codec,
            etag: None,
            mode: SaveMode::default(),
            in_flight: InFlightSaves::new(),
            dirty: BTreeSet::new(),
        };
        session.reload()?;
        Ok(session)
    }

    pub fn with_save_mode(mut self, mode: SaveMode) -> Self {
        self.mode = mode;
        self
    }

    /// Share an in-flight registry with other sessions of the same UI.
    pub fn with_in_flight(mut self, in_flight: InFlightSaves) -> Self {
        self.in_flight = in_flight;
        self
    }

    /// Re-read the page, discarding unsaved edits.
    pub fn reload(&mut self) -> Result<()> {
        let page = self.codec.page_key().to_string();
        let (raw, etag) = self.store.get_with_etag(&page)?;
        self.etag = etag;
        self.state = self.codec.decode(raw.as_ref());
        self.dirty.clear();
        emit_event(
            "load",
            &[
                ("page", page),
                ("stored", raw.is_some().to_string()),
            ],
        );
        Ok(())
    }

    pub fn state(&self) -> &PageState {
        &self.state
    }

    pub fn into_state(self) -> PageState {
        self.state
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn section(&self, key: &str) -> Option<&Section> {
        self.state.section(key)
    }

    pub fn field(&self, section: &str, field: &str) -> Option<&FieldDescriptor> {
        self.state.section(section)?.field(field)
    }

    pub fn is_dirty(&self, section: &str) -> bool {
        self.dirty.contains(section)
    }

    pub fn dirty_sections(&self) -> impl Iterator<Item = &str> {
        self.dirty.iter().map(String::as_str)
    }

    fn field_mut(&mut self, section: &str, field: &str) -> Result<&mut FieldDescriptor> {
        let s = self
            .state
            .section_mut(section)
            .ok_or_else(|| SessionError::UnknownSection(section.to_string()))?;
        s.field_mut(field).ok_or_else(|| SessionError::UnknownField {
            section: section.to_string(),
            field: field.to_string(),
        })
    }

    fn touch(&mut self, section: &str) {
        self.dirty.insert(section.to_string());
    }

    fn list_field_mut(&mut self, section: &str, field: &str) -> Result<&mut FieldDescriptor> {
        let f = self.field_mut(section, field)?;
        if !f.is_list() {
            return Err(SessionError::WrongFieldKind {
                section: section.to_string(),
                field: field.to_string(),
                kind: "scalar",
            });
        }
        Ok(f)
    }

    fn items_mut<'a>(f: &'a mut FieldDescriptor) -> &'a mut Vec<Value> {
        if !matches!(f.value, FieldValue::List(_)) {
            f.value = FieldValue::List(Vec::new());
        }
        match &mut f.value {
            FieldValue::List(items) => items,
            FieldValue::Text(_) => unreachable!("value was just made a list"),
        }
    }

    pub fn set_text(&mut self, section: &str, field: &str, value: impl Into<String>) -> Result<()> {
        let f = self.field_mut(section, field)?;
        if f.is_list() {
            return Err(SessionError::WrongFieldKind {
                section: section.to_string(),
                field: field.to_string(),
                kind: "list",
            });
        }
        f.value = FieldValue::Text(value.into());
        self.touch(section);
        Ok(())
    }

    /// Replace all items; each is normalized against the field's item schema.
    pub fn set_items(&mut self, section: &str, field: &str, items: Vec<Value>) -> Result<()> {
        let f = self.list_field_mut(section, field)?;
        let normalized = normalize_items(&items, f.item_schema());
        f.value = FieldValue::List(normalized);
        self.touch(section);
        Ok(())
    }

    /// Append an item (a record or bare string), normalized like stored items.
    pub fn push_item(&mut self, section: &str, field: &str, item: Value) -> Result<()> {
        let f = self.list_field_mut(section, field)?;
        let normalized = normalize_items(std::slice::from_ref(&item), f.item_schema());
        Self::items_mut(f).extend(normalized);
        self.touch(section);
        Ok(())
    }

    /// Append an item with every schema sub-field empty.
    pub fn push_blank_item(&mut self, section: &str, field: &str) -> Result<()> {
        self.push_item(section, field, Value::Object(Map::new()))
    }

    pub fn set_item_field(
        &mut self,
        section: &str,
        field: &str,
        index: usize,
        sub_field: &str,
        value: impl Into<String>,
    ) -> Result<()> {
        let f = self.list_field_mut(section, field)?;
        let known = match f.item_schema() {
            Some(schema) if !schema.is_empty() => schema.iter().any(|s| s.id == sub_field),
            _ => sub_field == FALLBACK_FIELD,
        };
        if !known {
            return Err(SessionError::UnknownSubField {
                section: section.to_string(),
                field: field.to_string(),
                sub_field: sub_field.to_string(),
            });
        }
        let items = Self::items_mut(f);
        let len = items.len();
        let item = items.get_mut(index).ok_or_else(|| SessionError::ItemOutOfRange {
            section: section.to_string(),
            field: field.to_string(),
            index,
            len,
        })?;
        let rec = item.as_object_mut().ok_or_else(|| SessionError::NotARecord {
            section: section.to_string(),
            field: field.to_string(),
            index,
        })?;
        rec.insert(sub_field.to_string(), Value::String(value.into()));
        self.touch(section);
        Ok(())
    }

    pub fn remove_item(&mut self, section: &str, field: &str, index: usize) -> Result<Value> {
        let f = self.list_field_mut(section, field)?;
        let items = Self::items_mut(f);
        if index >= items.len() {
            return Err(SessionError::ItemOutOfRange {
                section: section.to_string(),
                field: field.to_string(),
                index,
                len: items.len(),
            });
        }
        let removed = items.remove(index);
        self.touch(section);
        Ok(removed)
    }

    /// Move the item at `from` so that it ends up at index `to`.
    pub fn move_item(&mut self, section: &str, field: &str, from: usize, to: usize) -> Result<()> {
        let f = self.list_field_mut(section, field)?;
        let items = Self::items_mut(f);
        let len = items.len();
        for index in [from, to] {
            if index >= len {
                return Err(SessionError::ItemOutOfRange {
                    section: section.to_string(),
                    field: field.to_string(),
                    index,
                    len,
                });
            }
        }
        let item = items.remove(from);
        items.insert(to, item);
        self.touch(section);
        Ok(())
    }

    /// Page-level visibility. Every section is rewritten on the next save.
    pub fn set_enabled(&mut self, enabled: bool) {
        if self.state.enabled != enabled {
            self.state.enabled = enabled;
            self.dirty
                .extend(self.state.sections.iter().map(|s| s.key.clone()));
        }
    }

    /// Encode and write one section.
    pub fn save_section(&mut self, section_key: &str) -> Result<()> {
        let page = self.codec.page_key().to_string();
        let section = self
            .state
            .section(section_key)
            .ok_or_else(|| SessionError::UnknownSection(section_key.to_string()))?;
        let record = self
            .codec
            .encode_section(&section.fields, section_key)
            .ok_or_else(|| SessionError::UnknownSection(section_key.to_string()))?
            .with_enabled(self.state.enabled);

        let _guard = self
            .in_flight
            .try_begin(&page, section_key)
            .ok_or_else(|| SessionError::SaveInFlight(section_key.to_string()))?;

        // Only conditional writes advance the etag, taken from the store's reply.
        match self.mode {
            SaveMode::LastWriterWins => self.store.set(&page, section_key, &record)?,
            SaveMode::IfUnchanged => {
                let etag =
                    self.store
                        .set_if_match(&page, section_key, &record, self.etag.as_deref())?;
                self.etag = Some(etag);
            }
        }
        self.dirty.remove(section_key);

        #[cfg(feature = "tracing")]
        tracing::info!(page = %page, section = section_key, fields = record.data.len(), "section saved");
        emit_event(
            "save",
            &[("page", page), ("section", section_key.to_string())],
        );
        Ok(())
    }

    /// Save every section in template order, one after another. Stops at
    /// the first failure; sections saved before it stay saved.
    pub fn save_all(&mut self) -> Result<Vec<String>> {
        let keys: Vec<String> = self.state.section_keys().map(str::to_string).collect();
        for key in &keys {
            self.save_section(key)?;
        }
        Ok(keys)
    }

    /// Save only sections edited since load or their last save.
    pub fn save_dirty(&mut self) -> Result<Vec<String>> {
        let keys: Vec<String> = self.dirty.iter().cloned().collect();
        for key in &keys {
            self.save_section(key)?;
        }
        Ok(keys)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pagekit_codec::{PageTemplate, SectionTemplate};
    use pagekit_core::field::SubFieldDescriptor;
    use pagekit_io::MemorySectionStore;
    use serde_json::json;

    fn codec() -> PageCodec {
        let template = PageTemplate::new(
            "home",
            vec![
                SectionTemplate::new(
                    "hero",
                    "Hero",
                    vec![FieldDescriptor::text("hero-title", "Title", "Welcome").into()],
                ),
                SectionTemplate::new(
                    "services",
                    "Services",
                    vec![FieldDescriptor::list(
                        "items",
                        "Items",
                        vec![SubFieldDescriptor::text("title"), SubFieldDescriptor::text("body")],
                    )
                    .into()],
                ),
            ],
        );
        PageCodec::new(template, vec!["blob:".into()])
    }

    #[test]
    fn opens_with_defaults_when_page_missing() {
        let s = EditorSession::open(MemorySectionStore::new(), codec()).unwrap();
        assert_eq!(s.field("hero", "hero-title").unwrap().text_value(), "Welcome");
        assert_eq!(s.dirty_sections().count(), 0);
    }

    #[test]
    fn setters_mark_dirty_and_save_clears() {
        let store = MemorySectionStore::new();
        let mut s = EditorSession::open(store.clone(), codec()).unwrap();
        s.set_text("hero", "hero-title", "Hello").unwrap();
        assert!(s.is_dirty("hero"));
        assert_eq!(s.save_dirty().unwrap(), vec!["hero".to_string()]);
        assert!(!s.is_dirty("hero"));
        let doc = store.get("home").unwrap().unwrap();
        assert_eq!(doc["data"]["hero"]["data"]["hero-title"], "Hello");
        assert!(doc["data"].get("services").is_none());
    }

    #[test]
    fn list_editing() {
        let mut s = EditorSession::open(MemorySectionStore::new(), codec()).unwrap();
        s.push_item("services", "items", json!("First")).unwrap();
        s.push_blank_item("services", "items").unwrap();
        s.set_item_field("services", "items", 1, "title", "Second").unwrap();
        s.move_item("services", "items", 1, 0).unwrap();
        let items = s.field("services", "items").unwrap().items().to_vec();
        assert_eq!(
            items,
            vec![
                json!({"title": "Second", "body": ""}),
                json!({"title": "First", "body": ""})
            ]
        );
        let removed = s.remove_item("services", "items", 0).unwrap();
        assert_eq!(removed["title"], "Second");
        assert!(matches!(
            s.remove_item("services", "items", 5),
            Err(SessionError::ItemOutOfRange { len: 1, .. })
        ));
    }

    #[test]
    fn item_fields_outside_schema_are_refused() {
        let mut s = EditorSession::open(MemorySectionStore::new(), codec()).unwrap();
        s.push_item("services", "items", json!("a")).unwrap();
        s.save_dirty().unwrap();

        assert!(matches!(
            s.set_item_field("services", "items", 0, "bogus", "x"),
            Err(SessionError::UnknownSubField { .. })
        ));
        assert_eq!(
            s.field("services", "items").unwrap().items(),
            [json!({"title": "a", "body": ""})]
        );
        assert!(!s.is_dirty("services"));
        s.set_item_field("services", "items", 0, "body", "b").unwrap();
        assert!(s.is_dirty("services"));
    }

    #[test]
    fn wrong_kind_and_unknown_targets_are_errors() {
        let mut s = EditorSession::open(MemorySectionStore::new(), codec()).unwrap();
        assert!(matches!(
            s.set_text("services", "items", "x"),
            Err(SessionError::WrongFieldKind { .. })
        ));
        assert!(matches!(
            s.push_item("hero", "hero-title", json!("x")),
            Err(SessionError::WrongFieldKind { .. })
        ));
        assert!(matches!(
            s.set_text("nope", "x", "y"),
            Err(SessionError::UnknownSection(_))
        ));
        assert!(matches!(
            s.set_text("hero", "nope", "y"),
            Err(SessionError::UnknownField { .. })
        ));
        assert_eq!(s.dirty_sections().count(), 0);
    }

    #[test]
    fn save_refused_while_same_section_in_flight() {
        let saves = InFlightSaves::new();
        let mut s = EditorSession::open(MemorySectionStore::new(), codec())
            .unwrap()
            .with_in_flight(saves.clone());
        let _held = saves.try_begin("home", "hero").unwrap();
        assert!(matches!(
            s.save_section("hero"),
            Err(SessionError::SaveInFlight(_))
        ));
        s.save_section("services").unwrap();
    }

    #[test]
    fn if_unchanged_mode_detects_other_writer() {
        let store = MemorySectionStore::new();
        let mut a = EditorSession::open(store.clone(), codec())
            .unwrap()
            .with_save_mode(SaveMode::IfUnchanged);
        let mut b = EditorSession::open(store.clone(), codec()).unwrap();

        b.set_text("hero", "hero-title", "from b").unwrap();
        b.save_section("hero").unwrap();

        a.set_text("hero", "hero-title", "from a").unwrap();
        assert!(matches!(
            a.save_section("hero"),
            Err(SessionError::Store(pagekit_core::error::Error::Conflict { .. }))
        ));
        a.reload().unwrap();
        assert_eq!(a.field("hero", "hero-title").unwrap().text_value(), "from b");
        a.set_text("hero", "hero-title", "from a").unwrap();
        a.save_section("hero").unwrap();
        // Own writes refresh the etag, so a second save still succeeds.
        a.save_section("hero").unwrap();
    }

    #[test]
    fn disabling_page_marks_every_section() {
        let store = MemorySectionStore::new();
        let mut s = EditorSession::open(store.clone(), codec()).unwrap();
        s.set_enabled(false);
        assert_eq!(s.save_dirty().unwrap().len(), 2);
        let reopened = EditorSession::open(store, codec()).unwrap();
        assert!(!reopened.state().enabled);
    }
}
