use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use pagekit_codec::{KeyStyle, PageCodec, PageTemplate, SectionTemplate, TemplateField};
use pagekit_core::config::EditorConfig;
use pagekit_core::field::{FieldDescriptor, FieldType, SubFieldDescriptor};
use pagekit_core::error::{Error, Result as StoreResult};
use pagekit_core::record::PersistedSectionRecord;
use pagekit_core::SectionStore;
use pagekit_io::{FsSectionStore, MemorySectionStore};
use pagekit_session::{EditorSession, SaveMode, SessionError};
use serde_json::{json, Map, Value};

fn template() -> PageTemplate {
    PageTemplate::new(
        "home",
        vec![
            SectionTemplate::new(
                "hero",
                "Hero",
                vec![
                    FieldDescriptor::new("hero-image", "Image", FieldType::Image).into(),
                    FieldDescriptor::text("hero-title", "Title", "Welcome").into(),
                ],
            ),
            SectionTemplate::new(
                "services",
                "Services",
                vec![TemplateField::new(FieldDescriptor::list(
                    "service-list",
                    "Services",
                    vec![
                        SubFieldDescriptor::text("title"),
                        SubFieldDescriptor::new("points", "Points", FieldType::List),
                    ],
                ))
                .with_storage_key("services")],
            ),
        ],
    )
    .with_key_style(KeyStyle::Camel)
}

fn codec() -> PageCodec {
    PageCodec::from_config(template(), &EditorConfig::default())
}

#[test]
fn test_edit_save_reload_over_memory_store() {
    let store = Arc::new(MemorySectionStore::new());
    let mut s = EditorSession::open(Arc::clone(&store), codec()).expect("open");

    s.set_text("hero", "hero-title", "Hello").unwrap();
    s.set_text("hero", "hero-image", "blob:http://localhost/tmp").unwrap();
    s.push_item("services", "service-list", json!({"title": "Food", "points": "a\nb", "junk": 1}))
        .unwrap();
    assert_eq!(s.save_all().unwrap(), vec!["hero", "services"]);

    let doc = store.get("home").unwrap().unwrap();
    assert_eq!(doc["data"]["hero"]["data"], json!({"heroImage": "", "heroTitle": "Hello"}));
    assert_eq!(
        doc["data"]["services"]["data"]["services"],
        json!([{"title": "Food", "points": ["a", "b"]}])
    );

    let reopened = EditorSession::open(Arc::clone(&store), codec()).unwrap();
    let items = reopened.field("services", "service-list").unwrap().items().to_vec();
    assert_eq!(items, vec![json!({"title": "Food", "points": "a\nb"})]);
    assert_eq!(reopened.field("hero", "hero-title").unwrap().text_value(), "Hello");
}

#[test]
fn test_sections_save_independently_on_disk() {
    let mut dir = std::env::temp_dir();
    dir.push("pagekit-session-tests-fs");
    let _ = std::fs::remove_dir_all(&dir);

    let store = FsSectionStore::new(&dir);
    let mut s = EditorSession::open(store, codec()).unwrap();
    s.set_text("hero", "hero-title", "Only hero").unwrap();
    assert_eq!(s.save_dirty().unwrap(), vec!["hero"]);

    let doc = s.store().get("home").unwrap().unwrap();
    assert!(doc["data"].get("services").is_none());
    assert!(!s.is_dirty("hero"));
}

#[test]
fn test_if_unchanged_refuses_stale_writes() {
    let store = Arc::new(MemorySectionStore::new());
    let mut a = EditorSession::open(Arc::clone(&store), codec())
        .unwrap()
        .with_save_mode(SaveMode::IfUnchanged);
    let mut b = EditorSession::open(Arc::clone(&store), codec()).unwrap();

    b.set_text("hero", "hero-title", "from b").unwrap();
    b.save_section("hero").unwrap();

    a.set_text("hero", "hero-title", "from a").unwrap();
    let err = a.save_section("hero").unwrap_err();
    assert!(matches!(err, SessionError::Store(pagekit_core::error::Error::Conflict { .. })));
    assert!(a.is_dirty("hero"));

    let saved = store.get("home").unwrap().unwrap();
    assert_eq!(saved["data"]["hero"]["data"]["heroTitle"], json!("from b"));
}

#[test]
fn test_unknown_targets_are_errors() {
    let mut s = EditorSession::open(MemorySectionStore::new(), codec()).unwrap();
    assert!(matches!(
        s.set_text("footer", "x", "y"),
        Err(SessionError::UnknownSection(_))
    ));
    assert!(matches!(
        s.set_text("hero", "nope", "y"),
        Err(SessionError::UnknownField { .. })
    ));
    assert!(matches!(
        s.set_text("services", "service-list", "y"),
        Err(SessionError::WrongFieldKind { .. })
    ));
    assert!(matches!(s.save_section("footer"), Err(SessionError::UnknownSection(_))));
}

#[test]
fn test_page_can_be_enabled_again() {
    let store = Arc::new(MemorySectionStore::new());
    store
        .insert_page("home", json!({"enabled": false, "data": {}}))
        .unwrap();

    let mut s = EditorSession::open(Arc::clone(&store), codec()).unwrap();
    assert!(!s.state().enabled);
    s.set_enabled(true);
    s.save_dirty().unwrap();
    assert!(EditorSession::open(Arc::clone(&store), codec()).unwrap().state().enabled);

    let mut s = EditorSession::open(Arc::clone(&store), codec()).unwrap();
    s.set_enabled(false);
    s.save_dirty().unwrap();
    assert!(!EditorSession::open(Arc::clone(&store), codec()).unwrap().state().enabled);
}

/// When another admin's write to `hero` lands right behind one of our calls.
#[derive(Clone, Copy, PartialEq)]
enum Interleave {
    AfterRead,
    AfterWrite,
}

/// Memory store that lets a second writer in once, at a chosen point.
struct InterleavedStore {
    inner: MemorySectionStore,
    at: Interleave,
    fired: AtomicBool,
}

impl InterleavedStore {
    fn new(at: Interleave) -> Self {
        Self {
            inner: MemorySectionStore::new(),
            at,
            fired: AtomicBool::new(false),
        }
    }

    fn other_admin_writes(&self, at: Interleave) -> StoreResult<()> {
        if self.at != at || self.fired.swap(true, Ordering::SeqCst) {
            return Ok(());
        }
        let mut data = Map::new();
        data.insert("heroTitle".into(), json!("other admin"));
        self.inner
            .set("home", "hero", &PersistedSectionRecord::new(data))
    }
}

impl SectionStore for InterleavedStore {
    fn get(&self, page_key: &str) -> StoreResult<Option<Value>> {
        let doc = self.inner.get(page_key)?;
        self.other_admin_writes(Interleave::AfterRead)?;
        Ok(doc)
    }

    fn set(&self, page_key: &str, section_key: &str, record: &PersistedSectionRecord) -> StoreResult<()> {
        self.inner.set(page_key, section_key, record)?;
        self.other_admin_writes(Interleave::AfterWrite)
    }

    fn etag(&self, page_key: &str) -> StoreResult<Option<String>> {
        self.inner.etag(page_key)
    }

    fn get_with_etag(&self, page_key: &str) -> StoreResult<(Option<Value>, Option<String>)> {
        let read = self.inner.get_with_etag(page_key)?;
        self.other_admin_writes(Interleave::AfterRead)?;
        Ok(read)
    }

    fn set_if_match(
        &self,
        page_key: &str,
        section_key: &str,
        record: &PersistedSectionRecord,
        expected: Option<&str>,
    ) -> StoreResult<String> {
        let etag = self.inner.set_if_match(page_key, section_key, record, expected)?;
        self.other_admin_writes(Interleave::AfterWrite)?;
        Ok(etag)
    }
}

#[test]
fn test_write_right_after_load_is_not_overwritten() {
    let store = Arc::new(InterleavedStore::new(Interleave::AfterRead));
    let mut s = EditorSession::open(Arc::clone(&store), codec())
        .unwrap()
        .with_save_mode(SaveMode::IfUnchanged);
    assert_eq!(s.field("hero", "hero-title").unwrap().text_value(), "Welcome");

    s.set_text("hero", "hero-title", "mine").unwrap();
    let err = s.save_section("hero").unwrap_err();
    assert!(matches!(err, SessionError::Store(Error::Conflict { .. })));

    let doc = store.get("home").unwrap().unwrap();
    assert_eq!(doc["data"]["hero"]["data"]["heroTitle"], json!("other admin"));
}

#[test]
fn test_write_right_after_save_is_not_overwritten() {
    let store = Arc::new(InterleavedStore::new(Interleave::AfterWrite));
    let mut s = EditorSession::open(Arc::clone(&store), codec())
        .unwrap()
        .with_save_mode(SaveMode::IfUnchanged);

    s.set_text("hero", "hero-title", "first").unwrap();
    s.save_section("hero").unwrap();

    s.set_text("hero", "hero-title", "second").unwrap();
    let err = s.save_section("hero").unwrap_err();
    assert!(matches!(err, SessionError::Store(Error::Conflict { .. })));

    let doc = store.get("home").unwrap().unwrap();
    assert_eq!(doc["data"]["hero"]["data"]["heroTitle"], json!("other admin"));
}
