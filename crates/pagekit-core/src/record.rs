//! Persisted section records and the page documents that hold them.
//!
//! A page document looks like `{"data": {"<section>": {"enabled": .., "data": {..}}}}`.
//! An earlier writer nested the container one level deeper
//! (`{"data": {"data": {..}}}`); readers and writers both go through
//! [`sections_container`] / [`sections_container_mut`] so the two shapes stay
//! interchangeable.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// The JSON blob stored for one section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersistedSectionRecord {
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    #[serde(default)]
    pub data: Map<String, Value>,
}

fn default_enabled() -> bool {
    true
}

impl PersistedSectionRecord {
    pub fn new(data: Map<String, Value>) -> Self {
        Self {
            enabled: true,
            data,
        }
    }

    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    pub fn to_value(&self) -> Value {
        let mut obj = Map::new();
        obj.insert("enabled".into(), Value::Bool(self.enabled));
        obj.insert("data".into(), Value::Object(self.data.clone()));
        Value::Object(obj)
    }
}

/// The object holding section records: `raw.data.data` when that is an
/// object, otherwise `raw.data`.
pub fn sections_container(raw: &Value) -> Option<&Map<String, Value>> {
    let data = raw.get("data")?.as_object()?;
    match data.get("data") {
        Some(Value::Object(nested)) => Some(nested),
        _ => Some(data),
    }
}

/// The raw `data` object of one section, if present and object-shaped.
pub fn section_data<'a>(
    container: &'a Map<String, Value>,
    section_key: &str,
) -> Option<&'a Map<String, Value>> {
    container.get(section_key)?.get("data")?.as_object()
}

/// Page-level visibility: an explicit top-level `enabled`, else false only
/// when some stored section record says so.
pub fn page_enabled(raw: &Value) -> bool {
    if let Some(flag) = raw.get("enabled").and_then(Value::as_bool) {
        return flag;
    }
    sections_container(raw)
        .map(|c| {
            !c.values()
                .any(|rec| rec.get("enabled").and_then(Value::as_bool) == Some(false))
        })
        .unwrap_or(true)
}

/// Mutable access to the sections container, creating the flat shape when
/// the document has none. Non-object documents are replaced.
pub fn sections_container_mut(doc: &mut Value) -> &mut Map<String, Value> {
    if !doc.is_object() {
        *doc = Value::Object(Map::new());
    }
    let root = match doc {
        Value::Object(root) => root,
        _ => unreachable!("document was just made an object"),
    };
    let data = root
        .entry("data")
        .and_modify(|d| {
            if !d.is_object() {
                *d = Value::Object(Map::new());
            }
        })
        .or_insert_with(|| Value::Object(Map::new()));
    let data = match data {
        Value::Object(m) => m,
        _ => unreachable!("data was just made an object"),
    };
    if matches!(data.get("data"), Some(Value::Object(_))) {
        match data.get_mut("data") {
            Some(Value::Object(nested)) => nested,
            _ => unreachable!("checked above"),
        }
    } else {
        data
    }
}

/// Replace one section's record inside a page document, leaving every other
/// section untouched.
///
/// A top-level `enabled` flag, when the document carries one, follows the
/// record's flag.
pub fn put_section(doc: &mut Value, section_key: &str, record: &PersistedSectionRecord) {
    sections_container_mut(doc).insert(section_key.to_string(), record.to_value());
    if let Some(flag) = doc.get_mut("enabled") {
        *flag = Value::Bool(record.enabled);
    }
}
