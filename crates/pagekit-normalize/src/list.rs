//! Project raw list items onto an item schema.
//!
//! Stored list items come in several shapes: records with the expected keys,
//! records polluted with extra keys, bare strings, and strings that an old
//! serializer spread into a character map (`{"0": "a", "1": "b"}`). Every
//! item is turned into a record holding exactly the schema's ids, in schema
//! order. Items that are neither records nor strings pass through untouched.

use std::borrow::Cow;

use serde_json::{Map, Value};

use pagekit_core::field::{FieldType, SubFieldDescriptor};

use crate::bullets::{join_bullets, split_bullets};
use crate::scrub::scrub_transient;

/// Sub-field used when a list has no item schema.
pub const FALLBACK_FIELD: &str = "text";

fn effective_schema(schema: Option<&[SubFieldDescriptor]>) -> Cow<'_, [SubFieldDescriptor]> {
    match schema {
        Some(s) if !s.is_empty() => Cow::Borrowed(s),
        _ => Cow::Owned(vec![SubFieldDescriptor::text(FALLBACK_FIELD)]),
    }
}

/// Normalize `raw` into canonical list items.
///
/// Output has the same length and order as the input. Every record carries
/// all schema ids with string values; bullet arrays are joined with `\n`.
pub fn normalize_items(raw: &[Value], schema: Option<&[SubFieldDescriptor]>) -> Vec<Value> {
    let schema = effective_schema(schema);
    raw.iter().map(|item| normalize_item(item, &schema)).collect()
}

fn normalize_item(item: &Value, schema: &[SubFieldDescriptor]) -> Value {
    match item {
        Value::Object(obj) => Value::Object(project_record(obj, schema)),
        Value::String(s) => Value::Object(wrap_string(s, schema)),
        other => {
            #[cfg(feature = "tracing")]
            tracing::warn!(item = %other, "list item is neither record nor string; kept as is");
            other.clone()
        }
    }
}

fn project_record(obj: &Map<String, Value>, schema: &[SubFieldDescriptor]) -> Map<String, Value> {
    let mut out = Map::with_capacity(schema.len());
    for (idx, sub) in schema.iter().enumerate() {
        let mut text = sub_value_text(obj.get(&sub.id));
        if idx == 0 && text.is_empty() {
            if let Some(rebuilt) = rebuild_char_map(obj) {
                #[cfg(feature = "tracing")]
                tracing::debug!(field = %sub.id, "rebuilt text from character map");
                text = rebuilt;
            }
        }
        out.insert(sub.id.clone(), Value::String(text));
    }
    out
}

fn sub_value_text(v: Option<&Value>) -> String {
    match v {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Array(lines)) => join_bullets(lines),
        _ => String::new(),
    }
}

/// Concatenate the string values under numeric keys in ascending numeric
/// order. `None` when the record has no such keys.
fn rebuild_char_map(obj: &Map<String, Value>) -> Option<String> {
    let mut chars: Vec<(usize, &str)> = obj
        .iter()
        .filter_map(|(k, v)| Some((char_index(k)?, v.as_str()?)))
        .collect();
    if chars.is_empty() {
        return None;
    }
    chars.sort_by_key(|(idx, _)| *idx);
    Some(chars.into_iter().map(|(_, s)| s).collect())
}

/// Canonical decimal index: ASCII digits only, no sign, no leading zero.
fn char_index(key: &str) -> Option<usize> {
    let canonical = key == "0"
        || (!key.is_empty() && !key.starts_with('0') && key.bytes().all(|b| b.is_ascii_digit()));
    if canonical {
        key.parse().ok()
    } else {
        None
    }
}

fn wrap_string(s: &str, schema: &[SubFieldDescriptor]) -> Map<String, Value> {
    let mut out = Map::with_capacity(schema.len());
    for (idx, sub) in schema.iter().enumerate() {
        let text = if idx == 0 { s.to_string() } else { String::new() };
        out.insert(sub.id.clone(), Value::String(text));
    }
    out
}

/// Canonical items → persisted items: normalize, split bullet sub-fields
/// into arrays and scrub transient references from image/url sub-fields.
pub fn to_storage_items<S: AsRef<str>>(
    items: &[Value],
    schema: Option<&[SubFieldDescriptor]>,
    transient_prefixes: &[S],
) -> Vec<Value> {
    let schema = effective_schema(schema);
    items
        .iter()
        .map(|item| match normalize_item(item, &schema) {
            Value::Object(mut rec) => {
                for sub in schema.iter() {
                    let Some(Value::String(text)) = rec.get(&sub.id) else {
                        continue;
                    };
                    let stored = match sub.field_type {
                        FieldType::List => Value::Array(split_bullets(text)),
                        FieldType::Image | FieldType::Url => {
                            Value::String(scrub_transient(text, transient_prefixes))
                        }
                        _ => continue,
                    };
                    rec.insert(sub.id.clone(), stored);
                }
                Value::Object(rec)
            }
            other => other,
        })
        .collect()
}
