//! Page document → canonical field lists.
//!
//! Resolution order:
//! 1. sections container: `raw.data.data` when it is an object, else `raw.data`;
//! 2. section: `container[key].data`, then each legacy container key;
//! 3. field: id, camelCase id, explicit storage key, declared aliases.
//!
//! Any shape mismatch falls back to the template default. Nothing here fails.

use serde_json::{Map, Value};

use pagekit_core::field::{FieldDescriptor, FieldValue};
use pagekit_core::record::{page_enabled, section_data, sections_container};
use pagekit_core::section::{PageState, Section};
use pagekit_normalize::normalize_items;

use crate::template::{PageTemplate, SectionTemplate, TemplateField};

/// Locate the stored `data` object of `section`, if any.
pub fn locate_section<'a>(raw: &'a Value, section: &SectionTemplate) -> Option<&'a Map<String, Value>> {
    let container = sections_container(raw)?;
    std::iter::once(section.key.as_str())
        .chain(section.legacy_keys.iter().map(String::as_str))
        .find_map(|key| section_data(container, key))
}

/// Decode one section. Returns the template defaults unchanged when the
/// section is not present in `raw`.
pub fn decode_section(raw: &Value, section: &SectionTemplate) -> Vec<FieldDescriptor> {
    match locate_section(raw, section) {
        Some(data) => section.fields.iter().map(|f| resolve_field(data, f)).collect(),
        None => {
            #[cfg(feature = "tracing")]
            tracing::debug!(section = %section.key, "section not stored; using defaults");
            section.default_fields()
        }
    }
}

/// Decode every section of a page. `raw` may be `Value::Null` for a page
/// that was never saved.
pub fn decode_page(raw: &Value, template: &PageTemplate) -> PageState {
    let sections = template
        .sections
        .iter()
        .map(|s| Section {
            key: s.key.clone(),
            title: s.title.clone(),
            fields: decode_section(raw, s),
            enabled: true,
        })
        .collect();
    PageState {
        page_key: template.page.clone(),
        enabled: page_enabled(raw),
        sections,
    }
}

fn resolve_field(data: &Map<String, Value>, field: &TemplateField) -> FieldDescriptor {
    let default = &field.descriptor;
    let mut stored_empty: Option<FieldValue> = None;

    for key in field.lookup_keys() {
        let Some(raw) = data.get(&key) else {
            continue;
        };
        let value = match (default.is_list(), raw) {
            (true, Value::Array(items)) => {
                FieldValue::List(normalize_items(items, default.item_schema()))
            }
            (false, Value::String(s)) => FieldValue::Text(s.clone()),
            _ => {
                #[cfg(feature = "tracing")]
                tracing::debug!(field = %default.id, key = %key, "stored value has the wrong shape; skipped");
                continue;
            }
        };
        if !value.is_empty() {
            return default.clone().with_value(value);
        }
        stored_empty.get_or_insert(value);
    }

    // Stored empty values win over the default: a cleared field stays
    // cleared across save and reload.
    match stored_empty {
        Some(empty) => default.clone().with_value(empty),
        None => default.clone(),
    }
}
