//! Canonical field lists → persisted section records.
//!
//! Every field the template declares is written, edited or not, because a
//! save replaces the stored section wholesale. Fields present in memory but
//! unknown to the template are written too, under the page's key style.

use serde_json::{Map, Value};

use pagekit_core::field::FieldDescriptor;
use pagekit_core::record::PersistedSectionRecord;
use pagekit_core::section::PageState;
use pagekit_normalize::{scrub_transient, to_storage_items};

use crate::template::{KeyStyle, PageTemplate, SectionTemplate};

/// Encode one section's fields. The record is marked enabled; use
/// [`PersistedSectionRecord::with_enabled`] or [`encode_page`] to carry a
/// page-level flag.
pub fn encode_section<S: AsRef<str>>(
    fields: &[FieldDescriptor],
    section: &SectionTemplate,
    key_style: KeyStyle,
    transient_prefixes: &[S],
) -> PersistedSectionRecord {
    let mut data = Map::with_capacity(section.fields.len().max(fields.len()));

    for field in fields {
        let template = section.field(&field.id);
        let key = match template {
            Some(t) => t.storage_key(key_style),
            None => key_style.apply(&field.id),
        };
        let shape = template.map(|t| &t.descriptor).unwrap_or(field);
        data.insert(key, encode_value(field, shape, transient_prefixes));
    }

    for missing in section
        .fields
        .iter()
        .filter(|t| !fields.iter().any(|f| f.id == t.id()))
    {
        #[cfg(feature = "tracing")]
        tracing::debug!(section = %section.key, field = %missing.id(), "field absent from edit state; writing default");
        data.insert(
            missing.storage_key(key_style),
            encode_value(&missing.descriptor, &missing.descriptor, transient_prefixes),
        );
    }

    PersistedSectionRecord::new(data)
}

/// `field`'s value, shaped by `shape` (the template descriptor when known).
fn encode_value<S: AsRef<str>>(
    field: &FieldDescriptor,
    shape: &FieldDescriptor,
    transient_prefixes: &[S],
) -> Value {
    if shape.is_list() {
        let schema = shape.item_schema().or(field.item_schema());
        Value::Array(to_storage_items(field.items(), schema, transient_prefixes))
    } else {
        Value::String(scrub_transient(field.text_value(), transient_prefixes))
    }
}

/// Encode every section of `state` that the template knows, stamping each
/// record with the page-level `enabled` flag.
pub fn encode_page<S: AsRef<str>>(
    state: &PageState,
    template: &PageTemplate,
    transient_prefixes: &[S],
) -> Vec<(String, PersistedSectionRecord)> {
    template
        .sections
        .iter()
        .map(|st| {
            let fields = state
                .section(&st.key)
                .map(|s| s.fields.as_slice())
                .unwrap_or(&[]);
            let record = encode_section(fields, st, template.key_style, transient_prefixes)
                .with_enabled(state.enabled);
            (st.key.clone(), record)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decode::decode_section;
    use crate::template::TemplateField;
    use pagekit_core::field::{FieldType, FieldValue, SubFieldDescriptor};
    use serde_json::json;

    const PREFIXES: &[&str] = &["blob:"];

    fn services_section() -> SectionTemplate {
        SectionTemplate::new(
            "services",
            "Services",
            vec![
                FieldDescriptor::text("section-title", "Title", "Our services").into(),
                FieldDescriptor::new("hero-image", "Hero", FieldType::Image).into(),
                FieldDescriptor::list(
                    "services",
                    "Services",
                    vec![SubFieldDescriptor::text("title"), SubFieldDescriptor::text("description")],
                )
                .into(),
            ],
        )
    }

    #[test]
    fn list_items_lose_extra_keys() {
        let section = services_section();
        let mut fields = section.default_fields();
        fields[2].set_value(FieldValue::List(vec![
            json!({"title": "A", "description": "B", "extraJunk": 1}),
        ]));
        let rec = encode_section(&fields, &section, KeyStyle::Verbatim, PREFIXES);
        assert!(rec.enabled);
        assert_eq!(rec.data["services"], json!([{"title": "A", "description": "B"}]));
    }

    #[test]
    fn blob_urls_are_scrubbed() {
        let section = services_section();
        let mut fields = section.default_fields();
        fields[1].set_value("blob:http://localhost:3000/9f2c".into());
        let rec = encode_section(&fields, &section, KeyStyle::Verbatim, PREFIXES);
        assert_eq!(rec.data["hero-image"], json!(""));
    }

    #[test]
    fn keys_follow_style_and_overrides() {
        let section = SectionTemplate::new(
            "hero",
            "Hero",
            vec![
                FieldDescriptor::new("hero-image", "Image", FieldType::Image).into(),
                TemplateField::new(FieldDescriptor::text("hero-title", "Title", "t"))
                    .with_storage_key("headline"),
            ],
        );
        let rec = encode_section(&section.default_fields(), &section, KeyStyle::Camel, PREFIXES);
        let keys: Vec<&String> = rec.data.keys().collect();
        assert_eq!(keys, vec!["heroImage", "headline"]);
    }

    #[test]
    fn untouched_and_dropped_fields_are_preserved() {
        let section = services_section();
        let fields = vec![FieldDescriptor::text("section-title", "Title", "Edited")];
        let rec = encode_section(&fields, &section, KeyStyle::Verbatim, PREFIXES);
        assert_eq!(rec.data["section-title"], json!("Edited"));
        assert_eq!(rec.data["hero-image"], json!(""));
        assert_eq!(rec.data["services"], json!([]));
    }

    #[test]
    fn wrong_value_type_collapses_to_zero() {
        let section = services_section();
        let mut fields = section.default_fields();
        // Simulate drift: a scalar field carrying a list.
        fields[0].value = FieldValue::List(vec![json!("x")]);
        fields[2].value = FieldValue::Text("oops".into());
        let rec = encode_section(&fields, &section, KeyStyle::Verbatim, PREFIXES);
        assert_eq!(rec.data["section-title"], json!(""));
        assert_eq!(rec.data["services"], json!([]));
    }

    #[test]
    fn encode_decode_encode_is_stable() {
        let section = services_section();
        let mut fields = section.default_fields();
        fields[0].set_value("Custom".into());
        fields[1].set_value("uploads/a.png".into());
        fields[2].set_value(FieldValue::List(vec![json!("bare"), json!({"title": "T"})]));

        let first = encode_section(&fields, &section, KeyStyle::Camel, PREFIXES);
        let doc = json!({"data": {"services": first.to_value()}});
        let decoded = decode_section(&doc, &section);
        let second = encode_section(&decoded, &section, KeyStyle::Camel, PREFIXES);
        assert_eq!(first, second);
        assert_eq!(decoded[0].text_value(), "Custom");
        assert_eq!(decoded[1].text_value(), "uploads/a.png");
    }
}
