//! YAML (and JSON) → `PageTemplate` loader.
//!
//! Example:
//! ```yaml
//! page: home
//! key_style: camel
//! sections:
//!   - key: introduction
//!     title: Introduction
//!     legacy_keys: [intro]
//!     fields:
//!       - { id: intro-title, label: Title, type: text, value: "Welcome" }
//!       - id: services
//!         label: Services
//!         type: list
//!         item_schema:
//!           - { id: title, label: Title, type: text }
//!           - { id: points, label: Points, type: list }
//! ```

use serde::{Deserialize, Serialize};
use serde_json::Value;

use pagekit_core::field::{FieldDescriptor, FieldType, FieldValue, SubFieldDescriptor};

use crate::error::{Result, TemplateError};
use crate::template::{KeyStyle, PageTemplate, SectionTemplate, TemplateField};
use crate::validate::{validate_template, TemplateWarning};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TemplateDoc {
    pub page: String,
    #[serde(default)]
    pub key_style: KeyStyle,
    pub sections: Vec<SectionDef>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SectionDef {
    pub key: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub legacy_keys: Vec<String>,
    #[serde(default)]
    pub fields: Vec<FieldDef>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldDef {
    pub id: String,
    #[serde(default)]
    pub label: String,
    #[serde(rename = "type", default = "default_kind")]
    pub kind: String,
    #[serde(default)]
    pub value: Option<Value>,
    #[serde(default)]
    pub placeholder: Option<String>,
    #[serde(default, alias = "itemSchema")]
    pub item_schema: Option<Vec<SubFieldDef>>,
    #[serde(default)]
    pub aliases: Vec<String>,
    #[serde(default, alias = "storageKey")]
    pub storage_key: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubFieldDef {
    pub id: String,
    #[serde(default)]
    pub label: String,
    #[serde(rename = "type", default = "default_kind")]
    pub kind: String,
}

fn default_kind() -> String {
    "text".to_string()
}

fn parse_field_type(s: &str) -> Option<FieldType> {
    Some(match s.to_ascii_lowercase().replace(['_', '-'], "").as_str() {
        "text" | "string" => FieldType::Text,
        "textarea" => FieldType::Textarea,
        "richtext" => FieldType::RichText,
        "image" => FieldType::Image,
        "url" | "link" => FieldType::Url,
        "time" => FieldType::Time,
        "list" | "array" => FieldType::List,
        "table" => FieldType::Table,
        _ => return None,
    })
}

/// A loaded template plus the non-fatal findings about it.
#[derive(Debug, Clone)]
pub struct ParsedTemplate {
    pub template: PageTemplate,
    pub warnings: Vec<TemplateWarning>,
}

pub fn parse_yaml_template(yaml_src: &str) -> Result<ParsedTemplate> {
    let doc: TemplateDoc = serde_yaml::from_str(yaml_src)?;
    build_template(doc)
}

pub fn parse_json_template(json_src: &str) -> Result<ParsedTemplate> {
    let doc: TemplateDoc = serde_json::from_str(json_src)?;
    build_template(doc)
}

fn build_template(doc: TemplateDoc) -> Result<ParsedTemplate> {
    let mut warnings = Vec::new();
    let mut sections = Vec::with_capacity(doc.sections.len());

    for def in doc.sections {
        let mut fields = Vec::with_capacity(def.fields.len());
        for f in def.fields {
            fields.push(build_field(&def.key, f, &mut warnings)?);
        }
        sections.push(SectionTemplate {
            key: def.key,
            title: def.title,
            legacy_keys: def.legacy_keys,
            fields,
        });
    }

    let template = PageTemplate {
        page: doc.page,
        key_style: doc.key_style,
        sections,
    };
    warnings.extend(validate_template(&template)?);

    #[cfg(feature = "tracing")]
    for w in &warnings {
        tracing::warn!(page = %template.page, "{w}");
    }

    Ok(ParsedTemplate { template, warnings })
}

fn build_field(
    section: &str,
    def: FieldDef,
    warnings: &mut Vec<TemplateWarning>,
) -> Result<TemplateField> {
    let field_type = parse_field_type(&def.kind).ok_or_else(|| TemplateError::UnknownFieldType {
        section: section.to_string(),
        field: def.id.clone(),
        kind: def.kind.clone(),
    })?;

    let item_schema = match def.item_schema {
        Some(subs) => {
            let mut out = Vec::with_capacity(subs.len());
            for sub in subs {
                let sub_type =
                    parse_field_type(&sub.kind).ok_or_else(|| TemplateError::UnknownFieldType {
                        section: section.to_string(),
                        field: format!("{}.{}", def.id, sub.id),
                        kind: sub.kind.clone(),
                    })?;
                out.push(SubFieldDescriptor::new(sub.id, sub.label, sub_type));
            }
            Some(out)
        }
        None => None,
    };

    let value = match &def.value {
        None | Some(Value::Null) => field_type.zero_value(),
        Some(raw) => {
            let coerced = FieldValue::coerce(field_type, raw);
            if coerced.to_json() != *raw {
                warnings.push(TemplateWarning::DefaultCoerced {
                    section: section.to_string(),
                    field: def.id.clone(),
                    field_type,
                });
            }
            coerced
        }
    };

    let mut descriptor = FieldDescriptor::new(def.id, def.label, field_type).with_value(value);
    descriptor.placeholder = def.placeholder;
    descriptor.item_schema = item_schema;

    Ok(TemplateField {
        descriptor,
        aliases: def.aliases,
        storage_key: def.storage_key,
    })
}
