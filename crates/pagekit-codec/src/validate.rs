//! Structural checks on page templates.
//!
//! Hard errors are things that would lose data on save (duplicate ids or two
//! fields sharing a storage key). Modeling smells come back as warnings.

use std::collections::HashSet;
use std::fmt;

use pagekit_core::field::FieldType;

use crate::error::{Result, TemplateError};
use crate::template::PageTemplate;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TemplateWarning {
    /// A list/table field without item schema; items fall back to `{text}`.
    MissingItemSchema { section: String, field: String },
    /// A scalar field declaring an item schema that nothing will use.
    UnusedItemSchema { section: String, field: String },
    /// A default value whose shape did not match its type and was reset.
    DefaultCoerced {
        section: String,
        field: String,
        field_type: FieldType,
    },
}

impl fmt::Display for TemplateWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TemplateWarning::MissingItemSchema { section, field } => {
                write!(f, "{section}.{field}: list field has no item schema")
            }
            TemplateWarning::UnusedItemSchema { section, field } => {
                write!(f, "{section}.{field}: item schema on a scalar field is ignored")
            }
            TemplateWarning::DefaultCoerced {
                section,
                field,
                field_type,
            } => write!(
                f,
                "{section}.{field}: default value is not a valid {field_type}; using empty value"
            ),
        }
    }
}

pub fn validate_template(template: &PageTemplate) -> Result<Vec<TemplateWarning>> {
    if template.page.trim().is_empty() {
        return Err(TemplateError::EmptyKey("page"));
    }

    let mut warnings = Vec::new();
    let mut section_keys = HashSet::new();

    for section in &template.sections {
        if section.key.trim().is_empty() {
            return Err(TemplateError::EmptyKey("section"));
        }
        if !section_keys.insert(section.key.as_str()) {
            return Err(TemplateError::DuplicateSection(section.key.clone()));
        }

        let mut field_ids = HashSet::new();
        let mut storage_keys: Vec<(String, &str)> = Vec::new();

        for field in &section.fields {
            let d = &field.descriptor;
            if d.id.trim().is_empty() {
                return Err(TemplateError::EmptyKey("field"));
            }
            if !field_ids.insert(d.id.as_str()) {
                return Err(TemplateError::DuplicateField {
                    section: section.key.clone(),
                    field: d.id.clone(),
                });
            }

            let key = field.storage_key(template.key_style);
            if let Some((_, first)) = storage_keys.iter().find(|(k, _)| *k == key) {
                return Err(TemplateError::StorageKeyCollision {
                    section: section.key.clone(),
                    first: first.to_string(),
                    second: d.id.clone(),
                    key,
                });
            }
            storage_keys.push((key, d.id.as_str()));

            match (d.is_list(), d.item_schema()) {
                (true, None) | (true, Some([])) => warnings.push(TemplateWarning::MissingItemSchema {
                    section: section.key.clone(),
                    field: d.id.clone(),
                }),
                (false, Some(_)) => warnings.push(TemplateWarning::UnusedItemSchema {
                    section: section.key.clone(),
                    field: d.id.clone(),
                }),
                _ => {}
            }

            let mut sub_ids = HashSet::new();
            for sub in d.item_schema().unwrap_or(&[]) {
                if !sub_ids.insert(sub.id.as_str()) {
                    return Err(TemplateError::DuplicateSubField {
                        section: section.key.clone(),
                        field: d.id.clone(),
                        sub: sub.id.clone(),
                    });
                }
            }
        }
    }

    Ok(warnings)
}
