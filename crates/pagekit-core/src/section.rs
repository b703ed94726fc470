//! Sections and the page state owned by one editing session.

use serde::{Deserialize, Serialize};

use crate::field::FieldDescriptor;

fn default_enabled() -> bool {
    true
}

/// A named, independently saved group of fields. Field order is display order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Section {
    pub key: String,
    #[serde(default)]
    pub title: String,
    pub fields: Vec<FieldDescriptor>,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

impl Section {
    pub fn new(key: impl Into<String>, title: impl Into<String>, fields: Vec<FieldDescriptor>) -> Self {
        Self {
            key: key.into(),
            title: title.into(),
            fields,
            enabled: true,
        }
    }

    pub fn field(&self, id: &str) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|f| f.id == id)
    }

    pub fn field_mut(&mut self, id: &str) -> Option<&mut FieldDescriptor> {
        self.fields.iter_mut().find(|f| f.id == id)
    }
}

/// Every section of one page, in template order.
///
/// `enabled` is the page-level visibility flag; it is written into each
/// section record on save.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageState {
    pub page_key: String,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    pub sections: Vec<Section>,
}

impl PageState {
    pub fn new(page_key: impl Into<String>, sections: Vec<Section>) -> Self {
        Self {
            page_key: page_key.into(),
            enabled: true,
            sections,
        }
    }

    pub fn section(&self, key: &str) -> Option<&Section> {
        self.sections.iter().find(|s| s.key == key)
    }

    pub fn section_mut(&mut self, key: &str) -> Option<&mut Section> {
        self.sections.iter_mut().find(|s| s.key == key)
    }

    pub fn section_keys(&self) -> impl Iterator<Item = &str> {
        self.sections.iter().map(|s| s.key.as_str())
    }
}
