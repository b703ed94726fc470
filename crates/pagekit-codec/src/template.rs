//! Page templates: the hard-coded default sections of a page plus the key
//! aliases its stored documents have used over time.

use serde::{Deserialize, Serialize};

use pagekit_core::field::FieldDescriptor;
use pagekit_core::section::{PageState, Section};
use pagekit_normalize::camel_case;

/// How canonical field ids become storage keys when a field declares no
/// explicit `storage_key`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KeyStyle {
    /// Store under the canonical id (`intro-title`).
    #[default]
    Verbatim,
    /// Store under the camelCase id (`introTitle`).
    Camel,
}

impl KeyStyle {
    pub fn apply(self, id: &str) -> String {
        match self {
            KeyStyle::Verbatim => id.to_string(),
            KeyStyle::Camel => camel_case(id),
        }
    }
}

/// A template field: the default descriptor plus its storage naming.
#[derive(Debug, Clone, PartialEq)]
pub struct TemplateField {
    pub descriptor: FieldDescriptor,
    /// Extra legacy keys tried after the id and its camelCase form.
    pub aliases: Vec<String>,
    /// Explicit persisted key; overrides the page's `KeyStyle`.
    pub storage_key: Option<String>,
}

impl TemplateField {
    pub fn new(descriptor: FieldDescriptor) -> Self {
        Self {
            descriptor,
            aliases: Vec::new(),
            storage_key: None,
        }
    }

    pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
        self.aliases.push(alias.into());
        self
    }

    pub fn with_storage_key(mut self, key: impl Into<String>) -> Self {
        self.storage_key = Some(key.into());
        self
    }

    pub fn id(&self) -> &str {
        &self.descriptor.id
    }

    pub fn storage_key(&self, style: KeyStyle) -> String {
        self.storage_key
            .clone()
            .unwrap_or_else(|| style.apply(&self.descriptor.id))
    }

    /// Keys tried by the decoder, in precedence order, without repeats:
    /// id, camelCase id, explicit storage key, then aliases.
    pub fn lookup_keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = Vec::with_capacity(3 + self.aliases.len());
        let candidates = [
            Some(self.descriptor.id.clone()),
            Some(camel_case(&self.descriptor.id)),
            self.storage_key.clone(),
        ];
        for key in candidates
            .into_iter()
            .flatten()
            .chain(self.aliases.iter().cloned())
        {
            if !key.is_empty() && !keys.contains(&key) {
                keys.push(key);
            }
        }
        keys
    }
}

impl From<FieldDescriptor> for TemplateField {
    fn from(descriptor: FieldDescriptor) -> Self {
        TemplateField::new(descriptor)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SectionTemplate {
    pub key: String,
    pub title: String,
    /// Older container keys this section was stored under.
    pub legacy_keys: Vec<String>,
    pub fields: Vec<TemplateField>,
}

impl SectionTemplate {
    pub fn new(key: impl Into<String>, title: impl Into<String>, fields: Vec<TemplateField>) -> Self {
        Self {
            key: key.into(),
            title: title.into(),
            legacy_keys: Vec::new(),
            fields,
        }
    }

    pub fn with_legacy_key(mut self, key: impl Into<String>) -> Self {
        self.legacy_keys.push(key.into());
        self
    }

    pub fn field(&self, id: &str) -> Option<&TemplateField> {
        self.fields.iter().find(|f| f.id() == id)
    }

    pub fn default_fields(&self) -> Vec<FieldDescriptor> {
        self.fields.iter().map(|f| f.descriptor.clone()).collect()
    }

    pub fn default_section(&self) -> Section {
        Section::new(self.key.clone(), self.title.clone(), self.default_fields())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PageTemplate {
    pub page: String,
    pub key_style: KeyStyle,
    pub sections: Vec<SectionTemplate>,
}

impl PageTemplate {
    pub fn new(page: impl Into<String>, sections: Vec<SectionTemplate>) -> Self {
        Self {
            page: page.into(),
            key_style: KeyStyle::default(),
            sections,
        }
    }

    pub fn with_key_style(mut self, key_style: KeyStyle) -> Self {
        self.key_style = key_style;
        self
    }

    pub fn section(&self, key: &str) -> Option<&SectionTemplate> {
        self.sections.iter().find(|s| s.key == key)
    }

    /// Every section at its defaults.
    pub fn default_state(&self) -> PageState {
        PageState::new(
            self.page.clone(),
            self.sections.iter().map(SectionTemplate::default_section).collect(),
        )
    }
}
