//! A page template bound to its encoder settings.

use serde_json::Value;

use pagekit_core::config::EditorConfig;
use pagekit_core::field::FieldDescriptor;
use pagekit_core::record::PersistedSectionRecord;
use pagekit_core::section::PageState;

use crate::decode::{decode_page, decode_section};
use crate::encode::{encode_page, encode_section};
use crate::template::{PageTemplate, SectionTemplate};

#[derive(Debug, Clone)]
pub struct PageCodec {
    template: PageTemplate,
    transient_prefixes: Vec<String>,
}

impl PageCodec {
    pub fn new(template: PageTemplate, transient_prefixes: Vec<String>) -> Self {
        Self {
            template,
            transient_prefixes,
        }
    }

    pub fn from_config(template: PageTemplate, cfg: &EditorConfig) -> Self {
        Self::new(template, cfg.transient_prefixes.clone())
    }

    pub fn template(&self) -> &PageTemplate {
        &self.template
    }

    pub fn page_key(&self) -> &str {
        &self.template.page
    }

    pub fn section(&self, key: &str) -> Option<&SectionTemplate> {
        self.template.section(key)
    }

    /// Decode a stored page document; `None` means the page was never saved.
    pub fn decode(&self, raw: Option<&Value>) -> PageState {
        match raw {
            Some(raw) => decode_page(raw, &self.template),
            None => self.template.default_state(),
        }
    }

    /// Decode a single section; `None` when the template has no such section.
    pub fn decode_section(&self, raw: &Value, section_key: &str) -> Option<Vec<FieldDescriptor>> {
        self.section(section_key).map(|s| decode_section(raw, s))
    }

    /// Encode a single section; `None` when the template has no such section.
    pub fn encode_section(
        &self,
        fields: &[FieldDescriptor],
        section_key: &str,
    ) -> Option<PersistedSectionRecord> {
        self.section(section_key).map(|s| {
            encode_section(fields, s, self.template.key_style, &self.transient_prefixes)
        })
    }

    pub fn encode(&self, state: &PageState) -> Vec<(String, PersistedSectionRecord)> {
        encode_page(state, &self.template, &self.transient_prefixes)
    }
}
