#![forbid(unsafe_code)]
//! pagekit-codec: page templates → canonical field lists ↔ persisted records.
//!
//! Design:
//! - A `PageTemplate` is the configuration table for one page: its sections,
//!   their default fields, legacy lookup aliases and storage key mapping.
//! - `decode` reads whatever shape a page document happens to be in and
//!   produces default-filled canonical fields. It never fails.
//! - `encode` turns canonical fields back into a minimal, schema-conformant
//!   `PersistedSectionRecord`.
//! - `dsl::yaml` loads templates from YAML (or JSON) files.

pub mod codec;
pub mod decode;
pub mod dsl;
pub mod encode;
pub mod error;
pub mod template;
pub mod validate;

pub use codec::PageCodec;
pub use decode::{decode_page, decode_section};
pub use dsl::yaml::{parse_json_template, parse_yaml_template, ParsedTemplate};
pub use encode::{encode_page, encode_section};
pub use error::{Result, TemplateError};
pub use template::{KeyStyle, PageTemplate, SectionTemplate, TemplateField};
pub use validate::{validate_template, TemplateWarning};
