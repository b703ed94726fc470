//! Convenient re-exports for downstream crates.

pub use crate::config::{EditorConfig, StoreConfig};
pub use crate::error::{Error, Result};
pub use crate::field::{is_list_type, FieldDescriptor, FieldType, FieldValue, SubFieldDescriptor};
pub use crate::record::PersistedSectionRecord;
pub use crate::section::{PageState, Section};
pub use crate::store::SectionStore;
