#![forbid(unsafe_code)]
//! pagekit-core: the canonical field/section model shared by every other crate.
//!
//! - `field`: the closed `FieldType` taxonomy and per-type value shapes.
//! - `section`: `Section` and `PageState`, the values owned by one editing session.
//! - `record`: the persisted record shape and page-document container helpers.
//! - `store`: the `SectionStore` interface implemented by `pagekit-io`.
//!
//! Nothing here performs IO; adapters live in `pagekit-io`.

pub mod config;
pub mod error;
pub mod field;
pub mod hash;
pub mod prelude;
pub mod record;
pub mod section;
pub mod store;

pub use field::{is_list_type, FieldDescriptor, FieldType, FieldValue, SubFieldDescriptor};
pub use record::PersistedSectionRecord;
pub use section::{PageState, Section};
pub use store::SectionStore;
