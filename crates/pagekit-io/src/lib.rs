#![forbid(unsafe_code)]
//! pagekit-io: adapters implementing `pagekit_core::SectionStore`.
//!
//! - `memory_store`: process-local map, used by tests and `memory://`.
//! - `storage::fs`: one JSON document per page on the local filesystem.
//! - `response`: the `{ok, data, error}` envelope spoken by HTTP backends.

pub mod memory_store;
pub mod response;
pub mod storage;

pub use memory_store::MemorySectionStore;
pub use response::StoreResponse;
pub use storage::{build_store_from_config, FsSectionStore};
