//! Section store adapters selected by URI.
//!
//! - `fs`: local filesystem (default), one JSON document per page.
//! - `memory://`: the process-local `MemorySectionStore`.

mod fs;
pub use fs::FsSectionStore;

use pagekit_core::config::StoreConfig;
use pagekit_core::error::{Error, Result};
use pagekit_core::SectionStore;

use crate::memory_store::MemorySectionStore;

/// Build the correct store backend using the provided configuration.
pub fn build_store_from_config(cfg: &StoreConfig) -> Result<Box<dyn SectionStore>> {
    match cfg.scheme() {
        Some("memory") | Some("mem") => Ok(Box::new(MemorySectionStore::new())),
        Some("file") | None => {
            // Default to filesystem (treat URI as file:// or bare path).
            Ok(Box::new(
                FsSectionStore::new(&cfg.root).with_pretty(cfg.pretty_json),
            ))
        }
        Some(other) => Err(Error::Config(format!("unsupported store scheme '{other}'"))),
    }
}
