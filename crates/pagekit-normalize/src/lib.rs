#![forbid(unsafe_code)]
//! pagekit-normalize: pure functions that reconcile stored values with the
//! canonical field model.
//!
//! - `list`: project raw list items onto an item schema.
//! - `keys`: canonical id → camelCase storage key.
//! - `bullets`: newline string ↔ array-of-strings for bullet sub-fields.
//! - `scrub`: drop transient local references before persisting.

pub mod bullets;
pub mod keys;
pub mod list;
pub mod scrub;

pub use bullets::{join_bullets, split_bullets};
pub use keys::camel_case;
pub use list::{normalize_items, to_storage_items, FALLBACK_FIELD};
pub use scrub::{is_transient, scrub_transient};
