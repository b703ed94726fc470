#![forbid(unsafe_code)]
//! pagekit-session: one admin's editing session over one page.
//!
//! The session owns the decoded `PageState`; every mutation goes through an
//! explicit setter, and saves go section by section through the codec to the
//! store. Unsaved edits are simply dropped with the session.

pub mod guard;
pub mod metrics;
pub mod session;

pub use guard::{InFlightSaves, SaveGuard};
pub use session::{EditorSession, SaveMode, SessionError};
