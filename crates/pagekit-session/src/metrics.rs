//! Structured session events under the `pagekit::session` target.
//!
//! Subscribers (the CLI's `EnvFilter`, or whatever the host installs) decide
//! whether they are kept.

#[cfg(feature = "tracing")]
pub fn emit_event(event: &str, fields: &[(&str, String)]) {
    let rendered = fields
        .iter()
        .map(|(k, v)| format!("{k}={v}"))
        .collect::<Vec<_>>()
        .join(" ");
    tracing::debug!(target: "pagekit::session", event, fields = %rendered);
}

#[cfg(not(feature = "tracing"))]
pub fn emit_event(_event: &str, _fields: &[(&str, String)]) {}
