pub fn is_transient<S: AsRef<str>>(value: &str, prefixes: &[S]) -> bool {
    prefixes
        .iter()
        .map(AsRef::as_ref)
        .any(|p| !p.is_empty() && value.starts_with(p))
}

/// `""` for transient local references, the value itself otherwise.
pub fn scrub_transient<S: AsRef<str>>(value: &str, prefixes: &[S]) -> String {
    if is_transient(value, prefixes) {
        #[cfg(feature = "tracing")]
        tracing::debug!(value, "dropping transient reference");
        String::new()
    } else {
        value.to_string()
    }
}
