use serde_json::Value;

/// Join an array of stored bullet strings into one editable string.
/// Non-string entries are skipped.
pub fn join_bullets(items: &[Value]) -> String {
    items
        .iter()
        .filter_map(Value::as_str)
        .collect::<Vec<_>>()
        .join("\n")
}

/// Split an edited bullet string back into trimmed, non-blank lines.
pub fn split_bullets(text: &str) -> Vec<Value> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(|line| Value::String(line.to_string()))
        .collect()
}
