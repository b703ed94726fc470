//! Editor configuration that downstream crates can serialize/deserialize.

use serde::{Deserialize, Serialize};

/// Prefix of browser-local object URLs created for uploads that have not
/// finished. Such values must never be persisted.
pub const DEFAULT_TRANSIENT_PREFIXES: &[&str] = &["blob:"];

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EditorConfig {
    /// Optional fully-qualified store URI (`file:///srv/pages`, `memory://`).
    pub store_uri: Option<String>,

    /// Directory for page documents when no URI is given.
    pub store_dir: String,

    /// Scalar values starting with any of these are encoded as `""`.
    pub transient_prefixes: Vec<String>,

    /// Pretty-print page documents written by the filesystem store.
    pub pretty_json: bool,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            store_uri: None,
            store_dir: "./pagekit-data".to_string(),
            transient_prefixes: DEFAULT_TRANSIENT_PREFIXES
                .iter()
                .map(|p| p.to_string())
                .collect(),
            pretty_json: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    pub uri: Option<String>,
    pub root: String,
    pub pretty_json: bool,
}

impl StoreConfig {
    pub fn scheme(&self) -> Option<&str> {
        self.uri
            .as_deref()
            .filter(|uri| uri.contains("://"))
            .and_then(|uri| uri.split("://").next())
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
    }
}

impl EditorConfig {
    /// Create a config from environment variables, falling back to defaults.
    ///
    /// Environment variables:
    /// - `PAGEKIT_STORE_URI`: store URI
    /// - `PAGEKIT_STORE_DIR`: directory for page documents
    /// - `PAGEKIT_TRANSIENT_PREFIXES`: comma-separated scrub prefixes
    /// - `PAGEKIT_PRETTY_JSON`: `true`/`false`
    pub fn from_env() -> Self {
        let mut cfg = Self::default();

        if let Ok(s) = std::env::var("PAGEKIT_STORE_URI") {
            cfg.store_uri = Some(s);
        }

        if let Ok(s) = std::env::var("PAGEKIT_STORE_DIR") {
            cfg.store_dir = s;
        }

        if let Ok(s) = std::env::var("PAGEKIT_TRANSIENT_PREFIXES") {
            cfg.transient_prefixes = parse_prefix_list(&s);
        }

        if let Ok(s) = std::env::var("PAGEKIT_PRETTY_JSON") {
            if let Ok(v) = s.parse::<bool>() {
                cfg.pretty_json = v;
            }
        }

        cfg
    }

    /// Produce a store configuration snapshot used by the IO layer.
    pub fn store_config(&self) -> StoreConfig {
        let scheme = self
            .store_uri
            .as_deref()
            .and_then(|uri| uri.split_once("://"))
            .map(|(s, _)| s.trim().to_string())
            .filter(|s| !s.is_empty());

        let root = match (scheme.as_deref(), self.store_uri.as_ref()) {
            (Some("file"), Some(uri)) => {
                file_uri_to_path(uri).unwrap_or_else(|| self.store_dir.clone())
            }
            (Some(_), Some(uri)) => uri.trim_end_matches('/').to_string(),
            _ => self.store_dir.clone(),
        };

        StoreConfig {
            uri: self.store_uri.clone(),
            root,
            pretty_json: self.pretty_json,
        }
    }
}

fn parse_prefix_list(s: &str) -> Vec<String> {
    s.split(',')
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(str::to_string)
        .collect()
}

fn file_uri_to_path(uri: &str) -> Option<String> {
    let stripped = uri.strip_prefix("file://")?;
    if stripped.starts_with('/') {
        Some(stripped.to_string())
    } else {
        Some(format!("/{}", stripped))
    }
}
