use thiserror::Error;

/// Canonical result for core.
pub type Result<T> = std::result::Result<T, Error>;

/// Hard failures. Data-shape problems are never reported here: the decoder
/// and encoder coerce instead.
#[derive(Debug, Error)]
pub enum Error {
    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Store error: {0}")]
    Store(String),

    #[error("Write conflict on page '{page}': expected etag {expected:?}, found {found:?}")]
    Conflict {
        page: String,
        expected: Option<String>,
        found: Option<String>,
    },

    #[error("Serialization error: {0}")]
    Serde(String),
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serde(e.to_string())
    }
}
