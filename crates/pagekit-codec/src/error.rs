use thiserror::Error;

pub type Result<T> = std::result::Result<T, TemplateError>;

/// Problems with a page template. Stored data never produces these.
#[derive(Debug, Error)]
pub enum TemplateError {
    #[error("template yaml: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("template json: {0}")]
    Json(#[from] serde_json::Error),

    #[error("field '{field}' in section '{section}' has unknown type '{kind}'")]
    UnknownFieldType {
        section: String,
        field: String,
        kind: String,
    },

    #[error("empty {0} key")]
    EmptyKey(&'static str),

    #[error("duplicate section key '{0}'")]
    DuplicateSection(String),

    #[error("duplicate field id '{field}' in section '{section}'")]
    DuplicateField { section: String, field: String },

    #[error("duplicate item schema id '{sub}' in field '{section}.{field}'")]
    DuplicateSubField {
        section: String,
        field: String,
        sub: String,
    },

    #[error("fields '{first}' and '{second}' in section '{section}' both store under '{key}'")]
    StorageKeyCollision {
        section: String,
        first: String,
        second: String,
        key: String,
    },
}
