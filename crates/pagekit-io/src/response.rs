//! The `{ok, data?, error?}` envelope returned by the page backend.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use pagekit_core::error::{Error, Result};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoreResponse {
    pub ok: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl StoreResponse {
    pub fn ok(data: Option<Value>) -> Self {
        Self {
            ok: true,
            data,
            error: None,
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            data: None,
            error: Some(message.into()),
        }
    }

    pub fn from_result(res: &Result<Option<Value>>) -> Self {
        match res {
            Ok(data) => Self::ok(data.clone()),
            Err(e) => Self::failed(e.to_string()),
        }
    }

    /// Surface a failed envelope as `Error::Store`.
    pub fn into_result(self) -> Result<Option<Value>> {
        if self.ok {
            Ok(self.data)
        } else {
            Err(Error::Store(
                self.error.unwrap_or_else(|| "store request failed".to_string()),
            ))
        }
    }
}
