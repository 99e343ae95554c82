//! Server configuration.

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Settings for the dispatch engine and the bundled middleware.
///
/// Every field has a default, so a configuration document only needs to list
/// what it changes:
///
/// ```
/// use trellis::ServerConfig;
///
/// let config = ServerConfig::from_json(r#"{ "body_limit": 1048576 }"#).unwrap();
/// assert_eq!(config.body_limit, 1_048_576);
/// assert!(config.log_unhandled);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Log requests that fall through to the default 404.
    pub log_unhandled: bool,
    /// Largest body, in bytes, the body parser will decode.
    pub body_limit: usize,
    /// File served for directory requests by the static file middleware.
    pub static_index: String,
}

impl ServerConfig {
    /// Default body limit: 10 KiB.
    pub const DEFAULT_BODY_LIMIT: usize = 10 * 1024;

    /// Parses a JSON configuration document.
    ///
    /// # Errors
    ///
    /// Returns [`RouterError::Config`](crate::RouterError::Config) if the
    /// document is not valid JSON or has fields of the wrong type.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            log_unhandled: true,
            body_limit: Self::DEFAULT_BODY_LIMIT,
            static_index: "index.html".to_string(),
        }
    }
}
