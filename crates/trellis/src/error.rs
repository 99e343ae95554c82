//! Error types for routing and configuration.

use thiserror::Error;

/// Errors raised while configuring a router or server.
///
/// None of these are produced per request: a routing miss is not an error, it
/// simply lets the dispatch chain continue.
#[derive(Debug, Error)]
pub enum RouterError {
    /// A route was registered with a blank method string.
    #[error("every route must have a method such as GET, POST or `*`")]
    MissingMethod,

    /// A route method string contained no verb, or a verb that is not a
    /// known HTTP method.
    #[error("invalid route method: {0:?}")]
    InvalidMethod(String),

    /// A literal path template could not be compiled.
    #[error("invalid path pattern {pattern:?}: {source}")]
    InvalidPattern {
        /// The template as given at registration.
        pattern: String,
        /// The underlying regex error.
        #[source]
        source: regex::Error,
    },

    /// A request verb that is not one of the supported HTTP methods.
    #[error("unknown HTTP method: {0}")]
    UnknownMethod(String),

    /// A configuration document could not be parsed.
    #[error("invalid configuration: {0}")]
    Config(#[from] serde_json::Error),
}

/// Result type alias for router operations.
pub type Result<T> = std::result::Result<T, RouterError>;
