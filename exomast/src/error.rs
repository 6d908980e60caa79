//! Error types for the exoMAST client
//!
//! Every failure propagates to the caller of the method that triggered it.
//! Nothing is retried.

use std::path::PathBuf;
use thiserror::Error;

/// Example request that should always load while the service is up
pub const API_EXAMPLE_PATH: &str = "/exoplanets/identifiers/?name=kepler%201b";

/// Client error type
#[derive(Debug, Error)]
pub enum ExomastError {
    /// Mission-specific call on a record without a usable collection or id
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The service has no entry for the requested name or resource
    #[error("Not found: {0}")]
    NotFound(String),

    /// Server-side failure or a body that is malformed for its endpoint
    #[error(
        "Service error from {url}: {detail}\n\
         Confirm that {url} loads in your browser. If the API example URL \
         ending in {example} does not load either, the exoMAST API \
         server is likely unavailable.",
        example = API_EXAMPLE_PATH
    )]
    Service { url: String, detail: String },

    /// Explicit selection index outside the returned list
    #[error("{what} index {index} does not exist in range 0..{len}")]
    IndexOutOfRange {
        what: &'static str,
        index: usize,
        len: usize,
    },

    /// Payload failed to parse as JSON or as a spectrum table
    #[error("Decode error: {0}")]
    Decode(String),

    /// Transport failure before a response body was received
    #[error("Network error: {0}")]
    Network(String),

    /// Cache file written by an incompatible client version
    #[error("Stale cache file {path}: format version {found}, expected {expected}")]
    StaleCache {
        path: PathBuf,
        found: u32,
        expected: u32,
    },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// exomast-common error
    #[error("Common error: {0}")]
    Common(#[from] exomast_common::Error),
}

impl ExomastError {
    pub(crate) fn service(url: &str, detail: impl Into<String>) -> Self {
        ExomastError::Service {
            url: url.to_string(),
            detail: detail.into(),
        }
    }
}

/// Result type for client operations
pub type Result<T> = std::result::Result<T, ExomastError>;
