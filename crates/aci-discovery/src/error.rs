//! Error types for aci-discovery

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while opening or querying a repository
#[derive(Debug, Error)]
pub enum RepoError {
    /// Source descriptor is not a valid URI
    #[error("Invalid source URI {uri}: {source}")]
    InvalidUri {
        uri: String,
        #[source]
        source: url::ParseError,
    },

    /// Only `file://` sources are supported
    #[error("Unsupported scheme {scheme:?} in {uri}, must be file://")]
    UnsupportedScheme { uri: String, scheme: String },

    /// `file://` URI that does not name a local absolute path
    #[error("Source URI {0} does not name a local path")]
    InvalidPath(String),

    /// Serving domain cannot form an http endpoint
    #[error("Invalid serving domain {domain:?}: {source}")]
    InvalidEndpoint {
        domain: String,
        #[source]
        source: url::ParseError,
    },

    /// Key bundle could not be read at startup
    #[error("Failed reading keys from {path}: {source}")]
    KeyRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// IO error while inspecting an image directory
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors raised while rendering a discovery document
#[derive(Debug, Error)]
pub enum RenderError {
    /// The template failed to register or render
    #[error("Failed rendering discovery template: {0}")]
    Template(#[from] tera::Error),

    /// The response sink rejected a write
    #[error("Failed writing discovery document: {0}")]
    Write(#[from] std::io::Error),
}

/// Result type alias for repository operations
pub type RepoResult<T> = Result<T, RepoError>;
