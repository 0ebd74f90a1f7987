//! Source descriptors and endpoints

use crate::error::{RepoError, RepoResult};
use std::path::PathBuf;
use url::Url;

/// The only scheme a repository can be opened from
pub const FILE_SCHEME: &str = "file";

/// Resolve a `file://` source descriptor to a local path.
///
/// Any other scheme is rejected so that a misconfigured daemon fails at
/// startup instead of serving broken URLs.
pub fn local_path(uri: &str) -> RepoResult<PathBuf> {
    let parsed = Url::parse(uri).map_err(|source| RepoError::InvalidUri {
        uri: uri.to_string(),
        source,
    })?;

    if parsed.scheme() != FILE_SCHEME {
        return Err(RepoError::UnsupportedScheme {
            uri: uri.to_string(),
            scheme: parsed.scheme().to_string(),
        });
    }

    parsed
        .to_file_path()
        .map_err(|_| RepoError::InvalidPath(uri.to_string()))
}

/// Public http endpoint for a serving domain, e.g. `http://example.com/`.
pub fn endpoint_for(domain: &str) -> RepoResult<Url> {
    Url::parse(&format!("http://{}", domain)).map_err(|source| RepoError::InvalidEndpoint {
        domain: domain.to_string(),
        source,
    })
}

/// Domain as it appears in the endpoint: lowercased host, default port dropped.
///
/// Discovery prefixes use this form so they agree with the advertised URLs.
pub fn canonical_domain(endpoint: &Url) -> String {
    let host = endpoint.host_str().unwrap_or_default();
    match endpoint.port() {
        Some(port) => format!("{}:{}", host, port),
        None => host.to_string(),
    }
}

/// Endpoint as a string prefix without a trailing slash.
pub(crate) fn endpoint_base(endpoint: &Url) -> &str {
    endpoint.as_str().trim_end_matches('/')
}
