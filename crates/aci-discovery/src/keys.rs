//! Public key repositories

use crate::error::{RepoError, RepoResult};
use crate::source::local_path;
use axum::body::Bytes;
use axum::http::StatusCode;
use axum::routing::any;
use axum::Router;
use url::Url;

/// Route serving the key bundle
pub const PUBKEYS_PATH: &str = "/pubkeys.gpg";

/// Serves the key bundle that signs the images
pub trait KeyRepo: Send + Sync {
    /// Absolute URL of the key bundle
    fn url(&self) -> String;

    /// Mount the key bundle on the blob store
    fn register(&self, router: Router) -> Router;
}

/// Open the key repository described by `uri`, reading the bundle eagerly.
pub async fn open_key_repo(endpoint: &Url, uri: &str) -> RepoResult<Box<dyn KeyRepo>> {
    let path = local_path(uri)?;
    let data = tokio::fs::read(&path)
        .await
        .map_err(|source| RepoError::KeyRead {
            path: path.clone(),
            source,
        })?;

    tracing::debug!(path = %path.display(), bytes = data.len(), "Loaded key bundle");

    Ok(Box::new(LocalKeyRepo::new(endpoint.clone(), data)))
}

/// Key bundle held in memory for the lifetime of the process
#[derive(Debug, Clone)]
pub struct LocalKeyRepo {
    endpoint: Url,
    data: Bytes,
}

impl LocalKeyRepo {
    pub fn new(endpoint: Url, data: impl Into<Bytes>) -> Self {
        Self {
            endpoint,
            data: data.into(),
        }
    }
}

impl KeyRepo for LocalKeyRepo {
    fn url(&self) -> String {
        let mut url = self.endpoint.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().push("pubkeys.gpg");
        }
        url.to_string()
    }

    fn register(&self, router: Router) -> Router {
        let data = self.data.clone();
        router.route(
            PUBKEYS_PATH,
            any(move || {
                let data = data.clone();
                async move { (StatusCode::OK, data) }
            }),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::endpoint_for;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use tower::ServiceExt;

    const BUNDLE: &[u8] = b"-----BEGIN PGP PUBLIC KEY BLOCK-----\n...\n";

    #[test]
    fn test_url_joins_path() {
        let repo = LocalKeyRepo::new(endpoint_for("example.com").unwrap(), BUNDLE);
        assert_eq!(repo.url(), "http://example.com/pubkeys.gpg");
    }

    #[test]
    fn test_url_keeps_endpoint_path() {
        let endpoint = Url::parse("http://example.com/aci/").unwrap();
        let repo = LocalKeyRepo::new(endpoint, BUNDLE);
        assert_eq!(repo.url(), "http://example.com/aci/pubkeys.gpg");
    }

    #[tokio::test]
    async fn test_open_reads_bundle() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pubkeys.gpg");
        std::fs::write(&path, BUNDLE).unwrap();

        let uri = Url::from_file_path(&path).unwrap();
        let repo = open_key_repo(&endpoint_for("example.com").unwrap(), uri.as_str())
            .await
            .unwrap();
        assert_eq!(repo.url(), "http://example.com/pubkeys.gpg");
    }

    #[tokio::test]
    async fn test_open_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let uri = Url::from_file_path(dir.path().join("absent.gpg")).unwrap();

        let result = open_key_repo(&endpoint_for("example.com").unwrap(), uri.as_str()).await;
        assert!(matches!(result, Err(RepoError::KeyRead { .. })));
    }

    #[tokio::test]
    async fn test_open_rejects_unsupported_scheme() {
        let result = open_key_repo(
            &endpoint_for("example.com").unwrap(),
            "https://keys.example.com/pubkeys.gpg",
        )
        .await;
        assert!(matches!(result, Err(RepoError::UnsupportedScheme { .. })));
    }

    #[tokio::test]
    async fn test_register_serves_bundle_for_any_method() {
        let repo = LocalKeyRepo::new(endpoint_for("example.com").unwrap(), BUNDLE);
        let app = repo.register(Router::new());

        for method in ["GET", "POST", "HEAD"] {
            let response = app
                .clone()
                .oneshot(
                    Request::builder()
                        .method(method)
                        .uri(PUBKEYS_PATH)
                        .body(Body::empty())
                        .unwrap(),
                )
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::OK, "method {}", method);
        }

        let response = app
            .oneshot(Request::builder().uri(PUBKEYS_PATH).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&bytes[..], BUNDLE);
    }
}
