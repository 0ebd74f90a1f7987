//! Image repositories
//!
//! An image repository answers two questions for the discovery handler:
//! does a name resolve, and what is its artifact URL template. It also
//! mounts its backing directory on the router so the templated URLs can be
//! fetched.

use crate::error::{RepoError, RepoResult};
use crate::source::{endpoint_base, local_path};
use async_trait::async_trait;
use axum::Router;
use std::collections::BTreeSet;
use std::io;
use std::path::{Path, PathBuf};
use tower_http::services::ServeDir;
use url::Url;

/// Route prefix of the filesystem layout
pub const REPO_PREFIX: &str = "/repo";

/// Route prefix of the enumerated layout
pub const IMAGES_PREFIX: &str = "/images";

/// Resolves image names to artifact URL templates
#[async_trait]
pub trait ImageRepo: Send + Sync {
    /// Whether `name` resolves to an image this repository serves
    async fn contains(&self, name: &str) -> RepoResult<bool>;

    /// Artifact URL template for `name`, placeholders left literal
    fn url(&self, name: &str) -> String;

    /// Mount the backing directory on the blob store
    fn register(&self, router: Router) -> Router;
}

/// Open the image repository described by `uri`.
///
/// A non-empty `allowed` list selects the enumerated layout under
/// `/images/`; otherwise the directory is served as an `{os}/{arch}` tree
/// under `/repo/`.
pub fn open_image_repo(
    endpoint: &Url,
    uri: &str,
    allowed: &[String],
) -> RepoResult<Box<dyn ImageRepo>> {
    let dir = local_path(uri)?;

    if allowed.is_empty() {
        tracing::debug!(dir = %dir.display(), "Opened filesystem image repo");
        Ok(Box::new(LocalImageRepo::new(endpoint.clone(), dir)))
    } else {
        tracing::debug!(dir = %dir.display(), images = allowed.len(), "Opened listed image repo");
        Ok(Box::new(ListedImageRepo::new(
            endpoint.clone(),
            dir,
            allowed.iter().cloned(),
        )))
    }
}

/// Directory laid out as `{dir}/{os}/{arch}/{name}-{version}.{ext}`
#[derive(Debug, Clone)]
pub struct LocalImageRepo {
    endpoint: Url,
    dir: PathBuf,
}

impl LocalImageRepo {
    pub fn new(endpoint: Url, dir: impl Into<PathBuf>) -> Self {
        Self {
            endpoint,
            dir: dir.into(),
        }
    }
}

#[async_trait]
impl ImageRepo for LocalImageRepo {
    async fn contains(&self, name: &str) -> RepoResult<bool> {
        if !is_plain_name(name) {
            return Ok(false);
        }

        let prefix = format!("{}-", name);
        for os_dir in subdirs(&self.dir).await? {
            for arch_dir in subdirs(&os_dir).await? {
                if has_file_with_prefix(&arch_dir, &prefix).await? {
                    return Ok(true);
                }
            }
        }

        Ok(false)
    }

    fn url(&self, name: &str) -> String {
        // Formatted by hand: a URL builder would percent-encode the braces.
        format!(
            "{}{}/{{os}}/{{arch}}/{}-{{version}}.{{ext}}",
            endpoint_base(&self.endpoint),
            REPO_PREFIX,
            name
        )
    }

    fn register(&self, router: Router) -> Router {
        router.nest_service(REPO_PREFIX, ServeDir::new(&self.dir))
    }
}

/// Flat directory serving an explicit set of image names as
/// `{dir}/{name}-{version}-{os}-{arch}.{ext}`
#[derive(Debug, Clone)]
pub struct ListedImageRepo {
    endpoint: Url,
    dir: PathBuf,
    images: BTreeSet<String>,
}

impl ListedImageRepo {
    pub fn new(
        endpoint: Url,
        dir: impl Into<PathBuf>,
        images: impl IntoIterator<Item = String>,
    ) -> Self {
        Self {
            endpoint,
            dir: dir.into(),
            images: images.into_iter().collect(),
        }
    }
}

#[async_trait]
impl ImageRepo for ListedImageRepo {
    async fn contains(&self, name: &str) -> RepoResult<bool> {
        Ok(self.images.contains(name))
    }

    fn url(&self, name: &str) -> String {
        format!(
            "{}{}/{}-{{version}}-{{os}}-{{arch}}.{{ext}}",
            endpoint_base(&self.endpoint),
            IMAGES_PREFIX,
            name
        )
    }

    fn register(&self, router: Router) -> Router {
        router.nest_service(IMAGES_PREFIX, ServeDir::new(&self.dir))
    }
}

fn is_plain_name(name: &str) -> bool {
    !matches!(name, "" | "." | "..") && !name.contains(&['/', '\\'][..])
}

async fn subdirs(dir: &Path) -> RepoResult<Vec<PathBuf>> {
    let mut entries = match tokio::fs::read_dir(dir).await {
        Ok(entries) => entries,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(RepoError::Io(e)),
    };

    let mut dirs = Vec::new();
    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        if is_dir(&path).await? == Some(true) {
            dirs.push(path);
        }
    }
    Ok(dirs)
}

/// Follows symlinks, as the blob store does. `None` for dangling links.
async fn is_dir(path: &Path) -> RepoResult<Option<bool>> {
    match tokio::fs::metadata(path).await {
        Ok(metadata) => Ok(Some(metadata.is_dir())),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(RepoError::Io(e)),
    }
}

async fn has_file_with_prefix(dir: &Path, prefix: &str) -> RepoResult<bool> {
    let mut entries = tokio::fs::read_dir(dir).await?;
    while let Some(entry) = entries.next_entry().await? {
        let file_name = entry.file_name();
        let Some(file_name) = file_name.to_str() else {
            continue;
        };
        if file_name.len() > prefix.len()
            && file_name.starts_with(prefix)
            && is_dir(&entry.path()).await? == Some(false)
        {
            return Ok(true);
        }
    }
    Ok(false)
}
