//! ACI Discovery - image and key location for the `ac-discovery` protocol
//!
//! A client asking for `example.com/hello` fetches
//! `https://example.com/hello?ac-discovery=1` and expects an HTML document
//! carrying two `<meta>` tags: one with a URL template for the image
//! artifact, one with the URL of the public keys that sign it.
//!
//! ## Components
//!
//! - **DiscoveryEntry**: the three strings a discovery document is made of
//! - **DiscoveryRenderer**: renders an entry into the HTML document
//! - **ImageRepo**: resolves an image name to an artifact URL template
//! - **KeyRepo**: serves the key bundle and reports its URL
//!
//! Repositories are opened once at startup from `file://` source
//! descriptors and are read-only afterwards.

#![deny(unsafe_code)]

pub mod entry;
pub mod error;
pub mod image;
pub mod keys;
pub mod source;
pub mod template;

pub use entry::DiscoveryEntry;
pub use error::{RenderError, RepoError, RepoResult};
pub use image::{open_image_repo, ImageRepo, ListedImageRepo, LocalImageRepo};
pub use keys::{open_key_repo, KeyRepo, LocalKeyRepo};
pub use source::{canonical_domain, endpoint_for, local_path};
pub use template::DiscoveryRenderer;
