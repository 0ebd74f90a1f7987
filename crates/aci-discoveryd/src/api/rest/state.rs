//! Application state for API handlers

use aci_discovery::{DiscoveryRenderer, ImageRepo, KeyRepo};
use std::sync::Arc;

/// Shared application state, read-only once the server starts
#[derive(Clone)]
pub struct AppState {
    /// User-facing domain, prefix of every discovery entry
    pub domain: Arc<str>,

    /// Image repository
    pub images: Arc<dyn ImageRepo>,

    /// Key repository
    pub keys: Arc<dyn KeyRepo>,

    /// Discovery document template
    pub renderer: Arc<DiscoveryRenderer>,
}

impl AppState {
    /// Create new application state
    pub fn new(
        domain: &str,
        images: Arc<dyn ImageRepo>,
        keys: Arc<dyn KeyRepo>,
        renderer: Arc<DiscoveryRenderer>,
    ) -> Self {
        Self {
            domain: Arc::from(domain),
            images,
            keys,
            renderer,
        }
    }
}
