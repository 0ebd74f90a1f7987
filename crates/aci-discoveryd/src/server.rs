//! Server setup and lifecycle management

use crate::api::create_router;
use crate::api::rest::state::AppState;
use crate::config::DaemonConfig;
use crate::error::{DaemonError, DaemonResult};
use aci_discovery::{
    canonical_domain, endpoint_for, open_image_repo, open_key_repo, DiscoveryRenderer,
};
use axum::Router;
use std::sync::Arc;
use tokio::net::TcpListener;

/// ACI discovery server
pub struct Server {
    config: DaemonConfig,
    state: AppState,
}

impl Server {
    /// Create a new server, opening the image and key repositories.
    ///
    /// Any misconfiguration surfaces here, before a socket is bound.
    pub async fn new(config: DaemonConfig) -> DaemonResult<Self> {
        config.validate().map_err(DaemonError::Config)?;

        let discovery = &config.discovery;
        let endpoint = endpoint_for(&discovery.domain)?;

        let images = open_image_repo(&endpoint, &discovery.images, &discovery.allowed_images)?;
        let keys = open_key_repo(&endpoint, &discovery.keys).await?;

        let renderer = DiscoveryRenderer::new()?;

        // Prefixes must match the host the URLs are built from
        let domain = canonical_domain(&endpoint);

        let state = AppState::new(
            &domain,
            Arc::from(images),
            Arc::from(keys),
            Arc::new(renderer),
        );

        Ok(Self { config, state })
    }

    /// Router serving discovery documents, images and keys
    pub fn router(&self) -> Router {
        create_router(self.state.clone())
    }

    /// Run the server
    pub async fn run(self) -> DaemonResult<()> {
        let addr = self.config.server.listen_addr;
        let app = self.router();

        let listener = TcpListener::bind(addr).await?;

        tracing::info!("Serving ACI discovery on {}...", listener.local_addr()?);
        tracing::info!(domain = %self.state.domain, images = %self.config.discovery.images, "Discovery configured");

        // Run server with graceful shutdown
        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await
            .map_err(|e| DaemonError::Server(e.to_string()))?;

        tracing::info!("ACI discovery server shutting down");

        Ok(())
    }
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install signal handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating graceful shutdown");
        }
        _ = terminate => {
            tracing::info!("Received terminate signal, initiating graceful shutdown");
        }
    }
}
