//! ACI discovery daemon
//!
//! Serves `ac-discovery` meta tags for images under a domain, the image
//! files themselves and the public keys that sign them.

use aci_discoveryd::config::LoggingConfig;
use aci_discoveryd::error::{DaemonError, DaemonResult};
use aci_discoveryd::{DaemonConfig, Server};
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// ACI discovery daemon CLI
#[derive(Parser)]
#[command(name = "aci-discoveryd")]
#[command(about = "ACI discovery server - advertises image and key locations", long_about = None)]
#[command(version)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, env = "ACI_CONFIG")]
    config: Option<String>,

    /// User-facing domain routable to this server
    #[arg(short, long, env = "ACI_DOMAIN")]
    domain: Option<String>,

    /// IP and port to bind
    #[arg(short, long, env = "ACI_LISTEN_ADDR")]
    listen: Option<String>,

    /// Image source, e.g. file:///opt/aci/images
    #[arg(long, env = "ACI_IMAGES")]
    images: Option<String>,

    /// Key bundle source, e.g. file:///opt/aci/pubkeys.gpg
    #[arg(long, env = "ACI_KEYS")]
    keys: Option<String>,

    /// Image name to serve; repeat to build an allow-list
    #[arg(long = "image", value_name = "NAME")]
    allowed_images: Vec<String>,

    /// Log level
    #[arg(long, env = "ACI_LOG_LEVEL")]
    log_level: Option<String>,

    /// Enable JSON logging
    #[arg(long, env = "ACI_LOG_JSON")]
    log_json: bool,

    /// Omit timestamps, e.g. when a supervisor stamps log lines
    #[arg(long)]
    no_timestamps: bool,
}

impl Cli {
    /// Apply command-line overrides on top of the loaded configuration
    fn apply(self, config: &mut DaemonConfig) -> DaemonResult<()> {
        if let Some(domain) = self.domain {
            config.discovery.domain = domain;
        }
        if let Some(listen) = self.listen {
            config.server.listen_addr = listen
                .parse()
                .map_err(|e| DaemonError::Config(format!("Invalid listen address: {}", e)))?;
        }
        if let Some(images) = self.images {
            config.discovery.images = images;
        }
        if let Some(keys) = self.keys {
            config.discovery.keys = keys;
        }
        if !self.allowed_images.is_empty() {
            config.discovery.allowed_images = self.allowed_images;
        }
        if let Some(level) = self.log_level {
            config.logging.level = level;
        }
        if self.log_json {
            config.logging.json = true;
        }
        if self.no_timestamps {
            config.logging.timestamps = false;
        }
        Ok(())
    }
}

fn init_tracing(logging: &LoggingConfig) {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| logging.level.clone().into());

    let registry = tracing_subscriber::registry().with(env_filter);
    match (logging.json, logging.timestamps) {
        (true, true) => registry.with(tracing_subscriber::fmt::layer().json()).init(),
        (true, false) => registry
            .with(tracing_subscriber::fmt::layer().json().without_time())
            .init(),
        (false, true) => registry.with(tracing_subscriber::fmt::layer()).init(),
        (false, false) => registry
            .with(tracing_subscriber::fmt::layer().without_time())
            .init(),
    }
}

#[tokio::main]
async fn main() -> DaemonResult<()> {
    let cli = Cli::parse();

    // Load configuration
    let mut config = DaemonConfig::load(cli.config.as_deref())
        .map_err(|e| DaemonError::Config(e.to_string()))?;

    // Override with CLI args
    cli.apply(&mut config)?;

    init_tracing(&config.logging);

    if let Err(e) = config.validate() {
        tracing::error!("{}", e);
        return Err(DaemonError::Config(e));
    }

    let server = Server::new(config).await.map_err(|e| {
        tracing::error!(error = %e, "Unable to start ACI discovery server");
        e
    })?;
    server.run().await
}
