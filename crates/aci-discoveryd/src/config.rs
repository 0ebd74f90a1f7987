//! Configuration for aci-discoveryd

use serde::{Deserialize, Serialize};
use std::net::SocketAddr;

/// Main daemon configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DaemonConfig {
    /// Server configuration
    #[serde(default)]
    pub server: ServerConfig,

    /// Discovery configuration
    #[serde(default)]
    pub discovery: DiscoveryConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Listen address
    #[serde(default = "default_listen_addr")]
    pub listen_addr: SocketAddr,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: default_listen_addr(),
        }
    }
}

/// What is advertised and where it comes from
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscoveryConfig {
    /// User-facing domain routable to this server
    #[serde(default)]
    pub domain: String,

    /// Image source, must be a file:// URI
    #[serde(default = "default_images")]
    pub images: String,

    /// Key bundle source, must be a file:// URI
    #[serde(default = "default_keys")]
    pub keys: String,

    /// Explicit image names; when set, only these resolve
    #[serde(default)]
    pub allowed_images: Vec<String>,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            domain: String::new(),
            images: default_images(),
            keys: default_keys(),
            allowed_images: Vec::new(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level
    #[serde(default = "default_log_level")]
    pub level: String,

    /// JSON format
    #[serde(default)]
    pub json: bool,

    /// Include timestamps
    #[serde(default = "default_true")]
    pub timestamps: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
            timestamps: true,
        }
    }
}

// Default value helpers
fn default_true() -> bool {
    true
}

fn default_listen_addr() -> SocketAddr {
    SocketAddr::from(([0, 0, 0, 0], 80))
}

fn default_images() -> String {
    "file:///opt/aci/images".to_string()
}

fn default_keys() -> String {
    "file:///opt/aci/pubkeys.gpg".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

impl DaemonConfig {
    /// Load configuration from defaults, an optional file and `ACI_*` environment variables
    pub fn load(path: Option<&str>) -> Result<Self, config::ConfigError> {
        let mut builder = config::Config::builder();

        // Add default configuration
        builder = builder.add_source(config::Config::try_from(&DaemonConfig::default())?);

        // Add file configuration if provided
        if let Some(path) = path {
            builder = builder.add_source(config::File::with_name(path).required(true));
        }

        // Environment variables, e.g. ACI_DISCOVERY__DOMAIN=example.com
        builder = builder.add_source(
            config::Environment::with_prefix("ACI")
                .prefix_separator("_")
                .separator("__")
                .list_separator(",")
                .with_list_parse_key("discovery.allowed_images")
                .try_parsing(true),
        );

        builder.build()?.try_deserialize()
    }

    /// Check settings that cannot be defaulted
    pub fn validate(&self) -> Result<(), String> {
        if self.discovery.domain.trim().is_empty() {
            return Err("domain must be set".to_string());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = DaemonConfig::default();
        assert_eq!(config.server.listen_addr.port(), 80);
        assert_eq!(config.discovery.images, "file:///opt/aci/images");
        assert_eq!(config.discovery.keys, "file:///opt/aci/pubkeys.gpg");
        assert!(config.discovery.allowed_images.is_empty());
    }

    #[test]
    fn test_logging_defaults() {
        let config = LoggingConfig::default();
        assert_eq!(config.level, "info");
        assert!(!config.json);
        assert!(config.timestamps);
    }

    #[test]
    fn test_validate_requires_domain() {
        let mut config = DaemonConfig::default();
        assert!(config.validate().is_err());

        config.discovery.domain = "   ".to_string();
        assert!(config.validate().is_err());

        config.discovery.domain = "example.com".to_string();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            r#"
[server]
listen_addr = "127.0.0.1:8080"

[discovery]
domain = "example.com"
allowed_images = ["hello", "world"]
"#
        )
        .unwrap();

        let config = DaemonConfig::load(file.path().to_str()).unwrap();
        assert_eq!(config.server.listen_addr.port(), 8080);
        assert_eq!(config.discovery.domain, "example.com");
        assert_eq!(config.discovery.allowed_images, vec!["hello", "world"]);
        assert_eq!(config.discovery.keys, "file:///opt/aci/pubkeys.gpg");
    }
}
