//! Configuration types for Shelf.
//!
//! Configuration is loaded from a single YAML file (`shelf.yaml` by default).
//! Every section is optional; missing values fall back to the defaults below.
//!
//! ```yaml
//! server:
//!   host: 127.0.0.1
//!   port: 8000
//! database:
//!   url: sqlite://data/shelf.sqlite
//! session:
//!   cookie_name: shelf_session
//!   max_age_secs: 1209600
//! site:
//!   class_label: PBP C
//! products:
//!   enforce_ownership: false
//! ```

pub mod session;

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

pub use session::SessionConfig;

/// Complete Shelf configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ShelfConfig {
    /// HTTP listener settings.
    #[serde(default)]
    pub server: ServerConfig,

    /// SQLite database settings.
    #[serde(default)]
    pub database: DatabaseConfig,

    /// Session and cookie settings.
    #[serde(default)]
    pub session: SessionConfig,

    /// Text shown on rendered pages.
    #[serde(default)]
    pub site: SiteConfig,

    /// Product access rules.
    #[serde(default)]
    pub products: ProductsConfig,
}

/// HTTP listener configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to.
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl ServerConfig {
    /// Socket address string, e.g. `127.0.0.1:8000`.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Database configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// sqlx SQLite URL (`sqlite://path/to/file.sqlite` or `sqlite::memory:`).
    #[serde(default = "default_database_url")]
    pub url: String,

    /// Maximum pool connections.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: default_database_url(),
            max_connections: default_max_connections(),
        }
    }
}

/// Static text rendered on the listing page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteConfig {
    /// Page title suffix.
    #[serde(default = "default_title")]
    pub title: String,

    /// Class label shown next to the username.
    #[serde(default = "default_class_label")]
    pub class_label: String,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            title: default_title(),
            class_label: default_class_label(),
        }
    }
}

/// Product access rules.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProductsConfig {
    /// When set, edit and delete only resolve products owned by the caller.
    /// Exports stay unscoped either way.
    #[serde(default)]
    pub enforce_ownership: bool,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8000
}

fn default_database_url() -> String {
    "sqlite://data/shelf.sqlite".to_string()
}

fn default_max_connections() -> u32 {
    5
}

fn default_title() -> String {
    "Shelf".to_string()
}

fn default_class_label() -> String {
    "PBP C".to_string()
}

/// Error type for configuration loading.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl ShelfConfig {
    /// Load configuration from a YAML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path.as_ref())?;
        Self::from_yaml(&content)
    }

    /// Parse configuration from YAML content.
    pub fn from_yaml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yaml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from `path` if it exists, otherwise return defaults.
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if path.exists() {
            Self::from_file(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Reject values the server cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.database.max_connections == 0 {
            return Err(ConfigError::Config(
                "database.max_connections must be at least 1".to_string(),
            ));
        }
        if self.session.cookie_name.trim().is_empty() {
            return Err(ConfigError::Config(
                "session.cookie_name must not be empty".to_string(),
            ));
        }
        let expires = self
            .session
            .max_age()
            .and_then(|age| chrono::Utc::now().checked_add_signed(age));
        if expires.is_none() {
            return Err(ConfigError::Config(format!(
                "session.max_age_secs must be a positive number of seconds in range, got {}",
                self.session.max_age_secs
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn empty_yaml_yields_defaults() {
        let config = ShelfConfig::from_yaml("{}").unwrap();
        assert_eq!(config.server.bind_addr(), "127.0.0.1:8000");
        assert_eq!(config.site.class_label, "PBP C");
        assert_eq!(config.session.cookie_name, "shelf_session");
        assert!(!config.products.enforce_ownership);
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let yaml = r#"
server:
  port: 9000
products:
  enforce_ownership: true
"#;
        let config = ShelfConfig::from_yaml(yaml).unwrap();
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.server.host, "127.0.0.1");
        assert!(config.products.enforce_ownership);
        assert_eq!(config.database.max_connections, 5);
    }

    #[test]
    fn zero_connections_is_rejected() {
        let err = ShelfConfig::from_yaml("database:\n  max_connections: 0\n").unwrap_err();
        assert!(matches!(err, ConfigError::Config(_)));
    }

    #[test]
    fn session_age_must_be_positive_and_in_range() {
        for age in ["0", "-60", "9223372036854775807", "9223372036854775"] {
            let yaml = format!("session:\n  max_age_secs: {age}\n");
            let err = ShelfConfig::from_yaml(&yaml).unwrap_err();
            assert!(matches!(err, ConfigError::Config(_)), "accepted {age}");
        }

        let config = ShelfConfig::from_yaml("session:\n  max_age_secs: 3600\n").unwrap();
        assert_eq!(config.session.max_age(), Some(chrono::Duration::hours(1)));
    }

    #[test]
    fn loads_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "site:\n  class_label: PBP A").unwrap();
        let config = ShelfConfig::from_file(file.path()).unwrap();
        assert_eq!(config.site.class_label, "PBP A");
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = ShelfConfig::load_or_default(dir.path().join("absent.yaml")).unwrap();
        assert_eq!(config.server.port, 8000);
    }
}
