//! Pool configuration.
//!
//! Configuration is read from TOML:
//!
//! ```toml
//! endpoint = "localhost:3306"
//! user = "app"
//! password = "secret"
//! initial_size = 2
//! max_size = 3
//! ```

use log::info;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

use crate::error::ConfigError;
use crate::resource::{Credentials, Endpoint};

/// Connection parameters and sizing for a pool
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolConfig {
    /// Address of the backing service
    pub endpoint: String,

    /// User name presented to the service
    #[serde(default)]
    pub user: String,

    /// Password presented to the service
    #[serde(default)]
    pub password: String,

    /// Number of resources created up front
    #[serde(default = "default_initial_size")]
    pub initial_size: usize,

    /// Maximum number of checked-out resources
    #[serde(default = "default_max_size")]
    pub max_size: usize,
}

fn default_initial_size() -> usize {
    2
}

fn default_max_size() -> usize {
    3
}

impl PoolConfig {
    /// Create a configuration with default sizing
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            user: String::new(),
            password: String::new(),
            initial_size: default_initial_size(),
            max_size: default_max_size(),
        }
    }

    /// Parse and validate a configuration from TOML text
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a configuration file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        info!("Loading pool configuration from {}", path.display());

        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    /// Check the sizing and endpoint constraints
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.endpoint.trim().is_empty() {
            return Err(ConfigError::Invalid("endpoint cannot be empty".to_string()));
        }

        if self.initial_size > self.max_size {
            return Err(ConfigError::Invalid(format!(
                "initial_size ({}) cannot exceed max_size ({})",
                self.initial_size, self.max_size
            )));
        }

        Ok(())
    }

    /// The endpoint as a typed value
    pub fn endpoint(&self) -> Endpoint {
        Endpoint::new(self.endpoint.clone())
    }

    /// The credentials as a typed value
    pub fn credentials(&self) -> Credentials {
        Credentials::new(self.user.clone(), self.password.clone())
    }
}

impl fmt::Debug for PoolConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PoolConfig")
            .field("endpoint", &self.endpoint)
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .field("initial_size", &self.initial_size)
            .field("max_size", &self.max_size)
            .finish()
    }
}
