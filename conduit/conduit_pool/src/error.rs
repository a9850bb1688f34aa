//! Error types for pool construction and acquisition.

use thiserror::Error;

/// Boxed error produced by a factory or resource collaborator.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Error returned by pool operations
#[derive(Error, Debug)]
pub enum PoolError {
    /// The factory could not produce a resource
    #[error("failed to create resource: {0}")]
    CreationFailed(#[source] BoxError),

    /// No resource is available and the pool is at capacity
    #[error("resource pool exhausted: all {max_size} resources are in use")]
    PoolExhausted {
        /// Capacity of the exhausted pool
        max_size: usize,
    },

    /// Construction parameters are inconsistent
    #[error("invalid pool configuration: {0}")]
    InvalidConfig(String),

    /// A loaded configuration was rejected
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
}

impl PoolError {
    /// Wrap a collaborator error as a creation failure
    pub fn creation<E>(err: E) -> Self
    where
        E: Into<BoxError>,
    {
        Self::CreationFailed(err.into())
    }

    /// Whether this error reports an exhausted pool
    pub fn is_exhausted(&self) -> bool {
        matches!(self, Self::PoolExhausted { .. })
    }
}

/// Errors from loading or validating a [`PoolConfig`](crate::config::PoolConfig)
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The configuration file could not be read
    #[error("failed to read configuration file {path}: {source}")]
    Io {
        /// Path that was being read
        path: String,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// The configuration text is not valid TOML for a pool config
    #[error("failed to parse configuration: {0}")]
    Parse(#[from] toml::de::Error),

    /// The configuration parsed but violates a constraint
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Result alias for pool operations
pub type Result<T> = std::result::Result<T, PoolError>;
