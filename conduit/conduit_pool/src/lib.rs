#![deny(warnings)]
#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

//! # Conduit Pool
//!
//! A bounded pool of reusable network-backed resources such as database
//! connections.
//!
//! The pool hands out resources, tracks which ones are checked out, and takes
//! them back on release so they can be reused instead of re-established.
//! Opening connections is delegated to a [`ResourceFactory`] supplied by the
//! application.
//!
//! - At most `max_size` resources are checked out at any time
//! - A resource is never handed to two callers at once
//! - An exhausted pool fails fast with [`PoolError::PoolExhausted`]
//!
//! ```ignore
//! use conduit_pool::{Credentials, Pool};
//!
//! let pool = Pool::create("localhost:3306", Credentials::new("app", "secret"), 2, 3, factory)?;
//! let conn = pool.acquire()?;
//! // Use connection...
//! pool.release(Some(conn));
//! ```

/// Loading and validating pool configuration
pub mod config;

/// Error types for pool operations
pub mod error;

/// The pool itself and its drop guard
pub mod pool;

/// Factory and resource traits plus connection parameters
pub mod resource;

/// Usage counters
pub mod stats;

// Re-export key types for easier access
pub use config::PoolConfig;
pub use error::{BoxError, ConfigError, PoolError, Result};
pub use pool::{Pool, PoolGuard, ResourceOf};
pub use resource::{Credentials, Endpoint, Pooled, Resource, ResourceFactory, ResourceId};
pub use stats::PoolStats;
