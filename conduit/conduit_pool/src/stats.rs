//! Pool statistics.

use serde::{Deserialize, Serialize};

/// Counters describing how a pool has been used
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolStats {
    /// Total number of resources created by the factory
    pub total_created: usize,

    /// Total number of successful acquisitions
    pub total_checkouts: usize,

    /// Total number of handles released back into the pool
    pub total_returns: usize,

    /// Number of released handles this pool never checked out
    pub total_adopted: usize,

    /// Number of acquisitions rejected because the pool was exhausted
    pub total_exhausted: usize,

    /// Number of factory calls that failed
    pub total_creation_failures: usize,
}
