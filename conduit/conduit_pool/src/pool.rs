//! The bounded resource pool.
//!
//! A [`Pool`] keeps idle resources in an `available` stack and tracks the
//! identifiers of checked-out resources in an `in_use` set. Both live behind
//! a single mutex so every acquire and release is atomic with respect to
//! other callers. The mutex is held across factory calls as well, so a slow
//! connect delays other pool operations but can never overshoot capacity.

use log::{debug, info, trace, warn};
use parking_lot::Mutex;
use std::collections::HashSet;
use std::fmt;
use std::ops::{Deref, DerefMut};
use std::sync::{Arc, Weak};

use crate::config::PoolConfig;
use crate::error::{PoolError, Result};
use crate::resource::{Credentials, Endpoint, Pooled, Resource, ResourceFactory, ResourceId};
use crate::stats::PoolStats;

/// Resource type produced by factory `F`
pub type ResourceOf<F> = <F as ResourceFactory>::Resource;

/// Mutable pool state, guarded by the pool's mutex
struct PoolState<R> {
    /// Idle resources, most recently returned last
    available: Vec<Pooled<R>>,

    /// Identifiers of resources currently checked out
    in_use: HashSet<ResourceId>,

    /// Usage counters
    stats: PoolStats,
}

/// A bounded pool of reusable resources
pub struct Pool<F: ResourceFactory> {
    /// Creates new resources on demand
    factory: F,

    /// Where new resources connect to
    endpoint: Endpoint,

    /// Credentials passed to the factory
    credentials: Credentials,

    /// Upper bound on checked-out resources
    max_size: usize,

    /// All mutable state, under one lock
    state: Mutex<PoolState<ResourceOf<F>>>,
}

/// Close a resource, logging instead of propagating failures
fn close_quietly<R: Resource>(pooled: Pooled<R>) {
    let id = pooled.id();
    if let Err(e) = pooled.close() {
        warn!("Failed to close resource {}: {}", id, e);
    } else {
        trace!("Closed resource {}", id);
    }
}

impl<F: ResourceFactory> Pool<F> {
    /// Create a pool and pre-populate it with `initial_size` resources.
    ///
    /// Resources are created one after another. If any creation fails, every
    /// resource created so far is closed and the factory's error is returned.
    /// `initial_size` must not exceed `max_size`.
    pub fn create(
        endpoint: impl Into<Endpoint>,
        credentials: Credentials,
        initial_size: usize,
        max_size: usize,
        factory: F,
    ) -> Result<Self> {
        let endpoint = endpoint.into();

        if initial_size > max_size {
            return Err(PoolError::InvalidConfig(format!(
                "initial size {} exceeds max size {}",
                initial_size, max_size
            )));
        }

        info!(
            "Initializing resource pool for {} with {} resources (max {})",
            endpoint, initial_size, max_size
        );

        let mut available = Vec::with_capacity(initial_size);
        for _ in 0..initial_size {
            match factory.create(&endpoint, &credentials) {
                Ok(resource) => available.push(Pooled::new(resource)),
                Err(e) => {
                    warn!(
                        "Failed to create resource {} of {} for {}: {}; closing {} already created",
                        available.len() + 1,
                        initial_size,
                        endpoint,
                        e,
                        available.len()
                    );
                    for pooled in available.drain(..) {
                        close_quietly(pooled);
                    }
                    return Err(PoolError::creation(e));
                }
            }
        }

        debug!(
            "Resource pool for {} initialized with {} resources",
            endpoint,
            available.len()
        );

        let stats = PoolStats {
            total_created: available.len(),
            ..Default::default()
        };

        Ok(Self {
            factory,
            endpoint,
            credentials,
            max_size,
            state: Mutex::new(PoolState {
                available,
                in_use: HashSet::new(),
                stats,
            }),
        })
    }

    /// Create a pool from a loaded configuration
    pub fn from_config(config: &PoolConfig, factory: F) -> Result<Self> {
        config.validate()?;

        Self::create(
            config.endpoint(),
            config.credentials(),
            config.initial_size,
            config.max_size,
            factory,
        )
    }

    /// Check out a resource.
    ///
    /// An idle resource is reused if there is one. Otherwise a new resource is
    /// created, provided fewer than `max_size` are checked out. If neither is
    /// possible this fails with [`PoolError::PoolExhausted`] without waiting.
    pub fn acquire(&self) -> Result<Pooled<ResourceOf<F>>> {
        let mut state = self.state.lock();

        // Adopted handles can fill `available` past capacity; never let them
        // push the checked-out count over the bound.
        if state.in_use.len() >= self.max_size {
            state.stats.total_exhausted += 1;
            warn!(
                "Resource pool for {} exhausted ({} of {} in use)",
                self.endpoint,
                state.in_use.len(),
                self.max_size
            );
            return Err(PoolError::PoolExhausted {
                max_size: self.max_size,
            });
        }

        let pooled = match state.available.pop() {
            Some(pooled) => {
                trace!("Reusing idle resource {}", pooled.id());
                pooled
            }
            None => match self.factory.create(&self.endpoint, &self.credentials) {
                Ok(resource) => {
                    state.stats.total_created += 1;
                    let pooled = Pooled::new(resource);
                    debug!(
                        "Created resource {} for {} ({} in use)",
                        pooled.id(),
                        self.endpoint,
                        state.in_use.len() + 1
                    );
                    pooled
                }
                Err(e) => {
                    state.stats.total_creation_failures += 1;
                    return Err(PoolError::creation(e));
                }
            },
        };

        state.in_use.insert(pooled.id());
        state.stats.total_checkouts += 1;
        trace!(
            "Checked out resource {} ({} available, {} in use)",
            pooled.id(),
            state.available.len(),
            state.in_use.len()
        );

        Ok(pooled)
    }

    /// Check out a resource wrapped in a guard that releases it when dropped
    pub fn acquire_guard(self: &Arc<Self>) -> Result<PoolGuard<F>> {
        let pooled = self.acquire()?;
        Ok(PoolGuard {
            pooled: Some(pooled),
            pool: Arc::downgrade(self),
        })
    }

    /// Return a resource to the pool.
    ///
    /// `None` is ignored. A handle this pool does not consider checked out is
    /// accepted into the idle set as well. The resource is neither closed nor
    /// validated, and is eligible for the very next acquire.
    pub fn release(&self, handle: Option<Pooled<ResourceOf<F>>>) {
        let Some(pooled) = handle else {
            return;
        };

        let mut state = self.state.lock();
        if state.in_use.remove(&pooled.id()) {
            trace!("Returned resource {}", pooled.id());
            state.stats.total_returns += 1;
        } else {
            warn!(
                "Released resource {} was not checked out from this pool; adopting it",
                pooled.id()
            );
            state.stats.total_adopted += 1;
        }
        state.available.push(pooled);
    }

    /// Number of idle resources
    pub fn available_count(&self) -> usize {
        self.state.lock().available.len()
    }

    /// Number of checked-out resources
    pub fn in_use_count(&self) -> usize {
        self.state.lock().in_use.len()
    }

    /// Number of resources the pool is accounting for, idle or checked out
    pub fn total_count(&self) -> usize {
        let state = self.state.lock();
        state.available.len() + state.in_use.len()
    }

    /// Upper bound on checked-out resources
    pub fn max_size(&self) -> usize {
        self.max_size
    }

    /// Endpoint new resources connect to
    pub fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    /// Snapshot of the usage counters
    pub fn stats(&self) -> PoolStats {
        self.state.lock().stats.clone()
    }

    /// Consume the pool, handing its idle resources to the caller.
    ///
    /// Checked-out resources stay with whoever holds them.
    pub fn into_available(self) -> Vec<ResourceOf<F>> {
        self.state
            .into_inner()
            .available
            .into_iter()
            .map(Pooled::into_inner)
            .collect()
    }
}

impl<F: ResourceFactory> fmt::Debug for Pool<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.lock();
        f.debug_struct("Pool")
            .field("endpoint", &self.endpoint)
            .field("max_size", &self.max_size)
            .field("available", &state.available.len())
            .field("in_use", &state.in_use.len())
            .finish()
    }
}

/// A checked-out resource that goes back to its pool when dropped.
///
/// If the pool is gone by then, the resource is closed instead.
pub struct PoolGuard<F: ResourceFactory> {
    /// The checked-out resource, taken on drop or detach
    pooled: Option<Pooled<ResourceOf<F>>>,

    /// Pool to return the resource to
    pool: Weak<Pool<F>>,
}

impl<F: ResourceFactory> PoolGuard<F> {
    /// Identifier of the guarded resource
    pub fn id(&self) -> ResourceId {
        self.handle().id()
    }

    /// Return the resource to the pool now
    pub fn release(self) {
        drop(self);
    }

    /// Take the handle out of the guard without returning it.
    ///
    /// The pool still counts the resource as checked out until it is passed
    /// to [`Pool::release`].
    pub fn detach(mut self) -> Pooled<ResourceOf<F>> {
        self.pooled.take().expect("pooled resource already taken")
    }

    fn handle(&self) -> &Pooled<ResourceOf<F>> {
        self.pooled.as_ref().expect("pooled resource already taken")
    }
}

impl<F: ResourceFactory> Deref for PoolGuard<F> {
    type Target = ResourceOf<F>;

    fn deref(&self) -> &Self::Target {
        self.handle()
    }
}

impl<F: ResourceFactory> DerefMut for PoolGuard<F> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.pooled.as_mut().expect("pooled resource already taken")
    }
}

impl<F: ResourceFactory> Drop for PoolGuard<F> {
    fn drop(&mut self) {
        if let Some(pooled) = self.pooled.take() {
            match self.pool.upgrade() {
                Some(pool) => pool.release(Some(pooled)),
                None => {
                    trace!("Pool dropped before resource {} was returned", pooled.id());
                    close_quietly(pooled);
                }
            }
        }
    }
}

impl<F: ResourceFactory> fmt::Debug for PoolGuard<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.pooled {
            Some(pooled) => write!(f, "PoolGuard({})", pooled.id()),
            None => write!(f, "PoolGuard(returned)"),
        }
    }
}
