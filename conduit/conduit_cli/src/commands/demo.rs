//! Walk a pool of TCP connections through a checkout cycle.

use anyhow::{Context, Result};
use conduit_pool::{Pool, PoolConfig, Pooled, Resource};
use log::{info, warn};
use std::time::Duration;

use crate::tcp::{TcpConnection, TcpFactory};

/// Options for the demo run
#[derive(Debug, Clone)]
pub struct DemoOptions {
    /// Attempt one acquire past capacity and report the rejection
    pub probe_exhaustion: bool,

    /// Connect timeout for each new connection
    pub connect_timeout: Duration,
}

/// Acquire connections up to capacity, release the first and acquire again,
/// then hand everything back and close it.
pub fn run(config: &PoolConfig, options: &DemoOptions) -> Result<()> {
    let factory = TcpFactory::new(options.connect_timeout);
    let pool = Pool::from_config(config, factory)
        .with_context(|| format!("creating pool for {}", config.endpoint))?;

    println!(
        "Pool ready for {}: {} available connections (max {})",
        config.endpoint,
        pool.available_count(),
        pool.max_size()
    );

    let mut held: Vec<Pooled<TcpConnection>> = Vec::with_capacity(pool.max_size());
    for n in 1..=pool.max_size() {
        let conn = pool
            .acquire()
            .with_context(|| format!("acquiring connection {}", n))?;
        println!(
            "Connection {} acquired ({}), available connections: {}",
            n,
            conn.peer(),
            pool.available_count()
        );
        held.push(conn);
    }

    if options.probe_exhaustion {
        match pool.acquire() {
            Ok(extra) => {
                println!("Connection {} acquired beyond capacity", held.len() + 1);
                held.push(extra);
            }
            Err(e) => println!("Connection {} rejected: {}", held.len() + 1, e),
        }
    }

    if !held.is_empty() {
        let first = held.remove(0);
        let first_id = first.id();
        pool.release(Some(first));
        println!(
            "Connection 1 released, available connections: {}",
            pool.available_count()
        );

        let again = pool.acquire().context("re-acquiring after release")?;
        println!(
            "Connection acquired again (reused: {}), available connections: {}",
            again.id() == first_id,
            pool.available_count()
        );
        held.insert(0, again);
    }

    for conn in held.drain(..) {
        pool.release(Some(conn));
    }
    println!(
        "All connections released, available connections: {}",
        pool.available_count()
    );

    let stats = pool.stats();
    info!(
        "Pool stats: {} created, {} checkouts, {} returns, {} exhausted",
        stats.total_created, stats.total_checkouts, stats.total_returns, stats.total_exhausted
    );

    let mut closed = 0;
    for mut conn in pool.into_available() {
        match conn.close() {
            Ok(()) => closed += 1,
            Err(e) => warn!("Failed to close connection to {}: {}", conn.peer(), e),
        }
    }
    println!("Closed {} connections", closed);

    Ok(())
}
