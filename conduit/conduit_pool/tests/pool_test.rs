//! Integration tests for pool acquisition and release.
//!
//! These drive the public API the way an application would: a factory that
//! records every connection it opens and closes, and a pool built on top.

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use conduit_pool::{
    ConfigError, Credentials, Endpoint, Pool, PoolConfig, PoolError, Resource, ResourceFactory,
};

/// Events recorded by the fake driver
#[derive(Debug, Clone, PartialEq, Eq)]
enum Event {
    Opened(usize),
    Closed(usize),
}

#[derive(Debug)]
struct FakeConnection {
    number: usize,
    log: Arc<Mutex<Vec<Event>>>,
}

impl FakeConnection {
    fn query(&self, sql: &str) -> String {
        format!("#{}: {}", self.number, sql)
    }
}

impl Resource for FakeConnection {
    type Error = std::io::Error;

    fn close(&mut self) -> Result<(), std::io::Error> {
        self.log.lock().unwrap().push(Event::Closed(self.number));
        Ok(())
    }
}

#[derive(Clone, Default)]
struct FakeDriver {
    log: Arc<Mutex<Vec<Event>>>,
    refuse_after: Option<usize>,
}

impl FakeDriver {
    fn refusing_after(opened: usize) -> Self {
        Self {
            refuse_after: Some(opened),
            ..Default::default()
        }
    }

    fn events(&self) -> Vec<Event> {
        self.log.lock().unwrap().clone()
    }
}

impl ResourceFactory for FakeDriver {
    type Resource = FakeConnection;
    type Error = std::io::Error;

    fn create(
        &self,
        endpoint: &Endpoint,
        credentials: &Credentials,
    ) -> Result<FakeConnection, std::io::Error> {
        assert_eq!(endpoint.as_str(), "localhost:3306");
        assert_eq!(credentials.user(), "username");

        let mut log = self.log.lock().unwrap();
        let opened = log
            .iter()
            .filter(|e| matches!(e, Event::Opened(_)))
            .count();
        if self.refuse_after.is_some_and(|limit| opened >= limit) {
            return Err(std::io::Error::new(
                std::io::ErrorKind::ConnectionRefused,
                "server refused connection",
            ));
        }

        let number = opened + 1;
        log.push(Event::Opened(number));
        Ok(FakeConnection {
            number,
            log: Arc::clone(&self.log),
        })
    }
}

fn create_pool(
    initial: usize,
    max: usize,
    driver: &FakeDriver,
) -> Result<Pool<FakeDriver>, PoolError> {
    Pool::create(
        "localhost:3306",
        Credentials::new("username", "password"),
        initial,
        max,
        driver.clone(),
    )
}

#[test]
fn test_checkout_scenario() {
    let driver = FakeDriver::default();
    let pool = create_pool(2, 3, &driver).unwrap();
    assert_eq!(pool.available_count(), 2);

    let a = pool.acquire().unwrap();
    assert_eq!(pool.available_count(), 1);
    let b = pool.acquire().unwrap();
    assert_eq!(pool.available_count(), 0);

    let c = pool.acquire().unwrap();
    assert_eq!(c.number, 3, "third connection is freshly opened");
    assert_eq!(pool.available_count(), 0);
    assert_eq!(pool.in_use_count(), 3);

    match pool.acquire() {
        Err(PoolError::PoolExhausted { max_size }) => assert_eq!(max_size, 3),
        other => panic!("expected exhaustion, got {:?}", other),
    }

    assert_eq!(a.query("SELECT * FROM user"), "#2: SELECT * FROM user");
    let a_id = a.id();
    pool.release(Some(a));
    assert_eq!(pool.available_count(), 1);

    let reused = pool.acquire().unwrap();
    assert_eq!(reused.id(), a_id);
    assert_eq!(pool.available_count(), 0);

    // Only three connections were ever opened
    assert_eq!(driver.events().len(), 3);

    pool.release(Some(b));
    pool.release(Some(c));
    pool.release(Some(reused));
}

#[test]
fn test_first_n_acquires_succeed_then_exhausted() {
    for max in 0..5 {
        let driver = FakeDriver::default();
        let pool = create_pool(0, max, &driver).unwrap();

        let held: Vec<_> = (0..max).map(|_| pool.acquire().unwrap()).collect();
        assert!(pool.acquire().unwrap_err().is_exhausted());
        assert!(pool.in_use_count() <= pool.max_size());

        let ids: HashSet<_> = held.iter().map(|h| h.id()).collect();
        assert_eq!(ids.len(), max);
    }
}

#[test]
fn test_acquire_after_release_returns_a_handle() {
    let driver = FakeDriver::default();
    let pool = create_pool(3, 3, &driver).unwrap();

    let first = pool.acquire().unwrap();
    pool.release(Some(first));
    let before = pool.available_count();

    let handle = pool.acquire().unwrap();
    assert_eq!(pool.available_count(), before - 1);
    pool.release(Some(handle));
}

#[test]
fn test_in_use_never_exceeds_max_over_mixed_sequence() {
    let driver = FakeDriver::default();
    let pool = create_pool(1, 4, &driver).unwrap();
    let mut held = Vec::new();

    // Deterministic interleaving of acquires and releases
    for step in 0..40usize {
        if step % 3 == 2 {
            pool.release(held.pop());
        } else if let Ok(handle) = pool.acquire() {
            held.push(handle);
        }
        assert!(pool.in_use_count() <= pool.max_size());
        assert_eq!(pool.in_use_count(), held.len());
    }
}

#[test]
fn test_release_none_never_fails() {
    let driver = FakeDriver::default();
    let pool = create_pool(2, 3, &driver).unwrap();

    pool.release(None);
    pool.release(None);
    assert_eq!(pool.available_count(), 2);
}

#[test]
fn test_construction_failure_closes_partial_pool() {
    let driver = FakeDriver::refusing_after(1);

    let err = create_pool(3, 3, &driver).unwrap_err();
    assert!(matches!(err, PoolError::CreationFailed(_)));
    assert!(err.to_string().contains("server refused connection"));

    assert_eq!(driver.events(), vec![Event::Opened(1), Event::Closed(1)]);
}

#[test]
fn test_pool_from_config() {
    let driver = FakeDriver::default();
    let mut config = PoolConfig::new("localhost:3306");
    config.user = "username".to_string();

    let pool = Pool::from_config(&config, driver.clone()).unwrap();
    assert_eq!(pool.available_count(), 2);
    assert_eq!(pool.max_size(), 3);

    config.initial_size = 9;
    let err = Pool::from_config(&config, driver.clone()).unwrap_err();
    assert!(matches!(err, PoolError::Config(ConfigError::Invalid(_))));
}

#[test]
fn test_teardown_closes_everything() {
    let driver = FakeDriver::default();
    let pool = create_pool(2, 3, &driver).unwrap();

    let held = pool.acquire().unwrap();
    held.close().unwrap();
    for mut idle in pool.into_available() {
        idle.close().unwrap();
    }

    let closed = driver
        .events()
        .into_iter()
        .filter(|e| matches!(e, Event::Closed(_)))
        .count();
    assert_eq!(closed, 2);
}
