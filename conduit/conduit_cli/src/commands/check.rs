//! Validate pool settings without opening any connection.

use conduit_pool::PoolConfig;

/// Print the effective settings, password redacted
pub fn run(config: &PoolConfig) {
    println!("endpoint: {}", config.endpoint);
    println!("user: {}", config.user);
    println!(
        "password: {}",
        if config.password.is_empty() {
            "<empty>"
        } else {
            "<redacted>"
        }
    );
    println!("initial_size: {}", config.initial_size);
    println!("max_size: {}", config.max_size);
    println!("configuration is valid");
}
