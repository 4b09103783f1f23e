//! Common test utilities shared across integration tests.

use std::time::Duration;

use rand::{distributions::Alphanumeric, rngs::OsRng, Rng};
use noncekit_core::{NonceConfig, NonceStore};

/// A short expiration used by tests.
pub const SHORT: Duration = Duration::from_millis(25);

/// A store whose tokens expire after [`SHORT`].
pub fn short_lived_store() -> NonceStore {
    NonceStore::with_config(&NonceConfig::default().with_expiration(SHORT)).expect("store")
}

/// A random action label.
pub fn random_action() -> String {
    OsRng
        .sample_iter(&Alphanumeric)
        .take(16)
        .map(char::from)
        .collect()
}
