//! The nonce registry: issue, consume and peek single-use tokens.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::{Duration, Instant};

use log::{debug, trace};

use crate::config::{self, NonceConfig};
use crate::error::NonceResult;
use crate::fingerprint::{fingerprint, Expiry};
use crate::reaper::Reaper;
use crate::salt::Salt;
use crate::token::Token;

/// State shared between the store and its reclamation thread.
#[derive(Debug)]
pub(crate) struct Shared {
    entries: RwLock<HashMap<Token, Expiry>>,
    salt: RwLock<Salt>,
    expiration: RwLock<Duration>,
    sweep_multiplier: u32,
}

impl Shared {
    pub(crate) fn expiration(&self) -> Duration {
        *read(&self.expiration)
    }

    pub(crate) fn sweep_interval(&self) -> Duration {
        config::sweep_interval(self.expiration(), self.sweep_multiplier)
    }

    /// Drops every entry whose expiry is at or before now.
    pub(crate) fn reclaim_expired(&self) -> usize {
        let now = Instant::now();
        let mut entries = write(&self.entries);
        let before = entries.len();
        entries.retain(|_, expiry| !expiry.is_reclaimable(now));
        before - entries.len()
    }

    /// Expiry and action checks shared by consume and peek.
    fn is_valid(&self, token: &Token, expiry: &Expiry, action: &str) -> bool {
        if expiry.is_expired(Instant::now()) {
            return false;
        }
        let expected = fingerprint(action, expiry.unix_nanos(), &read(&self.salt));
        expected.matches(token)
    }
}

/// In-memory registry of single-use tokens bound to action labels.
///
/// Tokens live until they are consumed or, once expired, until the
/// background reclamation loop frees them. Every validation failure is a
/// plain `false`: unknown, expired, already consumed and wrong-action tokens
/// are indistinguishable to the caller.
///
/// The store is `Send + Sync`; share it behind an [`Arc`].
///
/// # Example
///
/// ```
/// use noncekit_core::NonceStore;
///
/// let store = NonceStore::new().unwrap();
/// let token = store.issue("123:foo:delete");
///
/// assert!(store.peek(token, "123:foo:delete"));
/// assert!(!store.consume(token, "123:bar:delete"));
/// assert!(store.consume(token, "123:foo:delete"));
/// assert!(!store.consume(token, "123:foo:delete"));
/// ```
#[derive(Debug)]
pub struct NonceStore {
    shared: Arc<Shared>,
    reaper: Reaper,
}

impl NonceStore {
    /// Creates a store with the default configuration: 30 minute expiration,
    /// sweeps every 5 expirations, a fresh 20 byte salt.
    ///
    /// # Errors
    ///
    /// Fails if the secure random source cannot produce a salt or the
    /// reclamation thread cannot be started.
    pub fn new() -> NonceResult<Self> {
        Self::with_config(&NonceConfig::default())
    }

    /// Creates a store from `config` and starts its reclamation loop.
    ///
    /// # Errors
    ///
    /// Fails on an invalid config, when the secure random source cannot
    /// produce a salt, or when the reclamation thread cannot be started.
    pub fn with_config(config: &NonceConfig) -> NonceResult<Self> {
        config.validate()?;
        let salt = Salt::generate(config.salt_len)?;
        let shared = Arc::new(Shared {
            entries: RwLock::new(HashMap::new()),
            salt: RwLock::new(salt),
            expiration: RwLock::new(config.expiration()),
            sweep_multiplier: config.sweep_multiplier,
        });
        let reaper = Reaper::spawn(Arc::clone(&shared))?;
        debug!(
            "nonce store started (expiration {:?}, sweep every {:?})",
            shared.expiration(),
            shared.sweep_interval()
        );
        Ok(Self { shared, reaper })
    }

    /// Sets the lifetime of tokens issued from now on.
    ///
    /// Already issued tokens keep their expiry. The reclamation loop abandons
    /// its current wait and switches to the new sweep interval.
    pub fn set_expiration(&self, expiration: Duration) -> &Self {
        *write(&self.shared.expiration) = expiration;
        debug!("nonce expiration set to {expiration:?}");
        self.reaper.reconfigure();
        self
    }

    /// Replaces the salt used for every later fingerprint.
    ///
    /// Outstanding tokens stay in the map until they expire and are swept, but
    /// none of them validates any more. Meant to be called right after
    /// construction.
    pub fn set_salt(&self, salt: impl Into<Salt>) -> &Self {
        *write(&self.shared.salt) = salt.into();
        debug!("nonce salt replaced, outstanding tokens invalidated");
        self
    }

    /// Issues a token for `action`, valid for the current expiration.
    #[must_use]
    pub fn issue(&self, action: &str) -> Token {
        let expiry = Expiry::after(self.shared.expiration());
        let token = fingerprint(action, expiry.unix_nanos(), &read(&self.shared.salt));
        let live = {
            let mut entries = write(&self.shared.entries);
            entries.insert(token, expiry);
            entries.len()
        };
        trace!("nonce issued ({live} entries)");
        token
    }

    /// Validates `token` for `action` and consumes it on success.
    ///
    /// Returns `true` at most once per token. A wrong action leaves the token
    /// in place; an expired token is left for the reclamation loop.
    pub fn consume(&self, token: impl AsRef<[u8]>, action: &str) -> bool {
        let Ok(token) = Token::try_from(token.as_ref()) else {
            return false;
        };
        // Check and removal happen under one exclusive acquisition so two
        // racing consumers cannot both observe a match.
        let mut entries = write(&self.shared.entries);
        let Some(expiry) = entries.get(&token).copied() else {
            return false;
        };
        if !self.shared.is_valid(&token, &expiry, action) {
            return false;
        }
        entries.remove(&token);
        drop(entries);
        trace!("nonce consumed");
        true
    }

    /// Validates `token` for `action` without consuming it.
    pub fn peek(&self, token: impl AsRef<[u8]>, action: &str) -> bool {
        let Ok(token) = Token::try_from(token.as_ref()) else {
            return false;
        };
        let entries = read(&self.shared.entries);
        entries
            .get(&token)
            .is_some_and(|expiry| self.shared.is_valid(&token, expiry, action))
    }

    /// Lifetime applied to newly issued tokens.
    #[must_use]
    pub fn expiration(&self) -> Duration {
        self.shared.expiration()
    }

    /// Current wait between two sweeps of the reclamation loop.
    #[must_use]
    pub fn sweep_interval(&self) -> Duration {
        self.shared.sweep_interval()
    }

    /// Number of entries physically held, including expired ones not yet swept.
    #[must_use]
    pub fn len(&self) -> usize {
        read(&self.shared.entries).len()
    }

    /// Returns `true` when no entry is held.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Runs one sweep now and returns how many expired entries were freed.
    pub fn reclaim_expired(&self) -> usize {
        self.shared.reclaim_expired()
    }

    /// Returns `true` while the reclamation loop is running.
    #[must_use]
    pub fn is_reclaiming(&self) -> bool {
        self.reaper.is_running()
    }

    /// Stops the reclamation loop and joins its thread. Idempotent.
    ///
    /// The store stays usable afterwards; expired entries are then only freed
    /// by [`NonceStore::reclaim_expired`].
    pub fn close(&self) {
        self.reaper.shutdown();
    }

    #[cfg(test)]
    pub(crate) fn contains(&self, token: &Token) -> bool {
        read(&self.shared.entries).contains_key(token)
    }
}

impl Drop for NonceStore {
    fn drop(&mut self) {
        self.close();
    }
}

// Every critical section leaves the map consistent, so a poisoned lock is
// safe to keep using.
fn read<T>(lock: &RwLock<T>) -> RwLockReadGuard<'_, T> {
    lock.read().unwrap_or_else(PoisonError::into_inner)
}

fn write<T>(lock: &RwLock<T>) -> RwLockWriteGuard<'_, T> {
    lock.write().unwrap_or_else(PoisonError::into_inner)
}
