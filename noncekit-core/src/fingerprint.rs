//! Token derivation from an action label, an expiry and the store salt.
//!
//! A token is `SHA-256("<expiry>:<action>:" || salt)`, where `<expiry>` is the
//! expiry instant as decimal nanoseconds since the Unix epoch. A fresh hasher
//! is built per call so concurrent derivations never share hashing state.

use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use sha2::{Digest, Sha256};

use crate::salt::Salt;
use crate::token::{Token, TOKEN_LEN};

/// Upper bound on a token lifetime, keeps instant arithmetic in range.
const MAX_LIFETIME: Duration = Duration::from_secs(100 * 365 * 24 * 60 * 60);

/// Derives the token for `action` expiring at `expires_at_unix_nanos`.
///
/// Identical inputs always yield the identical token.
#[must_use]
pub fn fingerprint(action: &str, expires_at_unix_nanos: u128, salt: &Salt) -> Token {
    let mut hasher = Sha256::new();
    hasher.update(expires_at_unix_nanos.to_string().as_bytes());
    hasher.update(b":");
    hasher.update(action.as_bytes());
    hasher.update(b":");
    hasher.update(salt.expose());
    let hash = hasher.finalize();
    let mut bytes = [0u8; TOKEN_LEN];
    bytes.copy_from_slice(&hash);
    Token::from_bytes(bytes)
}

/// Expiry recorded for an issued token. Fixed at issue time.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Expiry {
    /// Monotonic deadline used for every expiry check.
    at: Instant,
    /// Wall-clock deadline, only used as fingerprint input.
    unix_nanos: u128,
}

impl Expiry {
    /// Expiry `lifetime` from now.
    pub(crate) fn after(lifetime: Duration) -> Self {
        let lifetime = lifetime.min(MAX_LIFETIME);
        let at = Instant::now() + lifetime;
        let unix_nanos = (SystemTime::now() + lifetime)
            .duration_since(UNIX_EPOCH)
            .map_or(0, |since| since.as_nanos());
        Self { at, unix_nanos }
    }

    pub(crate) const fn unix_nanos(&self) -> u128 {
        self.unix_nanos
    }

    /// Validation treats a token as expired strictly after its deadline.
    pub(crate) fn is_expired(&self, now: Instant) -> bool {
        now > self.at
    }

    /// The sweep frees entries whose deadline is at or before `now`.
    pub(crate) fn is_reclaimable(&self, now: Instant) -> bool {
        self.at <= now
    }
}
