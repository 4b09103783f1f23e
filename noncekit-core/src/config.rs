//! Store configuration.

use std::time::Duration;

use serde::Deserialize;

use crate::error::{NonceError, NonceResult};
use crate::salt::DEFAULT_SALT_LEN;

/// Default token lifetime: 30 minutes.
pub const DEFAULT_EXPIRATION: Duration = Duration::from_secs(30 * 60);

/// Default ratio between the sweep interval and the token lifetime.
pub const DEFAULT_SWEEP_MULTIPLIER: u32 = 5;

/// Shortest wait between two sweeps, whatever the expiration.
pub(crate) const MIN_SWEEP_INTERVAL: Duration = Duration::from_millis(1);

/// Settings for a [`crate::NonceStore`].
///
/// Deserializes from a flat document, every field optional:
///
/// ```
/// use noncekit_core::NonceConfig;
///
/// let config: NonceConfig = serde_json::from_str(r#"{ "expiration_ms": 60000 }"#).unwrap();
/// assert_eq!(config.expiration().as_secs(), 60);
/// assert_eq!(config.sweep_multiplier, 5);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct NonceConfig {
    /// Lifetime of newly issued tokens, in milliseconds.
    pub expiration_ms: u64,
    /// Sweep interval as a multiple of the expiration.
    pub sweep_multiplier: u32,
    /// Number of generated salt bytes.
    pub salt_len: usize,
}

impl Default for NonceConfig {
    fn default() -> Self {
        Self {
            expiration_ms: duration_to_millis(DEFAULT_EXPIRATION),
            sweep_multiplier: DEFAULT_SWEEP_MULTIPLIER,
            salt_len: DEFAULT_SALT_LEN,
        }
    }
}

impl NonceConfig {
    /// Sets the token lifetime.
    #[must_use]
    pub fn with_expiration(mut self, expiration: Duration) -> Self {
        self.expiration_ms = duration_to_millis(expiration);
        self
    }

    /// Sets the sweep multiplier.
    #[must_use]
    pub const fn with_sweep_multiplier(mut self, multiplier: u32) -> Self {
        self.sweep_multiplier = multiplier;
        self
    }

    /// Sets the generated salt length.
    #[must_use]
    pub const fn with_salt_len(mut self, salt_len: usize) -> Self {
        self.salt_len = salt_len;
        self
    }

    /// Token lifetime as a [`Duration`].
    #[must_use]
    pub const fn expiration(&self) -> Duration {
        Duration::from_millis(self.expiration_ms)
    }

    /// Checks that the settings describe a usable store.
    ///
    /// # Errors
    ///
    /// Returns [`NonceError::InvalidConfig`] for a zero sweep multiplier or a
    /// zero salt length.
    pub fn validate(&self) -> NonceResult<()> {
        if self.sweep_multiplier == 0 {
            return Err(NonceError::InvalidConfig(
                "sweep_multiplier must be non-zero".to_string(),
            ));
        }
        if self.salt_len == 0 {
            return Err(NonceError::InvalidConfig(
                "salt_len must be non-zero".to_string(),
            ));
        }
        Ok(())
    }
}

/// Interval between sweeps for a given expiration.
pub(crate) fn sweep_interval(expiration: Duration, multiplier: u32) -> Duration {
    expiration
        .saturating_mul(multiplier)
        .max(MIN_SWEEP_INTERVAL)
}

fn duration_to_millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}
