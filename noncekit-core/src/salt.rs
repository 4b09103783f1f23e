//! Store-scoped secret salt mixed into every fingerprint.

use secrecy::{ExposeSecret, SecretBox};

use crate::error::{NonceError, NonceResult};

/// Length in bytes of a generated salt.
pub const DEFAULT_SALT_LEN: usize = 20;

/// Secret keying material for token fingerprints.
///
/// Each store owns exactly one salt, generated at construction, so two stores
/// never share keying material.
///
/// # Security
///
/// - The bytes are zeroized on drop.
/// - The salt is never logged; `Debug` output is redacted.
pub struct Salt(SecretBox<[u8]>);

impl Salt {
    /// Generates `len` bytes of salt from the OS secure random source.
    ///
    /// # Errors
    ///
    /// Returns [`NonceError::InvalidConfig`] when `len` is zero and
    /// [`NonceError::RandomSource`] when the random source fails.
    pub fn generate(len: usize) -> NonceResult<Self> {
        if len == 0 {
            return Err(NonceError::InvalidConfig(
                "salt length must be non-zero".to_string(),
            ));
        }
        let mut bytes = vec![0u8; len].into_boxed_slice();
        getrandom::fill(&mut bytes)?;
        Ok(Self(SecretBox::new(bytes)))
    }

    /// Returns the number of salt bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.expose_secret().len()
    }

    /// Returns `true` for an empty salt.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub(crate) fn expose(&self) -> &[u8] {
        self.0.expose_secret()
    }
}

impl From<Vec<u8>> for Salt {
    fn from(bytes: Vec<u8>) -> Self {
        Self(SecretBox::new(bytes.into_boxed_slice()))
    }
}

impl From<&[u8]> for Salt {
    fn from(bytes: &[u8]) -> Self {
        Self::from(bytes.to_vec())
    }
}

impl std::fmt::Debug for Salt {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Salt")
            .field("len", &self.len())
            .field("bytes", &"[REDACTED]")
            .finish()
    }
}
