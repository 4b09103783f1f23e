//! Opaque single-use tokens.

use std::str::FromStr;

use subtle::ConstantTimeEq;

use crate::error::NonceError;

/// Length in bytes of every token (SHA-256 output size).
pub const TOKEN_LEN: usize = 32;

/// An opaque token returned by [`crate::NonceStore::issue`].
///
/// The raw digest bytes are the token. Callers hand them back unchanged; the
/// store never parses them, it only compares them for exact equality.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Token([u8; TOKEN_LEN]);

impl Token {
    /// Wraps raw token bytes.
    #[must_use]
    pub const fn from_bytes(bytes: [u8; TOKEN_LEN]) -> Self {
        Self(bytes)
    }

    /// Returns the raw token bytes.
    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; TOKEN_LEN] {
        &self.0
    }

    /// Lowercase hex rendering, for transports that cannot carry raw bytes.
    #[must_use]
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Equality check whose timing does not depend on where the bytes differ.
    pub(crate) fn matches(&self, other: &Self) -> bool {
        self.0.as_slice().ct_eq(other.0.as_slice()).into()
    }
}

impl AsRef<[u8]> for Token {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl TryFrom<&[u8]> for Token {
    type Error = NonceError;

    fn try_from(bytes: &[u8]) -> Result<Self, Self::Error> {
        <[u8; TOKEN_LEN]>::try_from(bytes)
            .map(Self)
            .map_err(|_| NonceError::InvalidToken)
    }
}

impl FromStr for Token {
    type Err = NonceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut bytes = [0u8; TOKEN_LEN];
        hex::decode_to_slice(s.trim(), &mut bytes).map_err(|_| NonceError::InvalidToken)?;
        Ok(Self(bytes))
    }
}

impl std::fmt::Debug for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // A prefix is enough to tell tokens apart in test output.
        write!(f, "Token({}..)", &self.to_hex()[..8])
    }
}
