//! In-memory, single-use nonce registry.
//!
//! A [`NonceStore`] issues opaque tokens bound to an action label and later
//! checks that a presented token was issued for that exact action, has not
//! been consumed and has not expired. Applications use it to guard
//! state-changing requests against replay and forged-request (CSRF-style)
//! attacks without persisting anything.
//!
//! ```
//! use std::time::Duration;
//! use noncekit_core::NonceStore;
//!
//! let store = NonceStore::new()?;
//! store.set_expiration(Duration::from_secs(600));
//!
//! // Rendered into the form that deletes widget "foo" for user 123.
//! let token = store.issue("123:foo:delete");
//!
//! // On submission.
//! if store.consume(token, "123:foo:delete") {
//!     // delete the widget
//! }
//! # Ok::<(), noncekit_core::NonceError>(())
//! ```
//!
//! Validation never says why it failed. An expired token, a consumed one, one
//! minted for another action and random bytes all yield `false`.
//!
//! Expired entries are freed by a background thread owned by the store, which
//! sweeps every `sweep_multiplier` (default 5) expirations and stops when the
//! store is closed or dropped.

mod config;
pub use config::{NonceConfig, DEFAULT_EXPIRATION, DEFAULT_SWEEP_MULTIPLIER};

mod error;
pub use error::*;

mod fingerprint;
pub use fingerprint::fingerprint;

pub mod logger;

mod reaper;

mod salt;
pub use salt::{Salt, DEFAULT_SALT_LEN};

mod store;
pub use store::NonceStore;

mod token;
pub use token::{Token, TOKEN_LEN};
