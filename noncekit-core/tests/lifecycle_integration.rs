//! Lifecycle integration tests.

mod common;

use std::thread;
use std::time::Duration;

use noncekit_core::{NonceConfig, NonceError, NonceStore, Token, TOKEN_LEN};
use test_case::test_case;

#[test]
fn test_basic_usage() {
    let store = NonceStore::new().expect("store");
    store.set_expiration(common::SHORT);

    assert!(!store.consume(b"", "test"));
    assert!(!store.peek(b"", "test"));

    let token = store.issue("test");
    assert!(store.peek(token, "test"));
    assert!(store.peek(token, "test"));
    assert!(store.consume(token, "test"));
    assert!(!store.consume(token, "test"));

    let token = store.issue("test2");
    assert_eq!(store.len(), 1);

    thread::sleep(Duration::from_millis(26));
    assert!(!store.consume(token, "test2"));
    assert_eq!(store.len(), 1, "expired entry stays until swept");

    thread::sleep(store.sweep_interval() + Duration::from_millis(100));
    assert!(store.is_empty(), "expired entry should have been swept");
}

#[test_case(&[0u8; 0] ; "empty")]
#[test_case(&[0u8; 16] ; "short")]
#[test_case(&[0u8; TOKEN_LEN] ; "unknown")]
#[test_case(&[0xffu8; TOKEN_LEN + 1] ; "long")]
fn test_malformed_tokens_fail(token: &[u8]) {
    let store = NonceStore::new().expect("store");
    let _issued = store.issue("act");
    for action in ["act", "", "other"] {
        assert!(!store.peek(token, action));
        assert!(!store.consume(token, action));
    }
    assert_eq!(store.len(), 1);
}

#[test]
fn test_empty_action_is_a_valid_label() {
    let store = NonceStore::new().expect("store");
    let token = store.issue("");
    assert!(!store.peek(token, "x"));
    assert!(store.consume(token, ""));
}

#[test]
fn test_wrong_action_then_right_action() {
    let store = NonceStore::new().expect("store");
    let action = common::random_action();
    let token = store.issue(&action);
    assert!(!store.consume(token, "something-else"));
    assert!(store.peek(token, &action));
    assert!(store.consume(token, &action));
}

#[test]
fn test_token_round_trips_through_hex() {
    let store = NonceStore::new().expect("store");
    let token = store.issue("transfer");
    let presented: Token = token.to_hex().parse().expect("parse");
    assert!(store.consume(presented.as_bytes(), "transfer"));
}

#[test]
fn test_distinct_stores_do_not_accept_each_others_tokens() {
    let a = NonceStore::new().expect("store");
    let b = NonceStore::new().expect("store");
    let token = a.issue("act");
    assert!(!b.peek(token, "act"));
    assert!(!b.consume(token, "act"));
    assert!(a.consume(token, "act"));
}

#[test]
fn test_same_salt_same_action_differs_by_expiry() {
    let store = NonceStore::new().expect("store");
    store.set_salt(vec![7u8; 20]);
    let first = store.issue("act");
    thread::sleep(Duration::from_millis(2));
    let second = store.issue("act");
    assert_ne!(first, second);
    assert!(store.consume(first, "act"));
    assert!(store.consume(second, "act"));
}

#[test]
fn test_salt_override_invalidates_everything_outstanding() {
    let store = NonceStore::new().expect("store");
    let tokens: Vec<_> = (0..10).map(|i| (store.issue(&i.to_string()), i)).collect();
    store.set_salt(b"rotated".as_slice());
    for (token, i) in &tokens {
        assert!(!store.peek(token, &i.to_string()));
        assert!(!store.consume(token, &i.to_string()));
    }
    assert_eq!(store.len(), tokens.len());
}

#[test]
fn test_expiration_change_keeps_issued_expiry() {
    let store = common::short_lived_store();
    let short = store.issue("short");
    store.set_expiration(Duration::from_secs(60));
    let long = store.issue("long");

    thread::sleep(common::SHORT + Duration::from_millis(10));
    assert!(!store.peek(short, "short"));
    assert!(store.peek(long, "long"));
}

#[test]
fn test_reconfigure_shortens_pending_wait() {
    // Starts with a 30 minute expiration, so the first wait is 2.5 hours.
    let store = NonceStore::new().expect("store");
    store.set_expiration(Duration::from_millis(10));
    let _token = store.issue("act");
    thread::sleep(Duration::from_millis(10 + 50 + 100));
    assert!(store.is_empty());
}

#[test]
fn test_reclaim_expired_only_frees_expired() {
    let store = common::short_lived_store();
    store.close();
    let _old = store.issue("old");
    thread::sleep(common::SHORT + Duration::from_millis(5));
    store.set_expiration(Duration::from_secs(60));
    let fresh = store.issue("fresh");

    assert_eq!(store.reclaim_expired(), 1);
    assert_eq!(store.len(), 1);
    assert!(store.peek(fresh, "fresh"));
}

#[test]
fn test_invalid_config_is_rejected() {
    let config = NonceConfig::default().with_sweep_multiplier(0);
    assert!(matches!(
        NonceStore::with_config(&config),
        Err(NonceError::InvalidConfig(_))
    ));
}

#[test]
fn test_custom_sweep_multiplier() {
    let config = NonceConfig::default()
        .with_expiration(Duration::from_millis(20))
        .with_sweep_multiplier(2);
    let store = NonceStore::with_config(&config).expect("store");
    assert_eq!(store.sweep_interval(), Duration::from_millis(40));
    let _token = store.issue("act");
    thread::sleep(Duration::from_millis(20 + 40 + 100));
    assert!(store.is_empty());
}
