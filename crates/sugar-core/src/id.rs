//! Sequential identifier generation for components.
//!
//! Components that are not given an explicit custom ID need one that is
//! unique within their registry. [`IdGenerator`] hands out short base-36
//! sequence numbers. Each generator owns its own counter, so two
//! applications (or two tests) never share a sequence.

use std::sync::atomic::{AtomicU64, Ordering};

use uuid::Uuid;

const DIGITS: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Generates unique component identifiers.
///
/// ```rust
/// use sugar_core::IdGenerator;
///
/// let ids = IdGenerator::new();
/// assert_eq!(ids.next_id(), "1");
/// assert_eq!(ids.next_id(), "2");
///
/// let scoped = IdGenerator::with_prefix("shop");
/// assert_eq!(scoped.next_id(), "shop-1");
/// ```
#[derive(Debug, Default)]
pub struct IdGenerator {
    prefix: Option<String>,
    counter: AtomicU64,
}

impl IdGenerator {
    /// Creates a generator whose first identifier is `"1"`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a generator whose identifiers are namespaced by `prefix`.
    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self {
            prefix: Some(prefix.into()),
            counter: AtomicU64::new(0),
        }
    }

    /// Creates a generator with a random per-instance prefix.
    ///
    /// Identifiers from two `random()` generators do not collide, which
    /// matters when several application instances share one platform
    /// application.
    pub fn random() -> Self {
        let simple = Uuid::new_v4().simple().to_string();
        Self::with_prefix(&simple[..8])
    }

    /// Returns the prefix, if any.
    pub fn prefix(&self) -> Option<&str> {
        self.prefix.as_deref()
    }

    /// Returns how many identifiers have been issued.
    pub fn issued(&self) -> u64 {
        self.counter.load(Ordering::Relaxed)
    }

    /// Issues the next identifier.
    pub fn next_id(&self) -> String {
        let n = self.counter.fetch_add(1, Ordering::Relaxed) + 1;
        let seq = to_base36(n);
        match &self.prefix {
            Some(prefix) => format!("{prefix}-{seq}"),
            None => seq,
        }
    }
}

fn to_base36(mut n: u64) -> String {
    if n == 0 {
        return "0".to_string();
    }
    let mut buf = Vec::new();
    while n > 0 {
        buf.push(DIGITS[(n % 36) as usize]);
        n /= 36;
    }
    buf.reverse();
    // DIGITS is ASCII
    buf.into_iter().map(char::from).collect()
}
