//! Ticket order identifiers.

use eticket_core::environment::Clock;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Identifier printed on a ticket and embedded in its verification code
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderId(String);

impl OrderId {
    /// Wraps an existing id
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The id as text
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OrderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Source of fresh order ids
pub trait OrderIdGenerator: Send + Sync {
    /// Produce a new id; ids are unique on a best-effort basis
    fn next_id(&self) -> OrderId;
}

/// `LL-<base36 epoch millis>-<random 0..9999>`
pub struct TimestampOrderIds {
    clock: Arc<dyn Clock>,
}

impl TimestampOrderIds {
    /// Prefix shared by every generated id
    pub const PREFIX: &'static str = "LL";

    /// Draws the time token from `clock`
    #[must_use]
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self { clock }
    }
}

impl OrderIdGenerator for TimestampOrderIds {
    fn next_id(&self) -> OrderId {
        let millis = u64::try_from(self.clock.now().timestamp_millis()).unwrap_or(0);
        let suffix: u16 = rand::thread_rng().gen_range(0..9999);
        OrderId(format!("{}-{}-{suffix}", Self::PREFIX, to_base36(millis)))
    }
}

impl fmt::Debug for TimestampOrderIds {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TimestampOrderIds").finish_non_exhaustive()
    }
}

/// Predictable ids (`<prefix>-1`, `<prefix>-2`, ...)
#[derive(Debug)]
pub struct SequentialOrderIds {
    prefix: String,
    next: AtomicU64,
}

impl SequentialOrderIds {
    /// Starts counting at 1
    #[must_use]
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            next: AtomicU64::new(1),
        }
    }
}

impl OrderIdGenerator for SequentialOrderIds {
    fn next_id(&self) -> OrderId {
        let n = self.next.fetch_add(1, Ordering::Relaxed);
        OrderId(format!("{}-{n}", self.prefix))
    }
}

fn to_base36(mut n: u64) -> String {
    const DIGITS: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";
    if n == 0 {
        return "0".to_string();
    }
    let mut out = Vec::new();
    while n > 0 {
        out.push(DIGITS[(n % 36) as usize]);
        n /= 36;
    }
    out.reverse();
    String::from_utf8_lossy(&out).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use eticket_testing::{test_clock, SteppingClock};

    #[test]
    fn base36_matches_radix_formatting() {
        assert_eq!(to_base36(0), "0");
        assert_eq!(to_base36(35), "z");
        assert_eq!(to_base36(36), "10");
        assert_eq!(to_base36(1_756_751_400_000), "mf1gfbk0");
    }

    #[test]
    fn timestamp_ids_have_three_parts() {
        let ids = TimestampOrderIds::new(Arc::new(test_clock()));
        let id = ids.next_id();
        let parts: Vec<&str> = id.as_str().split('-').collect();

        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0], "LL");
        assert_eq!(parts[1], "mf1gfbk0");
        let suffix: u32 = parts[2].parse().unwrap_or(u32::MAX);
        assert!(suffix < 9999);
    }

    #[test]
    fn advancing_clock_changes_time_token() {
        let clock = SteppingClock::new(
            eticket_testing::mocks::test_instant(),
            chrono::Duration::milliseconds(1),
        );
        let ids = TimestampOrderIds::new(Arc::new(clock));
        let a = ids.next_id();
        let b = ids.next_id();
        assert_ne!(a.as_str().split('-').nth(1), b.as_str().split('-').nth(1));
    }

    #[test]
    fn sequential_ids_count_up() {
        let ids = SequentialOrderIds::new("LL-TEST");
        assert_eq!(ids.next_id().as_str(), "LL-TEST-1");
        assert_eq!(ids.next_id().as_str(), "LL-TEST-2");
    }
}
