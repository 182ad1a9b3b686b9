//! Message id generation.
//!
//! An id combines a monotonically-observed millisecond timestamp with a
//! short random base36 suffix. Uniqueness is statistical, not guaranteed:
//! the suffix makes same-millisecond collisions negligible.

use std::sync::atomic::{AtomicI64, Ordering};

use chrono::Utc;
use rand::Rng;

const SUFFIX_LEN: usize = 9;
const BASE36: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

static LAST_MILLIS: AtomicI64 = AtomicI64::new(0);

/// Observe the clock so the timestamp component never moves backwards,
/// even if the wall clock does.
fn observe(now_millis: i64) -> i64 {
    let prev = LAST_MILLIS.fetch_max(now_millis, Ordering::Relaxed);
    prev.max(now_millis)
}

/// Deterministic composition of the two id parts. Split out of `fresh` so
/// tests don't need to mock the clock or the rng.
fn compose(millis: i64, suffix: &str) -> String {
    format!("{millis}{suffix}")
}

fn random_suffix(rng: &mut impl Rng) -> String {
    (0..SUFFIX_LEN)
        .map(|_| BASE36[rng.gen_range(0..BASE36.len())] as char)
        .collect()
}

/// A fresh message id from the wall clock and the thread rng.
pub fn fresh() -> String {
    let millis = observe(Utc::now().timestamp_millis());
    compose(millis, &random_suffix(&mut rand::thread_rng()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn compose_is_deterministic() {
        assert_eq!(compose(1700000000000, "abc123xyz"), "1700000000000abc123xyz");
        assert_eq!(compose(0, ""), "0");
    }

    #[test]
    fn observe_never_goes_backwards() {
        let ahead = Utc::now().timestamp_millis() + 60_000;
        assert_eq!(observe(ahead), ahead);
        // A clock step backwards still yields the high-water mark.
        assert!(observe(ahead - 5_000) >= ahead);
    }

    #[test]
    fn suffix_has_expected_shape() {
        let suffix = random_suffix(&mut rand::thread_rng());
        assert_eq!(suffix.len(), SUFFIX_LEN);
        assert!(suffix.bytes().all(|b| BASE36.contains(&b)));
    }

    #[test]
    fn fresh_ids_do_not_collide() {
        let ids: HashSet<String> = (0..10_000).map(|_| fresh()).collect();
        assert_eq!(ids.len(), 10_000);
    }
}
