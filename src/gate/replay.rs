//! Consumed-proof record for replay protection
//!
//! Proof tokens are tied to time-bound on-ledger payments, so consumption
//! records only need to outlive the window in which a token could plausibly
//! be replayed. Entries expire after the retention window and are pruned
//! opportunistically.

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

const PRUNE_EVERY_INSERTS: u64 = 256;

/// Bounded, time-windowed record of consumed route+proof pairs.
///
/// Two requests racing to redeem the same proof are serialized by the
/// map's insert-if-absent entry; exactly one wins.
pub struct ReplayGuard {
    consumed: DashMap<String, Instant>,
    retention: Duration,
    inserts: AtomicU64,
}

impl ReplayGuard {
    pub fn new(retention: Duration) -> Self {
        Self {
            consumed: DashMap::new(),
            retention,
            inserts: AtomicU64::new(0),
        }
    }

    fn key(route: &str, token: &str) -> String {
        format!("{route}\u{1f}{token}")
    }

    fn expired(&self, consumed_at: &Instant) -> bool {
        consumed_at.elapsed() >= self.retention
    }

    /// Has this route+token pair already been redeemed within the window?
    pub fn is_consumed(&self, route: &str, token: &str) -> bool {
        self.consumed
            .get(&Self::key(route, token))
            .map(|at| !self.expired(&at))
            .unwrap_or(false)
    }

    /// Atomically record consumption. Returns false when the pair was
    /// already redeemed within the window.
    pub fn try_consume(&self, route: &str, token: &str) -> bool {
        let won = match self.consumed.entry(Self::key(route, token)) {
            Entry::Occupied(mut entry) => {
                if self.expired(entry.get()) {
                    entry.insert(Instant::now());
                    true
                } else {
                    false
                }
            }
            Entry::Vacant(entry) => {
                entry.insert(Instant::now());
                true
            }
        };

        if won && self.inserts.fetch_add(1, Ordering::Relaxed) % PRUNE_EVERY_INSERTS == 0 {
            self.prune();
        }
        won
    }

    /// Drop entries past the retention window.
    pub fn prune(&self) {
        self.consumed.retain(|_, at| at.elapsed() < self.retention);
    }

    pub fn len(&self) -> usize {
        self.consumed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.consumed.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_consume_wins_second_loses() {
        let guard = ReplayGuard::new(Duration::from_secs(3600));
        assert!(guard.try_consume("POST /models/{id}/invest", "tok1"));
        assert!(!guard.try_consume("POST /models/{id}/invest", "tok1"));
    }

    #[test]
    fn same_token_on_another_route_is_distinct() {
        let guard = ReplayGuard::new(Duration::from_secs(3600));
        assert!(guard.try_consume("POST /models/{id}/invest", "tok1"));
        assert!(guard.try_consume("POST /competitions/{id}/enter", "tok1"));
    }

    #[test]
    fn is_consumed_does_not_consume() {
        let guard = ReplayGuard::new(Duration::from_secs(3600));
        assert!(!guard.is_consumed("r", "tok1"));
        assert!(guard.try_consume("r", "tok1"));
        assert!(guard.is_consumed("r", "tok1"));
    }

    #[test]
    fn expired_entries_can_be_reconsumed_and_pruned() {
        let guard = ReplayGuard::new(Duration::ZERO);
        assert!(guard.try_consume("r", "tok1"));
        // Zero retention: the record is immediately stale.
        assert!(!guard.is_consumed("r", "tok1"));
        assert!(guard.try_consume("r", "tok1"));

        guard.prune();
        assert!(guard.is_empty());
    }

    #[test]
    fn concurrent_redeemers_get_exactly_one_win() {
        use std::sync::Arc;

        let guard = Arc::new(ReplayGuard::new(Duration::from_secs(3600)));
        let mut handles = Vec::new();
        for _ in 0..16 {
            let guard = guard.clone();
            handles.push(std::thread::spawn(move || {
                guard.try_consume("r", "tok1") as u32
            }));
        }
        let wins: u32 = handles.into_iter().map(|h| h.join().unwrap()).sum();
        assert_eq!(wins, 1);
    }
}
