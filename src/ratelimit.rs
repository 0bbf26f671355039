// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Per-principal request rate limiting.
//!
//! Fixed-window counters kept in bounded LRU maps. The key space is sharded
//! across several locks, so admission checks for unrelated principals do not
//! serialize on one mutex. A key's window starts at its first admitted
//! request and is refreshed by every admitted request; entries whose window
//! has passed count as absent. When the key capacity overflows, the least
//! recently used counters are evicted.

use std::num::NonZeroUsize;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use lru::LruCache;

const DEFAULT_SHARDS: usize = 16;

/// Counter entry: admissions so far + window expiry.
struct CounterEntry {
    count: u32,
    window_ends_at: Instant,
}

/// Sharded fixed-window rate limiter.
pub struct RateLimiter {
    shards: Vec<Mutex<LruCache<String, CounterEntry>>>,
    ceiling: u32,
    window: Duration,
}

impl RateLimiter {
    /// Create a limiter admitting `ceiling` requests per key per `window`.
    ///
    /// - `ceiling`: Max admitted requests per key within one window.
    /// - `window`: Window length, measured from the last admitted request.
    /// - `key_capacity`: Max number of keys tracked across all shards.
    pub fn new(ceiling: u32, window: Duration, key_capacity: usize) -> Self {
        Self::with_shards(ceiling, window, key_capacity, DEFAULT_SHARDS)
    }

    /// Same as [`RateLimiter::new`] with an explicit shard count.
    pub fn with_shards(ceiling: u32, window: Duration, key_capacity: usize, shards: usize) -> Self {
        let shard_count = shards.max(1);
        let per_shard = key_capacity.div_ceil(shard_count).max(1);
        let shards = (0..shard_count)
            .map(|_| {
                Mutex::new(LruCache::new(
                    NonZeroUsize::new(per_shard).unwrap_or(NonZeroUsize::new(1).unwrap()),
                ))
            })
            .collect();
        Self {
            shards,
            ceiling,
            window,
        }
    }

    /// Decide whether one more request from `key` is admitted now.
    ///
    /// Only admitted requests consume budget and refresh the window; a
    /// denied request mutates nothing.
    pub fn admit(&self, key: &str) -> bool {
        if self.ceiling == 0 {
            return false;
        }

        let now = Instant::now();
        let shard = &self.shards[self.shard_for(key)];
        // A poisoned shard still holds valid counters
        let mut counters = match shard.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };

        if let Some(entry) = counters.get_mut(key) {
            if now < entry.window_ends_at {
                if entry.count >= self.ceiling {
                    return false;
                }
                entry.count += 1;
                entry.window_ends_at = now + self.window;
                return true;
            }
            // Window over, drop the stale counter
            counters.pop(key);
        }

        counters.put(
            key.to_string(),
            CounterEntry {
                count: 1,
                window_ends_at: now + self.window,
            },
        );
        true
    }

    fn shard_for(&self, key: &str) -> usize {
        use std::hash::{Hash, Hasher};
        let mut hasher = std::collections::hash_map::DefaultHasher::new();
        key.hash(&mut hasher);
        (hasher.finish() as usize) % self.shards.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn admits_up_to_the_ceiling_then_denies() {
        let limiter = RateLimiter::new(3, Duration::from_secs(60), 100);

        assert!(limiter.admit("alice"));
        assert!(limiter.admit("alice"));
        assert!(limiter.admit("alice"));
        assert!(!limiter.admit("alice"));
        assert!(!limiter.admit("alice"));
    }

    #[test]
    fn keys_are_limited_independently() {
        let limiter = RateLimiter::new(1, Duration::from_secs(60), 100);

        assert!(limiter.admit("alice"));
        assert!(!limiter.admit("alice"));
        assert!(limiter.admit("bob"));
    }

    #[test]
    fn window_expiry_resets_the_budget() {
        let limiter = RateLimiter::new(2, Duration::from_millis(50), 100);

        assert!(limiter.admit("alice"));
        assert!(limiter.admit("alice"));
        assert!(!limiter.admit("alice"));

        // Wait for the window to pass
        std::thread::sleep(Duration::from_millis(60));

        assert!(limiter.admit("alice"));
    }

    #[test]
    fn denied_attempts_do_not_extend_the_window() {
        let limiter = RateLimiter::new(1, Duration::from_millis(200), 100);

        assert!(limiter.admit("alice"));

        std::thread::sleep(Duration::from_millis(150));
        // Still inside the window
        assert!(!limiter.admit("alice"));

        std::thread::sleep(Duration::from_millis(110));
        // The denial above must not have pushed the window past this point
        assert!(limiter.admit("alice"));
    }

    #[test]
    fn zero_ceiling_denies_everything() {
        let limiter = RateLimiter::new(0, Duration::from_secs(60), 100);
        assert!(!limiter.admit("alice"));
        assert!(!limiter.admit("alice"));
    }

    #[test]
    fn overflowing_key_capacity_evicts_the_coldest_counter() {
        // Single shard so eviction order is deterministic
        let limiter = RateLimiter::with_shards(1, Duration::from_secs(60), 2, 1);

        assert!(limiter.admit("a"));
        assert!(!limiter.admit("a"));
        assert!(limiter.admit("b"));
        // Third key evicts "a", the least recently touched
        assert!(limiter.admit("c"));
        // "a" starts over with a fresh budget
        assert!(limiter.admit("a"));
    }

    #[test]
    fn concurrent_admissions_never_exceed_the_ceiling() {
        let limiter = Arc::new(RateLimiter::new(100, Duration::from_secs(60), 1000));

        let mut handles = Vec::new();
        for _ in 0..4 {
            let limiter = Arc::clone(&limiter);
            handles.push(std::thread::spawn(move || {
                let mut admitted = 0u32;
                for _ in 0..50 {
                    if limiter.admit("shared-key") {
                        admitted += 1;
                    }
                }
                admitted
            }));
        }

        let total: u32 = handles.into_iter().map(|h| h.join().unwrap()).sum();
        assert_eq!(total, 100);
    }
}
