//! Per-client fixed-window rate limiting.
//!
//! # Algorithm
//!
//! Each client owns a counter bound to a wall-clock epoch second. On every
//! check:
//!
//! - no window yet, or the window belongs to an earlier second: reset the
//!   counter to 1 and allow
//! - counter below the limit: increment and allow
//! - otherwise: deny
//!
//! Windows are aligned to wall-clock seconds rather than sliding, so a client
//! can get up to twice the limit through across a second boundary (a full
//! budget at the tail of second `T`, another at the head of `T + 1`).
//!
//! # Memory
//!
//! Entries are created on first sight of a client and never evicted. Under a
//! very large number of distinct client identifiers the map grows for the
//! lifetime of the process.
//!
//! # Concurrency
//!
//! One mutex guards the whole map. It is held only for the O(1)
//! check-and-update and never across I/O.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use chrono::Utc;

use super::ip::UNKNOWN_CLIENT;

/// Counter for a single client within one epoch second.
#[derive(Debug, Clone, Copy)]
struct Window {
    second: i64,
    count: i64,
}

/// In-memory fixed one-second window limiter keyed by client identifier.
///
/// # Example
///
/// ```rust,ignore
/// let limiter = FixedWindowLimiter::new(5);
/// if !limiter.allow("203.0.113.7") {
///     // respond 429
/// }
/// ```
#[derive(Debug)]
pub struct FixedWindowLimiter {
    limit: i64,
    windows: Mutex<HashMap<String, Window>>,
}

impl FixedWindowLimiter {
    /// Create a limiter admitting `limit` requests per client per second.
    ///
    /// A `limit` of zero or less disables limiting: every call is allowed.
    pub fn new(limit: i64) -> Self {
        Self {
            limit,
            windows: Mutex::new(HashMap::new()),
        }
    }

    /// Configured per-second limit.
    pub fn limit(&self) -> i64 {
        self.limit
    }

    /// Whether this limiter ever denies anything.
    pub fn is_enabled(&self) -> bool {
        self.limit > 0
    }

    /// Check and record one request from `client_id` in the current second.
    ///
    /// An empty identifier is counted under [`UNKNOWN_CLIENT`].
    pub fn allow(&self, client_id: &str) -> bool {
        self.allow_at(client_id, Utc::now().timestamp())
    }

    fn allow_at(&self, client_id: &str, now: i64) -> bool {
        if !self.is_enabled() {
            return true;
        }
        let key = if client_id.is_empty() {
            UNKNOWN_CLIENT
        } else {
            client_id
        };

        // Window updates are single assignments; a poisoned map is still consistent
        let mut windows = self.windows.lock().unwrap_or_else(PoisonError::into_inner);

        match windows.get_mut(key) {
            Some(window) if window.second == now => {
                if window.count >= self.limit {
                    return false;
                }
                window.count += 1;
                true
            }
            Some(window) => {
                *window = Window {
                    second: now,
                    count: 1,
                };
                true
            }
            None => {
                windows.insert(
                    key.to_string(),
                    Window {
                        second: now,
                        count: 1,
                    },
                );
                true
            }
        }
    }

    #[cfg(test)]
    fn tracked_clients(&self) -> usize {
        self.windows
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use std::sync::Arc;

    const T: i64 = 1_700_000_000;

    #[test]
    fn test_denies_request_over_limit_within_second() {
        let limiter = FixedWindowLimiter::new(2);

        assert!(limiter.allow_at("1.2.3.4", T));
        assert!(limiter.allow_at("1.2.3.4", T));
        assert!(!limiter.allow_at("1.2.3.4", T));
        assert!(!limiter.allow_at("1.2.3.4", T));
    }

    #[test]
    fn test_new_second_resets_window() {
        let limiter = FixedWindowLimiter::new(2);

        assert!(limiter.allow_at("1.2.3.4", T));
        assert!(limiter.allow_at("1.2.3.4", T));
        assert!(!limiter.allow_at("1.2.3.4", T));

        assert!(limiter.allow_at("1.2.3.4", T + 1));
    }

    #[test]
    fn test_boundary_allows_double_limit() {
        let limiter = FixedWindowLimiter::new(3);

        let tail = (0..3).filter(|_| limiter.allow_at("c", T)).count();
        let head = (0..3).filter(|_| limiter.allow_at("c", T + 1)).count();

        assert_eq!(tail + head, 6);
    }

    #[test]
    fn test_clients_have_independent_budgets() {
        let limiter = FixedWindowLimiter::new(1);

        assert!(limiter.allow_at("a", T));
        assert!(!limiter.allow_at("a", T));
        assert!(limiter.allow_at("b", T));
        assert_eq!(limiter.tracked_clients(), 2);
    }

    #[test]
    fn test_non_positive_limit_allows_everything() {
        for limit in [0, -1] {
            let limiter = FixedWindowLimiter::new(limit);
            assert!(!limiter.is_enabled());
            assert!((0..1_000).all(|_| limiter.allow_at("1.2.3.4", T)));
            // Disabled limiter does not track clients
            assert_eq!(limiter.tracked_clients(), 0);
        }
    }

    #[test]
    fn test_empty_client_shares_unknown_bucket() {
        let limiter = FixedWindowLimiter::new(1);

        assert!(limiter.allow_at("", T));
        assert!(!limiter.allow_at(UNKNOWN_CLIENT, T));
    }

    #[test]
    fn test_concurrent_checks_never_exceed_limit() {
        let limiter = Arc::new(FixedWindowLimiter::new(10));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let limiter = limiter.clone();
                std::thread::spawn(move || (0..50).filter(|_| limiter.allow_at("c", T)).count())
            })
            .collect();

        let allowed: usize = handles.into_iter().map(|h| h.join().unwrap()).sum();
        assert_eq!(allowed, 10);
    }
}
