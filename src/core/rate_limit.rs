//! Sliding-window admission gate, one window per caller.
//!
//! Timestamps live in an injected [`RateLimitStore`] so the in-process map can
//! be swapped for a shared store. Read-then-append is not atomic; a burst of
//! concurrent requests may be admitted slightly past the limit.

use crate::core::RateLimitStore;
use serde::Serialize;
use std::sync::atomic::{AtomicUsize, Ordering};

pub const WINDOW_MS: i64 = 60_000;

/// Idle callers are swept from the store once per this many checks.
pub const CLEANUP_EVERY: usize = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Admission {
    pub allowed: bool,
    /// Requests left in the current window after this one.
    pub remaining: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retry_after_ms: Option<u64>,
}

pub struct RateLimiter<S: RateLimitStore> {
    store: S,
    max_requests: usize,
    checks: AtomicUsize,
}

impl<S: RateLimitStore> RateLimiter<S> {
    pub fn new(store: S, max_requests: usize) -> Self {
        Self {
            store,
            max_requests,
            checks: AtomicUsize::new(0),
        }
    }

    pub fn check(&self, caller: &str) -> Admission {
        self.check_at(caller, chrono::Utc::now().timestamp_millis())
    }

    /// Admit or deny `caller` at `now_ms`, recording the request only when admitted.
    pub fn check_at(&self, caller: &str, now_ms: i64) -> Admission {
        let cutoff = now_ms - WINDOW_MS;
        if (self.checks.fetch_add(1, Ordering::Relaxed) + 1) % CLEANUP_EVERY == 0 {
            self.cleanup_at(now_ms);
        }

        self.store.prune(caller, cutoff);
        let timestamps = self.store.timestamps(caller);

        if timestamps.len() >= self.max_requests {
            let oldest = timestamps.iter().copied().min().unwrap_or(now_ms);
            let retry_after_ms = (oldest + WINDOW_MS - now_ms).max(0) as u64;
            tracing::warn!(
                caller = caller,
                requests = timestamps.len(),
                max = self.max_requests,
                retry_after_ms = retry_after_ms,
                "Rate limit exceeded"
            );
            return Admission {
                allowed: false,
                remaining: 0,
                retry_after_ms: Some(retry_after_ms),
            };
        }

        self.store.append(caller, now_ms);
        Admission {
            allowed: true,
            remaining: self.max_requests - timestamps.len() - 1,
            retry_after_ms: None,
        }
    }

    /// Drop every timestamp that has left the window, and callers left with none.
    pub fn cleanup_at(&self, now_ms: i64) {
        self.store.cleanup(now_ms - WINDOW_MS);
    }
}
