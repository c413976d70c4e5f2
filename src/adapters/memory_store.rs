use crate::core::RateLimitStore;
use dashmap::DashMap;

/// Process-local rate-limit timestamps. DashMap shards its locks, so concurrent
/// requests from different callers do not contend.
#[derive(Debug, Default)]
pub struct InMemoryRateLimitStore {
    requests: DashMap<String, Vec<i64>>,
}

impl InMemoryRateLimitStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tracked_callers(&self) -> usize {
        self.requests.len()
    }
}

impl RateLimitStore for InMemoryRateLimitStore {
    fn timestamps(&self, caller: &str) -> Vec<i64> {
        self.requests
            .get(caller)
            .map(|entry| entry.value().clone())
            .unwrap_or_default()
    }

    fn append(&self, caller: &str, timestamp_ms: i64) {
        self.requests
            .entry(caller.to_string())
            .or_default()
            .push(timestamp_ms);
    }

    fn prune(&self, caller: &str, older_than_ms: i64) {
        if let Some(mut entry) = self.requests.get_mut(caller) {
            entry.retain(|t| *t > older_than_ms);
        }
    }

    fn cleanup(&self, older_than_ms: i64) {
        // 先丟掉過期時間戳，再移除空的呼叫者
        self.requests.retain(|_, timestamps| {
            timestamps.retain(|t| *t > older_than_ms);
            !timestamps.is_empty()
        });
    }
}
