use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThrottleMetrics {
    pub total_requests: u64,
    pub allowed_requests: u64,
    pub throttled_requests: u64,
}

/// Counts throttle decisions across all clients.
#[derive(Debug, Default)]
pub struct MetricsCollector {
    allowed: AtomicU64,
    throttled: AtomicU64,
}

impl MetricsCollector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_request(&self, allowed: bool) {
        if allowed {
            self.allowed.fetch_add(1, Ordering::Relaxed);
        } else {
            self.throttled.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn snapshot(&self) -> ThrottleMetrics {
        let allowed_requests = self.allowed.load(Ordering::Relaxed);
        let throttled_requests = self.throttled.load(Ordering::Relaxed);

        ThrottleMetrics {
            total_requests: allowed_requests + throttled_requests,
            allowed_requests,
            throttled_requests,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_request() {
        let metrics = MetricsCollector::new();
        metrics.record_request(true);
        metrics.record_request(false);
        metrics.record_request(true);

        assert_eq!(
            metrics.snapshot(),
            ThrottleMetrics {
                total_requests: 3,
                allowed_requests: 2,
                throttled_requests: 1,
            }
        );
    }
}
