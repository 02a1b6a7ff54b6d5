use serde::{Deserialize, Serialize};
use std::time::SystemTime;

use crate::error::ApiError;
use crate::handlers::AppState;
use crate::metrics::ThrottleMetrics;

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    pub timestamp: u64,
    pub version: String,
    pub uptime_seconds: u64,
    pub books: BookStoreStatus,
    pub throttle: ThrottleStatus,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct BookStoreStatus {
    pub stored: u64,
    pub cached: usize,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ThrottleStatus {
    pub cooldown_seconds: u64,
    pub tracked_clients: usize,
    pub requests: ThrottleMetrics,
}

pub struct HealthChecker<'a> {
    state: &'a AppState,
}

impl<'a> HealthChecker<'a> {
    pub fn new(state: &'a AppState) -> Self {
        Self { state }
    }

    pub fn check_health(&self) -> Result<HealthStatus, ApiError> {
        let timestamp = SystemTime::now()
            .duration_since(SystemTime::UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs();

        Ok(HealthStatus {
            status: "healthy".to_string(),
            timestamp,
            version: env!("CARGO_PKG_VERSION").to_string(),
            uptime_seconds: self.state.started_at.elapsed().as_secs(),
            books: BookStoreStatus {
                stored: self.state.books.count()?,
                cached: self.state.books.cache().len(),
            },
            throttle: ThrottleStatus {
                cooldown_seconds: self.state.throttle.cooldown().as_secs(),
                tracked_clients: self.state.throttle.tracked_clients(),
                requests: self.state.metrics.snapshot(),
            },
        })
    }
}
