use crate::error::ApiError;
use envconfig::Envconfig;
use std::net::SocketAddr;
use std::time::Duration;

#[derive(Debug, Envconfig, Clone)]
pub struct Config {
    /// Server bind address
    #[envconfig(from = "BIND_ADDR", default = "127.0.0.1:8080")]
    pub bind_addr: SocketAddr,

    /// Log level used when RUST_LOG is not set
    #[envconfig(from = "LOG_LEVEL", default = "info")]
    pub log_level: String,

    /// Book cache expire-after-access time in seconds
    #[envconfig(from = "CACHE_TTL_SECS", default = "600")]
    pub cache_ttl_secs: u64,

    /// Interval between throttle and cache sweeps in seconds
    #[envconfig(from = "SWEEP_INTERVAL_SECS", default = "60")]
    pub sweep_interval_secs: u64,

    /// Page size used when a list request does not ask for one
    #[envconfig(from = "DEFAULT_PAGE_SIZE", default = "20")]
    pub default_page_size: u32,

    /// Largest page size a client may request
    #[envconfig(from = "MAX_PAGE_SIZE", default = "100")]
    pub max_page_size: u32,

    /// Enable request tracing
    #[envconfig(from = "ENABLE_TRACING", default = "true")]
    pub enable_tracing: bool,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, envconfig::Error> {
        Config::init_from_env()
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }

    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_secs)
    }

    pub fn validate(&self) -> Result<(), ApiError> {
        if self.cache_ttl_secs == 0 {
            return Err(ApiError::Configuration(
                "Cache TTL must be greater than 0".to_string(),
            ));
        }

        if self.sweep_interval_secs == 0 {
            return Err(ApiError::Configuration(
                "Sweep interval must be greater than 0".to_string(),
            ));
        }

        if self.max_page_size == 0 {
            return Err(ApiError::Configuration(
                "Max page size must be greater than 0".to_string(),
            ));
        }

        if self.default_page_size == 0 || self.default_page_size > self.max_page_size {
            return Err(ApiError::Configuration(format!(
                "Default page size must be between 1 and {}",
                self.max_page_size
            )));
        }

        let level = self.log_level.to_lowercase();
        if !["trace", "debug", "info", "warn", "error"].contains(&level.as_str()) {
            return Err(ApiError::Configuration(format!(
                "Invalid log level '{}'",
                self.log_level
            )));
        }

        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 8080)),
            log_level: "info".to_string(),
            cache_ttl_secs: 600,
            sweep_interval_secs: 60,
            default_page_size: 20,
            max_page_size: 100,
            enable_tracing: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn test_zero_intervals_rejected() {
        let config = Config {
            cache_ttl_secs: 0,
            ..Config::default()
        };
        assert!(config.validate().is_err());

        let config = Config {
            sweep_interval_secs: 0,
            ..Config::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_default_page_size_above_max_rejected() {
        let config = Config {
            default_page_size: 200,
            max_page_size: 100,
            ..Config::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_invalid_log_level_rejected() {
        let config = Config {
            log_level: "loud".to_string(),
            ..Config::default()
        };
        assert!(config.validate().is_err());
    }
}
