use skinmatch_core::{Error, Result};
use std::time::Duration;

/// Runtime settings for the REST server
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub http_port: u16,
    pub cache_capacity: usize,
    pub request_timeout: Duration,
    pub default_count: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            http_port: 8080,
            cache_capacity: 32,
            request_timeout: Duration::from_millis(5000),
            default_count: 5,
        }
    }
}

impl ServerConfig {
    pub fn validate(&self) -> Result<()> {
        if self.request_timeout.is_zero() {
            return Err(Error::InvalidConfig("request timeout must be positive".to_string()));
        }
        if self.default_count == 0 {
            return Err(Error::InvalidConfig("default count must be positive".to_string()));
        }
        Ok(())
    }
}
