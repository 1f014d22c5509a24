//! HTTP server and order query configuration.

use std::time::Duration;

use chrono::FixedOffset;
use serde::Deserialize;

/// HTTP server configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Bind address.
    pub host: String,
    /// Listen port.
    pub port: u16,
    /// Requests running longer than this are answered with 408.
    pub request_timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            request_timeout_secs: 30,
        }
    }
}

impl ServerConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

/// Order query configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct OrdersConfig {
    /// Fixed offset from UTC, in minutes, that defines the shop's calendar day.
    pub utc_offset_minutes: i32,
}

impl OrdersConfig {
    /// The configured offset; must lie strictly within ±24h.
    pub fn day_offset(&self) -> Result<FixedOffset, ::config::ConfigError> {
        self.utc_offset_minutes
            .checked_mul(60)
            .and_then(FixedOffset::east_opt)
            .ok_or_else(|| {
                ::config::ConfigError::Message(format!(
                    "orders.utc_offset_minutes out of range: {}",
                    self.utc_offset_minutes
                ))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_day_offset_bounds() {
        let ok = OrdersConfig {
            utc_offset_minutes: -300,
        };
        assert_eq!(ok.day_offset().unwrap().local_minus_utc(), -300 * 60);

        let too_far = OrdersConfig {
            utc_offset_minutes: 24 * 60,
        };
        assert!(too_far.day_offset().is_err());
    }
}
