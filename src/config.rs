// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Adapter configuration.
//!
//! The configuration surface is deliberately small: device host, device
//! port, poll interval and per-request timeout. Everything else about the
//! device is discovered at bootstrap.

use std::time::Duration;

use serde::Deserialize;

use crate::error::ValueError;

/// Configuration for a water-guard device adapter.
///
/// # Examples
///
/// ```
/// use safetec_lib::AdapterConfig;
/// use std::time::Duration;
///
/// let config = AdapterConfig::new("192.168.70.26")
///     .with_port(5333)
///     .with_poll_interval(Duration::from_secs(30));
///
/// assert_eq!(config.base_url(), "http://192.168.70.26:5333");
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AdapterConfig {
    host: String,
    port: u16,
    poll_interval_secs: u64,
    request_timeout_secs: u64,
}

impl Default for AdapterConfig {
    fn default() -> Self {
        Self {
            host: String::new(),
            port: Self::DEFAULT_PORT,
            poll_interval_secs: Self::DEFAULT_POLL_INTERVAL_SECS,
            request_timeout_secs: Self::DEFAULT_REQUEST_TIMEOUT_SECS,
        }
    }
}

impl AdapterConfig {
    /// Default device HTTP port.
    pub const DEFAULT_PORT: u16 = 5333;
    /// Default poll interval in seconds.
    pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 60;
    /// Default per-request timeout in seconds.
    pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 10;

    /// Creates a new configuration for the specified device host.
    #[must_use]
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            ..Self::default()
        }
    }

    /// Sets a custom device port.
    #[must_use]
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Sets the poll interval.
    ///
    /// Sub-second durations are truncated to whole seconds.
    #[must_use]
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval_secs = interval.as_secs();
        self
    }

    /// Sets the per-request timeout.
    #[must_use]
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout_secs = timeout.as_secs();
        self
    }

    /// Returns the device host.
    #[must_use]
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Returns the device port.
    #[must_use]
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Returns the poll interval.
    #[must_use]
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }

    /// Returns the per-request timeout.
    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Builds the device base URL from this configuration.
    ///
    /// No validation of host format is performed; a malformed host surfaces
    /// as a downstream connection failure.
    #[must_use]
    pub fn base_url(&self) -> String {
        format!("http://{}:{}", self.host, self.port)
    }

    /// Checks the configuration for values the poller cannot work with.
    ///
    /// # Errors
    ///
    /// Returns `ValueError::ZeroPollInterval` if the poll interval is zero.
    pub fn validate(&self) -> Result<(), ValueError> {
        if self.poll_interval_secs == 0 {
            return Err(ValueError::ZeroPollInterval);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_values() {
        let config = AdapterConfig::new("192.168.70.26");
        assert_eq!(config.host(), "192.168.70.26");
        assert_eq!(config.port(), 5333);
        assert_eq!(config.poll_interval(), Duration::from_secs(60));
        assert_eq!(config.request_timeout(), Duration::from_secs(10));
    }

    #[test]
    fn base_url_includes_port() {
        let config = AdapterConfig::new("192.168.70.26").with_port(8080);
        assert_eq!(config.base_url(), "http://192.168.70.26:8080");
    }

    #[test]
    fn builder_chain() {
        let config = AdapterConfig::new("device.local")
            .with_port(5333)
            .with_poll_interval(Duration::from_secs(15))
            .with_request_timeout(Duration::from_secs(3));
        assert_eq!(config.poll_interval(), Duration::from_secs(15));
        assert_eq!(config.request_timeout(), Duration::from_secs(3));
    }

    #[test]
    fn zero_interval_is_rejected() {
        let config = AdapterConfig::new("device.local").with_poll_interval(Duration::ZERO);
        assert_eq!(config.validate(), Err(ValueError::ZeroPollInterval));
    }

    #[test]
    fn deserializes_with_defaults() {
        let config: AdapterConfig =
            serde_json::from_str(r#"{"host": "192.168.70.26", "poll_interval_secs": 30}"#).unwrap();
        assert_eq!(config.host(), "192.168.70.26");
        assert_eq!(config.port(), AdapterConfig::DEFAULT_PORT);
        assert_eq!(config.poll_interval(), Duration::from_secs(30));
    }
}
