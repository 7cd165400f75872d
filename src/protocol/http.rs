// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! HTTP transport for the water-guard device.

use reqwest::Client;

use crate::command::CommandCode;
use crate::config::AdapterConfig;
use crate::error::{ParseError, ProtocolError, Result};
use crate::protocol::{RawValue, Transport};

/// HTTP client for the device's `safe-tec` REST API.
///
/// Each register is read with `GET /safe-tec/get/<CODE>`; the reply is a
/// single-key JSON object `{"get<CODE>": <value>}`. No authentication, no
/// TLS; the device's embedded HTTP stack speaks plain HTTP only.
///
/// # Examples
///
/// ```no_run
/// use safetec_lib::{AdapterConfig, CommandCode};
/// use safetec_lib::protocol::{HttpClient, Transport};
///
/// # async fn example() -> safetec_lib::Result<()> {
/// let config = AdapterConfig::new("192.168.70.26");
/// let client = HttpClient::from_config(&config)?;
/// let raw = client.query(&CommandCode::BatteryVoltage).await?;
/// println!("battery: {raw} V");
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct HttpClient {
    base_url: String,
    client: Client,
}

impl HttpClient {
    /// Creates an HTTP client from the adapter configuration.
    ///
    /// The configured per-request timeout is applied to every fetch, so a
    /// silent device can never stall a sequencer indefinitely.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying HTTP client cannot be created.
    pub fn from_config(config: &AdapterConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.request_timeout())
            .build()
            .map_err(ProtocolError::Http)?;

        Ok(Self {
            base_url: config.base_url(),
            client,
        })
    }

    /// Returns the base URL of the device.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Builds the request URL for a register.
    fn build_url(&self, code: &CommandCode) -> String {
        format!("{}/safe-tec/get/{}", self.base_url, code.code())
    }
}

impl Transport for HttpClient {
    async fn query(&self, code: &CommandCode) -> Result<RawValue> {
        let url = self.build_url(code);

        tracing::debug!(url = %url, "querying device register");

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(ProtocolError::Http)?;

        if !response.status().is_success() {
            return Err(ProtocolError::ConnectionFailed(format!(
                "HTTP {} - {}",
                response.status().as_u16(),
                response.status().canonical_reason().unwrap_or("Unknown")
            ))
            .into());
        }

        let body: serde_json::Value = response
            .json()
            .await
            .map_err(ProtocolError::Http)?;

        let key = code.response_key();
        let value = body
            .get(&key)
            .ok_or_else(|| ParseError::MissingField(key.clone()))?;

        let raw = match value {
            serde_json::Value::String(s) => s.clone(),
            serde_json::Value::Number(n) => n.to_string(),
            other => {
                return Err(ParseError::UnexpectedFormat(format!(
                    "{key} holds {other}, expected string or number"
                ))
                .into());
            }
        };

        tracing::debug!(code = %code, raw = %raw, "received register value");

        Ok(RawValue::new(raw))
    }
}
