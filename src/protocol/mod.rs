// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Transport towards the water-guard device.
//!
//! The device exposes one HTTP endpoint per register; [`Transport`] is the
//! seam the sequencers talk to, [`HttpClient`] the production
//! implementation. Tests may substitute a scripted transport.

mod http;

pub use http::HttpClient;

use crate::command::CommandCode;
use crate::error::Result;

/// Raw reply value for one register, as returned by the device.
///
/// The device reports strings and numbers; numbers are carried in their
/// decimal rendering so the mapper sees one uniform input shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawValue(String);

impl RawValue {
    /// Wraps a raw reply value.
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Returns the raw value as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for RawValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Trait for transports that can query one device register.
///
/// Every failure mode (connection refused, timeout, non-2xx status,
/// malformed body) surfaces as an `Err`; the sequencers treat them all
/// uniformly as "fetch failed, leave the state stale".
pub trait Transport {
    /// Queries the device for the value of one register.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the response body does not
    /// contain the expected `get<CODE>` key.
    fn query(&self, code: &CommandCode) -> impl Future<Output = Result<RawValue>> + Send;
}

impl<T: Transport + Sync> Transport for &T {
    fn query(&self, code: &CommandCode) -> impl Future<Output = Result<RawValue>> + Send {
        (**self).query(code)
    }
}

impl<T: Transport + Sync + Send> Transport for std::sync::Arc<T> {
    fn query(&self, code: &CommandCode) -> impl Future<Output = Result<RawValue>> + Send {
        (**self).query(code)
    }
}
