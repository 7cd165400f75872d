// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! `SafeTec` Lib - A Rust library to poll Wasserwächter water-guard devices.
//!
//! This library reads a leak-protection device's local `safe-tec` HTTP API
//! and republishes every queried register as a named state in a host
//! automation platform's state store.
//!
//! # How it works
//!
//! - **Bootstrap**: device-wide settings (language, units, sensor presence,
//!   firmware identity) are read once at startup.
//! - **Profile discovery**: the profile count, then the parameters of all
//!   8 leak-protection profile slots.
//! - **Recurring poll**: live conditions (volumes, alarm, valve, voltages,
//!   optional sensor readings) re-read on a configurable interval.
//!
//! All fetches are strictly serial, one request in flight at a time.
//! Failures never crash the adapter: a failed fetch leaves the state at its
//! last value, an unrecognized raw value publishes the `"undefined"`
//! sentinel.
//!
//! # Quick Start
//!
//! ```no_run
//! use safetec_lib::{AdapterConfig, Poller};
//! use safetec_lib::protocol::HttpClient;
//! use safetec_lib::state::MemoryStateStore;
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() -> safetec_lib::Result<()> {
//!     let config = AdapterConfig::new("192.168.70.26")
//!         .with_port(5333)
//!         .with_poll_interval(Duration::from_secs(30));
//!
//!     let transport = HttpClient::from_config(&config)?;
//!     let store = MemoryStateStore::new();
//!
//!     let handle = Poller::new(transport, store, config).spawn()?;
//!
//!     // ... run until the host asks the adapter to unload ...
//!     handle.shutdown().await;
//!     Ok(())
//! }
//! ```
//!
//! # Single fetches
//!
//! The transport can also be used directly:
//!
//! ```no_run
//! use safetec_lib::{AdapterConfig, CommandCode};
//! use safetec_lib::protocol::{HttpClient, Transport};
//!
//! # async fn example() -> safetec_lib::Result<()> {
//! let client = HttpClient::from_config(&AdapterConfig::new("192.168.70.26"))?;
//! let raw = client.query(&CommandCode::Alarm).await?;
//! println!("alarm register: {raw}");
//! # Ok(())
//! # }
//! ```

mod command;
mod config;
pub mod error;
pub mod mapping;
pub mod poller;
pub mod protocol;
pub mod state;

pub use command::{CommandCode, ProfileField, ProfileIndex};
pub use config::AdapterConfig;
pub use error::{Error, ParseError, ProtocolError, Result, ValueError};
pub use mapping::{Mapped, UnitSystem};
pub use poller::{CycleOutcome, CycleStats, FieldOutcome, Poller, PollerHandle};
pub use protocol::{HttpClient, RawValue, Transport};
pub use state::{MemoryStateStore, StateDeclaration, StateKind, StateStore, StateValue};
