// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Bootstrap and poll sequencers.
//!
//! The poller drives three strictly serial stages against one device:
//! a one-time bootstrap of device settings, a one-time profile discovery,
//! and a recurring poll of live conditions. Serialization comes from
//! sequential awaits, so one request is in flight at a time, and a
//! single-flight guard drops overlapping timer ticks instead of queueing
//! them.

use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::watch;
use tokio::time::MissedTickBehavior;

use crate::command::{CommandCode, ProfileIndex};
use crate::config::AdapterConfig;
use crate::error::Result;
use crate::mapping::{self, Mapped, UNDEFINED, UnitSystem};
use crate::protocol::Transport;
use crate::state::{StateDeclaration, StateStore, StateValue};

/// State path the adapter's device address is republished under.
pub const INFO_IP_ADDRESS: &str = "Info.IpAddress";
/// State path the adapter's device port is republished under.
pub const INFO_PORT: &str = "Info.Port";
/// State path the adapter's poll interval is republished under.
pub const INFO_POLL_INTERVAL: &str = "Info.PollInterval";

/// Outcome of fetching and publishing one register.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldOutcome {
    /// The register was fetched, mapped and written.
    Value(StateValue),
    /// The fetch failed; the state keeps its last value.
    TransportError,
    /// The raw value matched no known case; the sentinel was written.
    UnmappedValue,
}

/// Counters for one sequencer pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CycleStats {
    /// Registers attempted.
    pub fetched: usize,
    /// Fetches that failed at the transport level.
    pub transport_errors: usize,
    /// Fetches that produced the `"undefined"` sentinel.
    pub unmapped: usize,
}

impl CycleStats {
    fn record(&mut self, outcome: &FieldOutcome) {
        self.fetched += 1;
        match outcome {
            FieldOutcome::Value(_) => {}
            FieldOutcome::TransportError => self.transport_errors += 1,
            FieldOutcome::UnmappedValue => self.unmapped += 1,
        }
    }
}

/// Outcome of one poll invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleOutcome {
    /// The cycle ran to completion.
    Completed(CycleStats),
    /// A previous cycle was still running; this tick was dropped.
    Skipped,
}

/// Sequencer for one water-guard device.
///
/// # Examples
///
/// ```no_run
/// use safetec_lib::{AdapterConfig, Poller};
/// use safetec_lib::protocol::HttpClient;
/// use safetec_lib::state::MemoryStateStore;
///
/// # async fn example() -> safetec_lib::Result<()> {
/// let config = AdapterConfig::new("192.168.70.26");
/// let transport = HttpClient::from_config(&config)?;
/// let poller = Poller::new(transport, MemoryStateStore::new(), config);
///
/// let handle = poller.spawn()?;
/// // ... adapter runs until shutdown ...
/// handle.shutdown().await;
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct Poller<T, S> {
    transport: T,
    store: S,
    config: AdapterConfig,
    in_flight: AtomicBool,
}

impl<T, S> Poller<T, S>
where
    T: Transport + Sync,
    S: StateStore + Sync,
{
    /// Creates a poller over the given transport and state store.
    pub fn new(transport: T, store: S, config: AdapterConfig) -> Self {
        Self {
            transport,
            store,
            config,
            in_flight: AtomicBool::new(false),
        }
    }

    /// Returns the adapter configuration.
    #[must_use]
    pub fn config(&self) -> &AdapterConfig {
        &self.config
    }

    /// Declares every state path this poller publishes.
    ///
    /// Idempotent; called once before the first fetch. States are created
    /// here and never deleted.
    pub async fn declare_states(&self) {
        for code in CommandCode::all() {
            self.store
                .declare(&code.state_path(), code.declaration())
                .await;
        }
        // The adapter's own configuration is republished as host states,
        // writable so the host may correct them by hand.
        self.store
            .declare(INFO_IP_ADDRESS, StateDeclaration::text().writable())
            .await;
        self.store
            .declare(INFO_PORT, StateDeclaration::number().writable())
            .await;
        self.store
            .declare(INFO_POLL_INTERVAL, StateDeclaration::number().with_unit("s").writable())
            .await;
    }

    /// Republishes the adapter configuration as acknowledged states.
    #[allow(clippy::cast_precision_loss)]
    pub async fn publish_info_states(&self) {
        tracing::info!(
            host = %self.config.host(),
            port = self.config.port(),
            interval_secs = self.config.poll_interval().as_secs(),
            "publishing adapter configuration"
        );
        self.store
            .write(
                INFO_IP_ADDRESS,
                StateValue::text(self.config.host()),
                true,
            )
            .await;
        self.store
            .write(INFO_PORT, StateValue::number(f64::from(self.config.port())), true)
            .await;
        self.store
            .write(
                INFO_POLL_INTERVAL,
                StateValue::number(self.config.poll_interval().as_secs() as f64),
                true,
            )
            .await;
    }

    /// Runs the one-time bootstrap: device settings, then profile
    /// discovery.
    ///
    /// Every fetch is awaited before the next one starts; nothing here is
    /// fatal. Bootstrap-only fields are never re-polled afterwards.
    pub async fn bootstrap(&self) -> CycleStats {
        tracing::info!(device = %self.config.base_url(), "bootstrapping device settings");
        let mut stats = CycleStats::default();
        for code in CommandCode::DEVICE_SETTINGS {
            let outcome = self.fetch_and_publish(code, UnitSystem::Metric).await;
            stats.record(&outcome);
        }
        let outcome = self
            .fetch_and_publish(CommandCode::SelectedProfile, UnitSystem::Metric)
            .await;
        stats.record(&outcome);
        self.discover_profiles(&mut stats).await;
        tracing::info!(
            fetched = stats.fetched,
            transport_errors = stats.transport_errors,
            unmapped = stats.unmapped,
            "bootstrap finished"
        );
        stats
    }

    /// Fetches the profile count, then every profile slot.
    ///
    /// A missing or zero count short-circuits the per-profile loop for this
    /// pass and leaves `Profiles.Active` at 0; discovery is not retried.
    async fn discover_profiles(&self, stats: &mut CycleStats) {
        let outcome = self
            .fetch_and_publish(CommandCode::ProfileCount, UnitSystem::Metric)
            .await;
        stats.record(&outcome);

        let count = match &outcome {
            FieldOutcome::Value(StateValue::Number(n)) if *n > 0.0 => *n,
            _ => {
                self.store
                    .write(
                        &CommandCode::ProfileCount.state_path(),
                        StateValue::number(0.0),
                        true,
                    )
                    .await;
                tracing::warn!("profile count unavailable, skipping profile fetches");
                return;
            }
        };

        tracing::info!(count, "fetching leak-protection profiles");
        for index in ProfileIndex::all() {
            for code in CommandCode::profile_codes(index) {
                let outcome = self.fetch_and_publish(code, UnitSystem::Metric).await;
                stats.record(&outcome);
            }
        }
    }

    /// Runs one poll cycle, unless a previous one is still in flight.
    ///
    /// Overlapping invocations are dropped, not queued: the caller gets
    /// [`CycleOutcome::Skipped`] and the running cycle is unaffected.
    pub async fn poll_once(&self) -> CycleOutcome {
        if self
            .in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            tracing::warn!("previous poll cycle still running, dropping this tick");
            return CycleOutcome::Skipped;
        }

        let mut stats = CycleStats::default();
        self.run_poll_cycle(&mut stats).await;
        self.in_flight.store(false, Ordering::Release);

        tracing::debug!(
            fetched = stats.fetched,
            transport_errors = stats.transport_errors,
            unmapped = stats.unmapped,
            "poll cycle finished"
        );
        CycleOutcome::Completed(stats)
    }

    async fn run_poll_cycle(&self, stats: &mut CycleStats) {
        for code in CommandCode::CONDITIONS {
            let outcome = self.fetch_and_publish(code, UnitSystem::Metric).await;
            stats.record(&outcome);
        }

        // Sensor flags and the unit system are read back from the store on
        // every tick rather than cached from bootstrap, so a manual
        // override takes effect without restarting the adapter.
        let units_state = self.store.read(&CommandCode::Units.state_path()).await;
        let units = UnitSystem::from_label(units_state.as_ref().and_then(StateValue::as_text));

        let gated = [
            (CommandCode::TemperatureSensor, CommandCode::WaterTemperature),
            (CommandCode::PressureSensor, CommandCode::WaterPressure),
            (CommandCode::ConductivitySensor, CommandCode::WaterConductivity),
        ];
        for (flag, reading) in gated {
            if self.sensor_installed(&flag).await {
                let outcome = self.fetch_and_publish(reading, units).await;
                stats.record(&outcome);
            } else {
                tracing::debug!(code = %reading, "sensor not installed, skipping fetch");
            }
        }
    }

    async fn sensor_installed(&self, flag: &CommandCode) -> bool {
        self.store
            .read(&flag.state_path())
            .await
            .as_ref()
            .and_then(StateValue::as_text)
            == Some("Yes")
    }

    /// Fetches one register, maps it and writes the result.
    ///
    /// Transport failures leave the state at its last value; unmapped raw
    /// values publish the `"undefined"` sentinel. Neither is propagated as
    /// an error.
    pub async fn fetch_and_publish(&self, code: CommandCode, units: UnitSystem) -> FieldOutcome {
        let raw = match self.transport.query(&code).await {
            Ok(raw) => raw,
            Err(err) => {
                tracing::warn!(code = %code, error = %err, "device fetch failed, state left stale");
                return FieldOutcome::TransportError;
            }
        };

        match mapping::map_raw(&code, raw.as_str(), units) {
            Mapped::Known(value) => {
                self.store
                    .write(&code.state_path(), value.clone(), true)
                    .await;
                FieldOutcome::Value(value)
            }
            Mapped::Undefined => {
                tracing::warn!(code = %code, raw = %raw, "unmapped raw value, publishing sentinel");
                self.store
                    .write(&code.state_path(), StateValue::text(UNDEFINED), true)
                    .await;
                FieldOutcome::UnmappedValue
            }
        }
    }
}

impl<T, S> Poller<T, S>
where
    T: Transport + Send + Sync + 'static,
    S: StateStore + Send + Sync + 'static,
{
    /// Spawns the adapter lifecycle: declaration, info states, bootstrap,
    /// then the recurring poll loop.
    ///
    /// The first poll runs one interval after bootstrap completes. Missed
    /// ticks are skipped, never bunched. Shutdown interrupts the lifecycle
    /// at its next await point, abandoning any fetch still in flight;
    /// bootstrap and running poll cycles do not finish first.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn spawn(self) -> Result<PollerHandle> {
        self.config.validate()?;
        let period = self.config.poll_interval();
        let (shutdown_tx, mut shutdown_rx) = watch::channel(false);

        let task = tokio::spawn(async move {
            let lifecycle = async {
                self.declare_states().await;
                self.publish_info_states().await;
                self.bootstrap().await;

                let mut ticker = tokio::time::interval(period);
                ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
                // The first tick completes immediately; consume it so
                // polling starts one interval after bootstrap.
                ticker.tick().await;

                loop {
                    ticker.tick().await;
                    self.poll_once().await;
                }
            };

            tokio::select! {
                () = lifecycle => {}
                _ = shutdown_rx.changed() => {}
            }
            tracing::info!("poller stopped");
        });

        Ok(PollerHandle { shutdown_tx, task })
    }
}

/// Handle to a spawned poller.
///
/// Dropping the handle stops the poller at its next await point; call
/// [`shutdown`](Self::shutdown) to stop it and wait, so no stray tick
/// fires afterwards. Any in-flight fetch is abandoned with the task.
#[derive(Debug)]
pub struct PollerHandle {
    shutdown_tx: watch::Sender<bool>,
    task: tokio::task::JoinHandle<()>,
}

impl PollerHandle {
    /// Stops the poll loop and waits for the task to finish.
    pub async fn shutdown(self) {
        let _ = self.shutdown_tx.send(true);
        let _ = self.task.await;
    }

    /// Returns whether the poller task has finished.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}
