// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Integration tests for the HTTP transport and the sequencers, using
//! wiremock as a stand-in for the device's embedded HTTP stack.

use std::sync::Arc;
use std::time::Duration;

use safetec_lib::protocol::{HttpClient, Transport};
use safetec_lib::state::{MemoryStateStore, StateStore, StateValue};
use safetec_lib::{AdapterConfig, CommandCode, CycleOutcome, Poller};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn config_for(server: &MockServer) -> AdapterConfig {
    let addr = server.address();
    AdapterConfig::new(addr.ip().to_string())
        .with_port(addr.port())
        .with_request_timeout(Duration::from_secs(2))
}

fn poller_for(
    server: &MockServer,
) -> (Poller<HttpClient, Arc<MemoryStateStore>>, Arc<MemoryStateStore>) {
    let config = config_for(server);
    let transport = HttpClient::from_config(&config).unwrap();
    let store = Arc::new(MemoryStateStore::new());
    (Poller::new(transport, Arc::clone(&store), config), store)
}

async fn mount_register(server: &MockServer, code: &str, value: serde_json::Value) {
    let mut body = serde_json::Map::new();
    body.insert(format!("get{code}"), value);
    Mock::given(method("GET"))
        .and(path(format!("/safe-tec/get/{code}")))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::Value::Object(body)))
        .mount(server)
        .await;
}

async fn mount_conditions(server: &MockServer) {
    mount_register(server, "VOL", "Vol[L]3000".into()).await;
    mount_register(server, "LTV", "42".into()).await;
    mount_register(server, "AVO", "1500mL".into()).await;
    mount_register(server, "ALA", "FF".into()).await;
    mount_register(server, "VLV", "1".into()).await;
    mount_register(server, "BAT", "9,27".into()).await;
    mount_register(server, "NET", "12,3".into()).await;
    mount_register(server, "TMP", "0".into()).await;
}

// ============================================================================
// HttpClient tests
// ============================================================================

mod http_client {
    use super::*;

    #[tokio::test]
    async fn query_string_register() {
        let server = MockServer::start().await;
        mount_register(&server, "BAT", "9,27".into()).await;

        let client = HttpClient::from_config(&config_for(&server)).unwrap();
        let raw = client.query(&CommandCode::BatteryVoltage).await.unwrap();
        assert_eq!(raw.as_str(), "9,27");
    }

    #[tokio::test]
    async fn query_numeric_register() {
        let server = MockServer::start().await;
        mount_register(&server, "PRN", serde_json::json!(3)).await;

        let client = HttpClient::from_config(&config_for(&server)).unwrap();
        let raw = client.query(&CommandCode::ProfileCount).await.unwrap();
        assert_eq!(raw.as_str(), "3");
    }

    #[tokio::test]
    async fn missing_response_key_is_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/safe-tec/get/ALA"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({"getXXX": "FF"})),
            )
            .mount(&server)
            .await;

        let client = HttpClient::from_config(&config_for(&server)).unwrap();
        assert!(client.query(&CommandCode::Alarm).await.is_err());
    }

    #[tokio::test]
    async fn server_error_is_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/safe-tec/get/VLV"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let client = HttpClient::from_config(&config_for(&server)).unwrap();
        assert!(client.query(&CommandCode::Valve).await.is_err());
    }

    #[tokio::test]
    async fn unreachable_device_is_error() {
        // Keep the port of a server that has already shut down.
        let config = {
            let server = MockServer::start().await;
            config_for(&server)
        };
        let client = HttpClient::from_config(&config).unwrap();
        assert!(client.query(&CommandCode::Alarm).await.is_err());
    }
}

// ============================================================================
// Bootstrap sequencer tests
// ============================================================================

mod bootstrap {
    use super::*;

    async fn mount_settings(server: &MockServer) {
        mount_register(server, "LNG", "1".into()).await;
        mount_register(server, "UNI", "0".into()).await;
        mount_register(server, "LWT", "90".into()).await;
        mount_register(server, "BUZ", "1".into()).await;
        mount_register(server, "DMA", "0".into()).await;
        mount_register(server, "DRP", "2".into()).await;
        mount_register(server, "TSD", "1".into()).await;
        mount_register(server, "PSD", "1".into()).await;
        mount_register(server, "CSD", "0".into()).await;
        mount_register(server, "CNL", "500".into()).await;
        mount_register(server, "CNF", "1,25".into()).await;
        mount_register(server, "VER", "Safe-Tec V4.06".into()).await;
        mount_register(server, "SRN", "123456789".into()).await;
        mount_register(server, "MAC", "00:11:22:33:44:55".into()).await;
        mount_register(server, "SRV", "01.01.2027".into()).await;
        mount_register(server, "PRF", "1".into()).await;
    }

    async fn mount_profiles(server: &MockServer) {
        mount_register(server, "PRN", "2".into()).await;
        for i in 1..=8 {
            let available = if i <= 2 { "1" } else { "0" };
            mount_register(server, &format!("PA{i}"), available.into()).await;
            mount_register(server, &format!("PN{i}"), "Standard".into()).await;
            mount_register(server, &format!("PV{i}"), "25".into()).await;
            mount_register(server, &format!("PT{i}"), "0".into()).await;
            mount_register(server, &format!("PF{i}"), "3000".into()).await;
            mount_register(server, &format!("PM{i}"), "1".into()).await;
            mount_register(server, &format!("PR{i}"), "0".into()).await;
            mount_register(server, &format!("PB{i}"), "1".into()).await;
            mount_register(server, &format!("PW{i}"), "0".into()).await;
        }
    }

    #[tokio::test]
    async fn bootstrap_populates_settings_and_profiles() {
        let server = MockServer::start().await;
        mount_settings(&server).await;
        mount_profiles(&server).await;

        let (poller, store) = poller_for(&server);
        poller.declare_states().await;
        let stats = poller.bootstrap().await;

        // 15 settings + PRF + PRN + 8 x 9 profile registers.
        assert_eq!(stats.fetched, 89);
        assert_eq!(stats.transport_errors, 0);
        assert_eq!(stats.unmapped, 0);

        assert_eq!(
            store.value("Settings.Language"),
            Some(StateValue::text("English"))
        );
        assert_eq!(
            store.value("Settings.MicroLeakageTestPeriod"),
            Some(StateValue::text("week"))
        );
        assert_eq!(
            store.value("Settings.TemperatureSensor"),
            Some(StateValue::text("Yes"))
        );
        assert_eq!(
            store.value("Settings.ConductivitySensor"),
            Some(StateValue::text("No"))
        );
        assert_eq!(
            store.value("Settings.ConductivityFactor"),
            Some(StateValue::number(1.25))
        );
        assert_eq!(
            store.value("Device.SerialNumber"),
            Some(StateValue::text("123456789"))
        );
        assert_eq!(store.value("Profiles.Active"), Some(StateValue::number(2.0)));
        assert_eq!(
            store.value("Profiles.2.Available"),
            Some(StateValue::text("Yes"))
        );
        assert_eq!(
            store.value("Profiles.5.Available"),
            Some(StateValue::text("No"))
        );
        assert_eq!(
            store.value("Profiles.1.MaxFlow"),
            Some(StateValue::text("3000"))
        );
        assert_eq!(
            store.value("Profiles.1.ReturnTime"),
            Some(StateValue::text("disabled"))
        );
    }

    #[tokio::test]
    async fn unanswered_profile_count_short_circuits() {
        let server = MockServer::start().await;
        mount_settings(&server).await;
        // No PRN mock: the count fetch 404s.

        let (poller, store) = poller_for(&server);
        let stats = poller.bootstrap().await;

        assert_eq!(store.value("Profiles.Active"), Some(StateValue::number(0.0)));
        assert_eq!(store.value("Profiles.1.Name"), None);
        // 15 settings + PRF + the failed PRN fetch.
        assert_eq!(stats.fetched, 17);
        assert_eq!(stats.transport_errors, 1);
    }
}

// ============================================================================
// Poll sequencer tests
// ============================================================================

mod poll {
    use super::*;

    #[tokio::test]
    async fn poll_cycle_publishes_conditions() {
        let server = MockServer::start().await;
        mount_conditions(&server).await;

        let (poller, store) = poller_for(&server);
        let outcome = poller.poll_once().await;

        let CycleOutcome::Completed(stats) = outcome else {
            panic!("cycle was skipped");
        };
        assert_eq!(stats.fetched, 8);
        assert_eq!(stats.transport_errors, 0);

        assert_eq!(
            store.value("Conditions.TotalVolume"),
            Some(StateValue::text("3"))
        );
        assert_eq!(
            store.value("Conditions.CurrentVolume"),
            Some(StateValue::text("1.5"))
        );
        assert_eq!(
            store.value("Conditions.Alarm"),
            Some(StateValue::text("NO ALARM"))
        );
        assert_eq!(store.value("Conditions.Valve"), Some(StateValue::text("open")));
        assert_eq!(
            store.value("Conditions.BatteryVoltage"),
            Some(StateValue::number(9.27))
        );
        assert_eq!(
            store.value("Conditions.TemporaryDeactivation"),
            Some(StateValue::text("disabled"))
        );
        assert!(store.is_acknowledged("Conditions.Alarm"));
    }

    #[tokio::test]
    async fn sensor_fetches_follow_bootstrapped_flags() {
        let server = MockServer::start().await;
        mount_conditions(&server).await;
        mount_register(&server, "CEL", "215".into()).await;
        mount_register(&server, "BAR", "3250".into()).await;
        mount_register(&server, "CND", "480".into()).await;

        let (poller, store) = poller_for(&server);
        store
            .write("Settings.TemperatureSensor", StateValue::text("Yes"), true)
            .await;
        store
            .write("Settings.PressureSensor", StateValue::text("No"), true)
            .await;
        store
            .write("Settings.ConductivitySensor", StateValue::text("Yes"), true)
            .await;

        let outcome = poller.poll_once().await;
        assert!(matches!(outcome, CycleOutcome::Completed(s) if s.fetched == 10));

        assert_eq!(
            store.value("Conditions.WaterTemperature"),
            Some(StateValue::number(21.5))
        );
        // Pressure sensor absent: no fetch, no state.
        assert_eq!(store.value("Conditions.WaterPressure"), None);
        assert_eq!(
            store.value("Conditions.WaterConductivity"),
            Some(StateValue::number(480.0))
        );
    }

    #[tokio::test]
    async fn failed_fetch_keeps_previous_value() {
        // Every condition register answers except BAT.
        let failing = MockServer::start().await;
        mount_register(&failing, "VOL", "Vol[L]4000".into()).await;
        mount_register(&failing, "LTV", "42".into()).await;
        mount_register(&failing, "AVO", "0mL".into()).await;
        mount_register(&failing, "ALA", "A3".into()).await;
        mount_register(&failing, "VLV", "2".into()).await;
        mount_register(&failing, "NET", "12,3".into()).await;
        mount_register(&failing, "TMP", "0".into()).await;

        let (poller, store) = poller_for(&failing);
        store
            .write("Conditions.BatteryVoltage", StateValue::number(9.27), true)
            .await;

        let outcome = poller.poll_once().await;
        let CycleOutcome::Completed(stats) = outcome else {
            panic!("cycle was skipped");
        };
        assert_eq!(stats.transport_errors, 1);

        // The failed register kept its last value, the rest moved on.
        assert_eq!(
            store.value("Conditions.BatteryVoltage"),
            Some(StateValue::number(9.27))
        );
        assert_eq!(
            store.value("Conditions.Alarm"),
            Some(StateValue::text("ALARM VOLUME LEAKAGE"))
        );
        assert_eq!(store.value("Conditions.Valve"), Some(StateValue::text("closed")));
    }
}

// ============================================================================
// Lifecycle tests
// ============================================================================

mod lifecycle {
    use super::*;

    #[tokio::test]
    async fn spawned_poller_bootstraps_then_stops() {
        let server = MockServer::start().await;
        mount_register(&server, "LNG", "0".into()).await;
        mount_register(&server, "PRN", "0".into()).await;

        let config = config_for(&server);
        let transport = HttpClient::from_config(&config).unwrap();
        let store = Arc::new(MemoryStateStore::new());
        let poller = Poller::new(transport, Arc::clone(&store), config);

        let handle = poller.spawn().unwrap();

        // Bootstrap runs in the spawned task; wait for its first write.
        let deadline = tokio::time::Instant::now() + Duration::from_secs(10);
        while store.value("Settings.Language").is_none() {
            assert!(tokio::time::Instant::now() < deadline, "bootstrap never ran");
            tokio::time::sleep(Duration::from_millis(10)).await;
        }

        assert_eq!(
            store.value("Settings.Language"),
            Some(StateValue::text("German"))
        );
        assert_eq!(store.value("Profiles.Active"), Some(StateValue::number(0.0)));
        assert!(store.is_declared("Conditions.Alarm"));

        handle.shutdown().await;
        assert!(store.value("Info.IpAddress").is_some());
    }
}
