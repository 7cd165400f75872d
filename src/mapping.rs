// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Raw-value mapping.
//!
//! Pure, table-driven translation of raw device replies into display
//! values. The mapper never errors: any raw value that does not match a
//! known case resolves to [`Mapped::Undefined`], which callers publish as
//! the literal string `"undefined"` while accounting for the miss.

use crate::command::{CommandCode, ProfileField};
use crate::state::StateValue;

/// Sentinel published for any unrecognized raw value.
pub const UNDEFINED: &str = "undefined";

/// Sentinel published for thresholds the device reports as `0`.
pub const DISABLED: &str = "disabled";

/// Display label for the metric unit system.
pub const UNITS_METRIC: &str = "°C / mbar / Liter";

/// Display label for the imperial unit system.
pub const UNITS_IMPERIAL: &str = "°F / psi / US.liq.gal";

/// Unit system the device was configured with.
///
/// Selects the conversion applied to temperature and pressure readings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UnitSystem {
    /// Celsius, bar, liters.
    #[default]
    Metric,
    /// Fahrenheit, psi, US gallons.
    Imperial,
}

impl UnitSystem {
    /// Derives the unit system from the published `Settings.Units` label.
    ///
    /// Anything other than the imperial label (including `"undefined"` or a
    /// missing state) falls back to metric.
    #[must_use]
    pub fn from_label(label: Option<&str>) -> Self {
        if label == Some(UNITS_IMPERIAL) {
            Self::Imperial
        } else {
            Self::Metric
        }
    }
}

/// Result of mapping one raw value.
#[derive(Debug, Clone, PartialEq)]
pub enum Mapped {
    /// The raw value matched a known case.
    Known(StateValue),
    /// The raw value matched no known case; publish the sentinel.
    Undefined,
}

impl Mapped {
    /// Returns the value to publish, substituting the sentinel for
    /// unmapped raw values.
    #[must_use]
    pub fn into_value(self) -> StateValue {
        match self {
            Self::Known(value) => value,
            Self::Undefined => StateValue::text(UNDEFINED),
        }
    }

    fn text(value: impl Into<String>) -> Self {
        Self::Known(StateValue::text(value))
    }

    fn number(value: f64) -> Self {
        Self::Known(StateValue::number(value))
    }
}

/// Maps a raw device reply to the display value for its register.
///
/// # Examples
///
/// ```
/// use safetec_lib::mapping::{map_raw, Mapped, UnitSystem};
/// use safetec_lib::{CommandCode, StateValue};
///
/// let mapped = map_raw(&CommandCode::Valve, "1", UnitSystem::Metric);
/// assert_eq!(mapped, Mapped::Known(StateValue::text("open")));
///
/// let mapped = map_raw(&CommandCode::Valve, "7", UnitSystem::Metric);
/// assert_eq!(mapped.into_value(), StateValue::text("undefined"));
/// ```
#[must_use]
pub fn map_raw(code: &CommandCode, raw: &str, units: UnitSystem) -> Mapped {
    match code {
        CommandCode::Language => language_label(raw).map_or(Mapped::Undefined, Mapped::text),
        CommandCode::Units => units_label(raw).map_or(Mapped::Undefined, Mapped::text),
        CommandCode::Buzzer => enabled_label(raw).map_or(Mapped::Undefined, Mapped::text),
        CommandCode::MicroLeakageTest => {
            micro_leakage_mode_label(raw).map_or(Mapped::Undefined, Mapped::text)
        }
        CommandCode::MicroLeakageTestPeriod => {
            micro_leakage_period_label(raw).map_or(Mapped::Undefined, Mapped::text)
        }
        CommandCode::TemperatureSensor
        | CommandCode::PressureSensor
        | CommandCode::ConductivitySensor => {
            yes_no_label(raw).map_or(Mapped::Undefined, Mapped::text)
        }
        CommandCode::LeakageWarningThreshold
        | CommandCode::ConductivityLimit
        | CommandCode::TemporaryDeactivation => threshold_or_disabled(raw),
        CommandCode::ConductivityFactor => {
            parse_decimal_comma(raw).map_or(Mapped::Undefined, |n| Mapped::number(round2(n)))
        }
        CommandCode::FirmwareVersion
        | CommandCode::SerialNumber
        | CommandCode::MacAddress
        | CommandCode::NextMaintenance => text_passthrough(raw),
        CommandCode::SelectedProfile | CommandCode::ProfileCount => {
            parse_integer(raw).map_or(Mapped::Undefined, Mapped::number)
        }
        CommandCode::Profile(field, _) => map_profile_field(*field, raw),
        CommandCode::TotalVolume => scale_total_volume(raw),
        CommandCode::CurrentVolume => scale_draw_volume(raw),
        CommandCode::LastTapVolume => {
            parse_decimal_comma(raw).map_or(Mapped::Undefined, |n| Mapped::text(trimmed(n)))
        }
        CommandCode::Alarm => alarm_label(raw).map_or(Mapped::Undefined, Mapped::text),
        CommandCode::Valve => valve_label(raw).map_or(Mapped::Undefined, Mapped::text),
        CommandCode::BatteryVoltage | CommandCode::PowerAdaptorVoltage => {
            parse_decimal_comma(raw).map_or(Mapped::Undefined, |n| Mapped::number(round2(n)))
        }
        CommandCode::WaterTemperature => map_temperature(raw, units),
        CommandCode::WaterPressure => map_pressure(raw, units),
        CommandCode::WaterConductivity => {
            parse_decimal_comma(raw).map_or(Mapped::Undefined, Mapped::number)
        }
    }
}

/// Returns the label for an alarm code, covering `FF` and `A1`..`AF`.
#[must_use]
pub fn alarm_label(raw: &str) -> Option<&'static str> {
    match raw {
        "FF" => Some("NO ALARM"),
        "A1" => Some("ALARM END SWITCH"),
        "A2" => Some("NO NETWORK"),
        "A3" => Some("ALARM VOLUME LEAKAGE"),
        "A4" => Some("ALARM TIME LEAKAGE"),
        "A5" => Some("ALARM MAX FLOW LEAKAGE"),
        "A6" => Some("ALARM MICRO LEAKAGE"),
        "A7" => Some("ALARM EXT. SENSOR LEAKAGE"),
        "A8" => Some("ALARM TURBINE BLOCKED"),
        "A9" => Some("ALARM PRESSURE SENSOR ERROR"),
        "AA" => Some("ALARM TEMPERATURE SENSOR ERROR"),
        "AB" => Some("ALARM CONDUCTIVITY SENSOR ERROR"),
        "AC" => Some("ALARM TO HIGH CONDUCTIVITY"),
        "AD" => Some("LOW BATTERY"),
        "AE" => Some("WARNING VOLUME LEAKAGE"),
        "AF" => Some("ALARM NO POWER SUPPLY"),
        _ => None,
    }
}

/// Returns the shutoff-valve state label.
#[must_use]
pub fn valve_label(raw: &str) -> Option<&'static str> {
    match raw {
        "1" => Some("open"),
        "2" => Some("closed"),
        _ => None,
    }
}

/// Returns the menu-language label. Only the first character of the raw
/// value is significant.
#[must_use]
pub fn language_label(raw: &str) -> Option<&'static str> {
    match raw.chars().next() {
        Some('0') => Some("German"),
        Some('1') => Some("English"),
        Some('2') => Some("Spanish"),
        Some('3') => Some("Italian"),
        Some('4') => Some("Polish"),
        _ => None,
    }
}

/// Returns the unit-system label.
#[must_use]
pub fn units_label(raw: &str) -> Option<&'static str> {
    match raw {
        "0" => Some(UNITS_METRIC),
        "1" => Some(UNITS_IMPERIAL),
        _ => None,
    }
}

/// Returns the micro-leakage test mode label.
#[must_use]
pub fn micro_leakage_mode_label(raw: &str) -> Option<&'static str> {
    match raw {
        "0" => Some(DISABLED),
        "1" => Some("warning"),
        "2" => Some("shutoff"),
        _ => None,
    }
}

/// Returns the micro-leakage test period label.
#[must_use]
pub fn micro_leakage_period_label(raw: &str) -> Option<&'static str> {
    match raw {
        "0" => Some("always"),
        "1" => Some("day"),
        "2" => Some("week"),
        "3" => Some("month"),
        _ => None,
    }
}

/// Returns `Yes`/`No` for a presence flag.
#[must_use]
pub fn yes_no_label(raw: &str) -> Option<&'static str> {
    match raw {
        "0" => Some("No"),
        "1" => Some("Yes"),
        _ => None,
    }
}

fn enabled_label(raw: &str) -> Option<&'static str> {
    match raw {
        "0" => Some(DISABLED),
        "1" => Some("enabled"),
        _ => None,
    }
}

/// Parses a device number, accepting a decimal comma in place of a dot.
#[must_use]
pub fn parse_decimal_comma(raw: &str) -> Option<f64> {
    let normalized = raw.trim().replace(',', ".");
    normalized.parse::<f64>().ok().filter(|n| n.is_finite())
}

#[allow(clippy::cast_precision_loss)]
fn parse_integer(raw: &str) -> Option<f64> {
    raw.trim().parse::<i64>().ok().map(|n| n as f64)
}

/// Maps a threshold where the device uses `0` as "feature disabled".
#[allow(clippy::float_cmp)]
fn threshold_or_disabled(raw: &str) -> Mapped {
    match parse_decimal_comma(raw) {
        Some(n) if n == 0.0 => Mapped::text(DISABLED),
        Some(n) => Mapped::text(trimmed(n)),
        None => Mapped::Undefined,
    }
}

fn text_passthrough(raw: &str) -> Mapped {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        Mapped::Undefined
    } else {
        Mapped::text(trimmed)
    }
}

fn map_profile_field(field: ProfileField, raw: &str) -> Mapped {
    match field {
        ProfileField::Available => yes_no_label(raw).map_or(Mapped::Undefined, Mapped::text),
        ProfileField::Name => text_passthrough(raw),
        ProfileField::LeakVolume
        | ProfileField::LeakTime
        | ProfileField::MaxFlow
        | ProfileField::ReturnTime => threshold_or_disabled(raw),
        ProfileField::MicroLeakageDetection | ProfileField::Buzzer | ProfileField::LeakageWarning => {
            enabled_label(raw).map_or(Mapped::Undefined, Mapped::text)
        }
    }
}

/// Total volume arrives as `Vol[L]<liters>`; published in cubic meters.
fn scale_total_volume(raw: &str) -> Mapped {
    let digits = raw.trim().strip_prefix("Vol[L]").unwrap_or_else(|| raw.trim());
    match parse_decimal_comma(digits) {
        Some(liters) => Mapped::text(trimmed(liters / 1000.0)),
        None => Mapped::Undefined,
    }
}

/// Current draw arrives as `<milliliters>mL`; published in liters.
fn scale_draw_volume(raw: &str) -> Mapped {
    let digits = raw.trim().strip_suffix("mL").unwrap_or_else(|| raw.trim());
    match parse_decimal_comma(digits) {
        Some(milliliters) => Mapped::text(trimmed(milliliters / 1000.0)),
        None => Mapped::Undefined,
    }
}

/// Temperature arrives in tenths of a degree Celsius.
fn map_temperature(raw: &str, units: UnitSystem) -> Mapped {
    let Some(tenths) = parse_decimal_comma(raw) else {
        return Mapped::Undefined;
    };
    let celsius = tenths / 10.0;
    let value = match units {
        UnitSystem::Metric => celsius,
        UnitSystem::Imperial => celsius * 9.0 / 5.0 + 32.0,
    };
    Mapped::number(round1(value))
}

/// Pressure arrives in millibar.
fn map_pressure(raw: &str, units: UnitSystem) -> Mapped {
    let Some(mbar) = parse_decimal_comma(raw) else {
        return Mapped::Undefined;
    };
    let value = match units {
        UnitSystem::Metric => round3(mbar / 1000.0),
        UnitSystem::Imperial => round2(mbar * 0.014_503_8),
    };
    Mapped::number(value)
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn round3(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}

/// Formats a number without trailing zeros (`3.0` → `"3"`, `1.5` → `"1.5"`).
fn trimmed(value: f64) -> String {
    format!("{value}")
}
