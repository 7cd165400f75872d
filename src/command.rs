// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Command codes for the water-guard device registers.
//!
//! Every queryable register of the device is identified by a short
//! mnemonic (`BAT`, `VOL`, `ALA`, ...). The set is finite and fixed per
//! firmware version. Per-profile registers embed the profile index in the
//! mnemonic (`PV1`..`PV8`); they are modeled as one parameterized variant
//! instead of eight near-identical ones.

use std::fmt;

use crate::error::ValueError;
use crate::state::StateDeclaration;

/// Index of a leak-protection profile slot.
///
/// The device holds up to 8 profiles, indexed from 1 to 8.
///
/// # Examples
///
/// ```
/// use safetec_lib::ProfileIndex;
///
/// let idx = ProfileIndex::new(3).unwrap();
/// assert_eq!(idx.value(), 3);
/// assert!(ProfileIndex::new(9).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ProfileIndex(u8);

impl ProfileIndex {
    /// Lowest valid profile index.
    pub const MIN: u8 = 1;
    /// Highest valid profile index.
    pub const MAX: u8 = 8;

    /// Creates a new profile index.
    ///
    /// # Errors
    ///
    /// Returns `ValueError::OutOfRange` if the index is not in 1..=8.
    pub fn new(index: u8) -> Result<Self, ValueError> {
        if index < Self::MIN || index > Self::MAX {
            return Err(ValueError::OutOfRange {
                min: u16::from(Self::MIN),
                max: u16::from(Self::MAX),
                actual: u16::from(index),
            });
        }
        Ok(Self(index))
    }

    /// Returns the numeric value of the index.
    #[must_use]
    pub const fn value(&self) -> u8 {
        self.0
    }

    /// Iterates over all profile slots, 1 through 8.
    pub fn all() -> impl Iterator<Item = Self> {
        (Self::MIN..=Self::MAX).map(Self)
    }
}

impl fmt::Display for ProfileIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One parameter of a leak-protection profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProfileField {
    /// Whether the profile slot is configured.
    Available,
    /// Profile display name.
    Name,
    /// Leak shutoff volume threshold in liters.
    LeakVolume,
    /// Leak shutoff time threshold.
    LeakTime,
    /// Maximum flow threshold in liters per hour.
    MaxFlow,
    /// Micro-leakage detection flag.
    MicroLeakageDetection,
    /// Automatic return-to-standard-profile timer in hours.
    ReturnTime,
    /// Buzzer on alarm flag.
    Buzzer,
    /// Leakage warning flag.
    LeakageWarning,
}

impl ProfileField {
    /// All profile fields, in device query order.
    pub const ALL: [Self; 9] = [
        Self::Available,
        Self::Name,
        Self::LeakVolume,
        Self::LeakTime,
        Self::MaxFlow,
        Self::MicroLeakageDetection,
        Self::ReturnTime,
        Self::Buzzer,
        Self::LeakageWarning,
    ];

    /// Returns the two-letter mnemonic prefix (the profile index is
    /// appended to form the wire code).
    #[must_use]
    pub const fn code_prefix(&self) -> &'static str {
        match self {
            Self::Available => "PA",
            Self::Name => "PN",
            Self::LeakVolume => "PV",
            Self::LeakTime => "PT",
            Self::MaxFlow => "PF",
            Self::MicroLeakageDetection => "PM",
            Self::ReturnTime => "PR",
            Self::Buzzer => "PB",
            Self::LeakageWarning => "PW",
        }
    }

    /// Returns the last segment of the state path.
    #[must_use]
    pub const fn path_segment(&self) -> &'static str {
        match self {
            Self::Available => "Available",
            Self::Name => "Name",
            Self::LeakVolume => "LeakVolume",
            Self::LeakTime => "LeakTime",
            Self::MaxFlow => "MaxFlow",
            Self::MicroLeakageDetection => "MicroLeakageDetection",
            Self::ReturnTime => "ReturnTime",
            Self::Buzzer => "Buzzer",
            Self::LeakageWarning => "LeakageWarning",
        }
    }
}

/// Identifies one queryable device register.
///
/// Each code maps to exactly one state path in the host platform; the
/// response to `GET .../safe-tec/get/<code>` is a JSON object keyed
/// `get<code>`.
///
/// # Examples
///
/// ```
/// use safetec_lib::{CommandCode, ProfileField, ProfileIndex};
///
/// assert_eq!(CommandCode::BatteryVoltage.code(), "BAT");
/// assert_eq!(CommandCode::BatteryVoltage.response_key(), "getBAT");
/// assert_eq!(
///     CommandCode::BatteryVoltage.state_path(),
///     "Conditions.BatteryVoltage"
/// );
///
/// let code = CommandCode::Profile(ProfileField::LeakVolume, ProfileIndex::new(3).unwrap());
/// assert_eq!(code.code(), "PV3");
/// assert_eq!(code.state_path(), "Profiles.3.LeakVolume");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommandCode {
    // Device settings, fetched once at bootstrap.
    /// Menu language (`LNG`).
    Language,
    /// Unit system (`UNI`).
    Units,
    /// Leakage warning threshold in percent of the shutoff volume (`LWT`).
    LeakageWarningThreshold,
    /// Buzzer on alarm (`BUZ`).
    Buzzer,
    /// Micro-leakage test mode (`DMA`).
    MicroLeakageTest,
    /// Micro-leakage test period (`DRP`).
    MicroLeakageTestPeriod,
    /// Temperature sensor installed (`TSD`).
    TemperatureSensor,
    /// Pressure sensor installed (`PSD`).
    PressureSensor,
    /// Conductivity sensor installed (`CSD`).
    ConductivitySensor,
    /// Conductivity shutoff limit in µS/cm (`CNL`).
    ConductivityLimit,
    /// Conductivity temperature-compensation factor (`CNF`).
    ConductivityFactor,
    /// Firmware version (`VER`).
    FirmwareVersion,
    /// Device serial number (`SRN`).
    SerialNumber,
    /// Device MAC address (`MAC`).
    MacAddress,
    /// Next maintenance date (`SRV`).
    NextMaintenance,

    // Profile discovery.
    /// Currently selected profile (`PRF`).
    SelectedProfile,
    /// Number of configured profiles (`PRN`).
    ProfileCount,
    /// One parameter of one profile slot (`PA1`..`PW8`).
    Profile(ProfileField, ProfileIndex),

    // Live conditions, re-read every poll tick.
    /// Cumulative water volume (`VOL`).
    TotalVolume,
    /// Volume of the last tapping (`LTV`).
    LastTapVolume,
    /// Volume of the current draw (`AVO`).
    CurrentVolume,
    /// Active alarm code (`ALA`).
    Alarm,
    /// Shutoff valve state (`VLV`).
    Valve,
    /// Backup battery voltage (`BAT`).
    BatteryVoltage,
    /// Power adaptor voltage (`NET`).
    PowerAdaptorVoltage,
    /// Remaining temporary-deactivation time (`TMP`).
    TemporaryDeactivation,
    /// Water temperature (`CEL`), only with temperature sensor.
    WaterTemperature,
    /// Water pressure (`BAR`), only with pressure sensor.
    WaterPressure,
    /// Water conductivity (`CND`), only with conductivity sensor.
    WaterConductivity,
}

impl CommandCode {
    /// Device settings fetched once at bootstrap, in query order.
    pub const DEVICE_SETTINGS: [Self; 15] = [
        Self::Language,
        Self::Units,
        Self::LeakageWarningThreshold,
        Self::Buzzer,
        Self::MicroLeakageTest,
        Self::MicroLeakageTestPeriod,
        Self::TemperatureSensor,
        Self::PressureSensor,
        Self::ConductivitySensor,
        Self::ConductivityLimit,
        Self::ConductivityFactor,
        Self::FirmwareVersion,
        Self::SerialNumber,
        Self::MacAddress,
        Self::NextMaintenance,
    ];

    /// Unconditional condition registers re-read every poll tick, in order.
    pub const CONDITIONS: [Self; 8] = [
        Self::TotalVolume,
        Self::LastTapVolume,
        Self::CurrentVolume,
        Self::Alarm,
        Self::Valve,
        Self::BatteryVoltage,
        Self::PowerAdaptorVoltage,
        Self::TemporaryDeactivation,
    ];

    /// Condition registers gated on a bootstrapped sensor-presence flag.
    pub const SENSOR_CONDITIONS: [Self; 3] = [
        Self::WaterTemperature,
        Self::WaterPressure,
        Self::WaterConductivity,
    ];

    /// All registers of one profile slot, in query order.
    #[must_use]
    pub fn profile_codes(index: ProfileIndex) -> [Self; 9] {
        ProfileField::ALL.map(|field| Self::Profile(field, index))
    }

    /// Every queryable register, in declaration order.
    #[must_use]
    pub fn all() -> Vec<Self> {
        let mut codes = Vec::with_capacity(100);
        codes.extend(Self::DEVICE_SETTINGS);
        codes.extend([Self::SelectedProfile, Self::ProfileCount]);
        for index in ProfileIndex::all() {
            codes.extend(Self::profile_codes(index));
        }
        codes.extend(Self::CONDITIONS);
        codes.extend(Self::SENSOR_CONDITIONS);
        codes
    }

    /// Returns the wire mnemonic, e.g. `"BAT"` or `"PV3"`.
    #[must_use]
    pub fn code(&self) -> String {
        match self {
            Self::Language => "LNG".to_string(),
            Self::Units => "UNI".to_string(),
            Self::LeakageWarningThreshold => "LWT".to_string(),
            Self::Buzzer => "BUZ".to_string(),
            Self::MicroLeakageTest => "DMA".to_string(),
            Self::MicroLeakageTestPeriod => "DRP".to_string(),
            Self::TemperatureSensor => "TSD".to_string(),
            Self::PressureSensor => "PSD".to_string(),
            Self::ConductivitySensor => "CSD".to_string(),
            Self::ConductivityLimit => "CNL".to_string(),
            Self::ConductivityFactor => "CNF".to_string(),
            Self::FirmwareVersion => "VER".to_string(),
            Self::SerialNumber => "SRN".to_string(),
            Self::MacAddress => "MAC".to_string(),
            Self::NextMaintenance => "SRV".to_string(),
            Self::SelectedProfile => "PRF".to_string(),
            Self::ProfileCount => "PRN".to_string(),
            Self::Profile(field, index) => format!("{}{index}", field.code_prefix()),
            Self::TotalVolume => "VOL".to_string(),
            Self::LastTapVolume => "LTV".to_string(),
            Self::CurrentVolume => "AVO".to_string(),
            Self::Alarm => "ALA".to_string(),
            Self::Valve => "VLV".to_string(),
            Self::BatteryVoltage => "BAT".to_string(),
            Self::PowerAdaptorVoltage => "NET".to_string(),
            Self::TemporaryDeactivation => "TMP".to_string(),
            Self::WaterTemperature => "CEL".to_string(),
            Self::WaterPressure => "BAR".to_string(),
            Self::WaterConductivity => "CND".to_string(),
        }
    }

    /// Returns the key under which the device reports this register,
    /// `"get"` followed by the mnemonic.
    #[must_use]
    pub fn response_key(&self) -> String {
        format!("get{}", self.code())
    }

    /// Returns the dot-separated state path this register is published
    /// under.
    #[must_use]
    pub fn state_path(&self) -> String {
        match self {
            Self::Language => "Settings.Language".to_string(),
            Self::Units => "Settings.Units".to_string(),
            Self::LeakageWarningThreshold => "Settings.LeakageWarningThreshold".to_string(),
            Self::Buzzer => "Settings.Buzzer".to_string(),
            Self::MicroLeakageTest => "Settings.MicroLeakageTest".to_string(),
            Self::MicroLeakageTestPeriod => "Settings.MicroLeakageTestPeriod".to_string(),
            Self::TemperatureSensor => "Settings.TemperatureSensor".to_string(),
            Self::PressureSensor => "Settings.PressureSensor".to_string(),
            Self::ConductivitySensor => "Settings.ConductivitySensor".to_string(),
            Self::ConductivityLimit => "Settings.ConductivityLimit".to_string(),
            Self::ConductivityFactor => "Settings.ConductivityFactor".to_string(),
            Self::FirmwareVersion => "Device.FirmwareVersion".to_string(),
            Self::SerialNumber => "Device.SerialNumber".to_string(),
            Self::MacAddress => "Device.MacAddress".to_string(),
            Self::NextMaintenance => "Device.NextMaintenance".to_string(),
            Self::SelectedProfile => "Profiles.Selected".to_string(),
            Self::ProfileCount => "Profiles.Active".to_string(),
            Self::Profile(field, index) => {
                format!("Profiles.{index}.{}", field.path_segment())
            }
            Self::TotalVolume => "Conditions.TotalVolume".to_string(),
            Self::LastTapVolume => "Conditions.LastTapVolume".to_string(),
            Self::CurrentVolume => "Conditions.CurrentVolume".to_string(),
            Self::Alarm => "Conditions.Alarm".to_string(),
            Self::Valve => "Conditions.Valve".to_string(),
            Self::BatteryVoltage => "Conditions.BatteryVoltage".to_string(),
            Self::PowerAdaptorVoltage => "Conditions.PowerAdaptorVoltage".to_string(),
            Self::TemporaryDeactivation => "Conditions.TemporaryDeactivation".to_string(),
            Self::WaterTemperature => "Conditions.WaterTemperature".to_string(),
            Self::WaterPressure => "Conditions.WaterPressure".to_string(),
            Self::WaterConductivity => "Conditions.WaterConductivity".to_string(),
        }
    }

    /// Returns the declaration metadata for this register's state.
    #[must_use]
    pub fn declaration(&self) -> StateDeclaration {
        match self {
            Self::BatteryVoltage | Self::PowerAdaptorVoltage => {
                StateDeclaration::number().with_unit("V")
            }
            Self::WaterConductivity => StateDeclaration::number().with_unit("µS/cm"),
            Self::ConductivityFactor
            | Self::SelectedProfile
            | Self::ProfileCount
            | Self::WaterTemperature
            | Self::WaterPressure => StateDeclaration::number(),
            _ => StateDeclaration::text(),
        }
    }
}

impl fmt::Display for CommandCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}
