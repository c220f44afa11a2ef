//! Temperature probe and the monitor that samples it.
//!
//! The probe is an NTC thermistor (10 kOhm @ 25 C, B = 3950) in a
//! voltage divider with a fixed 10 kOhm resistor, read via the ESP32-S3
//! ADC.  A reading pinned to either rail means the probe is open or
//! shorted and is reported as absent.
//!
//! ## Dual-target design
//!
//! On ESP-IDF: reads ADC1_CH8 via the oneshot API (initialised by hw_init).
//! On host/test: reads from a static AtomicU16 for injection.

use core::fmt;
#[cfg(not(target_os = "espidf"))]
use core::sync::atomic::{AtomicU16, Ordering};

use log::warn;

use crate::app::ports::{Presence, TemperatureProbe};
#[cfg(target_os = "espidf")]
use crate::drivers::hw_init;
use crate::error::SensorError;

#[cfg(not(target_os = "espidf"))]
static SIM_TEMP_ADC: AtomicU16 = AtomicU16::new(2048);

#[cfg(not(target_os = "espidf"))]
pub fn sim_set_temp_adc(raw: u16) {
    SIM_TEMP_ADC.store(raw, Ordering::Relaxed);
}

const R25: f32 = 10_000.0;
const BETA: f32 = 3950.0;
const T25_K: f32 = 298.15;
const R_DIVIDER: f32 = 10_000.0;
const ADC_MAX: f32 = 4095.0;
const V_REF: f32 = 3.3;
/// Closer than this to either rail = open or shorted probe.
const RAIL_MARGIN_V: f32 = 0.01;

// ---------------------------------------------------------------------------
// NTC probe
// ---------------------------------------------------------------------------

pub struct NtcProbe {
    _adc_gpio: i32,
}

impl NtcProbe {
    pub fn new(adc_gpio: i32) -> Self {
        Self { _adc_gpio: adc_gpio }
    }

    #[cfg(target_os = "espidf")]
    fn read_adc(&self) -> u16 {
        hw_init::adc1_read(hw_init::ADC1_CH_TEMP)
    }

    #[cfg(not(target_os = "espidf"))]
    fn read_adc(&self) -> u16 {
        SIM_TEMP_ADC.load(Ordering::Relaxed)
    }

    fn voltage(raw: u16) -> f32 {
        (raw as f32 / ADC_MAX) * V_REF
    }

    fn on_rail(raw: u16) -> bool {
        let v = Self::voltage(raw);
        v <= RAIL_MARGIN_V || v >= V_REF - RAIL_MARGIN_V
    }

    fn adc_to_celsius(raw: u16) -> Result<f32, SensorError> {
        if Self::on_rail(raw) {
            return Err(SensorError::NotPresent);
        }
        let voltage = Self::voltage(raw);
        let r_ntc = R_DIVIDER * voltage / (V_REF - voltage);
        let inv_t = (1.0 / T25_K) + (1.0 / BETA) * (r_ntc / R25).ln();
        if inv_t <= 0.0 {
            return Err(SensorError::OutOfRange);
        }
        Ok((1.0 / inv_t) - 273.15)
    }
}

impl TemperatureProbe for NtcProbe {
    fn reset(&mut self) -> Result<Presence, SensorError> {
        if Self::on_rail(self.read_adc()) {
            Ok(Presence::Absent)
        } else {
            Ok(Presence::Present)
        }
    }

    fn read_temperature(&mut self) -> Result<f32, SensorError> {
        Self::adc_to_celsius(self.read_adc())
    }
}

// ---------------------------------------------------------------------------
// Monitor
// ---------------------------------------------------------------------------

/// Last known probe state, for display and telemetry.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TemperatureStatus {
    /// Sampling turned off in configuration.
    Disabled,
    /// Enabled but not sampled yet.
    Pending,
    /// Probe absent or unreadable on the last attempt.
    SensorFault,
    Celsius(f32),
}

impl TemperatureStatus {
    pub fn celsius(&self) -> Option<f32> {
        match self {
            Self::Celsius(c) => Some(*c),
            _ => None,
        }
    }
}

impl fmt::Display for TemperatureStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Disabled => write!(f, "off"),
            Self::Pending => write!(f, "--"),
            Self::SensorFault => write!(f, "sensor fault"),
            Self::Celsius(c) => write!(f, "{:.1}C", c),
        }
    }
}

/// Samples the probe once per call and keeps the result.
pub struct TemperatureMonitor {
    enabled: bool,
    status: TemperatureStatus,
}

impl TemperatureMonitor {
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled,
            status: if enabled {
                TemperatureStatus::Pending
            } else {
                TemperatureStatus::Disabled
            },
        }
    }

    /// One reset-then-read cycle.  A fault is retried on the next call.
    /// When disabled the probe is never touched.
    pub fn sample(&mut self, probe: &mut impl TemperatureProbe) -> TemperatureStatus {
        if !self.enabled {
            return self.status;
        }

        let was_fault = self.status == TemperatureStatus::SensorFault;
        self.status = match probe.reset() {
            Ok(Presence::Present) => match probe.read_temperature() {
                Ok(c) => TemperatureStatus::Celsius(c),
                Err(e) => {
                    if !was_fault {
                        warn!("Temperature: read failed: {}", e);
                    }
                    TemperatureStatus::SensorFault
                }
            },
            Ok(Presence::Absent) => {
                if !was_fault {
                    warn!("Temperature: probe not present");
                }
                TemperatureStatus::SensorFault
            }
            Err(e) => {
                if !was_fault {
                    warn!("Temperature: bus reset failed: {}", e);
                }
                TemperatureStatus::SensorFault
            }
        };
        self.status
    }

    pub fn status(&self) -> TemperatureStatus {
        self.status
    }
}
