//! GPIO / peripheral pin assignments for the bait feeder main board.
//!
//! Single source of truth: every driver references this module rather than
//! hard-coding pin numbers.  Change a pin here and it propagates everywhere.

// ---------------------------------------------------------------------------
// Keypad (six momentary switches, active-low with internal pull-up)
// ---------------------------------------------------------------------------

pub const KEY_BACK_GPIO: i32 = 4;
pub const KEY_DOWN_GPIO: i32 = 5;
pub const KEY_LEFT_GPIO: i32 = 6;
pub const KEY_CONFIRM_GPIO: i32 = 7;
pub const KEY_RIGHT_GPIO: i32 = 15;
pub const KEY_UP_GPIO: i32 = 16;

// ---------------------------------------------------------------------------
// Feed gate servo (SG90-class, 50 Hz)
// ---------------------------------------------------------------------------

/// LEDC PWM output to the servo signal line.
pub const SERVO_PWM_GPIO: i32 = 1;

// ---------------------------------------------------------------------------
// Sensors
// ---------------------------------------------------------------------------

/// Bait hopper level switch.  HIGH = bait present, LOW = insufficient.
pub const BAIT_LEVEL_GPIO: i32 = 8;

/// NTC thermistor, 10 kΩ @ 25 °C, voltage-divider to ADC.
/// ADC1 channel 8 (GPIO 9 on ESP32-S3).
pub const TEMP_ADC_GPIO: i32 = 9;

// ---------------------------------------------------------------------------
// PWM configuration
// ---------------------------------------------------------------------------

/// LEDC timer resolution for the servo (bits).  14-bit gives ~1.2 µs steps
/// at 50 Hz, enough for sub-degree positioning.
pub const SERVO_PWM_RESOLUTION_BITS: u32 = 14;
/// Standard hobby-servo frame rate.
pub const SERVO_PWM_FREQ_HZ: u32 = 50;
/// Pulse width at 0°.
pub const SERVO_MIN_PULSE_US: u32 = 500;
/// Pulse width at 180°.
pub const SERVO_MAX_PULSE_US: u32 = 2500;
