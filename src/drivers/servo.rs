//! Feed-gate hobby servo driver.
//!
//! Angle control via a 50 Hz LEDC PWM channel.  Pulse width runs
//! linearly from `SERVO_MIN_PULSE_US` at 0° to `SERVO_MAX_PULSE_US` at
//! 180°.
//!
//! ## Dual-target design
//!
//! On ESP-IDF: drives real PWM via hw_init helpers.
//! On host/test: tracks state in-memory only.

use crate::drivers::hw_init;
use crate::error::ActuatorError;
use crate::pins;

/// One PWM frame at 50 Hz.
const PERIOD_US: u32 = 1_000_000 / pins::SERVO_PWM_FREQ_HZ;

pub struct ServoDriver {
    angle: Option<u8>,
    hw_duty: u32,
}

impl Default for ServoDriver {
    fn default() -> Self {
        Self::new()
    }
}

impl ServoDriver {
    pub fn new() -> Self {
        Self {
            angle: None,
            hw_duty: 0,
        }
    }

    /// Pulse width for `angle` (0–180) in microseconds.
    pub fn pulse_us(angle: u8) -> u32 {
        let span = pins::SERVO_MAX_PULSE_US - pins::SERVO_MIN_PULSE_US;
        pins::SERVO_MIN_PULSE_US + span * u32::from(angle.min(180)) / 180
    }

    /// LEDC duty value for `angle` at the configured resolution.
    pub fn angle_to_duty(angle: u8) -> u32 {
        let full_scale = 1u32 << pins::SERVO_PWM_RESOLUTION_BITS;
        Self::pulse_us(angle) * full_scale / PERIOD_US
    }

    pub fn move_to(&mut self, angle: u8) -> Result<(), ActuatorError> {
        if angle > 180 {
            return Err(ActuatorError::AngleOutOfRange);
        }
        let duty = Self::angle_to_duty(angle);
        hw_init::ledc_set_raw(hw_init::LEDC_CH_SERVO, duty)?;
        self.hw_duty = duty;
        self.angle = Some(angle);
        Ok(())
    }

    /// Last commanded angle, `None` before the first move.
    pub fn angle(&self) -> Option<u8> {
        self.angle
    }

    pub fn current_duty(&self) -> u32 {
        self.hw_duty
    }
}
