//! Sensor subsystem.
//!
//! Both sensors are polled from the main loop; neither raises interrupts.
//! Their readings feed the scheduler (bait level) or only the display and
//! telemetry (temperature).

pub mod bait_level;
pub mod temperature;
