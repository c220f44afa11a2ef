//! Actuator and input drivers, hardware initialisation, and timers.

pub mod hw_init;
pub mod hw_timer;
pub mod keypad;
pub mod servo;
pub mod watchdog;
