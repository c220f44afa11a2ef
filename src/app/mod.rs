//! Application core: pure domain logic, zero I/O.
//!
//! This module contains the rules that tie the feed scheduler, the
//! interaction FSM and the monitors together.  All interaction with
//! hardware happens through **port traits** defined in [`ports`],
//! keeping this layer fully testable without real peripherals.

pub mod commands;
pub mod events;
pub mod frame;
pub mod ports;
pub mod service;
pub mod telemetry;
