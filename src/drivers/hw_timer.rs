//! Hardware timer module using ESP-IDF's esp_timer API.
//!
//! Two timers feed the event cells:
//!
//! - a 1 Hz periodic timer raising [`SECOND_TICK`]
//! - a one-shot feed alarm raising [`ALARM_FIRED`]
//!
//! Timer callbacks execute in the ESP timer task context (not ISR) and
//! only touch atomics.  On simulation targets nothing is started; tests
//! raise the cells directly.

#[cfg(target_os = "espidf")]
use crate::events::{ALARM_FIRED, SECOND_TICK};
#[cfg(target_os = "espidf")]
use crate::error::ClockError;

#[cfg(target_os = "espidf")]
use esp_idf_svc::sys::*;

#[cfg(target_os = "espidf")]
use log::info;

#[cfg(target_os = "espidf")]
static mut SECOND_TIMER: esp_timer_handle_t = core::ptr::null_mut();
#[cfg(target_os = "espidf")]
static mut ALARM_TIMER: esp_timer_handle_t = core::ptr::null_mut();

/// SAFETY: SECOND_TIMER is written once in `start_timers()` before any
/// timer callbacks fire.  Only called from the single main task.
#[cfg(target_os = "espidf")]
unsafe fn second_timer() -> esp_timer_handle_t { unsafe { SECOND_TIMER } }

/// SAFETY: Same invariants as `second_timer()`.
#[cfg(target_os = "espidf")]
unsafe fn alarm_timer() -> esp_timer_handle_t { unsafe { ALARM_TIMER } }

#[cfg(target_os = "espidf")]
unsafe extern "C" fn second_tick_cb(_arg: *mut core::ffi::c_void) {
    SECOND_TICK.raise();
}

#[cfg(target_os = "espidf")]
unsafe extern "C" fn alarm_cb(_arg: *mut core::ffi::c_void) {
    ALARM_FIRED.raise();
}

/// Create both timers and start the 1 Hz tick.  The alarm timer is
/// created idle; [`alarm_arm`] starts it.
#[cfg(target_os = "espidf")]
pub fn start_timers() {
    // SAFETY: SECOND_TIMER and ALARM_TIMER are written here once at boot
    // from the single main-task context before any timer callbacks fire.
    // The callbacks themselves only raise atomic flags.
    unsafe {
        let second_args = esp_timer_create_args_t {
            callback: Some(second_tick_cb),
            arg: core::ptr::null_mut(),
            dispatch_method: esp_timer_dispatch_t_ESP_TIMER_TASK,
            name: b"second\0".as_ptr() as *const _,
            skip_unhandled_events: true,
        };
        let ret = esp_timer_create(&second_args, &raw mut SECOND_TIMER);
        if ret != ESP_OK as i32 {
            log::error!("hw_timer: second timer create failed (rc={}), continuing without ticks", ret);
        } else if esp_timer_start_periodic(second_timer(), 1_000_000) != ESP_OK as i32 {
            log::error!("hw_timer: second timer start failed");
        }

        let alarm_args = esp_timer_create_args_t {
            callback: Some(alarm_cb),
            arg: core::ptr::null_mut(),
            dispatch_method: esp_timer_dispatch_t_ESP_TIMER_TASK,
            name: b"feed_alarm\0".as_ptr() as *const _,
            skip_unhandled_events: false,
        };
        let ret = esp_timer_create(&alarm_args, &raw mut ALARM_TIMER);
        if ret != ESP_OK as i32 {
            log::error!("hw_timer: alarm timer create failed (rc={}), feeding unavailable", ret);
            return;
        }

        info!("hw_timer: second@1Hz started, feed alarm ready");
    }
}

#[cfg(not(target_os = "espidf"))]
pub fn start_timers() {
    log::info!("hw_timer(sim): timers not started (events raised by tests)");
}

/// Start the alarm `secs` from now, replacing any pending expiry.
#[cfg(target_os = "espidf")]
pub fn alarm_arm(secs: u32) -> Result<(), ClockError> {
    // SAFETY: alarm_timer() contract: main task only.
    unsafe {
        let t = alarm_timer();
        if t.is_null() {
            return Err(ClockError::AlarmUnavailable);
        }
        // Not running is fine; any other error will show up on start.
        esp_timer_stop(t);
        if esp_timer_start_once(t, u64::from(secs) * 1_000_000) != ESP_OK as i32 {
            return Err(ClockError::AlarmUnavailable);
        }
    }
    Ok(())
}

/// Cancel the alarm.  No-op when it is not running.
#[cfg(target_os = "espidf")]
pub fn alarm_disarm() {
    // SAFETY: alarm_timer() contract: main task only.
    unsafe {
        let t = alarm_timer();
        if !t.is_null() {
            esp_timer_stop(t);
        }
    }
}

/// Stop all hardware timers.
#[cfg(target_os = "espidf")]
pub fn stop_timers() {
    // SAFETY: SECOND_TIMER/ALARM_TIMER are valid handles if start_timers()
    // succeeded; null-check prevents use of a failed create.
    unsafe {
        let st = second_timer();
        if !st.is_null() { esp_timer_stop(st); }
    }
    alarm_disarm();
}

#[cfg(not(target_os = "espidf"))]
pub fn stop_timers() {}
