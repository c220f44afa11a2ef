//! Adapters: concrete implementations of the hexagonal port traits.
//!
//! | Adapter     | Implements        | Connects to                 |
//! |-------------|-------------------|-----------------------------|
//! | `clock`     | ClockPort         | system time + esp_timer     |
//! | `display`   | DisplayPort       | Serial log text lines       |
//! | `hardware`  | ClockPort         | (delegates to `clock`)      |
//! |             | ActuatorPort      | ESP32 LEDC (servo)          |
//! |             | TemperatureProbe  | ESP32 ADC (NTC)             |
//! |             | DelayNs           | FreeRTOS delay              |
//! | `log_sink`  | EventSink         | Serial log output           |
//! | `nvs`       | IntervalStore     | NVS / in-memory store       |
//! |             | StoragePort       |                             |
//! | `telemetry` | TelemetryPort     | JSON lines on the console   |

pub mod clock;
pub mod display;
pub mod hardware;
pub mod log_sink;
pub mod nvs;
pub mod telemetry;
