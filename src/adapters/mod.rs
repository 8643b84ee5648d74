//! Adapters: concrete implementations of the hexagonal port traits.
//!
//! | Adapter     | Implements    | Connects to                 |
//! |-------------|---------------|-----------------------------|
//! | `hardware`  | ActuatorPort  | Buzzer, LED, display value  |
//! | `log_sink`  | EventSink     | Serial log output           |
//! | `nvs`       | ConfigPort    | NVS / in-memory store       |
//! |             | CounterStore  |                             |
//! | `time`      | Clock         | ESP32 system timer          |
//! | `uart`      | SerialPort    | UART1 / scripted simulation |

pub mod hardware;
pub mod log_sink;
pub mod nvs;
pub mod time;
pub mod uart;
