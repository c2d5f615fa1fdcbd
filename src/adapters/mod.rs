//! Adapters: concrete implementations of the hexagonal port traits.
//!
//! | Adapter        | Implements   | Connects to                    |
//! |----------------|--------------|--------------------------------|
//! | `i2c_bus`      | RegisterBus  | any `embedded_hal` I2C master  |
//! | `hardware`     | SensorPort   | BME280 session over RegisterBus|
//! | `log_sink`     | EventSink    | `log` facade                   |
//! | `time`         | Clock        | system wall clock              |
//! | `config_file`  | ConfigPort   | JSON file on disk              |

pub mod config_file;
pub mod hardware;
pub mod i2c_bus;
pub mod log_sink;
pub mod time;
