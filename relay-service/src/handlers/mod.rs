//! HTTP handlers for relay-service.

pub mod send_code;
pub mod sensor_data;

pub use send_code::send_code;
pub use sensor_data::sensor_data;
