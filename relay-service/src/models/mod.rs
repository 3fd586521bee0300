pub mod security_code;
pub mod sensor;

pub use security_code::{ChatChannel, SecurityCode, SendCodeRequest};
pub use sensor::SensorRecord;
