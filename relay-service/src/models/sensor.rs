use serde_json::{Map, Value};

/// One row of `sensor_data`, keyed by column name.
///
/// The table schema is owned by the database; rows are passed through without
/// interpretation.
pub type SensorRecord = Map<String, Value>;
