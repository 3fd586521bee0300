//! Read access to the `sensor_data` table.

use crate::config::DatabaseConfig;
use crate::models::SensorRecord;
use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use secrecy::ExposeSecret;
use serde_json::Value;
use sqlx::mysql::types::MySqlTime;
use sqlx::mysql::{MySqlConnectOptions, MySqlConnection, MySqlRow};
use sqlx::{Column, Connection, Row, TypeInfo, ValueRef};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use thiserror::Error;
use tracing::instrument;

pub const SENSOR_QUERY: &str = "SELECT * FROM sensor_data";

#[derive(Debug, Error)]
pub enum DataAccessError {
    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Query error: {0}")]
    Query(String),
}

#[async_trait]
pub trait SensorRepository: Send + Sync {
    async fn fetch_all(&self) -> Result<Vec<SensorRecord>, DataAccessError>;
}

/// MySQL-backed repository. Every call opens and closes its own connection.
#[derive(Clone)]
pub struct MySqlSensorRepository {
    options: MySqlConnectOptions,
}

impl MySqlSensorRepository {
    pub fn new(config: &DatabaseConfig) -> Self {
        let options = MySqlConnectOptions::new()
            .host(&config.host)
            .port(config.port)
            .username(&config.user)
            .password(config.password.expose_secret())
            .database(&config.name);

        Self { options }
    }
}

#[async_trait]
impl SensorRepository for MySqlSensorRepository {
    #[instrument(skip(self))]
    async fn fetch_all(&self) -> Result<Vec<SensorRecord>, DataAccessError> {
        let mut conn = MySqlConnection::connect_with(&self.options)
            .await
            .map_err(|e| DataAccessError::Connection(e.to_string()))?;

        let rows = sqlx::query(SENSOR_QUERY)
            .fetch_all(&mut conn)
            .await
            .map_err(|e| DataAccessError::Query(e.to_string()))?;

        let records = rows
            .iter()
            .map(row_to_record)
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| DataAccessError::Query(e.to_string()))?;

        if let Err(e) = conn.close().await {
            tracing::warn!(error = %e, "Failed to close database connection cleanly");
        }

        tracing::debug!(rows = records.len(), "Fetched sensor rows");
        Ok(records)
    }
}

/// How a MySQL column is rendered as JSON.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    Bool,
    Signed,
    Unsigned,
    Float,
    DateTime,
    Timestamp,
    Date,
    Time,
    Json,
    Bytes,
    Text,
}

impl ColumnKind {
    /// Classify a column from its driver-reported type name.
    pub fn from_type_name(name: &str) -> Self {
        if name.ends_with("UNSIGNED") {
            return ColumnKind::Unsigned;
        }

        match name {
            "BOOLEAN" => ColumnKind::Bool,
            "TINYINT" | "SMALLINT" | "MEDIUMINT" | "INT" | "BIGINT" | "YEAR" => ColumnKind::Signed,
            "FLOAT" | "DOUBLE" => ColumnKind::Float,
            "DATETIME" => ColumnKind::DateTime,
            "TIMESTAMP" => ColumnKind::Timestamp,
            "DATE" => ColumnKind::Date,
            "TIME" => ColumnKind::Time,
            "JSON" => ColumnKind::Json,
            "BLOB" | "TINYBLOB" | "MEDIUMBLOB" | "LONGBLOB" | "BINARY" | "VARBINARY" | "BIT"
            | "GEOMETRY" => ColumnKind::Bytes,
            _ => ColumnKind::Text,
        }
    }
}

fn row_to_record(row: &MySqlRow) -> Result<SensorRecord, sqlx::Error> {
    let mut record = SensorRecord::new();
    for column in row.columns() {
        let value = column_value(row, column.ordinal(), column.type_info().name())?;
        record.insert(column.name().to_string(), value);
    }
    Ok(record)
}

fn column_value(row: &MySqlRow, index: usize, type_name: &str) -> Result<Value, sqlx::Error> {
    if row.try_get_raw(index)?.is_null() {
        return Ok(Value::Null);
    }

    let typed = match ColumnKind::from_type_name(type_name) {
        ColumnKind::Bool => row.try_get::<bool, _>(index).map(Value::Bool),
        ColumnKind::Signed => row.try_get_unchecked::<i64, _>(index).map(Value::from),
        ColumnKind::Unsigned => row.try_get_unchecked::<u64, _>(index).map(Value::from),
        ColumnKind::Float => row.try_get::<f64, _>(index).map(float_value),
        ColumnKind::DateTime => row.try_get::<NaiveDateTime, _>(index).map(datetime_value),
        ColumnKind::Timestamp => row.try_get::<DateTime<Utc>, _>(index).map(timestamp_value),
        ColumnKind::Date => row.try_get::<NaiveDate, _>(index).map(date_value),
        // TIME spans -838:59:59 to 838:59:59, wider than a time of day.
        ColumnKind::Time => row
            .try_get::<MySqlTime, _>(index)
            .map(|t| Value::String(t.to_string())),
        ColumnKind::Json => row.try_get::<Value, _>(index),
        ColumnKind::Bytes => row
            .try_get_unchecked::<Vec<u8>, _>(index)
            .map(|b| binary_value(&b)),
        ColumnKind::Text => row
            .try_get_unchecked::<Vec<u8>, _>(index)
            .map(|b| text_value(&b)),
    };

    // Undecodable values keep their raw wire bytes rather than failing the row.
    typed.or_else(|e| {
        tracing::debug!(error = %e, column = index, type_name, "Falling back to raw column bytes");
        row.try_get_unchecked::<Vec<u8>, _>(index)
            .map(|b| binary_value(&b))
    })
}

fn float_value(f: f64) -> Value {
    serde_json::Number::from_f64(f).map_or(Value::Null, Value::Number)
}

fn datetime_value(dt: NaiveDateTime) -> Value {
    Value::String(dt.format("%Y-%m-%dT%H:%M:%S%.f").to_string())
}

fn timestamp_value(dt: DateTime<Utc>) -> Value {
    Value::String(dt.to_rfc3339())
}

fn date_value(d: NaiveDate) -> Value {
    Value::String(d.to_string())
}

fn binary_value(bytes: &[u8]) -> Value {
    Value::String(BASE64.encode(bytes))
}

/// Text columns (and DECIMAL, ENUM, SET) as strings; bytes that are not
/// UTF-8 are base64 encoded instead of being mangled.
fn text_value(bytes: &[u8]) -> Value {
    match std::str::from_utf8(bytes) {
        Ok(text) => Value::String(text.to_string()),
        Err(_) => binary_value(bytes),
    }
}

/// In-memory repository for tests and local runs without MySQL.
pub struct MockSensorRepository {
    rows: Option<Vec<SensorRecord>>,
    fetch_count: AtomicU64,
}

impl MockSensorRepository {
    pub fn with_rows(rows: Vec<SensorRecord>) -> Self {
        Self {
            rows: Some(rows),
            fetch_count: AtomicU64::new(0),
        }
    }

    /// A repository whose every fetch fails as if the database were down.
    pub fn unreachable() -> Self {
        Self {
            rows: None,
            fetch_count: AtomicU64::new(0),
        }
    }

    pub fn fetch_count(&self) -> u64 {
        self.fetch_count.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SensorRepository for MockSensorRepository {
    async fn fetch_all(&self) -> Result<Vec<SensorRecord>, DataAccessError> {
        self.fetch_count.fetch_add(1, Ordering::SeqCst);
        self.rows
            .clone()
            .ok_or_else(|| DataAccessError::Connection("[MOCK] database unreachable".to_string()))
    }
}

/// Fetches sensor rows, downgrading any failure to an empty result.
#[derive(Clone)]
pub struct SensorReader {
    repository: Arc<dyn SensorRepository>,
}

impl SensorReader {
    pub fn new(repository: Arc<dyn SensorRepository>) -> Self {
        Self { repository }
    }

    pub async fn read_all(&self) -> Vec<SensorRecord> {
        match self.repository.fetch_all().await {
            Ok(rows) => rows,
            Err(e) => {
                tracing::error!(error = %e, "Failed to read sensor data");
                Vec::new()
            }
        }
    }
}
