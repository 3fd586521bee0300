use axum::{extract::State, Json};

use crate::models::SensorRecord;
use crate::startup::AppState;

/// `GET /sensor_data`: every row of the table, or `[]` if it could not be read.
#[tracing::instrument(skip(state))]
pub async fn sensor_data(State(state): State<AppState>) -> Json<Vec<SensorRecord>> {
    Json(state.sensor_reader.read_all().await)
}
