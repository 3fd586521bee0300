use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;
use serde_json::Value;

use crate::models::SendCodeRequest;
use crate::startup::AppState;
use service_core::error::AppError;

pub const CODE_SENT: &str = "Security code sent successfully";
pub const CODE_REQUIRED: &str = "Phone number and code are required";
pub const CODE_FAILED: &str = "Failed to send security code";

#[derive(Debug, Serialize)]
pub struct SendCodeResponse {
    pub message: String,
}

/// `POST /send_code`: forward a one-time code to the given phone number.
///
/// A body that is not a JSON object is handled like one without fields.
#[tracing::instrument(skip(state, payload))]
pub async fn send_code(
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<(StatusCode, Json<SendCodeResponse>), AppError> {
    let request = match payload {
        Ok(Json(body)) => SendCodeRequest::from_body(body),
        Err(rejection) => {
            tracing::debug!(error = %rejection, "Unreadable send_code body");
            SendCodeRequest::default()
        }
    };

    let Some(code) = request.into_security_code() else {
        return Err(AppError::BadRequest(anyhow::anyhow!(CODE_REQUIRED)));
    };

    if !state.forwarder.forward(&code).await {
        return Err(AppError::UpstreamError(CODE_FAILED.to_string()));
    }

    Ok((
        StatusCode::OK,
        Json(SendCodeResponse {
            message: CODE_SENT.to_string(),
        }),
    ))
}
