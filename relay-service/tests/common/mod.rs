#![allow(dead_code)]

use axum::{body::Body, http::Request, Router};
use http_body_util::BodyExt;
use relay_service::config::{DatabaseConfig, RelayConfig, TwilioConfig};
use relay_service::models::SensorRecord;
use relay_service::services::{MessagingProvider, MockSensorRepository, SensorRepository};
use relay_service::startup::Application;
use relay_service::{build_router, AppState};
use secrecy::Secret;
use serde_json::Value;
use service_core::config::Config as CoreConfig;
use std::sync::Arc;
use tower::util::ServiceExt;

pub const TEST_SENDER: &str = "+14155238886";

/// Config pointing at nothing real: port 0, a closed MySQL port, Twilio disabled.
pub fn test_config() -> RelayConfig {
    RelayConfig {
        common: CoreConfig { port: 0 },
        log_level: "error".to_string(),
        otlp_endpoint: None,
        database: DatabaseConfig {
            host: "127.0.0.1".to_string(),
            port: 1,
            user: "test".to_string(),
            password: Secret::new("test".to_string()),
            name: "sensors_test".to_string(),
        },
        twilio: TwilioConfig {
            account_sid: "ACtest".to_string(),
            auth_token: Secret::new("test-token".to_string()),
            whatsapp_from: TEST_SENDER.to_string(),
            api_base_url: "http://127.0.0.1:1".to_string(),
            enabled: false,
        },
    }
}

pub fn record(value: Value) -> SensorRecord {
    match value {
        Value::Object(map) => map,
        other => panic!("expected a JSON object, got {other}"),
    }
}

pub fn router(
    sensors: Arc<dyn SensorRepository>,
    provider: Arc<dyn MessagingProvider>,
) -> Router {
    build_router(AppState::new(test_config(), sensors, provider))
}

pub fn empty_sensors() -> Arc<dyn SensorRepository> {
    Arc::new(MockSensorRepository::with_rows(Vec::new()))
}

/// Send one request through the router and return status plus JSON body.
pub async fn call(app: Router, request: Request<Body>) -> (u16, Value) {
    let response = app.oneshot(request).await.expect("router call failed");
    let status = response.status().as_u16();
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("Failed to read body")
        .to_bytes();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, body)
}

pub fn post_json(uri: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

pub struct TestApp {
    pub address: String,
    pub port: u16,
}

impl TestApp {
    /// Spawn the real server on a random port.
    pub async fn spawn(config: RelayConfig) -> Self {
        let app = Application::build(config)
            .await
            .expect("Failed to build test application");

        let port = app.port();
        let address = format!("http://127.0.0.1:{}", port);

        tokio::spawn(async move {
            app.run_until_stopped().await.ok();
        });

        TestApp { address, port }
    }
}
