mod common;

use common::{test_config, TestApp};
use reqwest::Client;
use serde_json::json;

#[tokio::test]
async fn sensor_data_with_unreachable_database_is_empty() {
    let app = TestApp::spawn(test_config()).await;
    let client = Client::new();

    let response = client
        .get(format!("{}/sensor_data", app.address))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status().as_u16(), 200);
    assert!(response.headers().contains_key("x-request-id"));
    let body: serde_json::Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body, json!([]));
}

#[tokio::test]
async fn send_code_uses_mock_provider_when_twilio_disabled() {
    let app = TestApp::spawn(test_config()).await;
    let client = Client::new();

    let response = client
        .post(format!("{}/send_code", app.address))
        .json(&json!({ "phoneNumber": "+15551234567", "code": "123456" }))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status().as_u16(), 200);
    let body: serde_json::Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body, json!({ "message": "Security code sent successfully" }));
}

#[tokio::test]
async fn request_id_is_echoed() {
    let app = TestApp::spawn(test_config()).await;
    let client = Client::new();

    let response = client
        .get(format!("{}/sensor_data", app.address))
        .header("x-request-id", "trace-me")
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.headers()["x-request-id"], "trace-me");
}
