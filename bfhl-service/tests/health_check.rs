//! Spawns the real server on a random port and probes it over HTTP.

use bfhl_service::config::{BfhlConfig, GeminiSettings};
use bfhl_service::services::providers::mock::MockTextProvider;
use bfhl_service::startup::Application;
use reqwest::Client;
use std::sync::Arc;
use std::time::Duration;

/// Spawn the application on a random port and return the port number.
async fn spawn_app() -> u16 {
    let config = BfhlConfig {
        common: service_core::config::Config { port: 0 },
        official_email: "health@example.com".to_string(),
        gemini: GeminiSettings {
            api_key: None,
            model: "gemini-pro".to_string(),
            api_base: "http://127.0.0.1:9".to_string(),
        },
    };
    let provider = Arc::new(MockTextProvider::replying("Forty two"));
    let app = Application::build_with_provider(config, provider)
        .await
        .expect("Failed to build application");

    let port = app.port();

    // Spawn the server in the background
    tokio::spawn(async move {
        let _ = app.run_until_stopped().await;
    });

    port
}

#[tokio::test]
async fn health_check_returns_ok() {
    let port = spawn_app().await;
    let client = Client::new();

    let response = client
        .get(format!("http://127.0.0.1:{}/health", port))
        .timeout(Duration::from_secs(5))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: serde_json::Value = response.json().await.expect("Failed to parse JSON");
    assert_eq!(body["is_success"], true);
    assert_eq!(body["official_email"], "health@example.com");
}

#[tokio::test]
async fn bfhl_round_trip_over_http() {
    let port = spawn_app().await;
    let client = Client::new();

    let response = client
        .post(format!("http://127.0.0.1:{}/bfhl", port))
        .json(&serde_json::json!({"AI": "Meaning of life?"}))
        .timeout(Duration::from_secs(5))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), reqwest::StatusCode::OK);
    let body: serde_json::Value = response.json().await.expect("Failed to parse JSON");
    assert_eq!(body["data"], "Forty two");
}

#[tokio::test]
async fn build_with_gemini_provider_succeeds_without_key() {
    let config = BfhlConfig {
        common: service_core::config::Config { port: 0 },
        official_email: "health@example.com".to_string(),
        gemini: GeminiSettings {
            api_key: None,
            model: "gemini-pro".to_string(),
            api_base: "http://127.0.0.1:9".to_string(),
        },
    };

    let app = Application::build(config).await.expect("Failed to build application");
    assert_ne!(app.port(), 0);
}
