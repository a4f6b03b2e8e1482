//! Health endpoint integration test.

mod common;

use common::TestApp;

#[tokio::test]
#[ignore] // Requires PostgreSQL
async fn health_check_reports_healthy() {
    let app = TestApp::spawn().await.expect("Failed to spawn test app");

    let response = app
        .client()
        .get(format!("{}/health", app.address))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), 200);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["checks"]["postgres"], "up");
}
