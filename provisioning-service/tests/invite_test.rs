//! Single invite integration tests.
//!
//! The invite endpoint is a one-row commit through the same pipeline as the
//! bulk import, so these focus on the contract surface rather than re-testing
//! the pipeline internals.

mod common;

use common::{cleanup_test_data, count_audit_events, count_rows, seed_platform_admin, TestApp};
use serde_json::json;

#[tokio::test]
#[ignore] // Requires PostgreSQL
async fn invite_provisions_a_single_account() {
    let app = TestApp::spawn().await.expect("Failed to spawn test app");
    cleanup_test_data(&app.pool).await.expect("Failed to cleanup");
    common::seed_tenant(&app.pool, "north-hill").await.unwrap();

    let admin_id = app.identity.seed_user("admin@platform.example");
    seed_platform_admin(&app.pool, admin_id).await.unwrap();
    let token = app.token_for(admin_id, "admin@platform.example");

    let response = app
        .client()
        .post(format!(
            "{}/provisioning/tenants/north-hill/invite",
            app.address
        ))
        .bearer_auth(&token)
        .json(&json!({
            "email": "counselor@school.example",
            "password": "welcome-aboard-1",
            "roles": ["counselor"],
            "display_name": "New Counselor"
        }))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), 200);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["ok"], true);
    assert_eq!(body["mode"], "commit");
    assert_eq!(body["results"][0]["ok"], true);
    assert!(body["results"][0]["user_id"].is_string());

    assert_eq!(count_rows(&app.pool, "memberships").await, 1);
    assert_eq!(count_rows(&app.pool, "directory_entries").await, 1);
    assert_eq!(count_audit_events(&app.pool, "user_provisioned").await, 1);
}

#[tokio::test]
#[ignore] // Requires PostgreSQL
async fn invalid_invite_is_refused_with_row_report() {
    let app = TestApp::spawn().await.expect("Failed to spawn test app");
    cleanup_test_data(&app.pool).await.expect("Failed to cleanup");
    common::seed_tenant(&app.pool, "north-hill").await.unwrap();

    let admin_id = app.identity.seed_user("admin@platform.example");
    seed_platform_admin(&app.pool, admin_id).await.unwrap();
    let token = app.token_for(admin_id, "admin@platform.example");

    let response = app
        .client()
        .post(format!(
            "{}/provisioning/tenants/north-hill/invite",
            app.address
        ))
        .bearer_auth(&token)
        .json(&json!({
            "email": "counselor@school.example",
            "password": "welcome-aboard-1",
            "roles": []
        }))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), 400);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["ok"], false);
    assert_eq!(
        body["results"][0]["errors"],
        json!(["At least one role is required"])
    );
    assert_eq!(count_rows(&app.pool, "memberships").await, 0);
}
