//! Tenant bootstrap integration tests.

mod common;

use common::{cleanup_test_data, count_audit_events, role_codes_for, seed_platform_admin, TestApp};
use serde_json::json;
use uuid::Uuid;

#[tokio::test]
#[ignore] // Requires PostgreSQL
async fn bootstrap_creates_tenant_and_owner() {
    let app = TestApp::spawn().await.expect("Failed to spawn test app");
    cleanup_test_data(&app.pool).await.expect("Failed to cleanup");

    let admin_id = app.identity.seed_user("admin@platform.example");
    seed_platform_admin(&app.pool, admin_id).await.unwrap();
    let token = app.token_for(admin_id, "admin@platform.example");

    let response = app
        .client()
        .post(format!("{}/provisioning/tenants/bootstrap", app.address))
        .bearer_auth(&token)
        .json(&json!({
            "tenant_slug": "west-lake",
            "tenant_label": "West Lake Academy",
            "owner": {
                "email": "owner@westlake.example",
                "password": "ownerpass123",
                "roles": ["principal"],
                "display_name": "Founding Principal"
            }
        }))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), 201);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["ok"], true);
    assert_eq!(body["tenant"]["tenant_slug"], "west-lake");
    assert_eq!(body["results"][0]["ok"], true);

    // The owner role is always granted even when the request omits it.
    let tenant_id: Uuid = body["tenant"]["tenant_id"].as_str().unwrap().parse().unwrap();
    let owner_id: Uuid = body["results"][0]["user_id"]
        .as_str()
        .unwrap()
        .parse()
        .unwrap();
    let codes = role_codes_for(&app.pool, tenant_id, owner_id).await;
    assert!(codes.contains(&"owner".to_string()), "{:?}", codes);
    assert!(codes.contains(&"principal".to_string()), "{:?}", codes);

    assert_eq!(count_audit_events(&app.pool, "tenant_bootstrapped").await, 1);
    assert_eq!(count_audit_events(&app.pool, "user_provisioned").await, 1);
}

#[tokio::test]
#[ignore] // Requires PostgreSQL
async fn bootstrap_requires_platform_admin() {
    let app = TestApp::spawn().await.expect("Failed to spawn test app");
    cleanup_test_data(&app.pool).await.expect("Failed to cleanup");

    let user_id = app.identity.seed_user("someone@school.example");
    let token = app.token_for(user_id, "someone@school.example");

    let response = app
        .client()
        .post(format!("{}/provisioning/tenants/bootstrap", app.address))
        .bearer_auth(&token)
        .json(&json!({
            "tenant_slug": "rogue-school",
            "tenant_label": "Rogue School",
            "owner": {
                "email": "owner@rogue.example",
                "password": "ownerpass123",
                "roles": ["owner"]
            }
        }))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), 403);
}

#[tokio::test]
#[ignore] // Requires PostgreSQL
async fn bootstrap_with_invalid_owner_creates_nothing() {
    let app = TestApp::spawn().await.expect("Failed to spawn test app");
    cleanup_test_data(&app.pool).await.expect("Failed to cleanup");

    let admin_id = app.identity.seed_user("admin@platform.example");
    seed_platform_admin(&app.pool, admin_id).await.unwrap();
    let token = app.token_for(admin_id, "admin@platform.example");

    let response = app
        .client()
        .post(format!("{}/provisioning/tenants/bootstrap", app.address))
        .bearer_auth(&token)
        .json(&json!({
            "tenant_slug": "half-built",
            "tenant_label": "Half Built School",
            "owner": {
                "email": "not-an-email",
                "password": "short",
                "roles": ["owner"]
            }
        }))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), 400);
    let body: serde_json::Value = response.json().await.unwrap();
    let errors = body["results"][0]["errors"].as_array().unwrap();
    assert!(errors.contains(&json!("Invalid email address")));
    assert!(errors.contains(&json!("Password must be at least 8 characters")));

    // No tenant row was left behind.
    let (tenants,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM tenants")
        .fetch_one(&app.pool)
        .await
        .unwrap();
    assert_eq!(tenants, 0);
}

#[tokio::test]
#[ignore] // Requires PostgreSQL
async fn bootstrap_rejects_duplicate_slug() {
    let app = TestApp::spawn().await.expect("Failed to spawn test app");
    cleanup_test_data(&app.pool).await.expect("Failed to cleanup");

    let admin_id = app.identity.seed_user("admin@platform.example");
    seed_platform_admin(&app.pool, admin_id).await.unwrap();
    let token = app.token_for(admin_id, "admin@platform.example");

    let request = json!({
        "tenant_slug": "twice-over",
        "tenant_label": "Twice Over School",
        "owner": {
            "email": "owner@twice.example",
            "password": "ownerpass123",
            "roles": ["owner"]
        }
    });

    let url = format!("{}/provisioning/tenants/bootstrap", app.address);
    let first = app
        .client()
        .post(&url)
        .bearer_auth(&token)
        .json(&request)
        .send()
        .await
        .unwrap();
    assert_eq!(first.status(), 201);

    let second = app
        .client()
        .post(&url)
        .bearer_auth(&token)
        .json(&request)
        .send()
        .await
        .unwrap();
    assert_eq!(second.status(), 409);
}
