//! Integration tests for partner administration and API-secret handling.

mod common;

use axum::http::StatusCode;
use common::{expect_json, flat_fee_partner, get_partner, seed_partner, send_json_admin};
use serde_json::json;
use sqlx::PgPool;

#[sqlx::test(migrations = "../../db/migrations")]
async fn create_partner_returns_secret_exactly_once(pool: PgPool) {
    let app = common::build_test_app(pool);

    let response = send_json_admin(
        app.clone(),
        "POST",
        "/api/v1/partners",
        json!({ "name": "Acme Recruiting", "fee_flat": "5000.00" }),
    )
    .await;
    let created = expect_json(response, StatusCode::CREATED).await;

    let api_secret = created["data"]["api_secret"].as_str().unwrap();
    assert_eq!(api_secret.len(), 48);
    assert!(created["data"]["secret_hash"].is_null());
    assert!(created["data"]["notify_secret"].is_null());
    assert_eq!(
        created["data"]["secret_prefix"].as_str().unwrap(),
        &api_secret[..8]
    );

    // Subsequent reads never expose the secret again.
    let id = created["data"]["id"].as_i64().unwrap();
    let response = common::get_admin(app, &format!("/api/v1/partners/{id}")).await;
    let fetched = expect_json(response, StatusCode::OK).await;
    assert!(fetched["data"]["api_secret"].is_null());
    assert!(fetched["data"]["secret_hash"].is_null());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn duplicate_partner_name_conflicts(pool: PgPool) {
    let app = common::build_test_app(pool);

    let body = json!({ "name": "Acme Recruiting" });
    let response = send_json_admin(app.clone(), "POST", "/api/v1/partners", body.clone()).await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = send_json_admin(app, "POST", "/api/v1/partners", body).await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn rotate_secret_invalidates_the_old_one(pool: PgPool) {
    let (partner, old_secret) = seed_partner(&pool, flat_fee_partner("Acme Recruiting")).await;
    let app = common::build_test_app(pool);

    // The old secret authenticates.
    let response = get_partner(app.clone(), "/api/v1/introductions", &old_secret).await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = send_json_admin(
        app.clone(),
        "POST",
        &format!("/api/v1/partners/{}/rotate-secret", partner.id),
        json!({}),
    )
    .await;
    let rotated = expect_json(response, StatusCode::OK).await;
    let new_secret = rotated["data"]["api_secret"].as_str().unwrap().to_string();
    assert_ne!(new_secret, old_secret);

    let response = get_partner(app.clone(), "/api/v1/introductions", &old_secret).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = get_partner(app, "/api/v1/introductions", &new_secret).await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn deactivated_partner_fails_authentication(pool: PgPool) {
    let (partner, secret) = seed_partner(&pool, flat_fee_partner("Acme Recruiting")).await;
    let app = common::build_test_app(pool);

    let response = send_json_admin(
        app.clone(),
        "PUT",
        &format!("/api/v1/partners/{}/active", partner.id),
        json!({ "is_active": false }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = get_partner(app.clone(), "/api/v1/introductions", &secret).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    // Reactivation restores access.
    let response = send_json_admin(
        app.clone(),
        "PUT",
        &format!("/api/v1/partners/{}/active", partner.id),
        json!({ "is_active": true }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = get_partner(app, "/api/v1/introductions", &secret).await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn admin_endpoints_reject_bad_tokens(pool: PgPool) {
    let app = common::build_test_app(pool);

    let request = axum::http::Request::builder()
        .uri("/api/v1/partners")
        .header("authorization", "Bearer not-the-admin-token")
        .body(axum::body::Body::empty())
        .unwrap();
    let response = tower::ServiceExt::oneshot(app.clone(), request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let request = axum::http::Request::builder()
        .uri("/api/v1/partners")
        .body(axum::body::Body::empty())
        .unwrap();
    let response = tower::ServiceExt::oneshot(app, request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}
