//! End-to-end attribution scenarios through the HTTP surface.
//!
//! Covers the introduction lifecycle, hire-triggered matching, the calendar
//! window boundary, oldest-first selection, fee resolution, and the guards
//! around manual placement creation.

mod common;

use axum::http::StatusCode;
use chrono::{Duration, Months, Utc};
use common::{
    body_json, expect_json, flat_fee_partner, get_partner, percent_fee_partner, seed_partner,
    send_json_admin, send_json_partner,
};
use serde_json::json;
use sqlx::PgPool;

use advlink_core::audit::{entity_types, event_types};
use advlink_core::status::HireSource;
use advlink_db::models::hire::CreateHire;
use advlink_db::repositories::audit_repo::AuditRepo;
use advlink_db::repositories::hire_repo::HireRepo;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn introduction_body(crd_number: i64, conversation_ref: &str, introduced_at: &str) -> serde_json::Value {
    json!({
        "crd_number": crd_number,
        "first_name": "Avery",
        "last_name": "Stone",
        "email": "avery.stone@example.com",
        "introduced_at": introduced_at,
        "conversation_ref": conversation_ref,
    })
}

fn hire_body(crd_number: i64, hire_date: &str) -> serde_json::Value {
    json!({
        "crd_number": crd_number,
        "advisor_name": "Avery Stone",
        "firm_name": "Summit Advisors",
        "firm_crd": 99001,
        "hire_date": hire_date,
    })
}

fn days_ago(days: i64) -> String {
    (Utc::now() - Duration::days(days)).to_rfc3339()
}

fn months_ago(months: u32) -> String {
    (Utc::now() - Months::new(months)).to_rfc3339()
}

// ---------------------------------------------------------------------------
// Introduction lifecycle
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn introduction_create_and_duplicate(pool: PgPool) {
    let (_, secret) = seed_partner(&pool, flat_fee_partner("Acme Recruiting")).await;
    let app = common::build_test_app(pool.clone());

    let body = introduction_body(123456, "conv-001", &days_ago(30));

    let response =
        send_json_partner(app.clone(), "POST", "/api/v1/introductions", &secret, body.clone())
            .await;
    let created = expect_json(response, StatusCode::CREATED).await;
    let introduction_id = created["data"]["id"].as_i64().unwrap();
    assert_eq!(created["data"]["status"], "open");

    // Resubmitting the same triple returns the existing row with 200.
    let response = send_json_partner(app, "POST", "/api/v1/introductions", &secret, body).await;
    let duplicate = expect_json(response, StatusCode::OK).await;
    assert_eq!(duplicate["data"]["id"].as_i64().unwrap(), introduction_id);

    // Only the first submission produced an audit entry.
    let audited = AuditRepo::count_for_entity(
        &pool,
        entity_types::INTRODUCTION,
        introduction_id,
        Some(event_types::CREATED),
    )
    .await
    .unwrap();
    assert_eq!(audited, 1);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn introduction_requires_partner_auth(pool: PgPool) {
    let app = common::build_test_app(pool);

    let request = axum::http::Request::builder()
        .method("POST")
        .uri("/api/v1/introductions")
        .header("content-type", "application/json")
        .body(axum::body::Body::from(
            introduction_body(123456, "conv-001", &days_ago(30)).to_string(),
        ))
        .unwrap();

    let response = tower::ServiceExt::oneshot(app, request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn introduction_rejects_invalid_crd(pool: PgPool) {
    let (_, secret) = seed_partner(&pool, flat_fee_partner("Acme Recruiting")).await;
    let app = common::build_test_app(pool);

    let response = send_json_partner(
        app,
        "POST",
        "/api/v1/introductions",
        &secret,
        introduction_body(0, "conv-001", &days_ago(30)),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn partner_cannot_read_other_partners_introduction(pool: PgPool) {
    let (_, secret_a) = seed_partner(&pool, flat_fee_partner("Acme Recruiting")).await;
    let (_, secret_b) = seed_partner(&pool, flat_fee_partner("Beacon Search")).await;
    let app = common::build_test_app(pool);

    let response = send_json_partner(
        app.clone(),
        "POST",
        "/api/v1/introductions",
        &secret_a,
        introduction_body(123456, "conv-001", &days_ago(30)),
    )
    .await;
    let created = expect_json(response, StatusCode::CREATED).await;
    let id = created["data"]["id"].as_i64().unwrap();

    let response =
        get_partner(app, &format!("/api/v1/introductions/{id}"), &secret_b).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// ---------------------------------------------------------------------------
// Hire-triggered attribution
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn hire_inside_window_creates_placement(pool: PgPool) {
    let (partner, secret) = seed_partner(&pool, flat_fee_partner("Acme Recruiting")).await;
    let app = common::build_test_app(pool);

    let response = send_json_partner(
        app.clone(),
        "POST",
        "/api/v1/introductions",
        &secret,
        introduction_body(123456, "conv-001", &days_ago(60)),
    )
    .await;
    expect_json(response, StatusCode::CREATED).await;

    let today = Utc::now().date_naive().to_string();
    let response =
        send_json_admin(app.clone(), "POST", "/api/v1/hires", hire_body(123456, &today)).await;
    let created = expect_json(response, StatusCode::CREATED).await;

    let placement = &created["data"]["placement"];
    assert!(placement.is_object(), "expected a placement, got {placement}");
    assert_eq!(placement["partner_id"].as_i64().unwrap(), partner.id);
    // No notify_url configured counts as delivered.
    assert_eq!(placement["status"], "notified");
    assert_eq!(
        placement["fee_amount"].as_str().unwrap().parse::<f64>().unwrap(),
        5000.0
    );

    // The introduction is consumed.
    let response = get_partner(app.clone(), "/api/v1/introductions", &secret).await;
    let introductions = body_json(response).await;
    assert_eq!(introductions["data"][0]["status"], "placed");

    // The partner sees the placement in their own list.
    let response = get_partner(app, "/api/v1/placements", &secret).await;
    let placements = body_json(response).await;
    assert_eq!(placements["data"].as_array().unwrap().len(), 1);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn hire_without_open_introduction_yields_no_placement(pool: PgPool) {
    let app = common::build_test_app(pool);

    let today = Utc::now().date_naive().to_string();
    let response = send_json_admin(app, "POST", "/api/v1/hires", hire_body(123456, &today)).await;
    let created = expect_json(response, StatusCode::CREATED).await;

    assert!(created["data"]["placement"].is_null());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn duplicate_hire_returns_existing_without_rematching(pool: PgPool) {
    let app = common::build_test_app(pool);

    let body = hire_body(123456, "2026-03-02");
    let first = send_json_admin(app.clone(), "POST", "/api/v1/hires", body.clone()).await;
    let first = expect_json(first, StatusCode::CREATED).await;

    let second = send_json_admin(app, "POST", "/api/v1/hires", body).await;
    let second = expect_json(second, StatusCode::OK).await;
    assert_eq!(
        second["data"]["id"].as_i64().unwrap(),
        first["data"]["id"].as_i64().unwrap()
    );
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn hire_source_defaults_to_manual_and_accepts_onboarding(pool: PgPool) {
    let app = common::build_test_app(pool);

    let response = send_json_admin(
        app.clone(),
        "POST",
        "/api/v1/hires",
        hire_body(123456, "2026-03-02"),
    )
    .await;
    let created = expect_json(response, StatusCode::CREATED).await;
    assert_eq!(created["data"]["source"].as_str(), Some("manual"));

    let mut body = hire_body(654321, "2026-03-02");
    body["source"] = json!("onboarding");
    let response = send_json_admin(app, "POST", "/api/v1/hires", body).await;
    let created = expect_json(response, StatusCode::CREATED).await;
    assert_eq!(created["data"]["source"].as_str(), Some("onboarding"));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn hire_source_registry_sync_is_rejected(pool: PgPool) {
    let app = common::build_test_app(pool);

    let mut body = hire_body(123456, "2026-03-02");
    body["source"] = json!("registry_sync");
    let response = send_json_admin(app, "POST", "/api/v1/hires", body).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

// ---------------------------------------------------------------------------
// Window boundary
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn twelve_month_gap_is_inside_the_window(pool: PgPool) {
    let (_, secret) = seed_partner(&pool, flat_fee_partner("Acme Recruiting")).await;
    let app = common::build_test_app(pool);

    let response = send_json_partner(
        app.clone(),
        "POST",
        "/api/v1/introductions",
        &secret,
        introduction_body(123456, "conv-001", &months_ago(12)),
    )
    .await;
    expect_json(response, StatusCode::CREATED).await;

    // Exactly 12 calendar months is inclusive.
    let today = Utc::now().date_naive().to_string();
    let response = send_json_admin(app, "POST", "/api/v1/hires", hire_body(123456, &today)).await;
    let created = expect_json(response, StatusCode::CREATED).await;

    assert!(created["data"]["placement"].is_object());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn thirteen_month_gap_is_outside_the_window(pool: PgPool) {
    let (_, secret) = seed_partner(&pool, flat_fee_partner("Acme Recruiting")).await;
    let app = common::build_test_app(pool);

    let response = send_json_partner(
        app.clone(),
        "POST",
        "/api/v1/introductions",
        &secret,
        introduction_body(123456, "conv-001", &months_ago(13)),
    )
    .await;
    expect_json(response, StatusCode::CREATED).await;

    let today = Utc::now().date_naive().to_string();
    let response = send_json_admin(app, "POST", "/api/v1/hires", hire_body(123456, &today)).await;
    let created = expect_json(response, StatusCode::CREATED).await;

    assert!(created["data"]["placement"].is_null());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn hire_predating_introduction_never_matches(pool: PgPool) {
    let (_, secret) = seed_partner(&pool, flat_fee_partner("Acme Recruiting")).await;
    let app = common::build_test_app(pool);

    let response = send_json_partner(
        app.clone(),
        "POST",
        "/api/v1/introductions",
        &secret,
        introduction_body(123456, "conv-001", &days_ago(10)),
    )
    .await;
    expect_json(response, StatusCode::CREATED).await;

    // Hired before the introduction happened.
    let hire_date = (Utc::now() - Duration::days(20)).date_naive().to_string();
    let response =
        send_json_admin(app, "POST", "/api/v1/hires", hire_body(123456, &hire_date)).await;
    let created = expect_json(response, StatusCode::CREATED).await;

    assert!(created["data"]["placement"].is_null());
}

// ---------------------------------------------------------------------------
// Selection and fees
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn oldest_introduction_wins_across_partners(pool: PgPool) {
    let (partner_a, secret_a) = seed_partner(&pool, flat_fee_partner("Acme Recruiting")).await;
    let (_partner_b, secret_b) = seed_partner(&pool, flat_fee_partner("Beacon Search")).await;
    let app = common::build_test_app(pool);

    // Partner B introduced recently; partner A introduced months earlier.
    let response = send_json_partner(
        app.clone(),
        "POST",
        "/api/v1/introductions",
        &secret_b,
        introduction_body(123456, "conv-b", &days_ago(20)),
    )
    .await;
    expect_json(response, StatusCode::CREATED).await;

    let response = send_json_partner(
        app.clone(),
        "POST",
        "/api/v1/introductions",
        &secret_a,
        introduction_body(123456, "conv-a", &days_ago(120)),
    )
    .await;
    expect_json(response, StatusCode::CREATED).await;

    let today = Utc::now().date_naive().to_string();
    let response = send_json_admin(app, "POST", "/api/v1/hires", hire_body(123456, &today)).await;
    let created = expect_json(response, StatusCode::CREATED).await;

    assert_eq!(
        created["data"]["placement"]["partner_id"].as_i64().unwrap(),
        partner_a.id
    );
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn percent_terms_resolve_to_zero_fee(pool: PgPool) {
    let (_, secret) = seed_partner(&pool, percent_fee_partner("Beacon Search")).await;
    let app = common::build_test_app(pool);

    let response = send_json_partner(
        app.clone(),
        "POST",
        "/api/v1/introductions",
        &secret,
        introduction_body(123456, "conv-001", &days_ago(60)),
    )
    .await;
    expect_json(response, StatusCode::CREATED).await;

    let today = Utc::now().date_naive().to_string();
    let response = send_json_admin(app, "POST", "/api/v1/hires", hire_body(123456, &today)).await;
    let created = expect_json(response, StatusCode::CREATED).await;

    // Percentage terms need a comp figure nobody has at attribution time.
    assert_eq!(
        created["data"]["placement"]["fee_amount"]
            .as_str()
            .unwrap()
            .parse::<f64>()
            .unwrap(),
        0.0
    );
}

// ---------------------------------------------------------------------------
// Manual placement creation
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn manual_placement_honours_fee_override(pool: PgPool) {
    let (_, secret) = seed_partner(&pool, flat_fee_partner("Acme Recruiting")).await;
    let app = common::build_test_app(pool.clone());

    let response = send_json_partner(
        app.clone(),
        "POST",
        "/api/v1/introductions",
        &secret,
        introduction_body(123456, "conv-001", &days_ago(60)),
    )
    .await;
    let created = expect_json(response, StatusCode::CREATED).await;
    let introduction_id = created["data"]["id"].as_i64().unwrap();

    // Seed the hire through the repository so no automatic match fires.
    let hire = HireRepo::create(
        &pool,
        &CreateHire {
            crd_number: 123456,
            advisor_name: "Avery Stone".to_string(),
            firm_name: "Summit Advisors".to_string(),
            firm_crd: Some(99001),
            hire_date: Utc::now().date_naive(),
            source_ref: None,
        },
        HireSource::Onboarding,
    )
    .await
    .unwrap()
    .hire;

    let response = send_json_admin(
        app.clone(),
        "POST",
        "/api/v1/placements",
        json!({
            "introduction_id": introduction_id,
            "hire_id": hire.id,
            "fee_override": "1234.56",
        }),
    )
    .await;
    let placement = expect_json(response, StatusCode::CREATED).await;
    assert_eq!(
        placement["data"]["fee_amount"].as_str().unwrap().parse::<f64>().unwrap(),
        1234.56
    );

    // The introduction is no longer open; a second manual create fails.
    let response = send_json_admin(
        app,
        "POST",
        "/api/v1/placements",
        json!({
            "introduction_id": introduction_id,
            "hire_id": hire.id,
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn expired_introduction_is_skipped_by_matching(pool: PgPool) {
    let (_, secret) = seed_partner(&pool, flat_fee_partner("Acme Recruiting")).await;
    let app = common::build_test_app(pool);

    let response = send_json_partner(
        app.clone(),
        "POST",
        "/api/v1/introductions",
        &secret,
        introduction_body(123456, "conv-001", &days_ago(60)),
    )
    .await;
    let created = expect_json(response, StatusCode::CREATED).await;
    let id = created["data"]["id"].as_i64().unwrap();

    let response = send_json_admin(
        app.clone(),
        "PATCH",
        &format!("/api/v1/admin/introductions/{id}/status"),
        json!({ "status": "expired" }),
    )
    .await;
    expect_json(response, StatusCode::OK).await;

    let today = Utc::now().date_naive().to_string();
    let response = send_json_admin(app, "POST", "/api/v1/hires", hire_body(123456, &today)).await;
    let created = expect_json(response, StatusCode::CREATED).await;

    assert!(created["data"]["placement"].is_null());
}
