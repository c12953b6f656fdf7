//! Integration tests for the idempotent ledger creates.
//!
//! Both ledgers absorb repeat submissions: the same natural key returns the
//! existing row unchanged with `created == false`, never an error and never
//! a second row.

use chrono::{Duration, NaiveDate, Utc};
use sqlx::PgPool;

use advlink_core::status::HireSource;
use advlink_db::models::hire::CreateHire;
use advlink_db::models::introduction::CreateIntroduction;
use advlink_db::models::partner::CreatePartner;
use advlink_db::repositories::hire_repo::HireRepo;
use advlink_db::repositories::introduction_repo::IntroductionRepo;
use advlink_db::repositories::partner_repo::PartnerRepo;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn seed_partner(pool: &PgPool, name: &str) -> i64 {
    let input = CreatePartner {
        name: name.to_string(),
        fee_flat: None,
        fee_percent: None,
        attribution_window_months: None,
        notify_url: None,
        notify_secret: None,
    };
    PartnerRepo::create(pool, &input, &format!("hash-{name}"), "testpref")
        .await
        .expect("partner create failed")
        .id
}

fn new_introduction(crd_number: i64, conversation_ref: &str) -> CreateIntroduction {
    CreateIntroduction {
        crd_number,
        first_name: "Avery".to_string(),
        last_name: "Stone".to_string(),
        email: Some("avery.stone@example.com".to_string()),
        phone: None,
        introduced_at: Utc::now() - Duration::days(30),
        conversation_ref: conversation_ref.to_string(),
        metadata: None,
    }
}

fn new_hire(crd_number: i64, firm_name: &str, hire_date: NaiveDate) -> CreateHire {
    CreateHire {
        crd_number,
        advisor_name: "Avery Stone".to_string(),
        firm_name: firm_name.to_string(),
        firm_crd: Some(99001),
        hire_date,
        source_ref: None,
    }
}

// ---------------------------------------------------------------------------
// Introductions
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn introduction_create_is_idempotent(pool: PgPool) {
    let partner_id = seed_partner(&pool, "Acme Recruiting").await;
    let input = new_introduction(123456, "conv-001");

    let first = IntroductionRepo::create(&pool, partner_id, &input)
        .await
        .unwrap();
    assert!(first.created);
    assert_eq!(first.introduction.status, "open");

    let second = IntroductionRepo::create(&pool, partner_id, &input)
        .await
        .unwrap();
    assert!(!second.created);
    assert_eq!(second.introduction.id, first.introduction.id);

    let rows = IntroductionRepo::list(&pool, &Default::default()).await.unwrap();
    assert_eq!(rows.len(), 1);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn introduction_triple_distinguishes_conversation_ref(pool: PgPool) {
    let partner_id = seed_partner(&pool, "Acme Recruiting").await;

    let first = IntroductionRepo::create(&pool, partner_id, &new_introduction(123456, "conv-001"))
        .await
        .unwrap();
    let second = IntroductionRepo::create(&pool, partner_id, &new_introduction(123456, "conv-002"))
        .await
        .unwrap();

    assert!(first.created);
    assert!(second.created);
    assert_ne!(first.introduction.id, second.introduction.id);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn same_candidate_allowed_across_partners(pool: PgPool) {
    let partner_a = seed_partner(&pool, "Acme Recruiting").await;
    let partner_b = seed_partner(&pool, "Beacon Search").await;

    let a = IntroductionRepo::create(&pool, partner_a, &new_introduction(123456, "conv-001"))
        .await
        .unwrap();
    let b = IntroductionRepo::create(&pool, partner_b, &new_introduction(123456, "conv-001"))
        .await
        .unwrap();

    assert!(a.created);
    assert!(b.created);
}

// ---------------------------------------------------------------------------
// Hires
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn hire_create_is_idempotent(pool: PgPool) {
    let hire_date = NaiveDate::from_ymd_opt(2026, 3, 2).unwrap();
    let input = new_hire(123456, "Summit Advisors", hire_date);

    let first = HireRepo::create(&pool, &input, HireSource::Onboarding)
        .await
        .unwrap();
    assert!(first.created);
    assert_eq!(first.hire.source, "onboarding");

    // Repeat from a different source path still dedupes on the triple and
    // preserves the original source tag.
    let second = HireRepo::create(&pool, &input, HireSource::RegistrySync)
        .await
        .unwrap();
    assert!(!second.created);
    assert_eq!(second.hire.id, first.hire.id);
    assert_eq!(second.hire.source, "onboarding");

    assert_eq!(HireRepo::count_all(&pool).await.unwrap(), 1);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn hire_triple_distinguishes_date_and_firm(pool: PgPool) {
    let base = NaiveDate::from_ymd_opt(2026, 3, 2).unwrap();

    let first = HireRepo::create(&pool, &new_hire(123456, "Summit Advisors", base), HireSource::Manual)
        .await
        .unwrap();
    let other_date = HireRepo::create(
        &pool,
        &new_hire(123456, "Summit Advisors", base + Duration::days(1)),
        HireSource::Manual,
    )
    .await
    .unwrap();
    let other_firm = HireRepo::create(
        &pool,
        &new_hire(123456, "Ridgeline Wealth", base),
        HireSource::Manual,
    )
    .await
    .unwrap();

    assert!(first.created);
    assert!(other_date.created);
    assert!(other_firm.created);
    assert_eq!(HireRepo::count_all(&pool).await.unwrap(), 3);
}
