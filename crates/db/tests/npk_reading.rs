//! Integration tests for the NPK reading repository.

use agrisensa_db::models::npk_reading::CreateNpkReading;
use agrisensa_db::repositories::NpkReadingRepo;
use serde_json::json;
use sqlx::PgPool;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn new_reading(user_id: Option<i64>, n: i32) -> CreateNpkReading {
    CreateNpkReading {
        user_id,
        n_value: n,
        p_value: 30,
        k_value: 200,
        ph_value: None,
        temperature: None,
        humidity: None,
        location: None,
        analysis_result: json!({"Nitrogen (N)": {"value": n}}),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_create_and_find(pool: PgPool) {
    let input = CreateNpkReading {
        ph_value: Some(6.4),
        temperature: Some(28.5),
        humidity: Some(71.0),
        location: Some("Subang".to_string()),
        ..new_reading(Some(7), 150)
    };

    let created = NpkReadingRepo::create(&pool, &input).await.unwrap();
    assert!(created.id > 0);
    assert_eq!(created.user_id, Some(7));
    assert_eq!(created.n_value, 150);
    assert_eq!(created.ph_value, Some(6.4));
    assert_eq!(created.location.as_deref(), Some("Subang"));
    assert_eq!(created.analysis_result["Nitrogen (N)"]["value"], 150);

    let found = NpkReadingRepo::find_by_id(&pool, created.id)
        .await
        .unwrap()
        .expect("reading should exist");
    assert_eq!(found.id, created.id);
    assert_eq!(found.recorded_at, created.recorded_at);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_anonymous_reading_has_no_owner(pool: PgPool) {
    let created = NpkReadingRepo::create(&pool, &new_reading(None, 90))
        .await
        .unwrap();
    assert_eq!(created.user_id, None);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_find_missing_returns_none(pool: PgPool) {
    assert!(NpkReadingRepo::find_by_id(&pool, 999_999)
        .await
        .unwrap()
        .is_none());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_list_by_user_is_newest_first_and_paginated(pool: PgPool) {
    for n in [100, 110, 120] {
        NpkReadingRepo::create(&pool, &new_reading(Some(1), n))
            .await
            .unwrap();
    }
    NpkReadingRepo::create(&pool, &new_reading(Some(2), 999))
        .await
        .unwrap();
    NpkReadingRepo::create(&pool, &new_reading(None, 999))
        .await
        .unwrap();

    assert_eq!(NpkReadingRepo::count_by_user(&pool, 1).await.unwrap(), 3);

    let first_page = NpkReadingRepo::list_by_user(&pool, 1, 2, 0).await.unwrap();
    let values: Vec<i32> = first_page.iter().map(|r| r.n_value).collect();
    assert_eq!(values, vec![120, 110]);

    let second_page = NpkReadingRepo::list_by_user(&pool, 1, 2, 2).await.unwrap();
    assert_eq!(second_page.len(), 1);
    assert_eq!(second_page[0].n_value, 100);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_serializes_recorded_at_as_timestamp(pool: PgPool) {
    let created = NpkReadingRepo::create(&pool, &new_reading(Some(3), 150))
        .await
        .unwrap();
    let json = serde_json::to_value(&created).unwrap();
    assert!(json.get("timestamp").is_some());
    assert!(json.get("recorded_at").is_none());
}
