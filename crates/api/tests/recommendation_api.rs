//! Integration tests for the fertilizer and field recommendation endpoints.

mod common;

use axum::http::StatusCode;
use common::{body_json, post_json};
use serde_json::json;
use sqlx::PgPool;

// ---------------------------------------------------------------------------
// Model-backed fertilizer recommendation
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn fertilizer_recommendation_uses_model(pool: PgPool) {
    let app = common::build_test_app(pool);
    let body = json!({
        "ph_tanah": 6.5,
        "skor_bwd": 3,
        "kelembaban_tanah": "55",
        "umur_tanaman_hari": 20
    });

    let response = post_json(&app.router, "/api/recommendation/fertilizer", body).await;

    assert_eq!(response.status(), StatusCode::OK);
    let rec = &body_json(response).await["recommendation"];
    assert_eq!(
        rec["rekomendasi_utama"],
        "Kondisi pH tanah optimal. Lanjutkan dengan pemupukan berikut:"
    );
    assert_eq!(rec["rekomendasi_pupuk_ml"]["Rekomendasi N (kg/ha)"], 120.0);
    assert_eq!(rec["rekomendasi_pupuk_ml"]["Rekomendasi P (kg/ha)"], 40.0);
    assert_eq!(rec["rekomendasi_pupuk_ml"]["Rekomendasi K (kg/ha)"], 55.0);
    assert_eq!(rec["peringatan_penting"], json!([]));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn acidic_soil_gets_dolomite_advice_and_warning(pool: PgPool) {
    let app = common::build_test_app(pool);
    let body = json!({
        "ph_tanah": 5.0,
        "skor_bwd": 2,
        "kelembaban_tanah": 40,
        "umur_tanaman_hari": 0
    });

    let json = body_json(post_json(&app.router, "/api/recommendation/fertilizer", body).await).await;

    let rec = &json["recommendation"];
    assert_eq!(
        rec["rekomendasi_utama"],
        "Prioritaskan aplikasi Dolomit untuk menaikkan pH."
    );
    assert_eq!(rec["peringatan_penting"].as_array().unwrap().len(), 1);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn fertilizer_recommendation_requires_every_field(pool: PgPool) {
    let app = common::build_test_app(pool);
    let body = json!({ "ph_tanah": 6.5, "skor_bwd": 3, "kelembaban_tanah": 55 });

    let response = post_json(&app.router, "/api/recommendation/fertilizer", body).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        body_json(response).await["error"],
        "umur_tanaman_hari is required"
    );
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn fertilizer_recommendation_without_model_is_500(pool: PgPool) {
    let app = common::build_test_app_without_models(pool);
    let body = json!({
        "ph_tanah": 6.5,
        "skor_bwd": 3,
        "kelembaban_tanah": 55,
        "umur_tanaman_hari": 20
    });

    let response = post_json(&app.router, "/api/recommendation/fertilizer", body).await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body_json(response).await["code"], "MODEL_UNAVAILABLE");
}

// ---------------------------------------------------------------------------
// Dosage and product conversion
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn dosage_scales_to_area(pool: PgPool) {
    let app = common::build_test_app(pool);
    let body = json!({ "commodity": "padi", "area_sqm": 5000 });

    let response = post_json(&app.router, "/api/recommendation/dosage", body).await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["commodity_name"], "Padi");
    assert_eq!(json["area_sqm"], 5000.0);
    assert_eq!(json["data"]["anorganik"]["Urea"], 112.5);
    assert_eq!(json["data"]["organik"]["Pupuk Kandang Sapi"], 5000.0);
    assert_eq!(json["data"]["perbaikan_tanah"], json!({}));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn dosage_adds_dolomite_on_acidic_soil(pool: PgPool) {
    let app = common::build_test_app(pool);
    let body = json!({ "commodity": "padi", "area_sqm": "10000", "ph_tanah": 5.2 });

    let json = body_json(post_json(&app.router, "/api/recommendation/dosage", body).await).await;

    assert_eq!(json["data"]["perbaikan_tanah"]["Dolomit"], 1500.0);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn dosage_rejects_unknown_commodity_and_empty_area(pool: PgPool) {
    let app = common::build_test_app(pool);

    let response = post_json(
        &app.router,
        "/api/recommendation/dosage",
        json!({ "commodity": "kopi", "area_sqm": 100 }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = post_json(
        &app.router,
        "/api/recommendation/dosage",
        json!({ "commodity": "padi", "area_sqm": 0 }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "VALIDATION_ERROR");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn fertilizer_bags_converts_nutrient_to_product(pool: PgPool) {
    let app = common::build_test_app(pool);
    let body = json!({
        "nutrient_needed": "N",
        "nutrient_amount_kg": 46,
        "fertilizer_type": "urea"
    });

    let response = post_json(&app.router, "/api/recommendation/fertilizer-bags", body).await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["required_fertilizer_kg"], 100.0);
    assert_eq!(json["fertilizer_name"], "Urea");
    assert_eq!(json["fertilizer_type"], "urea");
    assert_eq!(json["nutrient_amount_kg"], 46.0);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn fertilizer_bags_rejects_product_without_nutrient(pool: PgPool) {
    let app = common::build_test_app(pool);
    let body = json!({
        "nutrient_needed": "P",
        "nutrient_amount_kg": 10,
        "fertilizer_type": "urea"
    });

    let response = post_json(&app.router, "/api/recommendation/fertilizer-bags", body).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["success"], false);
}

// ---------------------------------------------------------------------------
// Integrated and spraying recommendations
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn integrated_recommendation_matches_known_keys(pool: PgPool) {
    let app = common::build_test_app(pool);
    let body = json!({
        "ketinggian": "dataran_rendah",
        "iklim": "tropis",
        "fase": "generatif",
        "masalah": "thrips"
    });

    let json = body_json(post_json(&app.router, "/api/recommendation/integrated", body).await).await;

    assert_eq!(
        json["data"]["bibit"],
        "Varietas tahan panas (Tomat Hibrida, Padi Sawah)."
    );
    assert_eq!(
        json["data"]["pemupukan"],
        "Fokus pada Fosfor (P) dan Kalium (K) untuk bunga dan buah."
    );
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn integrated_recommendation_falls_back(pool: PgPool) {
    let app = common::build_test_app(pool);

    let response = post_json(&app.router, "/api/recommendation/integrated", json!({})).await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["bibit"], "Pilih varietas sesuai kondisi.");
    assert_eq!(json["data"]["pemupukan"], "Sesuaikan dengan fase pertumbuhan.");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn spraying_plan_for_known_pest(pool: PgPool) {
    let app = common::build_test_app(pool);

    let response = post_json(
        &app.router,
        "/api/recommendation/spraying",
        json!({ "pest": "thrips" }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["strategy"]["name"], "Strategi Pengendalian Thrips");
    assert_eq!(json["data"]["strategy"]["cycles"].as_array().unwrap().len(), 3);
    assert_eq!(
        json["data"]["protocol"]["title"],
        "Protokol Penyemprotan Profesional"
    );
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn spraying_plan_errors(pool: PgPool) {
    let app = common::build_test_app(pool);

    let response = post_json(
        &app.router,
        "/api/recommendation/spraying",
        json!({ "pest": "wereng" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = post_json(&app.router, "/api/recommendation/spraying", json!({})).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["error"], "pest is required");
}
