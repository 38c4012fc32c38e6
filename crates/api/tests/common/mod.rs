#![allow(dead_code)]

use std::io::Cursor;
use std::path::Path;
use std::sync::Arc;

use agrisensa_api::auth::jwt::{generate_access_token, JwtConfig};
use agrisensa_api::config::ServerConfig;
use agrisensa_api::router::build_app_router;
use agrisensa_api::state::AppState;
use agrisensa_api::storage::DocumentStore;
use agrisensa_core::knowledge::KnowledgeBase;
use agrisensa_core::leaf_color::DEFAULT_VEGETATION_BAND;
use agrisensa_core::models::{ArtifactName, ArtifactPaths, ModelRegistry};
use axum::body::Body;
use axum::http::{header, Method, Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use image::{DynamicImage, ImageBuffer, ImageFormat, Rgb};
use serde_json::{json, Value};
use sqlx::PgPool;
use tempfile::TempDir;
use tower::ServiceExt;

pub const TEST_JWT_SECRET: &str = "test-secret-that-is-long-enough-for-hmac";

/// Yield dataset used by the planner tests.
pub const YIELD_CSV: &str = "\
Nitrogen,Phosphorus,Potassium,Temperature,Rainfall,pH,Yield
80,40,40,25.5,1200,6.2,3000
120.456,55,60,27,1500,6.8,4250
100,50,50,26,1300,6.5,5000
";

/// A router plus the temporary directory backing its models, dataset and
/// uploads. Keep it alive for the duration of the test.
pub struct TestApp {
    pub router: Router,
    pub config: ServerConfig,
    pub dir: TempDir,
}

/// Build a test `ServerConfig` rooted at `dir`.
pub fn test_config(dir: &Path) -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        model_dir: dir.join("models"),
        dataset_path: dir.join("EDA_500.csv"),
        upload_dir: dir.join("uploads"),
        max_upload_bytes: 2 * 1024 * 1024,
        vegetation_band: DEFAULT_VEGETATION_BAND,
        jwt: JwtConfig {
            secret: TEST_JWT_SECRET.to_string(),
            access_token_expiry_mins: 15,
        },
    }
}

/// Full application with every model artifact and the yield dataset present.
pub fn build_test_app(pool: PgPool) -> TestApp {
    let dir = tempfile::tempdir().expect("tempdir");
    write_fixture_models(&dir.path().join("models"));
    std::fs::write(dir.path().join("EDA_500.csv"), YIELD_CSV).expect("write dataset");
    assemble(pool, dir)
}

/// Application whose model directory and dataset do not exist.
pub fn build_test_app_without_models(pool: PgPool) -> TestApp {
    let dir = tempfile::tempdir().expect("tempdir");
    assemble(pool, dir)
}

fn assemble(pool: PgPool, dir: TempDir) -> TestApp {
    let config = test_config(dir.path());
    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
        models: Arc::new(ModelRegistry::from_paths(ArtifactPaths::in_dir(
            &config.model_dir,
        ))),
        knowledge: Arc::new(KnowledgeBase::embedded().expect("embedded knowledge")),
        documents: Arc::new(DocumentStore::new(&config.upload_dir)),
    };
    TestApp {
        router: build_app_router(state, &config),
        config,
        dir,
    }
}

// ---------------------------------------------------------------------------
// Fixture artifacts
// ---------------------------------------------------------------------------

fn write_artifact(dir: &Path, name: ArtifactName, artifact: Value) {
    std::fs::write(dir.join(name.default_file_name()), artifact.to_string())
        .expect("write artifact");
}

/// Small hand-written models with easily predicted outputs:
///
/// - bwd: hue near 75/62/50/40 scores 2/3/4/5.
/// - recommendation: N = 100 + age, P = 30 + age/2, K = 50 + age/4.
/// - crop: positive nitrogen favours "rice".
/// - yield: 3000 + 10 * nitrogen kg/ha.
/// - success: log-odds 0.1 * nitrogen - 5.
pub fn write_fixture_models(dir: &Path) {
    std::fs::create_dir_all(dir).expect("create model dir");

    write_artifact(
        dir,
        ArtifactName::Bwd,
        json!({
            "kind": "gaussian_nb",
            "classes": [2, 3, 4, 5],
            "theta": [[75.0], [62.0], [50.0], [40.0]],
            "var": [[20.0], [20.0], [20.0], [20.0]],
            "class_prior": [0.25, 0.25, 0.25, 0.25]
        }),
    );
    write_artifact(
        dir,
        ArtifactName::Recommendation,
        json!({
            "kind": "linear_regression",
            "coef": [[0.0, 0.0, 0.0, 1.0], [0.0, 0.0, 0.0, 0.5], [0.0, 0.0, 0.0, 0.25]],
            "intercept": [100.0, 30.0, 50.0]
        }),
    );
    write_artifact(
        dir,
        ArtifactName::CropRecommendation,
        json!({
            "kind": "logistic_regression",
            "classes": ["rice", "maize"],
            "coef": [
                [0.01, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0],
                [-0.01, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0]
            ],
            "intercept": [0.0, 0.0]
        }),
    );
    write_artifact(
        dir,
        ArtifactName::YieldPrediction,
        json!({
            "kind": "linear_regression",
            "coef": [[10.0, 0.0, 0.0, 0.0, 0.0, 0.0]],
            "intercept": [3000.0]
        }),
    );
    write_artifact(
        dir,
        ArtifactName::AdvancedYield,
        json!({
            "kind": "linear_regression",
            "coef": [[10.0, 0.0, 0.0, 0.0, 0.0, 0.0]],
            "intercept": [3000.0],
            "feature_importances": [0.5, 0.05, 0.1, 0.2, 0.1, 0.05]
        }),
    );
    write_artifact(
        dir,
        ArtifactName::ShapExplainer,
        json!({
            "kind": "linear_explainer",
            "expected_value": 3500.0,
            "coef": [10.0, 0.0, 0.0, 0.0, 0.0, 0.0],
            "feature_means": [50.0, 0.0, 0.0, 0.0, 0.0, 0.0]
        }),
    );
    write_artifact(
        dir,
        ArtifactName::SuccessModel,
        json!({
            "kind": "logistic_regression",
            "classes": [0, 1],
            "coef": [[0.1, 0.0, 0.0, 0.0, 0.0, 0.0]],
            "intercept": [-5.0]
        }),
    );
}

// ---------------------------------------------------------------------------
// Images and auth
// ---------------------------------------------------------------------------

/// A solid-color PNG.
pub fn png(width: u32, height: u32, rgb: [u8; 3]) -> Vec<u8> {
    let img = ImageBuffer::from_pixel(width, height, Rgb(rgb));
    let mut buf = Cursor::new(Vec::new());
    DynamicImage::ImageRgb8(img)
        .write_to(&mut buf, ImageFormat::Png)
        .expect("png encoding should succeed");
    buf.into_inner()
}

pub fn bearer(user_id: i64) -> String {
    let config = JwtConfig {
        secret: TEST_JWT_SECRET.to_string(),
        access_token_expiry_mins: 15,
    };
    let token = generate_access_token(user_id, &config).expect("token generation");
    format!("Bearer {token}")
}

// ---------------------------------------------------------------------------
// Requests
// ---------------------------------------------------------------------------

pub async fn send(app: &Router, request: Request<Body>) -> Response<Body> {
    app.clone().oneshot(request).await.expect("request should complete")
}

pub async fn get(app: &Router, uri: &str) -> Response<Body> {
    let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
    send(app, request).await
}

pub async fn get_with_auth(app: &Router, uri: &str, authorization: &str) -> Response<Body> {
    let request = Request::builder()
        .uri(uri)
        .header(header::AUTHORIZATION, authorization)
        .body(Body::empty())
        .unwrap();
    send(app, request).await
}

pub async fn post_json(app: &Router, uri: &str, body: Value) -> Response<Body> {
    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    send(app, request).await
}

pub async fn post_json_with_auth(
    app: &Router,
    uri: &str,
    body: Value,
    authorization: &str,
) -> Response<Body> {
    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .header(header::AUTHORIZATION, authorization)
        .body(Body::from(body.to_string()))
        .unwrap();
    send(app, request).await
}

const BOUNDARY: &str = "agrisensa-test-boundary";

/// POST a single-file multipart form with field name `file`.
pub async fn post_file(app: &Router, uri: &str, filename: &str, bytes: &[u8]) -> Response<Body> {
    let mut body = Vec::new();
    body.extend_from_slice(
        format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{filename}\"\r\nContent-Type: application/octet-stream\r\n\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(bytes);
    body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());

    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap();
    send(app, request).await
}

pub async fn body_bytes(response: Response<Body>) -> Vec<u8> {
    response
        .into_body()
        .collect()
        .await
        .expect("body should be readable")
        .to_bytes()
        .to_vec()
}

pub async fn body_json(response: Response<Body>) -> Value {
    serde_json::from_slice(&body_bytes(response).await).expect("body should be JSON")
}
