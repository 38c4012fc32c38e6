//! Handlers for leaf color scoring and NPK soil analysis.

use agrisensa_core::bwd::{score_leaf, ScoreResult};
use agrisensa_core::models::ArtifactName;
use agrisensa_core::npk::{advise, NpkAnalysis, ReadingContext, ReadingContextInput};
use agrisensa_core::numeric::NumericInput;
use agrisensa_core::types::DbId;
use agrisensa_db::models::npk_reading::{CreateNpkReading, NpkReading};
use agrisensa_db::repositories::NpkReadingRepo;
use axum::body::Bytes;
use axum::extract::{FromRequest, Multipart, Query, Request, State};
use axum::http::header::CONTENT_TYPE;
use axum::http::StatusCode;
use axum::Json;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};
use crate::extract::ApiJson;
use crate::middleware::auth::{AuthUser, MaybeAuthUser};
use crate::query::{page_count, PageParams};
use crate::response::Success;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Leaf color scoring
// ---------------------------------------------------------------------------

#[derive(Debug, Default, Deserialize)]
struct Base64Image {
    image_base64: Option<String>,
}

/// POST /api/analysis/bwd
///
/// Score a leaf photo on the BWD chart. Accepts a multipart `file` field or a
/// JSON body `{"image_base64": "..."}` (data-URL prefixes are allowed).
pub async fn analyze_bwd(
    State(state): State<AppState>,
    request: Request,
) -> AppResult<Json<Success<ScoreResult>>> {
    let image = read_image(&state, request).await?;

    let model = state.models.get(ArtifactName::Bwd).await?;
    let band = state.config.vegetation_band;
    let image_len = image.len();
    let result = tokio::task::spawn_blocking(move || score_leaf(&image, &band, model.classifier()?))
        .await
        .map_err(|e| AppError::InternalError(format!("leaf scoring task failed: {e}")))??
        .ok_or(AppError::NoSubjectDetected)?;

    tracing::info!(
        image_len,
        bwd_score = result.bwd_score,
        avg_hue = result.avg_hue,
        "Leaf scored",
    );

    Ok(Json(Success::new(result)))
}

/// Pull the image bytes out of a multipart or JSON request.
async fn read_image(state: &AppState, request: Request) -> AppResult<Bytes> {
    let is_multipart = request
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.starts_with("multipart/form-data"));

    let image = if is_multipart {
        let mut multipart = Multipart::from_request(request, state)
            .await
            .map_err(|e| AppError::BadRequest(e.body_text()))?;
        read_file_field(&mut multipart).await?.map(|(_, bytes)| bytes)
    } else {
        let body = Bytes::from_request(request, state)
            .await
            .map_err(|e| AppError::BadRequest(e.body_text()))?;
        // A body that is not the expected JSON counts as "no image".
        let payload: Base64Image = serde_json::from_slice(&body).unwrap_or_default();
        payload
            .image_base64
            .filter(|b64| !b64.is_empty())
            .map(|b64| decode_base64_image(&b64))
            .transpose()?
    };

    image
        .filter(|bytes| !bytes.is_empty())
        .ok_or_else(|| AppError::BadRequest("No image provided (file or image_base64)".into()))
}

/// Decode base64 image text, ignoring any `data:...;base64,` prefix.
pub fn decode_base64_image(raw: &str) -> AppResult<Bytes> {
    let encoded = raw.rsplit(',').next().unwrap_or(raw).trim();
    STANDARD
        .decode(encoded)
        .map(Bytes::from)
        .map_err(|_| AppError::BadRequest("Invalid base64 image".into()))
}

/// The first multipart field named `file`, with its client filename.
///
/// A `file` field with an empty filename is rejected as "No file selected".
pub async fn read_file_field(multipart: &mut Multipart) -> AppResult<Option<(String, Bytes)>> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(e.body_text()))?
    {
        if field.name() != Some("file") {
            continue;
        }
        let filename = field.file_name().unwrap_or_default().to_string();
        if filename.is_empty() {
            return Err(AppError::BadRequest("No file selected".into()));
        }
        let bytes = field
            .bytes()
            .await
            .map_err(|e| AppError::BadRequest(e.body_text()))?;
        return Ok(Some((filename, bytes)));
    }
    Ok(None)
}

// ---------------------------------------------------------------------------
// NPK analysis
// ---------------------------------------------------------------------------

/// Request body for `POST /api/analysis/npk`.
#[derive(Debug, Deserialize)]
pub struct NpkRequest {
    pub n_value: Option<NumericInput>,
    pub p_value: Option<NumericInput>,
    pub k_value: Option<NumericInput>,
    #[serde(flatten)]
    pub context: ReadingContextInput,
}

#[derive(Debug, Serialize)]
pub struct NpkCreated {
    pub reading_id: DbId,
    pub analysis: NpkAnalysis,
}

/// POST /api/analysis/npk
///
/// Band the readings, persist them (with the caller's identity when a valid
/// token is sent) and return the analysis.
pub async fn analyze_npk(
    MaybeAuthUser(identity): MaybeAuthUser,
    State(state): State<AppState>,
    ApiJson(input): ApiJson<NpkRequest>,
) -> AppResult<(StatusCode, Json<Success<NpkCreated>>)> {
    let (Some(n), Some(p), Some(k)) = (&input.n_value, &input.p_value, &input.k_value) else {
        return Err(AppError::BadRequest("Missing required NPK values".into()));
    };
    let n_value = n.to_i32("n_value")?;
    let p_value = p.to_i32("p_value")?;
    let k_value = k.to_i32("k_value")?;
    let context = input.context.resolve()?;

    let analysis = advise(n_value, p_value, k_value);
    let analysis_result = serde_json::to_value(&analysis)
        .map_err(|e| AppError::InternalError(format!("failed to encode analysis: {e}")))?;

    let ReadingContext {
        ph_value,
        temperature,
        humidity,
        location,
    } = context;
    let reading = NpkReadingRepo::create(
        &state.pool,
        &CreateNpkReading {
            user_id: identity.map(|i| i.user_id),
            n_value,
            p_value,
            k_value,
            ph_value,
            temperature,
            humidity,
            location,
            analysis_result,
        },
    )
    .await?;

    tracing::info!(
        reading_id = reading.id,
        user_id = ?reading.user_id,
        n_value,
        p_value,
        k_value,
        "NPK reading stored",
    );

    Ok((
        StatusCode::CREATED,
        Json(Success::new(NpkCreated {
            reading_id: reading.id,
            analysis,
        })),
    ))
}

#[derive(Debug, Serialize)]
pub struct NpkHistory {
    pub readings: Vec<NpkReading>,
    pub total: i64,
    pub page: i64,
    pub pages: i64,
}

/// GET /api/analysis/npk/history?page=&per_page=
///
/// The caller's readings, newest first.
pub async fn npk_history(
    AuthUser(identity): AuthUser,
    State(state): State<AppState>,
    Query(params): Query<PageParams>,
) -> AppResult<Json<Success<NpkHistory>>> {
    let per_page = params.per_page();
    let readings =
        NpkReadingRepo::list_by_user(&state.pool, identity.user_id, per_page, params.offset())
            .await?;
    let total = NpkReadingRepo::count_by_user(&state.pool, identity.user_id).await?;

    Ok(Json(Success::new(NpkHistory {
        readings,
        total,
        page: params.page(),
        pages: page_count(total, per_page),
    })))
}
