//! Batch upload endpoints. Text and CSV files arrive as multipart and
//! are parsed server-side; workbook formats are decoded to a cell grid
//! by the uploading client and posted as JSON rows.

use axum::{
    Extension, Json, Router,
    extract::{Multipart, State},
    routing::post,
};
use serde::{Deserialize, Serialize};

use lunarlink_core::{Claims, ServiceError, require_admin};

use super::AppState;
use crate::ingest;
use crate::model::SpeedTier;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/uploads", post(upload_file))
        .route("/uploads/rows", post(upload_rows))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct UploadResponse {
    imported: usize,
    batch: String,
    speed: SpeedTier,
}

/// Multipart form: `file` (the upload body), `batch`, `speed`, and an
/// optional `allowDuplicate` set to `true` to reuse a batch name.
async fn upload_file(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, ServiceError> {
    require_admin(&claims)?;

    let mut codes: Option<Vec<String>> = None;
    let mut batch: Option<String> = None;
    let mut speed: Option<SpeedTier> = None;
    let mut allow_duplicate = false;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ServiceError::Validation(format!("bad multipart body: {}", e)))?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "file" => {
                let filename = field.file_name().unwrap_or("upload").to_string();
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| ServiceError::Validation(format!("bad multipart body: {}", e)))?;
                codes = Some(ingest::parse_upload(&bytes, &filename));
            }
            "batch" => {
                batch = Some(read_text(field).await?);
            }
            "speed" => {
                speed = Some(read_text(field).await?.parse()?);
            }
            "allowDuplicate" => {
                allow_duplicate = read_text(field).await? == "true";
            }
            _ => {}
        }
    }

    let codes = codes.ok_or_else(|| ServiceError::Validation("file field is required".into()))?;
    let batch = batch.ok_or_else(|| ServiceError::Validation("batch field is required".into()))?;
    let speed = speed.ok_or_else(|| ServiceError::Validation("speed field is required".into()))?;

    let imported = state
        .service
        .insert_batch(&codes, &batch, speed, allow_duplicate)
        .await?;
    Ok(Json(UploadResponse {
        imported,
        batch,
        speed,
    }))
}

async fn read_text(field: axum::extract::multipart::Field<'_>) -> Result<String, ServiceError> {
    field
        .text()
        .await
        .map_err(|e| ServiceError::Validation(format!("bad multipart body: {}", e)))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RowsBody {
    batch: String,
    speed: SpeedTier,
    rows: Vec<Vec<String>>,
    #[serde(default)]
    allow_duplicate: bool,
}

/// JSON body with a pre-decoded cell grid, for workbook formats the
/// server does not parse itself.
async fn upload_rows(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(body): Json<RowsBody>,
) -> Result<Json<UploadResponse>, ServiceError> {
    require_admin(&claims)?;

    let codes = ingest::extract_from_rows(&body.rows);
    let imported = state
        .service
        .insert_batch(&codes, &body.batch, body.speed, body.allow_duplicate)
        .await?;
    Ok(Json(UploadResponse {
        imported,
        batch: body.batch,
        speed: body.speed,
    }))
}
