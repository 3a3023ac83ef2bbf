//! Admin-only pool management: the raw listing and the clear-all
//! reset.

use axum::{
    Extension, Json, Router,
    extract::{Query, State},
    routing::{delete, get},
};
use serde::Deserialize;

use lunarlink_core::{Claims, ServiceError, require_admin};

use super::AppState;
use crate::model::{Code, CodeStatus, SpeedTier};
use crate::service::CodeFilters;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/list", get(list_codes))
        .route("/all", delete(clear_all))
}

#[derive(Deserialize)]
struct ListQuery {
    speed: Option<SpeedTier>,
    status: Option<CodeStatus>,
}

async fn list_codes(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<Code>>, ServiceError> {
    require_admin(&claims)?;
    let filters = CodeFilters {
        speed: query.speed,
        status: query.status,
    };
    state.service.list_codes(&filters).await.map(Json)
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ClearAllBody {
    #[serde(default)]
    confirm: bool,
    #[serde(default)]
    confirm_again: bool,
}

/// Wipes every table. Irreversible, so the body must carry both
/// confirmation flags; anything less deletes nothing.
async fn clear_all(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(body): Json<ClearAllBody>,
) -> Result<Json<serde_json::Value>, ServiceError> {
    require_admin(&claims)?;
    if !(body.confirm && body.confirm_again) {
        return Err(ServiceError::Validation(
            "clear-all requires confirm and confirmAgain".into(),
        ));
    }
    state.service.clear_all().await?;
    Ok(Json(serde_json::json!({"ok": true})))
}
