use axum::{
    Extension, Json, Router,
    extract::{Query, State},
    routing::get,
};
use serde::Deserialize;

use lunarlink_core::{Claims, ServiceError, require_admin};

use super::AppState;
use crate::model::Batch;

pub fn routes() -> Router<AppState> {
    Router::new().route("/batches", get(list_batches))
}

#[derive(Deserialize)]
struct BatchesQuery {
    limit: Option<usize>,
}

async fn list_batches(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Query(query): Query<BatchesQuery>,
) -> Result<Json<Vec<Batch>>, ServiceError> {
    require_admin(&claims)?;
    state.service.batches(query.limit).await.map(Json)
}
