use axum::{Extension, Json, Router, extract::State, routing::get};

use lunarlink_core::{Claims, ServiceError, require_admin};

use super::AppState;
use crate::service::dashboard::DashboardSummary;

pub fn routes() -> Router<AppState> {
    Router::new().route("/stats", get(stats))
}

async fn stats(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<DashboardSummary>, ServiceError> {
    require_admin(&claims)?;
    state.dashboard.summary().await.map(Json)
}
