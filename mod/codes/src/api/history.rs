//! Usage history endpoints, including the CSV export the admin page
//! offers for offline filing.

use axum::{
    Extension, Json, Router,
    extract::{Query, State},
    http::header,
    response::IntoResponse,
    routing::get,
};
use serde::Deserialize;

use lunarlink_core::{Claims, ServiceError, require_admin};

use super::AppState;
use crate::model::{HistoryEntry, SpeedTier};
use crate::service::HistoryFilters;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/history", get(list_history))
        .route("/history/export", get(export_history))
}

#[derive(Deserialize)]
struct HistoryQuery {
    speed: Option<SpeedTier>,
    q: Option<String>,
}

async fn list_history(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Query(query): Query<HistoryQuery>,
) -> Result<Json<Vec<HistoryEntry>>, ServiceError> {
    require_admin(&claims)?;
    let filters = HistoryFilters {
        speed: query.speed,
        q: query.q,
    };
    state.service.history(&filters).await.map(Json)
}

async fn export_history(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Query(query): Query<HistoryQuery>,
) -> Result<impl IntoResponse, ServiceError> {
    require_admin(&claims)?;
    let filters = HistoryFilters {
        speed: query.speed,
        q: query.q,
    };
    let entries = state.service.history(&filters).await?;

    let mut csv = String::from("code,speed,batch,used_on\n");
    for entry in &entries {
        csv.push_str(&format!(
            "{},{},{},{}\n",
            csv_field(&entry.code_value),
            entry.speed_tier.as_str(),
            csv_field(&entry.batch_name),
            entry.used_on.as_deref().unwrap_or(""),
        ));
    }

    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8"),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"history.csv\"",
            ),
        ],
        csv,
    ))
}

/// Quote a field when it would break the row otherwise.
fn csv_field(s: &str) -> String {
    if s.contains([',', '"', '\n']) {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}
