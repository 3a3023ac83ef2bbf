//! Issuance endpoints plus the availability/alert reads every session
//! may hit. The session id from the JWT keys the offer slot, so a
//! token carries its issuance state across requests.

use axum::{
    Extension, Json, Router,
    extract::State,
    routing::{get, post},
};
use serde::{Deserialize, Serialize};

use lunarlink_core::{Claims, ServiceError};

use super::AppState;
use crate::model::{Alert, SpeedTier};
use crate::service::dashboard::TierCount;
use crate::service::issue::IssueOutcome;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/issue/request", post(request_code))
        .route("/issue/accept", post(accept_code))
        .route("/issue/reject", post(reject_code))
        .route("/issue/close", post(close_offer))
        .route("/available", get(available))
        .route("/alerts", get(alerts))
}

#[derive(Deserialize)]
struct RequestBody {
    speed: SpeedTier,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct IssueResponse {
    status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    speed: Option<SpeedTier>,
    #[serde(skip_serializing_if = "Option::is_none")]
    retries_left: Option<u32>,
}

impl From<IssueOutcome> for IssueResponse {
    fn from(outcome: IssueOutcome) -> Self {
        match outcome {
            IssueOutcome::CodeShown {
                value,
                tier,
                retries_left,
            } => Self {
                status: "CODE_SHOWN",
                code: Some(value),
                speed: Some(tier),
                retries_left: Some(retries_left),
            },
            IssueOutcome::Accepted { value, tier } => Self {
                status: "ACCEPTED",
                code: Some(value),
                speed: Some(tier),
                retries_left: None,
            },
            IssueOutcome::NoCodes => Self {
                status: "NO_CODES",
                code: None,
                speed: None,
                retries_left: None,
            },
            IssueOutcome::RetryLimitReached => Self {
                status: "RETRY_LIMIT",
                code: None,
                speed: None,
                retries_left: None,
            },
        }
    }
}

async fn request_code(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(body): Json<RequestBody>,
) -> Result<Json<IssueResponse>, ServiceError> {
    let outcome = state.engine.request(&claims.sid, body.speed).await?;
    Ok(Json(outcome.into()))
}

async fn accept_code(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<IssueResponse>, ServiceError> {
    let outcome = state.engine.accept(&claims.sid).await?;
    Ok(Json(outcome.into()))
}

async fn reject_code(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<IssueResponse>, ServiceError> {
    let outcome = state.engine.reject(&claims.sid).await?;
    Ok(Json(outcome.into()))
}

async fn close_offer(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Json<serde_json::Value> {
    state.engine.close(&claims.sid).await;
    Json(serde_json::json!({"ok": true}))
}

async fn available(State(state): State<AppState>) -> Result<Json<Vec<TierCount>>, ServiceError> {
    state.dashboard.unused_count_by_tier().await.map(Json)
}

async fn alerts(State(state): State<AppState>) -> Result<Json<Vec<Alert>>, ServiceError> {
    state.dashboard.alerts().await.map(Json)
}
