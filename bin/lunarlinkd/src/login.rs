//! Login endpoint. One shared password field decides the role.
//!
//! The admin secret verifies against the configured argon2id hash;
//! anything else is checked against the daily user password before
//! being refused.

use axum::Router;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::post;
use serde::{Deserialize, Serialize};

use lunarlink_core::auth::{Role, issue_token, verify_admin_password, verify_user_password};

use crate::routes::AppState;

/// Login request body.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub password: String,
}

/// Login response body.
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: u64,
    pub role: String,
}

/// Register login routes.
pub fn routes() -> Router<AppState> {
    Router::new().route("/auth/login", post(login_handler))
}

/// Handle POST /auth/login.
async fn login_handler(
    State(state): State<AppState>,
    axum::Json(body): axum::Json<LoginRequest>,
) -> impl IntoResponse {
    let config = &state.server_config;

    let role = if verify_admin_password(&body.password, &config.auth.admin_password_hash) {
        Role::Admin
    } else if verify_user_password(&body.password) {
        Role::User
    } else {
        return (
            StatusCode::UNAUTHORIZED,
            axum::Json(serde_json::json!({
                "error": "invalid credentials"
            })),
        )
            .into_response();
    };

    match issue_token(role, &config.auth.jwt_secret, config.auth.expire_secs) {
        Ok((token, claims)) => {
            tracing::info!(role = role.as_str(), sid = claims.sid, "session issued");
            let response = LoginResponse {
                access_token: token,
                token_type: "Bearer".to_string(),
                expires_in: config.auth.expire_secs,
                role: role.as_str().to_string(),
            };
            (StatusCode::OK, axum::Json(serde_json::json!(response))).into_response()
        }
        Err(e) => {
            tracing::error!("Failed to encode JWT: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                axum::Json(serde_json::json!({
                    "error": "internal server error"
                })),
            )
                .into_response()
        }
    }
}
