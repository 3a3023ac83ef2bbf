pub mod admin;
pub mod batches;
pub mod history;
pub mod issue;
pub mod stats;
pub mod uploads;

use std::sync::Arc;

use axum::Router;

use crate::service::CodeService;
use crate::service::dashboard::Dashboard;
use crate::service::issue::IssueEngine;

/// Shared application state.
pub struct CodesState {
    pub service: Arc<CodeService>,
    pub engine: IssueEngine,
    pub dashboard: Dashboard,
}

pub type AppState = Arc<CodesState>;

/// Build the codes API router. The caller nests it under the module
/// prefix and layers auth in front.
pub fn router(state: AppState) -> Router {
    Router::new()
        .merge(issue::routes())
        .merge(uploads::routes())
        .merge(history::routes())
        .merge(batches::routes())
        .merge(stats::routes())
        .merge(admin::routes())
        .with_state(state)
}
