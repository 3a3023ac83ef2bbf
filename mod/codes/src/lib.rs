pub mod api;
pub mod ingest;
pub mod model;
pub mod service;

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use lunarlink_core::Module;
use lunarlink_table::TableStore;

use api::CodesState;
use service::CodeService;
use service::dashboard::{AlertThresholds, Dashboard};
use service::issue::IssueEngine;

/// Voucher pool, issuance flow and dashboard, exposed as one module.
pub struct CodesModule {
    state: api::AppState,
}

impl CodesModule {
    pub fn new(
        store: Arc<dyn TableStore>,
        max_retries: u32,
        slot_ttl: Duration,
        thresholds: AlertThresholds,
    ) -> Self {
        let service = Arc::new(CodeService::new(store));
        let engine = IssueEngine::new(service.clone(), max_retries, slot_ttl);
        let dashboard = Dashboard::new(service.clone(), thresholds);
        Self {
            state: Arc::new(CodesState {
                service,
                engine,
                dashboard,
            }),
        }
    }

    /// The underlying service, for startup checks.
    pub fn service(&self) -> Arc<CodeService> {
        self.state.service.clone()
    }
}

impl Module for CodesModule {
    fn name(&self) -> &str {
        "codes"
    }

    fn routes(&self) -> Router {
        api::router(self.state.clone())
    }
}
