//! `lunarlinkd`, the LunarLink server binary.
//!
//! Usage:
//!   lunarlinkd -c <context-name-or-path> [--listen <addr>]
//!
//! The context name resolves to `/etc/lunarlink/<name>.toml`.
//! If a path with `/` or `.` is given, it's used directly.

mod auth_middleware;
mod bootstrap;
mod config;
mod login;
mod routes;

use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use lunarlink_codes::CodesModule;
use lunarlink_codes::service::dashboard::AlertThresholds;
use lunarlink_core::Module;
use lunarlink_table::{RestStore, TableStore};
use tracing::info;

use auth_middleware::JwtState;
use config::ServerConfig;
use routes::AppState;

/// LunarLink server.
#[derive(Parser, Debug)]
#[command(name = "lunarlinkd", about = "LunarLink voucher server")]
struct Cli {
    /// Context name or path to config file.
    #[arg(short = 'c', long = "config", required = true)]
    config: String,

    /// Listen address (overrides default 0.0.0.0:8080).
    #[arg(long = "listen", default_value = "0.0.0.0:8080")]
    listen: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let cli = Cli::parse();

    // Load server configuration.
    let config_path = ServerConfig::resolve_path(&cli.config);
    info!("Loading configuration from {}", config_path.display());
    let server_config = ServerConfig::load(&config_path)?;

    // Verify configuration is valid.
    bootstrap::verify_config(&server_config)?;

    // Connect to the hosted table service (shared by all modules).
    let store: Arc<dyn TableStore> = Arc::new(RestStore::new(
        &server_config.table.base_url,
        &server_config.table.api_key,
    ));

    let codes_module = CodesModule::new(
        store,
        server_config.issue.max_retries,
        Duration::from_secs(server_config.issue.slot_ttl_secs),
        AlertThresholds {
            warning: server_config.alerts.warning,
            critical: server_config.alerts.critical,
        },
    );
    info!("Codes module initialized");

    // Bootstrap: ensure the counters row exists.
    codes_module
        .service()
        .ensure_counters()
        .await
        .map_err(|e| anyhow::anyhow!("failed to reach table service: {}", e))?;

    let module_routes = vec![(codes_module.name(), codes_module.routes())];

    // Build JWT state for middleware.
    let jwt_state = Arc::new(JwtState::new(&server_config.auth.jwt_secret));

    let server_config = Arc::new(server_config);

    // Build application state.
    let app_state = AppState {
        jwt_state,
        server_config,
    };

    // Build router.
    let app = routes::build_router(app_state, module_routes);

    // Start server.
    let listener = tokio::net::TcpListener::bind(&cli.listen).await?;
    info!("LunarLink server listening on {}", cli.listen);
    axum::serve(listener, app).await?;

    Ok(())
}
