//! Startup checks.
//!
//! When lunarlinkd starts:
//! 1. Verify the config carries an admin hash, JWT secret and table
//!    credentials, and refuse to start otherwise.
//! 2. Ensure the counters singleton exists in the remote project.

use crate::config::ServerConfig;

/// Verify server configuration is ready for use.
pub fn verify_config(config: &ServerConfig) -> anyhow::Result<()> {
    if config.auth.admin_password_hash.is_empty() {
        anyhow::bail!(
            "No admin password hash found in configuration.\n\
             Run `lunarlink context create <name>` to set up the server first."
        );
    }
    if config.auth.jwt_secret.is_empty() {
        anyhow::bail!("JWT secret is empty in configuration.");
    }
    if config.table.base_url.is_empty() {
        anyhow::bail!("Table service base_url is empty in configuration.");
    }
    if config.table.api_key.is_empty() {
        anyhow::bail!("Table service api_key is empty in configuration.");
    }
    if config.issue.max_retries == 0 {
        anyhow::bail!("issue.max_retries must be at least 1.");
    }
    Ok(())
}
