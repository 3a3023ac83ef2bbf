//! Server configuration.
//!
//! A context name resolves to `/etc/lunarlink/<name>.toml`; anything
//! containing `/` or `.` is treated as a direct path.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use lunarlink_codes::service::dashboard::{DEFAULT_CRITICAL_THRESHOLD, DEFAULT_WARNING_THRESHOLD};
use lunarlink_codes::service::issue::{DEFAULT_MAX_RETRIES, DEFAULT_SLOT_TTL};

/// Connection to the hosted table service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableConfig {
    pub base_url: String,
    pub api_key: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// argon2id hash of the shared admin password.
    pub admin_password_hash: String,
    pub jwt_secret: String,
    #[serde(default = "default_expire_secs")]
    pub expire_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IssueConfig {
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    #[serde(default = "default_slot_ttl_secs")]
    pub slot_ttl_secs: u64,
}

impl Default for IssueConfig {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
            slot_ttl_secs: default_slot_ttl_secs(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlertsConfig {
    #[serde(default = "default_warning")]
    pub warning: u64,
    #[serde(default = "default_critical")]
    pub critical: u64,
}

impl Default for AlertsConfig {
    fn default() -> Self {
        Self {
            warning: default_warning(),
            critical: default_critical(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub table: TableConfig,
    pub auth: AuthConfig,
    #[serde(default)]
    pub issue: IssueConfig,
    #[serde(default)]
    pub alerts: AlertsConfig,
}

impl ServerConfig {
    /// Resolve a context name or direct path to a config file path.
    pub fn resolve_path(name_or_path: &str) -> PathBuf {
        if name_or_path.contains('/') || name_or_path.contains('.') {
            PathBuf::from(name_or_path)
        } else {
            PathBuf::from("/etc/lunarlink").join(format!("{}.toml", name_or_path))
        }
    }

    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: ServerConfig = toml::from_str(&content)?;
        Ok(config)
    }
}

fn default_expire_secs() -> u64 {
    3600
}

fn default_max_retries() -> u32 {
    DEFAULT_MAX_RETRIES
}

fn default_slot_ttl_secs() -> u64 {
    DEFAULT_SLOT_TTL.as_secs()
}

fn default_warning() -> u64 {
    DEFAULT_WARNING_THRESHOLD
}

fn default_critical() -> u64 {
    DEFAULT_CRITICAL_THRESHOLD
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_path() {
        assert_eq!(
            ServerConfig::resolve_path("prod"),
            PathBuf::from("/etc/lunarlink/prod.toml")
        );
        assert_eq!(
            ServerConfig::resolve_path("./local.toml"),
            PathBuf::from("./local.toml")
        );
        assert_eq!(
            ServerConfig::resolve_path("/tmp/x.toml"),
            PathBuf::from("/tmp/x.toml")
        );
    }

    #[test]
    fn test_minimal_config_gets_defaults() {
        let config: ServerConfig = toml::from_str(
            r#"
            [table]
            base_url = "https://example.test/rest/v1"
            api_key = "k"

            [auth]
            admin_password_hash = "$argon2id$stub"
            jwt_secret = "s"
            "#,
        )
        .unwrap();

        assert_eq!(config.auth.expire_secs, 3600);
        assert_eq!(config.issue.max_retries, 3);
        assert_eq!(config.issue.slot_ttl_secs, 600);
        assert_eq!(config.alerts.warning, 5);
        assert_eq!(config.alerts.critical, 2);
    }

    #[test]
    fn test_overrides_win() {
        let config: ServerConfig = toml::from_str(
            r#"
            [table]
            base_url = "https://example.test/rest/v1"
            api_key = "k"

            [auth]
            admin_password_hash = "$argon2id$stub"
            jwt_secret = "s"
            expire_secs = 60

            [issue]
            max_retries = 5

            [alerts]
            warning = 10
            critical = 1
            "#,
        )
        .unwrap();

        assert_eq!(config.auth.expire_secs, 60);
        assert_eq!(config.issue.max_retries, 5);
        assert_eq!(config.issue.slot_ttl_secs, 600);
        assert_eq!(config.alerts.warning, 10);
        assert_eq!(config.alerts.critical, 1);
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("server.toml");
        std::fs::write(
            &path,
            r#"
            [table]
            base_url = "https://example.test/rest/v1"
            api_key = "k"

            [auth]
            admin_password_hash = "$argon2id$stub"
            jwt_secret = "s"
            "#,
        )
        .unwrap();

        let config = ServerConfig::load(&path).unwrap();
        assert_eq!(config.table.api_key, "k");
    }
}
