//! `lunarlink`, the LunarLink CLI client.
//!
//! Manages contexts, authentication, uploads and reporting.
//! Think of it as `kubectl` for LunarLink.

mod commands;
mod config;

use clap::{Parser, Subcommand};

/// LunarLink CLI tool.
#[derive(Parser, Debug)]
#[command(name = "lunarlink", about = "LunarLink CLI client")]
struct Cli {
    /// Path to client config file (default: ~/.lunarlink/config.toml).
    #[arg(long = "config", global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Manage contexts.
    #[command(name = "context")]
    Context {
        #[command(subcommand)]
        action: ContextAction,
    },

    /// Login to the current context's server.
    Login {
        /// Password (not recommended; use the interactive prompt).
        #[arg(long)]
        password: Option<String>,
    },

    /// Logout and clear the stored token.
    Logout,

    /// Upload a code file as a new batch.
    Upload {
        /// Path to the code file (text or CSV).
        file: String,
        /// Batch name.
        #[arg(long)]
        batch: String,
        /// Speed tier (16mbps, 20mbps, 50mbps).
        #[arg(long)]
        speed: String,
        /// Reuse an existing batch name without prompting.
        #[arg(long = "allow-duplicate")]
        allow_duplicate: bool,
    },

    /// Dashboard summary and low-stock alerts.
    Stats,

    /// Usage history.
    History {
        /// Filter by speed tier.
        #[arg(long)]
        speed: Option<String>,
        /// Case-insensitive search on code or batch name.
        #[arg(long)]
        search: Option<String>,
    },

    /// Recent upload batches.
    Batches {
        /// Limit results.
        #[arg(long)]
        limit: Option<usize>,
    },

    /// Delete every code, history entry and batch.
    #[command(name = "clear-all")]
    ClearAll,

    /// Check server status.
    Status,

    /// Show version.
    Version,
}

#[derive(Subcommand, Debug)]
enum ContextAction {
    /// Create a new context; with table credentials, also scaffold the
    /// server config.
    Create {
        /// Context name.
        name: String,
        /// Server URL for this context.
        #[arg(long, default_value = "http://localhost:8080")]
        server: String,
        /// Table service REST root (enables server config scaffolding).
        #[arg(long = "table-url")]
        table_url: Option<String>,
        /// Table service API key.
        #[arg(long = "table-key")]
        table_key: Option<String>,
        /// Server config directory (default: /etc/lunarlink).
        #[arg(long, default_value = "/etc/lunarlink")]
        config_dir: String,
        /// Admin password (non-interactive, for CI/automation).
        /// If not provided, will prompt interactively.
        #[arg(long)]
        password: Option<String>,
    },
    /// List all contexts.
    List,
    /// Switch to a context.
    Use { name: String },
    /// Delete a context.
    Delete { name: String },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config_path = cli
        .config
        .map(std::path::PathBuf::from)
        .unwrap_or_else(config::ClientConfig::default_path);

    match cli.command {
        Commands::Context { action } => match action {
            ContextAction::Create {
                name,
                server,
                table_url,
                table_key,
                config_dir,
                password,
            } => {
                let table = match (&table_url, &table_key) {
                    (Some(url), Some(key)) => Some((url.as_str(), key.as_str())),
                    (None, None) => None,
                    _ => anyhow::bail!("--table-url and --table-key go together."),
                };
                commands::context::create(
                    &name,
                    &server,
                    table,
                    &config_dir,
                    password.as_deref(),
                    &config_path,
                )?;
            }
            ContextAction::List => {
                commands::context::list(&config_path)?;
            }
            ContextAction::Use { name } => {
                commands::context::use_context(&name, &config_path)?;
            }
            ContextAction::Delete { name } => {
                commands::context::delete(&name, &config_path)?;
            }
        },

        Commands::Login { password } => {
            let password = password.unwrap_or_else(|| {
                rpassword::prompt_password("Password: ").unwrap_or_default()
            });
            commands::login::login(&password, &config_path)?;
        }

        Commands::Logout => {
            commands::login::logout(&config_path)?;
        }

        Commands::Upload {
            file,
            batch,
            speed,
            allow_duplicate,
        } => {
            commands::codes::upload(&file, &batch, &speed, allow_duplicate, &config_path)?;
        }

        Commands::Stats => {
            commands::codes::stats(&config_path)?;
        }

        Commands::History { speed, search } => {
            commands::codes::history(speed.as_deref(), search.as_deref(), &config_path)?;
        }

        Commands::Batches { limit } => {
            commands::codes::batches(limit, &config_path)?;
        }

        Commands::ClearAll => {
            commands::codes::clear_all(&config_path)?;
        }

        Commands::Status => {
            commands::codes::status(&config_path)?;
        }

        Commands::Version => {
            println!("lunarlink cli v{}", env!("CARGO_PKG_VERSION"));
        }
    }

    Ok(())
}
