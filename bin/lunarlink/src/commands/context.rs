//! Context management commands.

use std::path::PathBuf;

use anyhow::Result;

use crate::config::{ClientConfig, Context};

/// Create a new context. With table credentials, also scaffolds the
/// server config with a freshly hashed admin password.
pub fn create(
    name: &str,
    server: &str,
    table: Option<(&str, &str)>,
    config_dir: &str,
    password: Option<&str>,
    client_config_path: &std::path::Path,
) -> Result<()> {
    let mut config_path = String::new();

    if let Some((table_url, table_key)) = table {
        let password = match password {
            // Non-interactive mode (CI/automation).
            Some(p) if !p.is_empty() => p.to_string(),
            Some(_) => anyhow::bail!("Password cannot be empty."),
            None => {
                let pw = rpassword::prompt_password("Enter admin password: ")?;
                let confirm = rpassword::prompt_password("Confirm admin password: ")?;
                if pw != confirm {
                    anyhow::bail!("Passwords do not match.");
                }
                if pw.is_empty() {
                    anyhow::bail!("Password cannot be empty.");
                }
                pw
            }
        };

        let path = write_server_config(name, table_url, table_key, &password, config_dir)?;
        println!("Server config written to {}", path.display());
        config_path = path.to_string_lossy().to_string();
    }

    let mut client_config = ClientConfig::load(client_config_path)?;
    client_config.upsert_context(Context {
        name: name.to_string(),
        config_path,
        server: server.to_string(),
        token: String::new(),
    });
    if client_config.current_context.is_empty() {
        client_config.current_context = name.to_string();
    }
    client_config.save(client_config_path)?;

    println!("Context \"{}\" created.", name);
    println!("  Server: {}", server);

    Ok(())
}

/// Hash the admin password and write the server config TOML.
fn write_server_config(
    name: &str,
    table_url: &str,
    table_key: &str,
    password: &str,
    config_dir: &str,
) -> Result<PathBuf> {
    use argon2::Argon2;
    use password_hash::rand_core::OsRng;
    use password_hash::{PasswordHasher, SaltString};

    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();
    let password_hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow::anyhow!("failed to hash password: {}", e))?
        .to_string();

    // Generate a random JWT secret.
    let jwt_secret: String = {
        use rand::Rng;
        let mut rng = rand::rng();
        (0..32).map(|_| format!("{:02x}", rng.random::<u8>())).collect()
    };

    let server_config = format!(
        r#"[table]
base_url = "{table_url}"
api_key = "{table_key}"

[auth]
admin_password_hash = "{password_hash}"
jwt_secret = "{jwt_secret}"
expire_secs = 3600
"#
    );

    let config_path = PathBuf::from(config_dir).join(format!("{}.toml", name));
    std::fs::create_dir_all(config_dir)?;
    std::fs::write(&config_path, &server_config)?;

    Ok(config_path)
}

/// List all contexts.
pub fn list(client_config_path: &std::path::Path) -> Result<()> {
    let config = ClientConfig::load(client_config_path)?;

    if config.contexts.is_empty() {
        println!("No contexts configured.");
        println!("Run: lunarlink context create <name>");
        return Ok(());
    }

    println!("{:2} {:20} {:40} {:12}", "", "NAME", "SERVER", "CONFIG");
    for ctx in &config.contexts {
        let marker = if ctx.name == config.current_context {
            "*"
        } else {
            " "
        };
        let server = if ctx.server.is_empty() { "-" } else { &ctx.server };
        let config_path = if ctx.config_path.is_empty() {
            "-"
        } else {
            &ctx.config_path
        };
        println!("{:2} {:20} {:40} {:12}", marker, ctx.name, server, config_path);
    }

    Ok(())
}

/// Switch current context.
pub fn use_context(name: &str, client_config_path: &std::path::Path) -> Result<()> {
    let mut config = ClientConfig::load(client_config_path)?;

    if !config.contexts.iter().any(|c| c.name == name) {
        anyhow::bail!(
            "Context \"{}\" not found. Run `lunarlink context list` to see available contexts.",
            name
        );
    }

    config.current_context = name.to_string();
    config.save(client_config_path)?;
    println!("Switched to context \"{}\".", name);
    Ok(())
}

/// Delete a context (doesn't delete server config file).
pub fn delete(name: &str, client_config_path: &std::path::Path) -> Result<()> {
    let mut config = ClientConfig::load(client_config_path)?;

    if !config.remove_context(name) {
        anyhow::bail!("Context \"{}\" not found.", name);
    }

    config.save(client_config_path)?;
    println!("Context \"{}\" deleted.", name);
    Ok(())
}
