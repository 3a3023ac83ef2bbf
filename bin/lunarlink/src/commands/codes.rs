//! Operator commands against the codes API.

use anyhow::Result;

use crate::config::ClientConfig;

const SPEED_TIERS: [&str; 3] = ["16mbps", "20mbps", "50mbps"];

fn validate_speed(speed: &str) -> Result<()> {
    if SPEED_TIERS.contains(&speed) {
        Ok(())
    } else {
        anyhow::bail!(
            "Unknown speed tier \"{}\". Valid tiers: {}.",
            speed,
            SPEED_TIERS.join(", ")
        )
    }
}

/// HTTP client helper.
fn build_client(ctx: &crate::config::Context) -> Result<(reqwest::blocking::Client, String)> {
    if ctx.server.is_empty() {
        anyhow::bail!("No server URL set for context \"{}\".", ctx.name);
    }

    let mut headers = reqwest::header::HeaderMap::new();
    if !ctx.token.is_empty() {
        let val = format!("Bearer {}", ctx.token);
        headers.insert(
            reqwest::header::AUTHORIZATION,
            reqwest::header::HeaderValue::from_str(&val)?,
        );
    }

    let client = reqwest::blocking::Client::builder()
        .default_headers(headers)
        .build()?;

    Ok((client, ctx.server.trim_end_matches('/').to_string()))
}

fn current_context(client_config_path: &std::path::Path) -> Result<crate::config::Context> {
    let config = ClientConfig::load(client_config_path)?;
    config
        .current()
        .cloned()
        .ok_or_else(|| anyhow::anyhow!("No current context. Run `lunarlink context use <name>`."))
}

/// Pull the error message out of an API error body.
fn api_error(body: &serde_json::Value) -> &str {
    body["message"]
        .as_str()
        .or_else(|| body["error"].as_str())
        .unwrap_or("unknown error")
}

fn confirm(prompt: &str) -> bool {
    eprint!("{} [y/N]: ", prompt);
    let mut s = String::new();
    if std::io::stdin().read_line(&mut s).is_err() {
        return false;
    }
    s.trim().eq_ignore_ascii_case("y")
}

/// Upload a code file as a new batch. A batch-name conflict prompts
/// before retrying with the duplicate override.
pub fn upload(
    file: &str,
    batch: &str,
    speed: &str,
    allow_duplicate: bool,
    client_config_path: &std::path::Path,
) -> Result<()> {
    validate_speed(speed)?;

    let ctx = current_context(client_config_path)?;
    let (client, base_url) = build_client(&ctx)?;

    let bytes = std::fs::read(file)?;
    let filename = std::path::Path::new(file)
        .file_name()
        .and_then(|s| s.to_str())
        .unwrap_or("upload.txt")
        .to_string();

    let mut allow_duplicate = allow_duplicate;
    loop {
        let part = reqwest::blocking::multipart::Part::bytes(bytes.clone())
            .file_name(filename.clone());
        let mut form = reqwest::blocking::multipart::Form::new()
            .text("batch", batch.to_string())
            .text("speed", speed.to_string())
            .part("file", part);
        if allow_duplicate {
            form = form.text("allowDuplicate", "true");
        }

        let resp = client
            .post(format!("{}/codes/uploads", base_url))
            .multipart(form)
            .send()?;
        let status = resp.status();
        let body: serde_json::Value = resp.json()?;

        if status == reqwest::StatusCode::CONFLICT && !allow_duplicate {
            eprintln!("{}", api_error(&body));
            if confirm("Upload under the same batch name anyway?") {
                allow_duplicate = true;
                continue;
            }
            println!("Cancelled.");
            return Ok(());
        }

        if !status.is_success() {
            anyhow::bail!("Error ({}): {}", status, api_error(&body));
        }

        println!(
            "Imported {} codes into batch \"{}\" ({}).",
            body["imported"], batch, speed
        );
        return Ok(());
    }
}

/// Dashboard summary plus low-stock alerts.
pub fn stats(client_config_path: &std::path::Path) -> Result<()> {
    let ctx = current_context(client_config_path)?;
    let (client, base_url) = build_client(&ctx)?;

    let resp = client.get(format!("{}/codes/stats", base_url)).send()?;
    let status = resp.status();
    let body: serde_json::Value = resp.json()?;
    if !status.is_success() {
        anyhow::bail!("Error ({}): {}", status, api_error(&body));
    }

    println!("POOL");
    if let Some(tiers) = body["tiers"].as_array() {
        for tier in tiers {
            println!(
                "  {:10} {:>6}",
                tier["label"].as_str().unwrap_or("?"),
                tier["count"]
            );
        }
    }

    let counters = &body["counters"];
    let rate_pct = (body["usageRate"].as_f64().unwrap_or(0.0) * 100.0).round();
    println!("COUNTERS");
    println!("  uploaded   {:>6}", counters["totalUploaded"]);
    println!("  used       {:>6}", counters["codesUsed"]);
    println!("  accepts    {:>6}", counters["acceptCount"]);
    println!("  rejects    {:>6}", counters["rejectCount"]);
    println!("  batches    {:>6}", counters["batchesUploaded"]);
    println!("  usage rate {:>5}%", rate_pct);

    let resp = client.get(format!("{}/codes/alerts", base_url)).send()?;
    let status = resp.status();
    let alerts: serde_json::Value = resp.json()?;
    if !status.is_success() {
        anyhow::bail!("Error ({}): {}", status, api_error(&alerts));
    }

    match alerts.as_array() {
        Some(list) if !list.is_empty() => {
            println!("ALERTS");
            for alert in list {
                println!(
                    "  [{}] {}: {} left",
                    alert["level"].as_str().unwrap_or("?"),
                    alert["label"].as_str().unwrap_or("?"),
                    alert["count"]
                );
            }
        }
        _ => println!("No low-stock alerts."),
    }

    Ok(())
}

/// Usage history, optionally filtered.
pub fn history(
    speed: Option<&str>,
    search: Option<&str>,
    client_config_path: &std::path::Path,
) -> Result<()> {
    if let Some(speed) = speed {
        validate_speed(speed)?;
    }

    let ctx = current_context(client_config_path)?;
    let (client, base_url) = build_client(&ctx)?;

    let mut url = format!("{}/codes/history", base_url);
    let mut params = Vec::new();
    if let Some(s) = speed {
        params.push(format!("speed={}", s));
    }
    if let Some(q) = search {
        params.push(format!("q={}", q));
    }
    if !params.is_empty() {
        url.push('?');
        url.push_str(&params.join("&"));
    }

    let resp = client.get(&url).send()?;
    let status = resp.status();
    let body: serde_json::Value = resp.json()?;
    if !status.is_success() {
        anyhow::bail!("Error ({}): {}", status, api_error(&body));
    }

    let entries = body.as_array().cloned().unwrap_or_default();
    if entries.is_empty() {
        println!("No history entries.");
        return Ok(());
    }

    println!("{:24} {:8} {:20} {:24}", "CODE", "SPEED", "BATCH", "USED ON");
    for entry in &entries {
        println!(
            "{:24} {:8} {:20} {:24}",
            entry["codeValue"].as_str().unwrap_or("-"),
            entry["speedTier"].as_str().unwrap_or("-"),
            entry["batchName"].as_str().unwrap_or("-"),
            entry["usedOn"].as_str().unwrap_or("-"),
        );
    }

    Ok(())
}

/// Recent upload batches.
pub fn batches(limit: Option<usize>, client_config_path: &std::path::Path) -> Result<()> {
    let ctx = current_context(client_config_path)?;
    let (client, base_url) = build_client(&ctx)?;

    let mut url = format!("{}/codes/batches", base_url);
    if let Some(n) = limit {
        url.push_str(&format!("?limit={}", n));
    }

    let resp = client.get(&url).send()?;
    let status = resp.status();
    let body: serde_json::Value = resp.json()?;
    if !status.is_success() {
        anyhow::bail!("Error ({}): {}", status, api_error(&body));
    }

    let rows = body.as_array().cloned().unwrap_or_default();
    if rows.is_empty() {
        println!("No batches uploaded yet.");
        return Ok(());
    }

    println!("{:20} {:8} {:>6} {:24}", "NAME", "SPEED", "CODES", "UPLOADED");
    for row in &rows {
        println!(
            "{:20} {:8} {:>6} {:24}",
            row["name"].as_str().unwrap_or("-"),
            row["speedTier"].as_str().unwrap_or("-"),
            row["codeCount"],
            row["uploadedOn"].as_str().unwrap_or("-"),
        );
    }

    Ok(())
}

/// Wipe the project. Prompts twice; there is no undo.
pub fn clear_all(client_config_path: &std::path::Path) -> Result<()> {
    if !confirm("This deletes ALL codes, history and batches. Continue?") {
        println!("Cancelled.");
        return Ok(());
    }
    if !confirm("Really delete everything?") {
        println!("Cancelled.");
        return Ok(());
    }

    let ctx = current_context(client_config_path)?;
    let (client, base_url) = build_client(&ctx)?;

    let resp = client
        .delete(format!("{}/codes/all", base_url))
        .json(&serde_json::json!({
            "confirm": true,
            "confirmAgain": true,
        }))
        .send()?;
    let status = resp.status();

    if !status.is_success() {
        let body: serde_json::Value = resp.json().unwrap_or_default();
        anyhow::bail!("Error ({}): {}", status, api_error(&body));
    }

    println!("All data cleared.");
    Ok(())
}

/// Check server health.
pub fn status(client_config_path: &std::path::Path) -> Result<()> {
    let config = ClientConfig::load(client_config_path)?;
    let ctx = config
        .current()
        .ok_or_else(|| anyhow::anyhow!("No current context."))?;

    println!("Context:   {}", ctx.name);
    println!(
        "Server:    {}",
        if ctx.server.is_empty() { "-" } else { &ctx.server }
    );

    if ctx.server.is_empty() {
        println!("Status:    no server configured");
        return Ok(());
    }

    let (client, base_url) = build_client(ctx)?;
    match client.get(format!("{}/health", base_url)).send() {
        Ok(resp) if resp.status().is_success() => {
            println!("Status:    connected");
        }
        Ok(resp) => {
            println!("Status:    error ({})", resp.status());
        }
        Err(e) => {
            println!("Status:    disconnected ({})", e);
        }
    }
    Ok(())
}
