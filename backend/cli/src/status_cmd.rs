//! CLI Status Command
//!
//! Prints the effective config (key masked), validation findings, and the
//! health of a running server.

use std::path::Path;

use anyhow::Result;

use appify_config::{apply_env_overrides, load_config, validate, OVERRIDE_VARS};

pub async fn run(config_path: &Path) -> Result<()> {
    let config = apply_env_overrides(load_config(config_path).await?)?;

    println!("\nAppify status\n");
    println!("Config file: {}", config_path.display());
    println!("{}", serde_yaml::to_string(&config.redacted())?);

    let active: Vec<&str> = OVERRIDE_VARS
        .iter()
        .copied()
        .filter(|var| std::env::var_os(var).is_some())
        .collect();
    if !active.is_empty() {
        println!("Environment overrides: {}", active.join(", "));
    }

    let report = validate(&config);
    for error in &report.errors {
        println!("  error: {error}");
    }
    for warning in &report.warnings {
        println!("  warning: {}: {}", warning.path, warning.message);
    }

    let url = format!("http://localhost:{}/api/health", config.port);
    match reqwest::get(&url).await {
        Ok(resp) => {
            let body: serde_json::Value = resp.json().await?;
            println!("Server: {}", serde_json::to_string_pretty(&body)?);
        }
        Err(_) => println!("Server: not running on port {}", config.port),
    }

    Ok(())
}
