//! Environment variable overrides, applied after the YAML file.

use anyhow::{Context, Result};
use std::collections::HashMap;
use std::path::PathBuf;

use crate::schema::AppifyConfig;

/// Every variable consulted, in the order it is applied.
pub const OVERRIDE_VARS: &[&str] = &[
    "APPIFY_BIND",
    "APPIFY_PORT",
    "APPIFY_DB",
    "APPIFY_SCRIPT_PATH",
    "APPIFY_LANG",
    "RUST_LOG",
    "OPENAI_API_KEY",
    "OPENAI_BASE_URL",
    "APPIFY_MODEL",
];

/// Apply overrides from the process environment.
pub fn apply_env_overrides(config: AppifyConfig) -> Result<AppifyConfig> {
    apply_env_overrides_with(config, &std::env::vars().collect())
}

/// Apply overrides from a provided map (useful for testing).
///
/// Empty values are ignored.
pub fn apply_env_overrides_with(
    mut config: AppifyConfig,
    env: &HashMap<String, String>,
) -> Result<AppifyConfig> {
    let get = |name: &str| env.get(name).map(|v| v.trim()).filter(|v| !v.is_empty());

    if let Some(bind) = get("APPIFY_BIND") {
        config.bind_address = bind.to_string();
    }
    if let Some(port) = get("APPIFY_PORT") {
        config.port = port
            .parse()
            .with_context(|| format!("APPIFY_PORT is not a valid port: {port}"))?;
    }
    if let Some(db) = get("APPIFY_DB") {
        config.db_path = PathBuf::from(db);
    }
    if let Some(script) = get("APPIFY_SCRIPT_PATH") {
        config.script_path = PathBuf::from(script);
    }
    if let Some(lang) = get("APPIFY_LANG") {
        config.lang = lang.to_ascii_lowercase();
    }
    if let Some(level) = get("RUST_LOG") {
        config.log_level = level.to_string();
    }
    if let Some(key) = get("OPENAI_API_KEY") {
        config.generator.api_key = Some(key.to_string());
    }
    if let Some(url) = get("OPENAI_BASE_URL") {
        config.generator.base_url = url.trim_end_matches('/').to_string();
    }
    if let Some(model) = get("APPIFY_MODEL") {
        config.generator.model = model.to_string();
    }

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn env(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[test]
    fn overrides_fields() {
        let env = env(&[
            ("APPIFY_PORT", "9100"),
            ("APPIFY_LANG", "FR"),
            ("OPENAI_API_KEY", "sk-abc"),
            ("OPENAI_BASE_URL", "http://localhost:11434/v1/"),
        ]);
        let cfg = apply_env_overrides_with(AppifyConfig::default(), &env).unwrap();
        assert_eq!(cfg.port, 9100);
        assert_eq!(cfg.lang, "fr");
        assert_eq!(cfg.generator.api_key.as_deref(), Some("sk-abc"));
        assert_eq!(cfg.generator.base_url, "http://localhost:11434/v1");
    }

    #[test]
    fn empty_values_are_ignored() {
        let env = env(&[("APPIFY_DB", "  "), ("OPENAI_API_KEY", "")]);
        let cfg = apply_env_overrides_with(AppifyConfig::default(), &env).unwrap();
        assert_eq!(cfg, AppifyConfig::default());
    }

    #[test]
    fn bad_port_is_error() {
        let env = env(&[("APPIFY_PORT", "eighty")]);
        let err = apply_env_overrides_with(AppifyConfig::default(), &env).unwrap_err();
        assert!(err.to_string().contains("APPIFY_PORT"));
    }
}
