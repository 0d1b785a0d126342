//! Appify runtime configuration schema.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::defaults::*;

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

/// Root configuration. Every field has a default, so an empty YAML file is valid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppifyConfig {
    pub bind_address: String,
    pub port: u16,
    /// SQLite file holding per-user code, chat log and attempt counter.
    pub db_path: PathBuf,
    /// The runnable app file the live preview serves.
    pub script_path: PathBuf,
    pub log_dir: PathBuf,
    pub log_level: String,
    /// Greeting language (`en` or `fr`).
    pub lang: String,
    pub max_tries: u32,
    pub history_cap: usize,
    pub generator: GeneratorConfig,
}

impl Default for AppifyConfig {
    fn default() -> Self {
        Self {
            bind_address: DEFAULT_BIND_ADDRESS.to_string(),
            port: DEFAULT_PORT,
            db_path: PathBuf::from(DEFAULT_DB_PATH),
            script_path: PathBuf::from(DEFAULT_SCRIPT_PATH),
            log_dir: PathBuf::from(DEFAULT_LOG_DIR),
            log_level: DEFAULT_LOG_LEVEL.to_string(),
            lang: DEFAULT_LANG.to_string(),
            max_tries: DEFAULT_MAX_TRIES,
            history_cap: DEFAULT_HISTORY_CAP,
            generator: GeneratorConfig::default(),
        }
    }
}

impl AppifyConfig {
    /// `host:port` for the HTTP listener.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.bind_address, self.port)
    }

    /// Copy safe to print: the API key is masked.
    pub fn redacted(&self) -> Self {
        let mut copy = self.clone();
        if copy.generator.api_key.is_some() {
            copy.generator.api_key = Some("__REDACTED__".to_string());
        }
        copy
    }
}

// ---------------------------------------------------------------------------
// Generator
// ---------------------------------------------------------------------------

/// OpenAI-compatible chat completion endpoint used for code generation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    pub base_url: String,
    pub model: String,
    /// Shared deployment key. Without it every user must bring their own.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    pub temperature: f32,
    pub max_tokens: u32,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            api_key: None,
            temperature: DEFAULT_TEMPERATURE,
            max_tokens: DEFAULT_MAX_TOKENS,
        }
    }
}
