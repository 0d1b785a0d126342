//! Default values for every config field.

pub const DEFAULT_BIND_ADDRESS: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 8501;
pub const DEFAULT_DB_PATH: &str = "appify.db";
pub const DEFAULT_SCRIPT_PATH: &str = "generated/streamlit_app.py";
pub const DEFAULT_LOG_DIR: &str = "logs";
pub const DEFAULT_LOG_LEVEL: &str = "info";
pub const DEFAULT_LANG: &str = "en";

/// Free generation turns per user before a personal API key is required.
pub const DEFAULT_MAX_TRIES: u32 = 5;

/// Past exchanges sent to the model with each instruction.
pub const DEFAULT_HISTORY_CAP: usize = 3;

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_TEMPERATURE: f32 = 0.0;
pub const DEFAULT_MAX_TOKENS: u32 = 2048;

pub const SUPPORTED_LANGS: &[&str] = &["en", "fr"];
