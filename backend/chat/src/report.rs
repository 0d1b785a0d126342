use serde::Serialize;

use appify_core::{LogEntry, Notice};

pub const DOWNLOAD_FILE_NAME: &str = "streamlit_app.py";
pub const DOWNLOAD_MIME: &str = "text/x-python";

/// The app offered for download.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Download {
    pub file_name: String,
    pub mime: String,
    pub content: String,
}

impl Download {
    pub fn python_app(content: impl Into<String>) -> Self {
        Self {
            file_name: DOWNLOAD_FILE_NAME.to_string(),
            mime: DOWNLOAD_MIME.to_string(),
            content: content.into(),
        }
    }
}

/// What a user sees after submitting one instruction.
#[derive(Debug, Clone, Default, Serialize)]
pub struct TurnReport {
    /// Assistant message appended to the display log, if any.
    pub message: Option<String>,
    pub notices: Vec<Notice>,
    pub download: Option<Download>,
    /// Free attempts left; `None` when the user supplied an API key.
    pub tries_left: Option<u32>,
    /// Progress text shown while generation runs.
    pub progress: Option<String>,
}

/// What a page load shows.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "view", rename_all = "snake_case")]
pub enum PageView {
    Chat { messages: Vec<LogEntry> },
    /// Free attempts are used up: ask for a key, offer only the download.
    QuotaExceeded {
        notices: Vec<Notice>,
        download: Option<Download>,
    },
}
