use serde::{Deserialize, Serialize};

use crate::history::HistoryTurn;

/// Numeric user identity handed over by the host shell.
pub type UserId = i64;

/// The signed-in user a session belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserIdentity {
    pub id: UserId,
    pub name: String,
}

impl UserIdentity {
    pub fn new(id: UserId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }
}

/// Everything the generator needs to produce the next version of the app.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GenerationRequest {
    pub instruction: String,
    /// Oldest first, at most the model-history cap.
    pub history: Vec<HistoryTurn>,
    /// The de-indented live code, if any.
    pub code: Option<String>,
}

/// What the generator answered for one instruction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurnResult {
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub explanation: String,
    /// Set when the instruction breaks the safety rules; the code must not be applied.
    #[serde(default)]
    pub revision_request: bool,
}

impl TurnResult {
    pub fn explanation_only(explanation: impl Into<String>) -> Self {
        Self {
            code: None,
            explanation: explanation.into(),
            revision_request: false,
        }
    }

    pub fn with_code(code: impl Into<String>, explanation: impl Into<String>) -> Self {
        Self {
            code: Some(code.into()),
            explanation: explanation.into(),
            revision_request: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeLevel {
    Info,
    Warning,
    Error,
}

/// Transient feedback shown next to the chat; never stored in the display log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notice {
    pub level: NoticeLevel,
    pub text: String,
}

impl Notice {
    pub fn info(text: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Info,
            text: text.into(),
        }
    }

    pub fn warning(text: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Warning,
            text: text.into(),
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            text: text.into(),
        }
    }
}
