//! Help for when the generated app itself crashes.

use serde::Serialize;

use appify_core::Notice;

/// Instruction a user can paste back into the chat to repair a runtime error.
pub fn fix_instruction(error: &str) -> String {
    format!("Fix this error: {}", error.trim())
}

/// Notices and a ready-made instruction for a crashed app.
#[derive(Debug, Clone, Serialize)]
pub struct RuntimeErrorHint {
    pub notices: Vec<Notice>,
    pub instruction: String,
}

impl RuntimeErrorHint {
    pub fn for_error(error: &str) -> Self {
        Self {
            notices: vec![
                Notice::error(format!("An error has occurred, Error details: {}", error.trim())),
                Notice::error(
                    "Please ask the bot to fix it. For instance, give it the following instruction:",
                ),
            ],
            instruction: fix_instruction(error),
        }
    }
}
