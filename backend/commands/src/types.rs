/// Slash command types.
use serde::{Deserialize, Serialize};

use appify_core::Notice;

/// Shown alongside every download offer.
pub const DOWNLOAD_HINT: &str = "Download the file by clicking on the button below.\nYou can then run it with `streamlit run streamlit_app.py`";

// ---------------------------------------------------------------------------
// Kind
// ---------------------------------------------------------------------------

/// The control commands a user can type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CommandKind {
    Undo,
    Reset,
    Save,
}

// ---------------------------------------------------------------------------
// Result
// ---------------------------------------------------------------------------

/// Outcome of classifying an instruction that starts with `/`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CommandResult {
    Unknown,
    NotUndo,
    Undo,
    Reset,
    Save,
}

impl CommandResult {
    /// The fixed message recorded in the chat log for this outcome.
    pub fn message(self) -> &'static str {
        match self {
            CommandResult::Unknown => "Unknown command",
            CommandResult::NotUndo => "Nothing to undo",
            CommandResult::Undo => "Code reverted",
            CommandResult::Reset => "Code resetted",
            CommandResult::Save => "Code saved",
        }
    }

    /// Inline feedback shown while the command runs.
    pub fn notice(self) -> Notice {
        match self {
            CommandResult::Unknown => Notice::error("Command unknown"),
            CommandResult::NotUndo => Notice::error("Nothing to undo"),
            CommandResult::Undo => Notice::info("Code reverted. Last instruction ignored by the bot."),
            CommandResult::Reset => Notice::info("Code resetted"),
            CommandResult::Save => Notice::info(DOWNLOAD_HINT),
        }
    }

    /// True for outcomes that report a user mistake rather than an action.
    pub fn is_error(self) -> bool {
        matches!(self, CommandResult::Unknown | CommandResult::NotUndo)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use appify_core::NoticeLevel;

    #[test]
    fn test_fixed_messages() {
        assert_eq!(CommandResult::Unknown.message(), "Unknown command");
        assert_eq!(CommandResult::NotUndo.message(), "Nothing to undo");
        assert_eq!(CommandResult::Undo.message(), "Code reverted");
        assert_eq!(CommandResult::Reset.message(), "Code resetted");
        assert_eq!(CommandResult::Save.message(), "Code saved");
    }

    #[test]
    fn test_error_outcomes_raise_error_notices() {
        for result in [
            CommandResult::Unknown,
            CommandResult::NotUndo,
            CommandResult::Undo,
            CommandResult::Reset,
            CommandResult::Save,
        ] {
            let expected = if result.is_error() { NoticeLevel::Error } else { NoticeLevel::Info };
            assert_eq!(result.notice().level, expected);
        }
    }
}
