/// Slash command detection: decide whether an instruction is a control command.
use tracing::debug;

use crate::registry::find_command;
use crate::types::{CommandKind, CommandResult};

/// Classify a raw instruction.
///
/// Returns `None` for anything that does not start with `/`; such text is a
/// generation request. `has_undo_snapshot` tells whether the session holds
/// code to revert to, which decides between `Undo` and `NotUndo`.
pub fn classify(instruction: &str, has_undo_snapshot: bool) -> Option<CommandResult> {
    if !instruction.starts_with('/') {
        return None;
    }

    let result = match find_command(instruction).map(|def| def.kind) {
        Some(CommandKind::Undo) if has_undo_snapshot => CommandResult::Undo,
        Some(CommandKind::Undo) => CommandResult::NotUndo,
        Some(CommandKind::Reset) => CommandResult::Reset,
        Some(CommandKind::Save) => CommandResult::Save,
        None => CommandResult::Unknown,
    };
    debug!(?result, "[Commands] Classified instruction");
    Some(result)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_undo_depends_on_snapshot() {
        assert_eq!(classify("/undo", false), Some(CommandResult::NotUndo));
        assert_eq!(classify("/undo", true), Some(CommandResult::Undo));
    }

    #[test]
    fn test_known_commands() {
        assert_eq!(classify("/reset", false), Some(CommandResult::Reset));
        assert_eq!(classify("/save", true), Some(CommandResult::Save));
        assert_eq!(classify("/save please", false), Some(CommandResult::Save));
    }

    #[test]
    fn test_other_slash_is_unknown() {
        assert_eq!(classify("/", false), Some(CommandResult::Unknown));
        assert_eq!(classify("/help", true), Some(CommandResult::Unknown));
        assert_eq!(classify("/UNDO", true), Some(CommandResult::Unknown));
    }

    #[test]
    fn test_plain_text_is_not_a_command() {
        for text in ["add a title", "", " /undo", "please /reset", "undo"] {
            assert_eq!(classify(text, true), None, "{text:?}");
        }
    }
}
