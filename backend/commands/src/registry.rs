/// Built-in slash command table.
use serde::Serialize;

use crate::types::CommandKind;

/// A slash command the chat understands.
#[derive(Debug, Clone, Serialize)]
pub struct CommandDef {
    pub kind: CommandKind,
    /// Prefix that selects the command (must start with '/').
    pub alias: &'static str,
    pub description: &'static str,
}

const BUILTIN: &[CommandDef] = &[
    CommandDef {
        kind: CommandKind::Undo,
        alias: "/undo",
        description: "Revert the code to what it was before the last change.",
    },
    CommandDef {
        kind: CommandKind::Reset,
        alias: "/reset",
        description: "Clear the conversation and start from an empty sandbox.",
    },
    CommandDef {
        kind: CommandKind::Save,
        alias: "/save",
        description: "Download the current app as streamlit_app.py.",
    },
];

/// All built-in commands, in the order they are listed to users.
pub fn builtin_commands() -> &'static [CommandDef] {
    BUILTIN
}

/// The command whose alias prefixes `text`, if any.
///
/// Matching is by prefix, so `/undo please` and `/undone` both select `/undo`.
pub fn find_command(text: &str) -> Option<&'static CommandDef> {
    BUILTIN.iter().find(|def| text.starts_with(def.alias))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_aliases_start_with_slash() {
        assert!(builtin_commands().iter().all(|c| c.alias.starts_with('/')));
    }

    #[test]
    fn test_find_by_prefix() {
        assert_eq!(find_command("/save now").unwrap().kind, CommandKind::Save);
        assert_eq!(find_command("/resetting").unwrap().kind, CommandKind::Reset);
        assert!(find_command("/help").is_none());
        assert!(find_command("save").is_none());
    }
}
