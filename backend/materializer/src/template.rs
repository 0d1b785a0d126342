//! Runnable app template and the sentinel block format.
//!
//! The runnable file embeds user code in a fixed Streamlit wrapper. The user
//! fragment lives between two marker lines:
//!
//! ```text
//! file     := prefix START "\n" block "\n" END suffix
//! block    := line ("\n" line)*
//! line     := INDENT source-line
//! START    := "#---start"
//! END      := "#---end"
//! INDENT   := 8 spaces
//! ```
//!
//! The fragment is indented so it sits inside `GeneratedApp.run`. The markers
//! are Python comments, so they may start at column zero without breaking the
//! enclosing block.

use std::sync::LazyLock;

use regex::Regex;

pub const START_MARKER: &str = "#---start";
pub const END_MARKER: &str = "#---end";
pub const INDENT_WIDTH: usize = 8;

/// Stored in place of code when nothing has been applied yet.
const NONE_LITERAL: &str = "None";

const CODE_SLOT: &str = "{code}";

const APP_TEMPLATE: &str = r#"# Generated by Appify. Edit through the chat, not by hand.
import streamlit as st


class GeneratedApp:
    def run(self):
#---start
{code}
#---end
        pass


if __name__ == "__main__":
    GeneratedApp().run()
"#;

static BLOCK_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"(?s){START_MARKER}\n(.*?){END_MARKER}"))
        .expect("sentinel pattern is valid")
});

/// Prefix every line with the block indent.
///
/// Splitting on `\n` keeps a trailing newline as an empty last line, which
/// also gets indented; `dedent` undoes that exactly.
pub fn indent(code: &str) -> String {
    let pad = " ".repeat(INDENT_WIDTH);
    code.split('\n')
        .map(|line| format!("{pad}{line}"))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Remove up to one block indent from the start of every line.
pub fn dedent(block: &str) -> String {
    block
        .split('\n')
        .map(strip_indent)
        .collect::<Vec<_>>()
        .join("\n")
}

fn strip_indent(line: &str) -> &str {
    let n = line
        .bytes()
        .take(INDENT_WIDTH)
        .take_while(|b| *b == b' ')
        .count();
    &line[n..]
}

/// Fill the template with an already-indented block.
pub fn render(indented: &str) -> String {
    APP_TEMPLATE.replacen(CODE_SLOT, indented, 1)
}

/// The raw indented block between the first pair of markers.
///
/// `None` when the markers are missing or the block holds the `None` literal.
pub fn extract_block(contents: &str) -> Option<&str> {
    let captured = BLOCK_RE.captures(contents)?.get(1)?.as_str();
    // The template puts END on its own line; that newline is not part of the block.
    let block = captured.strip_suffix('\n').unwrap_or(captured);
    if block == NONE_LITERAL {
        return None;
    }
    Some(block)
}

/// The de-indented user code embedded in a runnable file.
pub fn extract(contents: &str) -> Option<String> {
    extract_block(contents).map(dedent)
}
