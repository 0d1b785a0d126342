//! Appify conversation controller
//!
//! Owns the per-session chat state and runs the turn protocol: attempt gate,
//! bootstrap, command handling, and code generation.

pub mod controller;
pub mod fix;
pub mod locale;
pub mod report;
pub mod session;

pub use controller::{ChatSettings, ConversationController};
pub use fix::{fix_instruction, RuntimeErrorHint};
pub use locale::{Locale, PLACEHOLDER_CODE};
pub use report::{Download, PageView, TurnReport};
pub use session::Session;
