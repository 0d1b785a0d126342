pub mod detection;
pub mod registry;
pub mod types;

pub use detection::classify;
pub use registry::{builtin_commands, find_command, CommandDef};
pub use types::{CommandKind, CommandResult, DOWNLOAD_HINT};
