pub mod error;
pub mod history;
pub mod message;
pub mod traits;
pub mod types;

pub use error::AppifyError;
pub use history::{HistoryTurn, ModelHistory, DEFAULT_HISTORY_CAP};
pub use message::{ChatRole, LogEntry, MessageLog};
pub use traits::{ChatStore, CodeGenerator};
pub use types::{GenerationRequest, Notice, NoticeLevel, TurnResult, UserId, UserIdentity};
