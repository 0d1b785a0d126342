use anyhow::Result;
use async_trait::async_trait;

use crate::message::MessageLog;
use crate::types::{GenerationRequest, TurnResult, UserId};

/// Per-user system of record for code, chat history, and attempt count.
///
/// Writes are last-writer-wins; implementations do no merging.
#[async_trait]
pub trait ChatStore: Send + Sync {
    /// The persisted (8-space indented) code, if any was ever applied.
    async fn get_code(&self, user: UserId) -> Result<Option<String>>;

    async fn set_code(&self, user: UserId, code: &str) -> Result<()>;

    /// Empty when nothing has been stored for the user.
    async fn get_message_history(&self, user: UserId) -> Result<MessageLog>;

    async fn set_message_history(&self, user: UserId, log: &MessageLog) -> Result<()>;

    async fn get_tries(&self, user: UserId) -> Result<u32>;

    /// Bump the attempt counter and return the new value.
    async fn increment_tries(&self, user: UserId) -> Result<u32>;
}

/// Turns an instruction plus context into new code and an explanation.
#[async_trait]
pub trait CodeGenerator: Send + Sync {
    /// Provider name, used in logs and error reports.
    fn name(&self) -> &str;

    async fn generate(&self, request: &GenerationRequest) -> Result<TurnResult>;
}
