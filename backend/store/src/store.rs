use std::collections::HashMap;
use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use tokio::sync::RwLock;

use appify_core::{ChatStore, MessageLog, UserId};

#[derive(Debug, Clone, Default)]
struct UserRecord {
    code: Option<String>,
    messages: MessageLog,
    tries: u32,
}

/// Process-local store for tests and single-user runs.
#[derive(Clone, Default)]
pub struct InMemoryChatStore {
    users: Arc<RwLock<HashMap<UserId, UserRecord>>>,
}

impl InMemoryChatStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Preload the attempt counter for a user.
    pub async fn set_tries(&self, user: UserId, tries: u32) {
        self.users.write().await.entry(user).or_default().tries = tries;
    }
}

#[async_trait]
impl ChatStore for InMemoryChatStore {
    async fn get_code(&self, user: UserId) -> Result<Option<String>> {
        Ok(self.users.read().await.get(&user).and_then(|r| r.code.clone()))
    }

    async fn set_code(&self, user: UserId, code: &str) -> Result<()> {
        self.users.write().await.entry(user).or_default().code = Some(code.to_string());
        Ok(())
    }

    async fn get_message_history(&self, user: UserId) -> Result<MessageLog> {
        Ok(self
            .users
            .read()
            .await
            .get(&user)
            .map(|r| r.messages.clone())
            .unwrap_or_default())
    }

    async fn set_message_history(&self, user: UserId, log: &MessageLog) -> Result<()> {
        self.users.write().await.entry(user).or_default().messages = log.clone();
        Ok(())
    }

    async fn get_tries(&self, user: UserId) -> Result<u32> {
        Ok(self.users.read().await.get(&user).map(|r| r.tries).unwrap_or(0))
    }

    async fn increment_tries(&self, user: UserId) -> Result<u32> {
        let mut users = self.users.write().await;
        let record = users.entry(user).or_default();
        record.tries += 1;
        Ok(record.tries)
    }
}
