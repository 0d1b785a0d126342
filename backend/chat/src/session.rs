//! Per-connection chat session state.

use std::fmt;

use uuid::Uuid;

use appify_core::{MessageLog, ModelHistory, UserIdentity};

/// Everything the controller tracks for one browser session.
///
/// Only the display log, the code, and the attempt counter are written back
/// to the store; the rest lives and dies with the session.
pub struct Session {
    pub id: Uuid,
    pub user: UserIdentity,
    /// What the chat shows.
    pub messages: MessageLog,
    /// What the model sees of past turns.
    pub history: ModelHistory,
    /// Attempt counter, loaded from the store on first page load.
    pub tries: Option<u32>,
    /// De-indented code currently in the runnable file.
    pub live_code: Option<String>,
    /// Code to restore on `/undo`; cleared once used.
    pub undo_snapshot: Option<String>,
    /// User-supplied key; lifts the attempt quota.
    pub api_key: Option<String>,
    bootstrapped: bool,
}

impl Session {
    pub fn new(user: UserIdentity, history_cap: usize) -> Self {
        Self {
            id: Uuid::new_v4(),
            user,
            messages: MessageLog::new(),
            history: ModelHistory::new(history_cap),
            tries: None,
            live_code: None,
            undo_snapshot: None,
            api_key: None,
            bootstrapped: false,
        }
    }

    pub fn is_bootstrapped(&self) -> bool {
        self.bootstrapped
    }

    pub(crate) fn mark_bootstrapped(&mut self) {
        self.bootstrapped = true;
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("id", &self.id)
            .field("user", &self.user)
            .field("messages", &self.messages.len())
            .field("history", &self.history.len())
            .field("tries", &self.tries)
            .field("has_undo_snapshot", &self.undo_snapshot.is_some())
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("bootstrapped", &self.bootstrapped)
            .finish()
    }
}
