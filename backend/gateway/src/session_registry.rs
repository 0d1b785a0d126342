//! Active Browser Session Registry.
//!
//! Each session sits behind its own mutex so turns within a session run one
//! at a time while different sessions proceed in parallel.

use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use uuid::Uuid;

use appify_chat::Session;
use appify_core::UserId;

pub type SharedSession = Arc<Mutex<Session>>;

#[derive(Clone, Default)]
pub struct SessionRegistry {
    sessions: Arc<RwLock<HashMap<Uuid, (UserId, SharedSession)>>>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a session and return its handle.
    pub async fn register(&self, session: Session) -> SharedSession {
        let id = session.id;
        let owner = session.user.id;
        let shared = Arc::new(Mutex::new(session));
        let mut w = self.sessions.write().await;
        w.insert(id, (owner, Arc::clone(&shared)));
        shared
    }

    /// Look up a session owned by `user`. Other users' sessions are invisible.
    pub async fn get(&self, id: &Uuid, user: UserId) -> Option<SharedSession> {
        let r = self.sessions.read().await;
        r.get(id)
            .filter(|(owner, _)| *owner == user)
            .map(|(_, session)| Arc::clone(session))
    }

    /// Drop a session owned by `user`. Returns whether it existed.
    pub async fn remove(&self, id: &Uuid, user: UserId) -> bool {
        let mut w = self.sessions.write().await;
        match w.get(id) {
            Some((owner, _)) if *owner == user => w.remove(id).is_some(),
            _ => false,
        }
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use appify_core::UserIdentity;

    #[tokio::test]
    async fn sessions_are_scoped_to_their_owner() {
        let registry = SessionRegistry::new();
        let session = Session::new(UserIdentity::new(1, "Ada"), 3);
        let id = session.id;
        registry.register(session).await;

        assert!(registry.get(&id, 1).await.is_some());
        assert!(registry.get(&id, 2).await.is_none());
        assert!(!registry.remove(&id, 2).await);
        assert!(registry.remove(&id, 1).await);
        assert_eq!(registry.len().await, 0);
    }
}
