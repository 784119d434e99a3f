//! Per-user session and strategy storage.
//!
//! Both stores share one entry per user behind a per-user mutex: events
//! for the same user serialize on that lock, different users proceed
//! independently. Entries are created on first access and live for the
//! process lifetime.

use crate::models::session::BuildSession;
use crate::models::strategy::{Condition, Strategy};
use crate::transport::UserId;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};

/// Everything the engine tracks for one user.
#[derive(Debug, Default)]
pub struct UserEntry {
    pub session: Option<BuildSession>,
    pub strategy: Strategy,
}

/// Keyed store of per-user entries.
pub struct UserStore {
    users: RwLock<HashMap<UserId, Arc<Mutex<UserEntry>>>>,
}

impl UserStore {
    pub fn new() -> Self {
        Self {
            users: RwLock::new(HashMap::new()),
        }
    }

    /// Entry for `user_id`, created on first access.
    pub async fn entry(&self, user_id: UserId) -> Arc<Mutex<UserEntry>> {
        if let Some(entry) = self.users.read().await.get(&user_id) {
            return entry.clone();
        }
        let mut users = self.users.write().await;
        users.entry(user_id).or_default().clone()
    }

    /// Snapshot of the user's strategy.
    pub async fn strategy(&self, user_id: UserId) -> Strategy {
        let entry = self.entry(user_id).await;
        let guard = entry.lock().await;
        guard.strategy.clone()
    }

    /// Ordered conditions finalized so far.
    pub async fn conditions(&self, user_id: UserId) -> Vec<Condition> {
        self.strategy(user_id).await.conditions
    }
}

impl Default for UserStore {
    fn default() -> Self {
        Self::new()
    }
}
