use crate::models::user::User;
use dashmap::DashMap;
use std::sync::Arc;

/// In-memory cache of tracker accounts, keyed by passkey.
pub struct UserCache {
    users: DashMap<[u8; 32], Arc<User>>,
}

impl UserCache {
    pub fn new() -> Self {
        Self {
            users: DashMap::new(),
        }
    }

    /// Insert a user, replacing any existing entry with the same passkey.
    pub fn add_user(&self, user: User) {
        self.users.insert(user.passkey, Arc::new(user));
    }

    pub fn remove_user(&self, passkey: [u8; 32]) -> Option<Arc<User>> {
        self.users.remove(&passkey).map(|(_, user)| user)
    }

    pub fn get_user(&self, passkey: [u8; 32]) -> Option<Arc<User>> {
        self.users
            .get(&passkey)
            .map(|entry| Arc::clone(entry.value()))
    }

    /// Snapshot of every cached user, used for WAL compaction.
    pub fn all_users(&self) -> Vec<Arc<User>> {
        self.users
            .iter()
            .map(|entry| Arc::clone(entry.value()))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}

impl Default for UserCache {
    fn default() -> Self {
        Self::new()
    }
}
