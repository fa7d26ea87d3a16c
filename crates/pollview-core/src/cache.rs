use dashmap::DashMap;
use pollview_models::{User, UserId};
use std::sync::Arc;

/// Shared user store resolving voter ids to displayable users.
///
/// Voter pages carry the user objects for the ids they reference; a page is
/// fed through [`PeerCache::process_users`] before its voter ids are
/// resolved. Ids without a cached user are skipped by callers.
#[derive(Default)]
pub struct PeerCache {
    users: DashMap<UserId, Arc<User>>,
}

impl PeerCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Upserts every user into the cache.
    pub fn process_users<I>(&self, users: I)
    where
        I: IntoIterator<Item = User>,
    {
        for user in users {
            self.users.insert(user.id, Arc::new(user));
        }
    }

    pub fn user(&self, id: UserId) -> Option<Arc<User>> {
        self.users.get(&id).map(|entry| Arc::clone(entry.value()))
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}
