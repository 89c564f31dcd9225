/// In-memory store implementation
///
/// Keeps both collections behind a single `RwLock`, so join/leave are atomic
/// across the user list and the counter. Used by the API tests and for
/// running the server without a database.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{BatchInsert, CommunityStore, MembershipStore, Store, StoreError, StoreResult, UserStore};
use crate::models::{community::Community, user::User};

#[derive(Debug, Default)]
struct Collections {
    users: HashMap<String, User>,
    /// Insertion order is the listing order
    communities: Vec<Community>,
}

impl Collections {
    fn community_mut(&mut self, id: &str) -> Option<&mut Community> {
        self.communities.iter_mut().find(|c| c.id == id)
    }
}

/// In-memory implementation of [`Store`]
#[derive(Debug)]
pub struct MemoryStore {
    collections: RwLock<Collections>,
    available: AtomicBool,
}

impl MemoryStore {
    /// Create a new empty store
    pub fn new() -> Self {
        Self {
            collections: RwLock::new(Collections::default()),
            available: AtomicBool::new(true),
        }
    }

    /// Simulates the backend going away (or coming back)
    ///
    /// While unavailable every operation fails with
    /// [`StoreError::Unavailable`].
    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    fn check_available(&self) -> StoreResult<()> {
        if self.available.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(StoreError::Unavailable("in-memory store is offline".to_string()))
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn insert_user(&self, user: User) -> StoreResult<User> {
        self.check_available()?;
        let mut collections = self.collections.write().await;

        if collections.users.contains_key(&user.email) {
            return Err(StoreError::DuplicateEmail(user.email));
        }

        collections.users.insert(user.email.clone(), user.clone());
        Ok(user)
    }

    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        self.check_available()?;
        let collections = self.collections.read().await;
        Ok(collections.users.get(email).cloned())
    }

    async fn count_users(&self) -> StoreResult<u64> {
        self.check_available()?;
        Ok(self.collections.read().await.users.len() as u64)
    }
}

#[async_trait]
impl CommunityStore for MemoryStore {
    async fn insert_community(&self, community: Community) -> StoreResult<Community> {
        self.check_available()?;
        let mut collections = self.collections.write().await;

        if collections.communities.iter().any(|c| c.id == community.id) {
            return Err(StoreError::DuplicateCommunity(community.id));
        }

        collections.communities.push(community.clone());
        Ok(community)
    }

    async fn insert_communities_if_empty(
        &self,
        communities: Vec<Community>,
    ) -> StoreResult<BatchInsert> {
        self.check_available()?;
        let mut collections = self.collections.write().await;

        if !collections.communities.is_empty() {
            return Ok(BatchInsert::NotEmpty(collections.communities.len() as u64));
        }

        let count = communities.len();
        collections.communities.extend(communities);
        Ok(BatchInsert::Inserted(count))
    }

    async fn replace_communities(&self, communities: Vec<Community>) -> StoreResult<u64> {
        self.check_available()?;
        let mut collections = self.collections.write().await;
        let deleted = collections.communities.len() as u64;
        collections.communities = communities;
        Ok(deleted)
    }

    async fn list_communities(&self, limit: Option<usize>) -> StoreResult<Vec<Community>> {
        self.check_available()?;
        let collections = self.collections.read().await;
        let limit = limit.unwrap_or(usize::MAX);
        Ok(collections.communities.iter().take(limit).cloned().collect())
    }

    async fn recent_communities(&self, limit: usize) -> StoreResult<Vec<Community>> {
        self.check_available()?;
        let collections = self.collections.read().await;

        // Newest first; later insertions win ties
        let mut recent: Vec<Community> = collections.communities.iter().rev().cloned().collect();
        recent.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        recent.truncate(limit);
        Ok(recent)
    }

    async fn find_community(&self, id: &str) -> StoreResult<Option<Community>> {
        self.check_available()?;
        let collections = self.collections.read().await;
        Ok(collections.communities.iter().find(|c| c.id == id).cloned())
    }

    async fn count_communities(&self) -> StoreResult<u64> {
        self.check_available()?;
        Ok(self.collections.read().await.communities.len() as u64)
    }

}

#[async_trait]
impl MembershipStore for MemoryStore {
    async fn join_community(&self, email: &str, community_id: &str) -> StoreResult<i64> {
        self.check_available()?;
        let mut collections = self.collections.write().await;

        if collections.community_mut(community_id).is_none() {
            return Err(StoreError::CommunityNotFound(community_id.to_string()));
        }

        let user = collections
            .users
            .get_mut(email)
            .ok_or_else(|| StoreError::UserNotFound(email.to_string()))?;
        if user.has_joined(community_id) {
            return Err(StoreError::AlreadyMember);
        }
        user.joined_communities.push(community_id.to_string());

        let community = collections
            .community_mut(community_id)
            .ok_or_else(|| StoreError::CommunityNotFound(community_id.to_string()))?;
        community.member_count += 1;
        Ok(community.member_count)
    }

    async fn leave_community(&self, email: &str, community_id: &str) -> StoreResult<i64> {
        self.check_available()?;
        let mut collections = self.collections.write().await;

        if collections.community_mut(community_id).is_none() {
            return Err(StoreError::CommunityNotFound(community_id.to_string()));
        }

        let user = collections
            .users
            .get_mut(email)
            .ok_or_else(|| StoreError::UserNotFound(email.to_string()))?;
        if !user.has_joined(community_id) {
            return Err(StoreError::NotMember);
        }
        user.joined_communities.retain(|id| id != community_id);

        let community = collections
            .community_mut(community_id)
            .ok_or_else(|| StoreError::CommunityNotFound(community_id.to_string()))?;
        community.member_count = (community.member_count - 1).max(0);
        Ok(community.member_count)
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn ping(&self) -> StoreResult<()> {
        self.check_available()
    }

    async fn close(&self) {
        self.set_available(false);
    }
}
