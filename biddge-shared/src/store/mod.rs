/// Persistence layer for users and communities
///
/// Handlers never talk to a database directly; they go through the traits in
/// this module so the same routes run against PostgreSQL in production and an
/// in-memory store in tests.
///
/// # Implementations
///
/// - [`postgres::PgStore`]: PostgreSQL via a shared `sqlx` pool
/// - [`memory::MemoryStore`]: process-local maps behind one lock
///
/// # Join/leave atomicity
///
/// Joining and leaving touch two records: the user's joined list and the
/// community's counter. Both implementations apply the two writes as one
/// unit, and the list update is conditional on the current membership, so
/// concurrent double-joins resolve to one success and one
/// [`StoreError::AlreadyMember`].

pub mod memory;
pub mod postgres;

use async_trait::async_trait;

use crate::models::{community::Community, user::User};

pub use memory::MemoryStore;
pub use postgres::PgStore;

/// Store result type alias
pub type StoreResult<T> = Result<T, StoreError>;

/// Error type for store operations
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// A user with this email already exists
    #[error("Email already registered: {0}")]
    DuplicateEmail(String),

    /// A community with this id already exists
    #[error("Community id already in use: {0}")]
    DuplicateCommunity(String),

    /// The community id does not exist
    #[error("Community not found: {0}")]
    CommunityNotFound(String),

    /// The user record does not exist
    #[error("User not found: {0}")]
    UserNotFound(String),

    /// Join requested but the user is already a member
    #[error("Already joined this community")]
    AlreadyMember,

    /// Leave requested but the user is not a member
    #[error("Not a member of this community")]
    NotMember,

    /// The backing database failed or is unreachable
    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        StoreError::Unavailable(err.to_string())
    }
}

/// Collection sizes reported by the debug endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoreCounts {
    pub users: u64,
    pub communities: u64,
}

/// Result of [`CommunityStore::insert_communities_if_empty`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchInsert {
    /// The collection was empty; this many records were written
    Inserted(usize),

    /// Nothing written; the collection already held this many records
    NotEmpty(u64),
}

/// User persistence
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Inserts a new user
    ///
    /// # Errors
    ///
    /// `StoreError::DuplicateEmail` if the email is taken
    async fn insert_user(&self, user: User) -> StoreResult<User>;

    /// Looks a user up by exact email
    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>>;

    /// Number of stored users
    async fn count_users(&self) -> StoreResult<u64>;
}

/// Community persistence
#[async_trait]
pub trait CommunityStore: Send + Sync {
    /// Inserts one community
    async fn insert_community(&self, community: Community) -> StoreResult<Community>;

    /// Inserts a batch only when the collection is empty
    ///
    /// The emptiness check and the insert are one unit: of two overlapping
    /// calls on an empty store, exactly one inserts.
    async fn insert_communities_if_empty(
        &self,
        communities: Vec<Community>,
    ) -> StoreResult<BatchInsert>;

    /// Deletes every community and inserts the batch in one unit
    ///
    /// Returns how many communities were deleted.
    async fn replace_communities(&self, communities: Vec<Community>) -> StoreResult<u64>;

    /// Lists communities in insertion order, optionally capped at `limit`
    async fn list_communities(&self, limit: Option<usize>) -> StoreResult<Vec<Community>>;

    /// Lists the `limit` most recently created communities, newest first
    async fn recent_communities(&self, limit: usize) -> StoreResult<Vec<Community>>;

    /// Looks a community up by id
    async fn find_community(&self, id: &str) -> StoreResult<Option<Community>>;

    /// Number of stored communities
    async fn count_communities(&self) -> StoreResult<u64>;
}

/// Join/leave bookkeeping spanning both collections
#[async_trait]
pub trait MembershipStore: Send + Sync {
    /// Adds `community_id` to the user's list and increments the counter
    ///
    /// Returns the community's new member count.
    ///
    /// # Errors
    ///
    /// - `StoreError::CommunityNotFound` if the community is missing
    /// - `StoreError::AlreadyMember` if the id is already in the list
    async fn join_community(&self, email: &str, community_id: &str) -> StoreResult<i64>;

    /// Removes `community_id` from the user's list and decrements the counter
    ///
    /// Returns the community's new member count.
    ///
    /// # Errors
    ///
    /// - `StoreError::CommunityNotFound` if the community is missing
    /// - `StoreError::NotMember` if the id is not in the list
    async fn leave_community(&self, email: &str, community_id: &str) -> StoreResult<i64>;
}

/// Everything the API needs from persistence
#[async_trait]
pub trait Store: UserStore + CommunityStore + MembershipStore {
    /// Round-trips to the backend to confirm it is reachable
    async fn ping(&self) -> StoreResult<()>;

    /// Closes the backend connection; later calls fail with `Unavailable`
    async fn close(&self);

    /// Sizes of both collections
    async fn counts(&self) -> StoreResult<StoreCounts> {
        Ok(StoreCounts {
            users: self.count_users().await?,
            communities: self.count_communities().await?,
        })
    }
}
