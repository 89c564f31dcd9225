/// PostgreSQL store implementation
///
/// Both collections live in one database (see `migrations/`). Join and leave
/// run inside a transaction so the user's list and the community counter
/// always move together.

use async_trait::async_trait;
use sqlx::{PgPool, Postgres, Transaction};
use tracing::debug;

use super::{BatchInsert, CommunityStore, MembershipStore, Store, StoreError, StoreResult, UserStore};
use crate::db::pool::{close_pool, health_check};
use crate::models::{community::Community, user::User};

const COMMUNITY_COLUMNS: &str = "id, name, description, category, creator_id, creator_name, \
                                 member_count, image_url, created_at";

/// PostgreSQL implementation of [`Store`]
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    /// Wraps an existing pool (see [`crate::db::pool::create_pool`])
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Blocks concurrent writers to `communities` until the transaction ends
    ///
    /// Readers are not blocked.
    async fn lock_communities(tx: &mut Transaction<'_, Postgres>) -> StoreResult<()> {
        sqlx::query("LOCK TABLE communities IN EXCLUSIVE MODE")
            .execute(&mut **tx)
            .await?;
        Ok(())
    }

    async fn insert_batch(
        tx: &mut Transaction<'_, Postgres>,
        communities: Vec<Community>,
    ) -> StoreResult<usize> {
        let count = communities.len();

        for community in communities {
            sqlx::query(
                r#"
                INSERT INTO communities (id, name, description, category, creator_id, creator_name,
                                         member_count, image_url, created_at)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
                "#,
            )
            .bind(community.id)
            .bind(community.name)
            .bind(community.description)
            .bind(community.category)
            .bind(community.creator_id)
            .bind(community.creator_name)
            .bind(community.member_count)
            .bind(community.image_url)
            .bind(community.created_at)
            .execute(&mut **tx)
            .await?;
        }

        Ok(count)
    }

    async fn user_exists<'e, E>(executor: E, email: &str) -> StoreResult<bool>
    where
        E: sqlx::PgExecutor<'e>,
    {
        let exists: bool = sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM users WHERE email = $1)")
            .bind(email)
            .fetch_one(executor)
            .await?;
        Ok(exists)
    }
}

#[async_trait]
impl UserStore for PgStore {
    async fn insert_user(&self, user: User) -> StoreResult<User> {
        let result = sqlx::query(
            r#"
            INSERT INTO users (email, name, password_hash, is_creator, joined_communities, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (email) DO NOTHING
            "#,
        )
        .bind(&user.email)
        .bind(&user.name)
        .bind(&user.password_hash)
        .bind(user.is_creator)
        .bind(&user.joined_communities)
        .bind(user.created_at)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::DuplicateEmail(user.email));
        }

        Ok(user)
    }

    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT email, name, password_hash, is_creator, joined_communities, created_at
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn count_users(&self) -> StoreResult<u64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await?;
        Ok(count.max(0) as u64)
    }
}

#[async_trait]
impl CommunityStore for PgStore {
    async fn insert_community(&self, community: Community) -> StoreResult<Community> {
        let result = sqlx::query(
            r#"
            INSERT INTO communities (id, name, description, category, creator_id, creator_name,
                                     member_count, image_url, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            ON CONFLICT (id) DO NOTHING
            "#,
        )
        .bind(&community.id)
        .bind(&community.name)
        .bind(&community.description)
        .bind(&community.category)
        .bind(&community.creator_id)
        .bind(&community.creator_name)
        .bind(community.member_count)
        .bind(&community.image_url)
        .bind(community.created_at)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::DuplicateCommunity(community.id));
        }

        Ok(community)
    }

    async fn insert_communities_if_empty(
        &self,
        communities: Vec<Community>,
    ) -> StoreResult<BatchInsert> {
        let mut tx = self.pool.begin().await?;
        Self::lock_communities(&mut tx).await?;

        let existing: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM communities")
            .fetch_one(&mut *tx)
            .await?;
        if existing > 0 {
            return Ok(BatchInsert::NotEmpty(existing as u64));
        }

        let count = Self::insert_batch(&mut tx, communities).await?;
        tx.commit().await?;
        Ok(BatchInsert::Inserted(count))
    }

    async fn replace_communities(&self, communities: Vec<Community>) -> StoreResult<u64> {
        let mut tx = self.pool.begin().await?;
        Self::lock_communities(&mut tx).await?;

        let deleted = sqlx::query("DELETE FROM communities")
            .execute(&mut *tx)
            .await?
            .rows_affected();
        Self::insert_batch(&mut tx, communities).await?;

        tx.commit().await?;
        Ok(deleted)
    }

    async fn list_communities(&self, limit: Option<usize>) -> StoreResult<Vec<Community>> {
        // LIMIT NULL means no limit
        let limit = limit.map(|l| l as i64);
        let communities = sqlx::query_as::<_, Community>(&format!(
            "SELECT {COMMUNITY_COLUMNS} FROM communities ORDER BY seq ASC LIMIT $1"
        ))
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(communities)
    }

    async fn recent_communities(&self, limit: usize) -> StoreResult<Vec<Community>> {
        let communities = sqlx::query_as::<_, Community>(&format!(
            "SELECT {COMMUNITY_COLUMNS} FROM communities ORDER BY created_at DESC, seq DESC LIMIT $1"
        ))
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await?;

        Ok(communities)
    }

    async fn find_community(&self, id: &str) -> StoreResult<Option<Community>> {
        let community = sqlx::query_as::<_, Community>(&format!(
            "SELECT {COMMUNITY_COLUMNS} FROM communities WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(community)
    }

    async fn count_communities(&self) -> StoreResult<u64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM communities")
            .fetch_one(&self.pool)
            .await?;
        Ok(count.max(0) as u64)
    }

}

#[async_trait]
impl MembershipStore for PgStore {
    async fn join_community(&self, email: &str, community_id: &str) -> StoreResult<i64> {
        let mut tx = self.pool.begin().await?;

        let member_count: Option<i64> = sqlx::query_scalar(
            "UPDATE communities SET member_count = member_count + 1 WHERE id = $1 RETURNING member_count",
        )
        .bind(community_id)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(member_count) = member_count else {
            return Err(StoreError::CommunityNotFound(community_id.to_string()));
        };

        let updated = sqlx::query(
            r#"
            UPDATE users
            SET joined_communities = array_append(joined_communities, $2)
            WHERE email = $1 AND NOT ($2 = ANY(joined_communities))
            "#,
        )
        .bind(email)
        .bind(community_id)
        .execute(&mut *tx)
        .await?;

        // Dropping `tx` rolls the counter back
        if updated.rows_affected() == 0 {
            if Self::user_exists(&mut *tx, email).await? {
                return Err(StoreError::AlreadyMember);
            }
            return Err(StoreError::UserNotFound(email.to_string()));
        }

        tx.commit().await?;
        debug!(email, community_id, member_count, "Joined community");
        Ok(member_count)
    }

    async fn leave_community(&self, email: &str, community_id: &str) -> StoreResult<i64> {
        let mut tx = self.pool.begin().await?;

        let member_count: Option<i64> = sqlx::query_scalar(
            "UPDATE communities SET member_count = GREATEST(member_count - 1, 0) WHERE id = $1 RETURNING member_count",
        )
        .bind(community_id)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(member_count) = member_count else {
            return Err(StoreError::CommunityNotFound(community_id.to_string()));
        };

        let updated = sqlx::query(
            r#"
            UPDATE users
            SET joined_communities = array_remove(joined_communities, $2)
            WHERE email = $1 AND $2 = ANY(joined_communities)
            "#,
        )
        .bind(email)
        .bind(community_id)
        .execute(&mut *tx)
        .await?;

        if updated.rows_affected() == 0 {
            if Self::user_exists(&mut *tx, email).await? {
                return Err(StoreError::NotMember);
            }
            return Err(StoreError::UserNotFound(email.to_string()));
        }

        tx.commit().await?;
        debug!(email, community_id, member_count, "Left community");
        Ok(member_count)
    }
}

#[async_trait]
impl Store for PgStore {
    async fn ping(&self) -> StoreResult<()> {
        health_check(&self.pool).await.map_err(StoreError::from)
    }

    async fn close(&self) {
        close_pool(&self.pool).await;
    }
}
