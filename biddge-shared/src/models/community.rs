/// Community model
///
/// Communities are created by users with the creator flag, or in bulk by the
/// seed routine. The `member_count` column is a counter moved by join and
/// leave; it is not recomputed from the users' joined lists.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE communities (
///     id TEXT PRIMARY KEY,
///     name TEXT NOT NULL,
///     description TEXT NOT NULL,
///     category TEXT NOT NULL,
///     creator_id TEXT NOT NULL,
///     creator_name TEXT NOT NULL,
///     member_count BIGINT NOT NULL DEFAULT 0,
///     image_url TEXT,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::user::User;

/// Community record as stored and as returned by the API
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Community {
    /// Opaque unique id (UUID v4 text), immutable
    pub id: String,

    /// Display name
    pub name: String,

    /// Free-text description
    pub description: String,

    /// Free-text category
    pub category: String,

    /// Email of the creating user, or [`crate::seed::SYSTEM_CREATOR_ID`] for seeded records
    pub creator_id: String,

    /// Display name of the creator
    pub creator_name: String,

    /// Join/leave counter
    pub member_count: i64,

    /// Optional cover image
    pub image_url: Option<String>,

    /// When the community was created
    pub created_at: DateTime<Utc>,
}

/// Input for creating a community
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateCommunity {
    pub name: String,
    pub description: String,
    pub category: String,
    pub image_url: Option<String>,
}

impl Community {
    /// Builds a new community owned by `creator` with no members
    pub fn new(data: CreateCommunity, creator: &User) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name: data.name,
            description: data.description,
            category: data.category,
            creator_id: creator.email.clone(),
            creator_name: creator.name.clone(),
            member_count: 0,
            image_url: data.image_url,
            created_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::user::CreateUser;

    #[test]
    fn test_new_community() {
        let creator = User::new(CreateUser {
            name: "Ada".to_string(),
            email: "ada@example.com".to_string(),
            password_hash: "hash".to_string(),
            is_creator: true,
        });

        let community = Community::new(
            CreateCommunity {
                name: "Rustaceans".to_string(),
                description: "Crabs".to_string(),
                category: "Tech".to_string(),
                image_url: None,
            },
            &creator,
        );

        assert_eq!(community.creator_id, "ada@example.com");
        assert_eq!(community.creator_name, "Ada");
        assert_eq!(community.member_count, 0);
        assert!(Uuid::parse_str(&community.id).is_ok());
    }

    #[test]
    fn test_serialized_shape() {
        let community = Community {
            id: "c-1".to_string(),
            name: "X".to_string(),
            description: "d".to_string(),
            category: "c".to_string(),
            creator_id: "ada@example.com".to_string(),
            creator_name: "Ada".to_string(),
            member_count: 3,
            image_url: None,
            created_at: Utc::now(),
        };

        let json = serde_json::to_value(&community).unwrap();
        let object = json.as_object().unwrap();

        assert_eq!(object.len(), 9);
        assert!(object["image_url"].is_null());
        assert_eq!(object["member_count"], 3);
        assert!(object["created_at"].is_string());
    }
}
