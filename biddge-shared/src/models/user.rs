/// User model
///
/// A user is keyed by email (case-sensitive) and carries the list of
/// community ids it has joined.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE users (
///     email TEXT PRIMARY KEY,
///     name TEXT NOT NULL,
///     password_hash TEXT NOT NULL,
///     is_creator BOOLEAN NOT NULL DEFAULT FALSE,
///     joined_communities TEXT[] NOT NULL DEFAULT '{}',
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// User model representing a user account
///
/// Passwords are stored as Argon2id hashes, never in plaintext.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    /// Email address, unique across all users
    pub email: String,

    /// Display name
    pub name: String,

    /// Argon2id password hash
    pub password_hash: String,

    /// Whether this user may create communities
    pub is_creator: bool,

    /// Ids of the communities this user has joined
    pub joined_communities: Vec<String>,

    /// When the user account was created
    pub created_at: DateTime<Utc>,
}

/// Input for creating a new user
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateUser {
    /// Display name
    pub name: String,

    /// Email address
    pub email: String,

    /// Argon2id password hash (NOT plaintext password!)
    pub password_hash: String,

    /// Creator role flag
    pub is_creator: bool,
}

impl User {
    /// Builds a fresh user record with no joined communities
    pub fn new(data: CreateUser) -> Self {
        Self {
            email: data.email,
            name: data.name,
            password_hash: data.password_hash,
            is_creator: data.is_creator,
            joined_communities: Vec::new(),
            created_at: Utc::now(),
        }
    }

    /// Whether the user has joined the given community
    pub fn has_joined(&self, community_id: &str) -> bool {
        self.joined_communities.iter().any(|id| id == community_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_user() -> CreateUser {
        CreateUser {
            name: "Ada".to_string(),
            email: "ada@example.com".to_string(),
            password_hash: "$argon2id$...".to_string(),
            is_creator: true,
        }
    }

    #[test]
    fn test_new_user_has_no_communities() {
        let user = User::new(create_user());

        assert_eq!(user.email, "ada@example.com");
        assert!(user.is_creator);
        assert!(user.joined_communities.is_empty());
    }

    #[test]
    fn test_has_joined() {
        let mut user = User::new(create_user());
        user.joined_communities.push("c-1".to_string());

        assert!(user.has_joined("c-1"));
        assert!(!user.has_joined("c-2"));
    }
}
