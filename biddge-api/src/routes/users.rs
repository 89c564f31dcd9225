/// User endpoints
///
/// - `GET /api/users/me` - Profile of the authenticated caller

use axum::{Extension, Json};
use biddge_shared::{auth::middleware::CurrentUser, models::user::User};
use serde::{Deserialize, Serialize};

/// Public view of a user; never includes the password hash
#[derive(Debug, Serialize, Deserialize)]
pub struct UserProfile {
    pub name: String,
    pub email: String,
    pub is_creator: bool,
    pub joined_communities: Vec<String>,
}

impl From<User> for UserProfile {
    fn from(user: User) -> Self {
        Self {
            name: user.name,
            email: user.email,
            is_creator: user.is_creator,
            joined_communities: user.joined_communities,
        }
    }
}

/// Returns the caller's profile as loaded by the auth layer
pub async fn me(Extension(CurrentUser(user)): Extension<CurrentUser>) -> Json<UserProfile> {
    Json(user.into())
}
