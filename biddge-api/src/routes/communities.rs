/// Community endpoints
///
/// # Endpoints
///
/// - `GET /api/communities` - List all communities
/// - `GET /api/communities/featured` - Up to six newest communities
/// - `POST /api/communities` - Create a community (creators only)
/// - `GET /api/communities/:id` - Get one community
/// - `POST /api/communities/:id/join` - Join
/// - `POST /api/communities/:id/leave` - Leave

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    extract::ValidatedJson,
};
use axum::{
    extract::{Path, State},
    Extension, Json,
};
use biddge_shared::{
    auth::middleware::CurrentUser,
    models::community::{Community, CreateCommunity},
};
use serde::{Deserialize, Serialize};
use tracing::{error, info};
use validator::Validate;

/// Most communities the featured list returns
pub const FEATURED_LIMIT: usize = 6;

/// Create community request
#[derive(Debug, Deserialize, Validate)]
pub struct CreateCommunityRequest {
    #[validate(length(min = 1, message = "Name is required"))]
    pub name: String,

    pub description: String,

    pub category: String,

    #[serde(default)]
    pub image_url: Option<String>,
}

/// Acknowledgement for join/leave
#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

/// Lists every community in insertion order
///
/// # Errors
///
/// - `500 Internal Server Error`: Store failure
pub async fn list_communities(State(state): State<AppState>) -> ApiResult<Json<Vec<Community>>> {
    let communities = state.store.list_communities(None).await?;
    Ok(Json(communities))
}

/// Lists the most recently created communities
///
/// Never fails: a store error is logged and an empty list returned.
pub async fn featured_communities(State(state): State<AppState>) -> Json<Vec<Community>> {
    match state.store.recent_communities(FEATURED_LIMIT).await {
        Ok(communities) => Json(communities),
        Err(e) => {
            error!(error = %e, "Failed to load featured communities");
            Json(Vec::new())
        }
    }
}

/// Creates a community owned by the caller
///
/// # Endpoint
///
/// ```text
/// POST /api/communities
/// Authorization: Bearer eyJ...
/// Content-Type: application/json
///
/// {
///   "name": "Rustaceans",
///   "description": "Systems programmers",
///   "category": "Tech",
///   "image_url": null
/// }
/// ```
///
/// # Errors
///
/// - `401 Unauthorized`: Missing or invalid token
/// - `403 Forbidden`: Caller is not a creator
/// - `422 Unprocessable Entity`: Malformed body
pub async fn create_community(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    ValidatedJson(req): ValidatedJson<CreateCommunityRequest>,
) -> ApiResult<Json<Community>> {
    if !user.is_creator {
        return Err(ApiError::Forbidden(
            "Only creators can create communities".to_string(),
        ));
    }

    let community = Community::new(
        CreateCommunity {
            name: req.name,
            description: req.description,
            category: req.category,
            image_url: req.image_url,
        },
        &user,
    );

    let community = state.store.insert_community(community).await?;

    info!(
        community_id = %community.id,
        creator = %user.email,
        "Community created"
    );

    Ok(Json(community))
}

/// Gets one community by id
///
/// # Errors
///
/// - `404 Not Found`: No community with that id
pub async fn get_community(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Community>> {
    state
        .store
        .find_community(&id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound("Community not found".to_string()))
}

/// Adds the caller to a community
///
/// # Errors
///
/// - `404 Not Found`: No community with that id
/// - `409 Conflict`: Already a member
pub async fn join_community(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(id): Path<String>,
) -> ApiResult<Json<MessageResponse>> {
    let member_count = state.store.join_community(&user.email, &id).await?;

    info!(community_id = %id, email = %user.email, member_count, "Joined community");

    Ok(Json(MessageResponse {
        message: "Successfully joined community".to_string(),
    }))
}

/// Removes the caller from a community
///
/// # Errors
///
/// - `404 Not Found`: No community with that id
/// - `409 Conflict`: Not a member
pub async fn leave_community(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(id): Path<String>,
) -> ApiResult<Json<MessageResponse>> {
    let member_count = state.store.leave_community(&user.email, &id).await?;

    info!(community_id = %id, email = %user.email, member_count, "Left community");

    Ok(Json(MessageResponse {
        message: "Successfully left community".to_string(),
    }))
}
