/// Authentication endpoints
///
/// Argon2 hashing and verification run on the blocking pool, so a slow
/// login never holds up other requests.
///
/// # Endpoints
///
/// - `POST /api/auth/register` - Register new user
/// - `POST /api/auth/login` - Login and get a token

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    extract::ValidatedJson,
};
use axum::{extract::State, Json};
use biddge_shared::{
    auth::{jwt, password},
    models::user::{CreateUser, User},
};
use serde::{Deserialize, Serialize};
use tokio::task;
use tracing::info;
use validator::Validate;

/// Register request
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    /// Display name
    pub name: String,

    /// Email address
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    /// Password
    pub password: String,

    /// Whether the user may create communities
    #[serde(default)]
    pub is_creator: bool,
}

/// Login request
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    /// Email address
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    /// Password
    pub password: String,
}

/// Response for both register and login
#[derive(Debug, Serialize, Deserialize)]
pub struct AuthResponse {
    pub name: String,
    pub email: String,
    pub is_creator: bool,
    pub joined_communities: Vec<String>,

    /// Bearer token, valid for seven days
    pub token: String,
}

impl AuthResponse {
    fn new(user: User, token: String) -> Self {
        Self {
            name: user.name,
            email: user.email,
            is_creator: user.is_creator,
            joined_communities: user.joined_communities,
            token,
        }
    }
}

/// Register a new user
///
/// # Endpoint
///
/// ```text
/// POST /api/auth/register
/// Content-Type: application/json
///
/// {
///   "name": "Ada",
///   "email": "ada@example.com",
///   "password": "hunter22",
///   "is_creator": true
/// }
/// ```
///
/// # Response
///
/// ```json
/// {
///   "name": "Ada",
///   "email": "ada@example.com",
///   "is_creator": true,
///   "joined_communities": [],
///   "token": "eyJ..."
/// }
/// ```
///
/// # Errors
///
/// - `400 Bad Request`: Email already registered
/// - `422 Unprocessable Entity`: Malformed body or email
pub async fn register(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<RegisterRequest>,
) -> ApiResult<Json<AuthResponse>> {
    if state.store.find_user_by_email(&req.email).await?.is_some() {
        return Err(ApiError::BadRequest("Email already registered".to_string()));
    }

    let plaintext = req.password;
    let password_hash =
        task::spawn_blocking(move || password::hash_password(&plaintext)).await??;

    // A concurrent registration can still win the race; the store reports
    // that as DuplicateEmail, which maps to the same 400.
    let user = state
        .store
        .insert_user(User::new(CreateUser {
            name: req.name,
            email: req.email,
            password_hash,
            is_creator: req.is_creator,
        }))
        .await?;

    let token = jwt::issue_token(&user.email, state.jwt_secret())?;

    info!(email = %user.email, is_creator = user.is_creator, "User registered");

    Ok(Json(AuthResponse::new(user, token)))
}

/// Login endpoint
///
/// # Endpoint
///
/// ```text
/// POST /api/auth/login
/// Content-Type: application/json
///
/// {
///   "email": "ada@example.com",
///   "password": "hunter22"
/// }
/// ```
///
/// # Errors
///
/// - `401 Unauthorized`: Unknown email or wrong password
/// - `422 Unprocessable Entity`: Malformed body or email
pub async fn login(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<LoginRequest>,
) -> ApiResult<Json<AuthResponse>> {
    let user = state
        .store
        .find_user_by_email(&req.email)
        .await?
        .ok_or_else(|| ApiError::Unauthorized("Invalid email or password".to_string()))?;

    let plaintext = req.password;
    let stored_hash = user.password_hash.clone();
    let matches =
        task::spawn_blocking(move || password::verify_password(&plaintext, &stored_hash)).await?;

    if !matches {
        return Err(ApiError::Unauthorized(
            "Invalid email or password".to_string(),
        ));
    }

    let token = jwt::issue_token(&user.email, state.jwt_secret())?;

    info!(email = %user.email, "User logged in");

    Ok(Json(AuthResponse::new(user, token)))
}
