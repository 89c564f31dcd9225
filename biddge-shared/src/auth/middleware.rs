/// Bearer-token authentication
///
/// Resolves the `Authorization: Bearer <token>` header of a request to the
/// stored [`User`] it names. The API's auth layer calls [`authenticate`] and
/// inserts the result into request extensions as [`CurrentUser`].
///
/// # Example
///
/// ```
/// use axum::Extension;
/// use biddge_shared::auth::middleware::CurrentUser;
///
/// async fn handler(Extension(CurrentUser(user)): Extension<CurrentUser>) -> String {
///     format!("Hello, {}!", user.name)
/// }
/// ```

use axum::http::{header, HeaderMap};

use super::jwt::{verify_token, JwtError};
use crate::models::user::User;
use crate::store::{StoreError, UserStore};

/// The authenticated caller, added to request extensions by the auth layer
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

/// Error type for request authentication
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// No authorization header
    #[error("Missing authorization header")]
    MissingCredentials,

    /// Header present but not `Bearer <token>`
    #[error("Expected Bearer token")]
    InvalidFormat,

    /// Token is past its expiry
    #[error("Token expired")]
    Expired,

    /// Bad signature, issuer or encoding
    #[error("Invalid token: {0}")]
    InvalidToken(String),

    /// Token is valid but names no stored user
    #[error("Could not validate credentials")]
    UnknownUser,

    /// Lookup failed
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl From<JwtError> for AuthError {
    fn from(err: JwtError) -> Self {
        match err {
            JwtError::Expired => AuthError::Expired,
            other => AuthError::InvalidToken(other.to_string()),
        }
    }
}

/// Extracts the raw token from an `Authorization: Bearer` header
///
/// # Errors
///
/// - `AuthError::MissingCredentials` if the header is absent or not ASCII
/// - `AuthError::InvalidFormat` if the scheme is not `Bearer` or the token is empty
pub fn bearer_token(headers: &HeaderMap) -> Result<&str, AuthError> {
    let value = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or(AuthError::MissingCredentials)?;

    let token = value
        .strip_prefix("Bearer ")
        .map(str::trim)
        .ok_or(AuthError::InvalidFormat)?;

    if token.is_empty() {
        return Err(AuthError::InvalidFormat);
    }

    Ok(token)
}

/// Verifies the request's bearer token and loads the user it names
///
/// # Errors
///
/// Any [`AuthError`]; every variant except `Store` means "not authenticated".
pub async fn authenticate<S>(store: &S, headers: &HeaderMap, secret: &str) -> Result<User, AuthError>
where
    S: UserStore + ?Sized,
{
    let token = bearer_token(headers)?;
    let email = verify_token(token, secret)?;

    store
        .find_user_by_email(&email)
        .await?
        .ok_or(AuthError::UnknownUser)
}
