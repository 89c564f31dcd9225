/// JWT token generation and validation module
///
/// Bearer tokens are HS256-signed JWTs whose subject is the user's email.
/// Every token lives for seven days; there is no refresh flow and no
/// revocation list, so a token stays valid until it expires.
///
/// # Security
///
/// - **Algorithm**: HS256 (HMAC with SHA-256)
/// - **Expiration**: 7 days from issuance
/// - **Validation**: Signature, expiration, not-before and issuer checks
/// - **Secret Management**: Secrets should be at least 32 bytes (256 bits)
///
/// # Example
///
/// ```
/// use biddge_shared::auth::jwt::{issue_token, verify_token};
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let secret = "test-secret-key-at-least-32-bytes-long";
/// let token = issue_token("ada@example.com", secret)?;
///
/// assert_eq!(verify_token(&token, secret)?, "ada@example.com");
/// # Ok(())
/// # }
/// ```

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

/// Issuer claim stamped on every token
pub const ISSUER: &str = "biddge";

/// How long an issued token stays valid
pub fn token_lifetime() -> Duration {
    Duration::days(7)
}

/// Error type for JWT operations
#[derive(Debug, thiserror::Error)]
pub enum JwtError {
    /// Failed to create token
    #[error("Failed to create token: {0}")]
    CreateError(String),

    /// Token has expired
    #[error("Token has expired")]
    Expired,

    /// Signature, format, issuer or not-before check failed
    #[error("Invalid token: {0}")]
    Invalid(String),
}

/// JWT claims structure
///
/// - `sub`: Subject (user email)
/// - `iss`: Issuer (always "biddge")
/// - `iat`: Issued at timestamp
/// - `exp`: Expiration timestamp
/// - `nbf`: Not before timestamp
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject - user email
    pub sub: String,

    /// Issuer - always "biddge"
    pub iss: String,

    /// Issued at (Unix timestamp)
    pub iat: i64,

    /// Expiration time (Unix timestamp)
    pub exp: i64,

    /// Not before (Unix timestamp)
    pub nbf: i64,
}

impl Claims {
    /// Creates claims for `subject` with the standard seven day lifetime
    pub fn new(subject: impl Into<String>) -> Self {
        Self::with_expiration(subject, token_lifetime())
    }

    /// Creates claims with a custom lifetime
    ///
    /// A negative duration yields claims that are already expired, which is
    /// handy in tests.
    ///
    /// # Example
    ///
    /// ```
    /// use biddge_shared::auth::jwt::Claims;
    /// use chrono::Duration;
    ///
    /// let claims = Claims::with_expiration("ada@example.com", Duration::hours(1));
    /// assert_eq!(claims.exp - claims.iat, 3600);
    /// ```
    pub fn with_expiration(subject: impl Into<String>, expires_in: Duration) -> Self {
        let now = Utc::now();
        let expiration = now + expires_in;

        Self {
            sub: subject.into(),
            iss: ISSUER.to_string(),
            iat: now.timestamp(),
            exp: expiration.timestamp(),
            nbf: now.timestamp(),
        }
    }
}

/// Signs `claims` into a JWT using HS256
///
/// # Errors
///
/// Returns `JwtError::CreateError` if encoding fails
pub fn create_token(claims: &Claims, secret: &str) -> Result<String, JwtError> {
    let header = Header::new(Algorithm::HS256);
    let key = EncodingKey::from_secret(secret.as_bytes());

    encode(&header, claims, &key)
        .map_err(|e| JwtError::CreateError(format!("Token encoding failed: {}", e)))
}

/// Validates a JWT and returns its claims
///
/// Verifies the signature, expiry, not-before time and issuer. There is no
/// clock leeway: a token is rejected as soon as its `exp` has passed.
///
/// # Errors
///
/// - `JwtError::Expired` if the token is past its `exp`
/// - `JwtError::Invalid` for any other failure
pub fn validate_token(token: &str, secret: &str) -> Result<Claims, JwtError> {
    let key = DecodingKey::from_secret(secret.as_bytes());

    let mut validation = Validation::new(Algorithm::HS256);
    validation.set_issuer(&[ISSUER]);
    validation.validate_exp = true;
    validation.validate_nbf = true;
    validation.leeway = 0;

    let token_data = decode::<Claims>(token, &key, &validation).map_err(|e| match e.kind() {
        jsonwebtoken::errors::ErrorKind::ExpiredSignature => JwtError::Expired,
        _ => JwtError::Invalid(e.to_string()),
    })?;

    Ok(token_data.claims)
}

/// Issues a seven day token for `subject`
pub fn issue_token(subject: &str, secret: &str) -> Result<String, JwtError> {
    create_token(&Claims::new(subject), secret)
}

/// Verifies a token and returns the subject it was issued for
pub fn verify_token(token: &str, secret: &str) -> Result<String, JwtError> {
    validate_token(token, secret).map(|claims| claims.sub)
}
