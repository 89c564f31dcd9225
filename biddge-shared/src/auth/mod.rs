/// Authentication utilities
///
/// # Modules
///
/// - [`password`]: Argon2id password hashing and verification
/// - [`jwt`]: Bearer token issuance and validation
/// - [`middleware`]: Resolving a request's bearer token to a stored user
///
/// # Example
///
/// ```no_run
/// use biddge_shared::auth::password::{hash_password, verify_password};
/// use biddge_shared::auth::jwt::{issue_token, verify_token};
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let hash = hash_password("user_password")?;
/// assert!(verify_password("user_password", &hash));
///
/// let token = issue_token("ada@example.com", "secret-key-at-least-32-bytes-long")?;
/// # Ok(())
/// # }
/// ```

pub mod jwt;
pub mod middleware;
pub mod password;
