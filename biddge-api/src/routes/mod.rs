/// API route handlers
///
/// Organized by resource:
///
/// - `health`: Health check endpoint
/// - `auth`: Registration and login
/// - `users`: Current user profile
/// - `communities`: Community listing, creation and membership
/// - `debug`: Diagnostics and the seed hook

pub mod auth;
pub mod communities;
pub mod debug;
pub mod health;
pub mod users;
