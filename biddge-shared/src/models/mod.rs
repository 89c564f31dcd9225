/// Data models for Biddge
///
/// # Models
///
/// - `user`: User accounts and their joined-community lists
/// - `community`: Community records and their member counters
///
/// Persistence lives behind the traits in [`crate::store`].

pub mod community;
pub mod user;
