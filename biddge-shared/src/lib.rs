//! # Biddge Shared Library
//!
//! Types, persistence and auth primitives used by the Biddge API server and
//! the seed command.
//!
//! ## Module Organization
//!
//! - `models`: User and community records
//! - `store`: Persistence traits with PostgreSQL and in-memory implementations
//! - `db`: Connection pool and migrations
//! - `auth`: Password hashing, tokens and request authentication
//! - `seed`: Sample community data

pub mod auth;
pub mod db;
pub mod models;
pub mod seed;
pub mod store;

/// Current version of the Biddge shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
