/// Middleware modules for the API server
///
/// - `security`: Security response headers
///
/// Bearer-token authentication is applied per route in [`crate::app`].

pub mod security;
