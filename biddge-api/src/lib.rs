//! # Biddge API Server Library
//!
//! Router, handlers and configuration for the Biddge community backend.
//!
//! ## Modules
//!
//! - `app`: Application state and router builder
//! - `config`: Configuration management
//! - `error`: Error handling and HTTP response mapping
//! - `extract`: Validated JSON body extractor
//! - `middleware`: Security headers
//! - `routes`: API route handlers
//! - `telemetry`: Tracing subscriber setup shared by the binaries

pub mod app;
pub mod config;
pub mod error;
pub mod extract;
pub mod middleware;
pub mod routes;
pub mod telemetry;
