//! Gift registry backend service

#![deny(
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    missing_docs,
    dead_code
)]

/// HTTP route handlers
pub mod routes;

/// Router construction and server bootstrap
pub mod server;

/// Environment configuration and API error types
pub mod types;

/// Presigned upload URL issuance
pub mod upload_issuance;
