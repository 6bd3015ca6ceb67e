//! HTTP API layer for galerie.
//!
//! This crate provides the REST API:
//!
//! - **Endpoints**: gallery browsing, uploads, tags, albums, comments,
//!   sharing and account management
//! - **Extractors**: bearer-token authentication
//! - **Middleware**: token resolution, request state
//!
//! Built on Axum 0.8 with Tower middleware stack.

pub mod endpoints;
pub mod extractors;
pub mod middleware;
pub mod response;

pub use endpoints::router;
pub use middleware::{auth_middleware, AppState};
