//! Common utilities and shared types for galerie.
//!
//! This crate provides foundational components used across all galerie crates:
//!
//! - **Configuration**: Application settings via [`Config`]
//! - **Error handling**: Unified error types via [`AppError`] and [`AppResult`]
//! - **ID Generation**: Entity ids, API tokens and media filenames via [`IdGenerator`]
//! - **Media kinds**: Extension allow-list and MIME lookup via [`MediaKind`]

pub mod config;
pub mod error;
pub mod id;
pub mod media_kind;

pub use config::{Config, MediaConfig};
pub use error::{AppError, AppResult};
pub use id::IdGenerator;
pub use media_kind::MediaKind;
