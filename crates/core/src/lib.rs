//! Core business logic for galerie.

pub mod services;

pub use services::*;
