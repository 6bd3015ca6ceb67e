//! ID and filename generation utilities.

use ulid::Ulid;
use uuid::Uuid;

/// ID generator for entities, tokens and media filenames.
#[derive(Debug, Clone, Default)]
pub struct IdGenerator {
    _private: (),
}

impl IdGenerator {
    /// Create a new ID generator.
    #[must_use]
    pub const fn new() -> Self {
        Self { _private: () }
    }

    /// Generate a new ULID-based entity ID.
    ///
    /// ULIDs are lexicographically sortable and shorter than UUIDs when
    /// represented as strings.
    #[must_use]
    pub fn generate(&self) -> String {
        Ulid::new().to_string().to_lowercase()
    }

    /// Generate a cryptographically secure random API token.
    #[must_use]
    pub fn generate_token(&self) -> String {
        // UUID v4 for tokens (no time component)
        Uuid::new_v4().simple().to_string()
    }

    /// Generate an opaque media filename: 32 hex characters plus the given
    /// lowercase extension.
    ///
    /// Uploaded files never keep their user-supplied names; the random token
    /// rules out path traversal and collisions.
    #[must_use]
    pub fn generate_media_filename(&self, extension: &str) -> String {
        format!("{}.{}", Uuid::new_v4().simple(), extension.to_lowercase())
    }
}
