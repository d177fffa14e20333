//! Request DTOs for the gateway API
//!
//! Defines the structure of incoming HTTP request bodies.

use serde::Deserialize;

/// Maximum length of a schema version tag.
pub const MAX_VERSION_LENGTH: usize = 64;

/// Request body for the schema version bump (PUT /cache/version)
#[derive(Debug, Clone, Deserialize)]
pub struct VersionRequest {
    /// The new schema version tag
    pub version: String,
}

impl VersionRequest {
    /// Validates the request data
    ///
    /// Returns an error message if validation fails, None if valid.
    pub fn validate(&self) -> Option<String> {
        if self.version.trim().is_empty() {
            return Some("Version cannot be empty".to_string());
        }
        if self.version.len() > MAX_VERSION_LENGTH {
            return Some(format!(
                "Version exceeds maximum length of {} characters",
                MAX_VERSION_LENGTH
            ));
        }
        None
    }
}
