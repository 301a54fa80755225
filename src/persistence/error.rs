//! Persistence error types.

use thiserror::Error;

/// Errors that can occur while saving or restoring history snapshots.
///
/// The navigator treats every one of these as soft: they are logged and the
/// operation that triggered them still succeeds.
#[derive(Debug, Error)]
pub enum PersistenceError {
    /// The storage backend could not read or write the key
    #[error("Storage access for key '{key}' failed: {source}")]
    Storage {
        key: String,
        #[source]
        source: std::io::Error,
    },

    /// Serialization to JSON failed
    #[error("Serialization failed: {0}")]
    SerializationFailed(String),

    /// Deserialization from JSON failed
    #[error("Deserialization failed: {0}")]
    DeserializationFailed(String),

    /// Snapshot version is not supported by this version
    #[error("Unsupported snapshot version {found}, supported: {supported}")]
    UnsupportedVersion { found: u32, supported: u32 },

    /// Snapshot data is well-formed but structurally invalid
    #[error("Snapshot validation failed: {0}")]
    ValidationFailed(String),
}
